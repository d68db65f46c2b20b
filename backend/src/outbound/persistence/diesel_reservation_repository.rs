//! PostgreSQL-backed `ReservationRepository` implementation using Diesel ORM.
//!
//! Overlapping active bookings are rejected by the `reservations_no_overlap`
//! exclusion constraint, which the error mapping reports as a duplicate.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{HistoryFilter, RepositoryError, ReservationRepository};
use crate::domain::{
    CommunityId, Reservation, ReservationId, ReservationState, ReservationView, UserId, ZoneId,
};

use super::diesel_helpers::{count_to_u64, invalid_row, map_diesel_error, map_pool_error};
use super::models::{ReservationRow, ReservationStateChangeset};
use super::pool::DbPool;
use super::schema::{reservations, users, zones};

const ACTIVE: &str = ReservationState::Active.as_str();

type ViewRow = (ReservationRow, String, String, String);

/// Diesel-backed implementation of the reservation repository port.
#[derive(Clone)]
pub struct DieselReservationRepository {
    pool: DbPool,
}

impl DieselReservationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_reservation(row: ReservationRow) -> Result<Reservation, RepositoryError> {
    let state = row
        .state
        .parse::<ReservationState>()
        .map_err(|err| invalid_row("reservation", row.id, err))?;
    Ok(Reservation {
        id: ReservationId::from_uuid(row.id),
        zone_id: ZoneId::from_uuid(row.zone_id),
        user_id: UserId::from_uuid(row.user_id),
        date: row.date,
        start: row.start_time,
        end: row.end_time,
        state,
        created_at: row.created_at,
        cancelled_at: row.cancelled_at,
    })
}

fn reservation_row(reservation: &Reservation) -> ReservationRow {
    ReservationRow {
        id: *reservation.id.as_uuid(),
        zone_id: *reservation.zone_id.as_uuid(),
        user_id: *reservation.user_id.as_uuid(),
        date: reservation.date,
        start_time: reservation.start,
        end_time: reservation.end,
        state: reservation.state.as_str().to_owned(),
        created_at: reservation.created_at,
        cancelled_at: reservation.cancelled_at,
    }
}

fn rows_to_views(rows: Vec<ViewRow>) -> Result<Vec<ReservationView>, RepositoryError> {
    rows.into_iter()
        .map(|(row, zone_name, user_name, user_email)| {
            row_to_reservation(row).map(|reservation| ReservationView {
                reservation,
                zone_name,
                user_name,
                user_email,
            })
        })
        .collect()
}

#[async_trait]
impl ReservationRepository for DieselReservationRepository {
    async fn insert(&self, reservation: &Reservation) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(reservations::table)
            .values(&reservation_row(reservation))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &ReservationId,
    ) -> Result<Option<Reservation>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = reservations::table
            .filter(reservations::id.eq(id.as_uuid()))
            .select(ReservationRow::as_select())
            .first::<ReservationRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_reservation).transpose()
    }

    async fn update(&self, reservation: &Reservation) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = ReservationStateChangeset {
            state: reservation.state.as_str(),
            cancelled_at: reservation.cancelled_at,
        };
        diesel::update(reservations::table.filter(reservations::id.eq(reservation.id.as_uuid())))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn active_on(
        &self,
        zone: &ZoneId,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ReservationRow> = reservations::table
            .filter(reservations::zone_id.eq(zone.as_uuid()))
            .filter(reservations::date.eq(date))
            .filter(reservations::state.eq(ACTIVE))
            .order(reservations::start_time.asc())
            .select(ReservationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_reservation).collect()
    }

    async fn count_active_for_user_on(
        &self,
        user: &UserId,
        zone: &ZoneId,
        date: NaiveDate,
    ) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = reservations::table
            .filter(reservations::user_id.eq(user.as_uuid()))
            .filter(reservations::zone_id.eq(zone.as_uuid()))
            .filter(reservations::date.eq(date))
            .filter(reservations::state.eq(ACTIVE))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count_to_u64(count))
    }

    async fn count_upcoming_for_user(
        &self,
        user: &UserId,
        now: NaiveDateTime,
    ) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let today = now.date();
        let count: i64 = reservations::table
            .filter(reservations::user_id.eq(user.as_uuid()))
            .filter(reservations::state.eq(ACTIVE))
            .filter(
                reservations::date.gt(today).or(reservations::date
                    .eq(today)
                    .and(reservations::start_time.ge(now.time()))),
            )
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count_to_u64(count))
    }

    async fn has_active_after(
        &self,
        zone: &ZoneId,
        date: NaiveDate,
    ) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            reservations::table
                .filter(reservations::zone_id.eq(zone.as_uuid()))
                .filter(reservations::state.eq(ACTIVE))
                .filter(reservations::date.gt(date)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn active_for_zone(
        &self,
        zone: &ZoneId,
    ) -> Result<Vec<ReservationView>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ViewRow> = reservations::table
            .inner_join(zones::table)
            .inner_join(users::table)
            .filter(reservations::zone_id.eq(zone.as_uuid()))
            .filter(reservations::state.eq(ACTIVE))
            .order((reservations::date.asc(), reservations::start_time.asc()))
            .select((
                ReservationRow::as_select(),
                zones::name,
                users::full_name,
                users::email,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_views(rows)
    }

    async fn history(
        &self,
        community: &CommunityId,
        filter: HistoryFilter,
    ) -> Result<Vec<ReservationView>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = reservations::table
            .inner_join(zones::table)
            .inner_join(users::table)
            .filter(zones::community_id.eq(*community.as_uuid()))
            .select((
                ReservationRow::as_select(),
                zones::name,
                users::full_name,
                users::email,
            ))
            .into_boxed();
        if let Some(zone) = filter.zone {
            query = query.filter(reservations::zone_id.eq(*zone.as_uuid()));
        }
        if let Some(from) = filter.from {
            query = query.filter(reservations::date.ge(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(reservations::date.le(to));
        }

        let rows: Vec<ViewRow> = query
            .order((
                reservations::date.desc(),
                reservations::start_time.desc(),
                reservations::id.asc(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_views(rows)
    }

    async fn for_user(&self, user: &UserId) -> Result<Vec<ReservationView>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ViewRow> = reservations::table
            .inner_join(zones::table)
            .inner_join(users::table)
            .filter(reservations::user_id.eq(user.as_uuid()))
            .order((reservations::date.desc(), reservations::start_time.desc()))
            .select((
                ReservationRow::as_select(),
                zones::name,
                users::full_name,
                users::email,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_views(rows)
    }

    async fn community_between(
        &self,
        community: &CommunityId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ReservationView>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ViewRow> = reservations::table
            .inner_join(zones::table)
            .inner_join(users::table)
            .filter(zones::community_id.eq(community.as_uuid()))
            .filter(reservations::state.eq(ACTIVE))
            .filter(reservations::date.between(from, to))
            .order((reservations::date.asc(), reservations::start_time.asc()))
            .select((
                ReservationRow::as_select(),
                zones::name,
                users::full_name,
                users::email,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_views(rows)
    }
}
