//! Port abstraction for zone reservations.
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{
    CommunityId, Reservation, ReservationId, ReservationView, UserId, ZoneId,
};

use super::RepositoryError;

/// Optional filters for the reservation history of a community.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub zone: Option<ZoneId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Store a new reservation. Adapters reject an active reservation that
    /// overlaps another in the same zone and date with
    /// [`RepositoryError::Duplicate`].
    async fn insert(&self, reservation: &Reservation) -> Result<(), RepositoryError>;

    /// Fetch a reservation by identifier.
    async fn find_by_id(
        &self,
        id: &ReservationId,
    ) -> Result<Option<Reservation>, RepositoryError>;

    /// Persist a state change (cancellation).
    async fn update(&self, reservation: &Reservation) -> Result<(), RepositoryError>;

    /// Active reservations of a zone on one date, ordered by start.
    async fn active_on(
        &self,
        zone: &ZoneId,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, RepositoryError>;

    /// Active reservations `user` holds in `zone` on `date`.
    async fn count_active_for_user_on(
        &self,
        user: &UserId,
        zone: &ZoneId,
        date: NaiveDate,
    ) -> Result<u64, RepositoryError>;

    /// Active reservations of `user` starting at or after `now`.
    async fn count_upcoming_for_user(
        &self,
        user: &UserId,
        now: NaiveDateTime,
    ) -> Result<u64, RepositoryError>;

    /// Whether the zone has active reservations dated after `date`.
    async fn has_active_after(
        &self,
        zone: &ZoneId,
        date: NaiveDate,
    ) -> Result<bool, RepositoryError>;

    /// Active reservations of a zone, ordered by date and start.
    async fn active_for_zone(
        &self,
        zone: &ZoneId,
    ) -> Result<Vec<ReservationView>, RepositoryError>;

    /// Every reservation of a community matching `filter`, newest first.
    async fn history(
        &self,
        community: &CommunityId,
        filter: HistoryFilter,
    ) -> Result<Vec<ReservationView>, RepositoryError>;

    /// Reservations made by `user`, newest date first.
    async fn for_user(&self, user: &UserId) -> Result<Vec<ReservationView>, RepositoryError>;

    /// Active reservations of a community between two dates inclusive,
    /// ordered by date and start.
    async fn community_between(
        &self,
        community: &CommunityId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ReservationView>, RepositoryError>;
}
