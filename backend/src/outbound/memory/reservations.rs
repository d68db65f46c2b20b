//! Common zones and their reservations.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::ports::{
    HistoryFilter, RepositoryError, ReservationRepository, ZoneRepository,
};
use crate::domain::{
    CommonZone, CommunityId, Reservation, ReservationId, ReservationView, UserId, ZoneId,
};

use super::{MemoryStore, Tables};

/// Name reported when an active booking would overlap another.
const OVERLAP: &str = "reservations_no_overlap";

impl Tables {
    fn view(&self, reservation: &Reservation) -> Option<ReservationView> {
        let zone = self.zones.get(&reservation.zone_id)?;
        let user = self.user(&reservation.user_id)?;
        Some(ReservationView {
            reservation: reservation.clone(),
            zone_name: zone.name.clone(),
            user_name: user.full_name.to_string(),
            user_email: user.email.to_string(),
        })
    }

    fn zone_in(&self, zone: &ZoneId, community: &CommunityId) -> bool {
        self.zones
            .get(zone)
            .is_some_and(|stored| stored.community_id == *community)
    }

    fn views<F>(&self, keep: F) -> Vec<ReservationView>
    where
        F: Fn(&Reservation) -> bool,
    {
        self.reservations
            .values()
            .filter(|reservation| keep(reservation))
            .filter_map(|reservation| self.view(reservation))
            .collect()
    }
}

fn chronological(views: &mut [ReservationView]) {
    views.sort_by(|a, b| {
        a.reservation
            .starts_at()
            .cmp(&b.reservation.starts_at())
            .then_with(|| a.reservation.id.cmp(&b.reservation.id))
    });
}

fn newest_first(views: &mut [ReservationView]) {
    views.sort_by(|a, b| {
        b.reservation
            .starts_at()
            .cmp(&a.reservation.starts_at())
            .then_with(|| a.reservation.id.cmp(&b.reservation.id))
    });
}

#[async_trait]
impl ZoneRepository for MemoryStore {
    async fn insert(&self, zone: &CommonZone) -> Result<(), RepositoryError> {
        let mut tables = self.tables();
        if tables
            .zones
            .values()
            .any(|existing| existing.community_id == zone.community_id && existing.name == zone.name)
        {
            return Err(RepositoryError::duplicate("zones_community_name_key"));
        }
        tables.zones.insert(zone.id, zone.clone());
        Ok(())
    }

    async fn find_in_community(
        &self,
        id: &ZoneId,
        community: &CommunityId,
    ) -> Result<Option<CommonZone>, RepositoryError> {
        Ok(self
            .tables()
            .zones
            .get(id)
            .filter(|zone| zone.community_id == *community)
            .cloned())
    }

    async fn name_exists(
        &self,
        community: &CommunityId,
        name: &str,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .tables()
            .zones
            .values()
            .any(|zone| zone.community_id == *community && zone.name == name))
    }

    async fn list_by_community(
        &self,
        community: &CommunityId,
    ) -> Result<Vec<CommonZone>, RepositoryError> {
        let mut zones: Vec<CommonZone> = self
            .tables()
            .zones
            .values()
            .filter(|zone| zone.community_id == *community)
            .cloned()
            .collect();
        zones.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(zones)
    }

    async fn delete(&self, id: &ZoneId) -> Result<(), RepositoryError> {
        let mut tables = self.tables();
        tables.zones.remove(id);
        tables
            .reservations
            .retain(|_, reservation| reservation.zone_id != *id);
        Ok(())
    }
}

#[async_trait]
impl ReservationRepository for MemoryStore {
    async fn insert(&self, reservation: &Reservation) -> Result<(), RepositoryError> {
        let mut tables = self.tables();
        if reservation.is_active()
            && tables.reservations.values().any(|existing| {
                existing.is_active()
                    && existing.zone_id == reservation.zone_id
                    && existing.date == reservation.date
                    && existing.range().overlaps(&reservation.range())
            })
        {
            return Err(RepositoryError::duplicate(OVERLAP));
        }
        tables
            .reservations
            .insert(reservation.id, reservation.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ReservationId,
    ) -> Result<Option<Reservation>, RepositoryError> {
        Ok(self.tables().reservations.get(id).cloned())
    }

    async fn update(&self, reservation: &Reservation) -> Result<(), RepositoryError> {
        if let Some(stored) = self.tables().reservations.get_mut(&reservation.id) {
            stored.state = reservation.state;
            stored.cancelled_at = reservation.cancelled_at;
        }
        Ok(())
    }

    async fn active_on(
        &self,
        zone: &ZoneId,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, RepositoryError> {
        let mut active: Vec<Reservation> = self
            .tables()
            .reservations
            .values()
            .filter(|r| r.is_active() && r.zone_id == *zone && r.date == date)
            .cloned()
            .collect();
        active.sort_by_key(|r| r.start);
        Ok(active)
    }

    async fn count_active_for_user_on(
        &self,
        user: &UserId,
        zone: &ZoneId,
        date: NaiveDate,
    ) -> Result<u64, RepositoryError> {
        let count = self
            .tables()
            .reservations
            .values()
            .filter(|r| r.is_active() && r.user_id == *user && r.zone_id == *zone && r.date == date)
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn count_upcoming_for_user(
        &self,
        user: &UserId,
        now: NaiveDateTime,
    ) -> Result<u64, RepositoryError> {
        let count = self
            .tables()
            .reservations
            .values()
            .filter(|r| r.is_active() && r.user_id == *user && r.starts_at() >= now)
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn has_active_after(
        &self,
        zone: &ZoneId,
        date: NaiveDate,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .tables()
            .reservations
            .values()
            .any(|r| r.is_active() && r.zone_id == *zone && r.date > date))
    }

    async fn active_for_zone(
        &self,
        zone: &ZoneId,
    ) -> Result<Vec<ReservationView>, RepositoryError> {
        let mut views = self
            .tables()
            .views(|r| r.is_active() && r.zone_id == *zone);
        chronological(&mut views);
        Ok(views)
    }

    async fn history(
        &self,
        community: &CommunityId,
        filter: HistoryFilter,
    ) -> Result<Vec<ReservationView>, RepositoryError> {
        let tables = self.tables();
        let mut views = tables.views(|r| {
            tables.zone_in(&r.zone_id, community)
                && filter.zone.is_none_or(|zone| r.zone_id == zone)
                && filter.from.is_none_or(|from| r.date >= from)
                && filter.to.is_none_or(|to| r.date <= to)
        });
        newest_first(&mut views);
        Ok(views)
    }

    async fn for_user(&self, user: &UserId) -> Result<Vec<ReservationView>, RepositoryError> {
        let mut views = self.tables().views(|r| r.user_id == *user);
        newest_first(&mut views);
        Ok(views)
    }

    async fn community_between(
        &self,
        community: &CommunityId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ReservationView>, RepositoryError> {
        let tables = self.tables();
        let mut views = tables.views(|r| {
            r.is_active() && tables.zone_in(&r.zone_id, community) && r.date >= from && r.date <= to
        });
        chronological(&mut views);
        Ok(views)
    }
}
