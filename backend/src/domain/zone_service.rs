//! Common zones that residents can book.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::ports::{ReservationRepository, UserRepository, ZoneRepository};
use super::{
    ActorLoader, CommonZone, Error, Role, UserId, ZoneId, require_community, zone_name,
};

/// Zone as listed for one viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneListItem {
    pub zone: CommonZone,
    pub can_delete: bool,
}

/// Zone management for presidents and listing for members.
#[derive(Clone)]
pub struct ZoneService {
    actors: ActorLoader,
    zones: Arc<dyn ZoneRepository>,
    reservations: Arc<dyn ReservationRepository>,
    clock: Arc<dyn Clock>,
}

impl ZoneService {
    /// Assemble the service from its ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        zones: Arc<dyn ZoneRepository>,
        reservations: Arc<dyn ReservationRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            actors: ActorLoader::new(users),
            zones,
            reservations,
            clock,
        }
    }

    /// Create a zone with a name unique within the community.
    pub async fn create(&self, actor: &UserId, name: &str) -> Result<CommonZone, Error> {
        let name = zone_name(name)?;
        let actor = self
            .actors
            .load_with_role(actor, &[Role::President])
            .await?;
        let community_id = require_community(&actor)?;
        if self.zones.name_exists(&community_id, &name).await? {
            return Err(Error::invalid_field(
                "name",
                "taken",
                format!("a zone called {name} already exists"),
            ));
        }
        let zone = CommonZone {
            id: ZoneId::random(),
            name,
            community_id,
        };
        self.zones.insert(&zone).await?;
        info!(zone_id = %zone.id, name = %zone.name, "zone created");
        Ok(zone)
    }

    /// Delete a zone without upcoming active reservations.
    pub async fn delete(&self, actor: &UserId, id: &ZoneId) -> Result<(), Error> {
        let actor = self
            .actors
            .load_with_role(actor, &[Role::President])
            .await?;
        let community_id = require_community(&actor)?;
        let zone = self
            .zones
            .find_in_community(id, &community_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("zone {id} not found in your community")))?;
        let today = self.clock.utc().date_naive();
        if self.reservations.has_active_after(&zone.id, today).await? {
            return Err(Error::invalid_request(
                "the zone has upcoming active reservations",
            ));
        }
        self.zones.delete(&zone.id).await?;
        info!(zone_id = %zone.id, "zone deleted");
        Ok(())
    }

    /// Zones of the actor's community ordered by name.
    pub async fn list(&self, actor: &UserId) -> Result<Vec<ZoneListItem>, Error> {
        let actor = self.actors.load(actor).await?;
        let community_id = require_community(&actor)?;
        let can_delete = actor.role == Role::President;
        Ok(self
            .zones
            .list_by_community(&community_id)
            .await?
            .into_iter()
            .map(|zone| ZoneListItem { zone, can_delete })
            .collect())
    }
}
