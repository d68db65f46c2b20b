//! Incident reporting and follow-up.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::ports::{IncidentListing, IncidentRepository, UserRepository};
use super::{
    ActorLoader, Attachment, Error, FileCategory, Incident, IncidentDraft, IncidentId,
    IncidentSortField, IncidentState, IncidentView, Page, PageRequest, Role, SortDirection,
    StoredFileName, Uploader, UserId, require_community, require_role, require_same_community,
};

/// Incident operations scoped to the actor's community.
#[derive(Clone)]
pub struct IncidentService {
    actors: ActorLoader,
    incidents: Arc<dyn IncidentRepository>,
    uploads: Uploader,
    clock: Arc<dyn Clock>,
}

impl IncidentService {
    /// Assemble the service from its ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        incidents: Arc<dyn IncidentRepository>,
        uploads: Uploader,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            actors: ActorLoader::new(users),
            incidents,
            uploads,
            clock,
        }
    }

    /// Report an incident, optionally with a photo.
    pub async fn create(
        &self,
        actor: &UserId,
        draft: IncidentDraft,
        image: Option<Attachment>,
    ) -> Result<Incident, Error> {
        let actor = self.actors.load(actor).await?;
        let community_id = require_community(&actor)?;
        let image = match image {
            Some(image) => Some(self.uploads.store_image(FileCategory::Incidents, image).await?),
            None => None,
        };
        let incident = Incident {
            id: IncidentId::random(),
            title: draft.title,
            description: draft.description,
            location: draft.location,
            image,
            created_at: self.clock.utc(),
            state: IncidentState::Open,
            author_id: actor.id,
            community_id,
        };
        if let Err(error) = self.incidents.insert(&incident).await {
            self.discard_image(incident.image.as_ref()).await;
            return Err(error.into());
        }
        info!(incident_id = %incident.id, community_id = %community_id, "incident reported");
        Ok(incident)
    }

    /// Page through the incidents of the actor's community.
    pub async fn list(
        &self,
        actor: &UserId,
        sort: IncidentSortField,
        direction: SortDirection,
        page: PageRequest,
    ) -> Result<Page<IncidentView>, Error> {
        let actor = self.actors.load(actor).await?;
        let community = require_community(&actor)?;
        Ok(self
            .incidents
            .list(IncidentListing {
                community,
                sort,
                direction,
                page,
            })
            .await?)
    }

    /// Move an incident along its lifecycle.
    pub async fn update_state(
        &self,
        actor: &UserId,
        id: &IncidentId,
        next: IncidentState,
    ) -> Result<Incident, Error> {
        let actor = self.actors.load(actor).await?;
        require_role(&actor, &[Role::President, Role::Administrator])?;
        let mut incident = self.find(id).await?;
        require_same_community(&actor, incident.community_id)?;
        incident.state = incident.state.transition_to(next)?;
        self.incidents.update_state(id, incident.state).await?;
        info!(incident_id = %id, state = %incident.state, "incident state changed");
        Ok(incident)
    }

    /// Delete an incident and its photo.
    pub async fn delete(&self, actor: &UserId, id: &IncidentId) -> Result<(), Error> {
        let actor = self.actors.load(actor).await?;
        let incident = self.find(id).await?;
        require_same_community(&actor, incident.community_id)?;
        let may_delete = actor.has_any_role(&[Role::Administrator, Role::President])
            || incident.author_id == actor.id;
        if !may_delete {
            return Err(Error::forbidden(
                "only the author, the president or an administrator can delete an incident",
            ));
        }
        self.incidents.delete(id).await?;
        self.discard_image(incident.image.as_ref()).await;
        info!(incident_id = %id, "incident deleted");
        Ok(())
    }

    /// Bytes of a stored incident photo.
    pub async fn download(&self, raw_name: &str) -> Result<(StoredFileName, Vec<u8>), Error> {
        self.uploads.read(FileCategory::Incidents, raw_name).await
    }

    async fn find(&self, id: &IncidentId) -> Result<Incident, Error> {
        self.incidents
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("incident {id} not found")))
    }

    async fn discard_image(&self, image: Option<&StoredFileName>) {
        if let Some(image) = image {
            self.uploads
                .discard_all(FileCategory::Incidents, std::slice::from_ref(image))
                .await;
        }
    }
}

#[cfg(test)]
#[path = "incident_service_tests.rs"]
mod tests;
