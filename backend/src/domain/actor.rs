//! Loading the acting user and the role checks shared by services.

use std::sync::Arc;

use tracing::debug;

use super::ports::UserRepository;
use super::{CommunityId, Error, Role, User, UserId};

/// Resolves session user ids into [`User`] records.
#[derive(Clone)]
pub struct ActorLoader {
    users: Arc<dyn UserRepository>,
}

impl ActorLoader {
    /// Wrap the user repository.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Load the acting user; an id without a record is unauthenticated.
    pub async fn load(&self, id: &UserId) -> Result<User, Error> {
        match self.users.find_by_id(id).await? {
            Some(user) => Ok(user),
            None => {
                debug!(user_id = %id, "session refers to unknown user");
                Err(Error::unauthorized("login required"))
            }
        }
    }

    /// Load the acting user and require one of `roles`.
    pub async fn load_with_role(&self, id: &UserId, roles: &[Role]) -> Result<User, Error> {
        let actor = self.load(id).await?;
        require_role(&actor, roles)?;
        Ok(actor)
    }
}

/// Reject actors whose role is not in `roles`.
pub(crate) fn require_role(actor: &User, roles: &[Role]) -> Result<(), Error> {
    if actor.has_any_role(roles) {
        Ok(())
    } else {
        Err(Error::forbidden(format!(
            "role {} may not perform this action",
            actor.role
        )))
    }
}

/// Community the actor belongs to.
pub(crate) fn require_community(actor: &User) -> Result<CommunityId, Error> {
    actor
        .community_id
        .ok_or_else(|| Error::invalid_request("user has no community"))
}

/// Reject resources that live in another community.
pub(crate) fn require_same_community(actor: &User, owner: CommunityId) -> Result<(), Error> {
    if actor.belongs_to(owner) {
        Ok(())
    } else {
        Err(Error::forbidden("resource belongs to another community"))
    }
}
