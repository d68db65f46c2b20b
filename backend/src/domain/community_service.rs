//! Community overview, membership changes and the presidency handover.

use std::sync::Arc;

use tracing::info;

use super::ports::{CommunityRepository, UserRepository};
use super::{
    ActorLoader, CommunityCode, Error, Role, User, UserId, require_community, require_role,
};

/// President label used when a community has none.
pub const NOT_ASSIGNED: &str = "Not assigned";

/// One member as listed on the community page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidentSummary {
    pub id: UserId,
    pub name: String,
    pub floor: String,
}

/// Summary of the actor's community.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityOverview {
    pub name: String,
    pub code: String,
    pub president: String,
    pub residents: Vec<ResidentSummary>,
}

/// Community administration for members.
#[derive(Clone)]
pub struct CommunityService {
    actors: ActorLoader,
    users: Arc<dyn UserRepository>,
    communities: Arc<dyn CommunityRepository>,
}

impl CommunityService {
    /// Assemble the service from its ports.
    pub fn new(users: Arc<dyn UserRepository>, communities: Arc<dyn CommunityRepository>) -> Self {
        Self {
            actors: ActorLoader::new(Arc::clone(&users)),
            users,
            communities,
        }
    }

    /// Name, code, president and members of the actor's community.
    pub async fn my_community(&self, actor: &UserId) -> Result<CommunityOverview, Error> {
        let actor = self
            .actors
            .load_with_role(actor, &[Role::Resident, Role::President])
            .await?;
        let community_id = require_community(&actor)?;
        let community = self
            .communities
            .find_by_id(&community_id)
            .await?
            .ok_or_else(|| Error::not_found("community not found"))?;
        let members = self.users.list_by_community(&community_id).await?;

        let president = community
            .president_id
            .and_then(|id| members.iter().find(|member| member.id == id))
            .map_or_else(|| NOT_ASSIGNED.to_owned(), |user| user.full_name.to_string());
        let residents = members
            .into_iter()
            .map(|member| ResidentSummary {
                id: member.id,
                name: member.full_name.to_string(),
                floor: member.floor.as_ref().to_owned(),
            })
            .collect();
        Ok(CommunityOverview {
            name: community.name,
            code: community.code.to_string(),
            president,
            residents,
        })
    }

    /// Move the actor to the community identified by `code`.
    ///
    /// Presidents must hand over the presidency first.
    pub async fn change_community(&self, actor: &UserId, code: &CommunityCode) -> Result<(), Error> {
        let mut actor = self.actors.load(actor).await?;
        let target = self
            .communities
            .find_by_code(code)
            .await?
            .ok_or_else(|| Error::not_found(format!("community {code} not found")))?;
        if actor.role == Role::President {
            return Err(Error::invalid_request(
                "a president must cede the presidency before changing community",
            ));
        }
        actor.community_id = Some(target.id);
        self.users.update(&actor).await?;
        info!(user_id = %actor.id, community_id = %target.id, "user changed community");
        Ok(())
    }

    /// Hand the presidency to another resident of the same community.
    pub async fn cede_presidency(&self, actor: &UserId, successor: &UserId) -> Result<(), Error> {
        let actor = self.actors.load(actor).await?;
        if actor.role != Role::President {
            return Err(Error::forbidden("only the president can cede the presidency"));
        }
        let community_id = require_community(&actor)?;
        let successor = self
            .users
            .find_by_id(successor)
            .await?
            .ok_or_else(|| Error::not_found("user not found"))?;
        if !successor.belongs_to(community_id) {
            return Err(Error::invalid_request(
                "the new president must belong to the same community",
            ));
        }
        if successor.id == actor.id {
            return Err(Error::invalid_request("the presidency cannot be ceded to yourself"));
        }
        if successor.role != Role::Resident {
            return Err(Error::invalid_request(
                "the presidency can only be ceded to a resident",
            ));
        }
        self.communities
            .transfer_presidency(&community_id, &actor.id, &successor.id)
            .await?;
        info!(
            community_id = %community_id,
            from = %actor.id,
            to = %successor.id,
            "presidency ceded"
        );
        Ok(())
    }

    /// Every user of the actor's community, ordered by name.
    pub async fn members(&self, actor: &UserId) -> Result<Vec<User>, Error> {
        let actor = self.actors.load(actor).await?;
        require_role(&actor, &[Role::President, Role::Administrator])?;
        let community_id = require_community(&actor)?;
        Ok(self.users.list_by_community(&community_id).await?)
    }
}
