//! Registration, login and session lookups.

use std::sync::Arc;

use tracing::{info, warn};

use super::ports::{CommunityRepository, PasswordHasher, UserRepository};
use super::{
    AccountDraft, Community, CommunityId, Email, Error, LoginCredentials, PresidentRegistration,
    ResidentRegistration, Role, User, UserId,
};

/// Authenticated user together with the community they belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user: User,
    pub community: Option<Community>,
}

/// Account creation and credential checks.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    communities: Arc<dyn CommunityRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AuthService {
    /// Assemble the service from its ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        communities: Arc<dyn CommunityRepository>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            users,
            communities,
            hasher,
        }
    }

    /// Found a community and create its president in one step.
    pub async fn register_president(
        &self,
        registration: PresidentRegistration,
    ) -> Result<User, Error> {
        let PresidentRegistration { account, community } = registration;
        self.ensure_account_is_new(&account).await?;
        if self.communities.code_exists(community.code()).await? {
            return Err(Error::invalid_field(
                "communityCode",
                "taken",
                "community code already in use",
            ));
        }

        let community_id = CommunityId::random();
        let president = self.build_user(account, Role::President, Some(community_id))?;
        let community = community.into_community(community_id, president.id);
        self.communities
            .create_with_president(&community, &president)
            .await?;
        info!(
            user_id = %president.id,
            community_id = %community.id,
            code = %community.code,
            "community founded"
        );
        Ok(president)
    }

    /// Create a resident or administrator inside an existing community.
    pub async fn register_resident(
        &self,
        registration: ResidentRegistration,
    ) -> Result<User, Error> {
        let ResidentRegistration {
            account,
            community_code,
            role,
        } = registration;
        let community = self
            .communities
            .find_by_code(&community_code)
            .await?
            .ok_or_else(|| Error::not_found(format!("community {community_code} not found")))?;
        self.ensure_account_is_new(&account).await?;

        let user = self.build_user(account, role, Some(community.id))?;
        self.users.insert(&user).await?;
        info!(user_id = %user.id, community_id = %community.id, role = %role, "user registered");
        Ok(user)
    }

    /// Verify credentials. Unknown emails and wrong passwords are
    /// indistinguishable to the caller.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let rejected = || Error::unauthorized("invalid credentials");
        let Ok(email) = Email::new(credentials.email()) else {
            return Err(rejected());
        };
        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!("login attempt for unknown email");
            return Err(rejected());
        };
        if !self
            .hasher
            .verify(credentials.password(), &user.password_hash)?
        {
            warn!(user_id = %user.id, "login attempt with wrong password");
            return Err(rejected());
        }
        info!(user_id = %user.id, "user logged in");
        Ok(user)
    }

    /// Load the session user and their community.
    pub async fn me(&self, id: &UserId) -> Result<CurrentUser, Error> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::unauthorized("login required"))?;
        let community = match user.community_id {
            Some(community_id) => self.communities.find_by_id(&community_id).await?,
            None => None,
        };
        Ok(CurrentUser { user, community })
    }

    /// Whether a session id still refers to an existing user.
    pub async fn session_valid(&self, id: Option<UserId>) -> Result<bool, Error> {
        match id {
            Some(id) => Ok(self.users.find_by_id(&id).await?.is_some()),
            None => Ok(false),
        }
    }

    async fn ensure_account_is_new(&self, account: &AccountDraft) -> Result<(), Error> {
        if self.users.email_exists(&account.email).await? {
            return Err(Error::invalid_field(
                "email",
                "taken",
                "email already registered",
            ));
        }
        if self.users.dni_exists(&account.dni).await? {
            return Err(Error::invalid_field("dni", "taken", "DNI already registered"));
        }
        Ok(())
    }

    fn build_user(
        &self,
        account: AccountDraft,
        role: Role,
        community_id: Option<CommunityId>,
    ) -> Result<User, Error> {
        let password_hash = self.hasher.hash(&account.password)?;
        Ok(User {
            id: UserId::random(),
            email: account.email,
            dni: account.dni,
            full_name: account.full_name,
            floor: account.floor,
            password_hash,
            role,
            community_id,
        })
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
