//! Users and communities.

use async_trait::async_trait;

use crate::domain::ports::{CommunityRepository, RepositoryError, UserRepository};
use crate::domain::{Community, CommunityCode, CommunityId, Dni, Email, Role, User, UserId};

use super::MemoryStore;

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: &User) -> Result<(), RepositoryError> {
        let mut tables = self.tables();
        tables.check_user_unique(user)?;
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let mut tables = self.tables();
        tables.check_user_unique(user)?;
        if let Some(stored) = tables.users.get_mut(&user.id) {
            stored.full_name = user.full_name.clone();
            stored.floor = user.floor.clone();
            stored.password_hash = user.password_hash.clone();
            stored.role = user.role;
            stored.community_id = user.community_id;
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables().users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|user| &user.email == email)
            .cloned())
    }

    async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        Ok(self.tables().users.values().any(|user| &user.email == email))
    }

    async fn dni_exists(&self, dni: &Dni) -> Result<bool, RepositoryError> {
        Ok(self.tables().users.values().any(|user| &user.dni == dni))
    }

    async fn list_by_community(
        &self,
        community: &CommunityId,
    ) -> Result<Vec<User>, RepositoryError> {
        let mut members: Vec<User> = self
            .tables()
            .users
            .values()
            .filter(|user| user.community_id == Some(*community))
            .cloned()
            .collect();
        members.sort_by(|a, b| {
            a.full_name
                .as_ref()
                .cmp(b.full_name.as_ref())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(members)
    }
}

#[async_trait]
impl CommunityRepository for MemoryStore {
    async fn create_with_president(
        &self,
        community: &Community,
        president: &User,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables();
        if tables
            .communities
            .values()
            .any(|existing| existing.code == community.code)
        {
            return Err(RepositoryError::duplicate("communities_code_key"));
        }
        tables.check_user_unique(president)?;

        let mut stored = community.clone();
        stored.president_id = Some(president.id);
        tables.communities.insert(stored.id, stored);
        tables.users.insert(president.id, president.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CommunityId) -> Result<Option<Community>, RepositoryError> {
        Ok(self.tables().communities.get(id).cloned())
    }

    async fn find_by_code(
        &self,
        code: &CommunityCode,
    ) -> Result<Option<Community>, RepositoryError> {
        Ok(self
            .tables()
            .communities
            .values()
            .find(|community| &community.code == code)
            .cloned())
    }

    async fn code_exists(&self, code: &CommunityCode) -> Result<bool, RepositoryError> {
        Ok(self
            .tables()
            .communities
            .values()
            .any(|community| &community.code == code))
    }

    async fn transfer_presidency(
        &self,
        community: &CommunityId,
        from: &UserId,
        to: &UserId,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables();
        if !tables.users.contains_key(from) || !tables.users.contains_key(to) {
            return Err(RepositoryError::query("referenced record does not exist"));
        }
        if let Some(user) = tables.users.get_mut(from) {
            user.role = Role::Resident;
        }
        if let Some(user) = tables.users.get_mut(to) {
            user.role = Role::President;
        }
        if let Some(stored) = tables.communities.get_mut(community) {
            stored.president_id = Some(*to);
        }
        Ok(())
    }
}
