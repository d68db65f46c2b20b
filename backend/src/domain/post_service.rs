//! Community bulletin posts.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::ports::{CommunityRepository, PostRepository, UserRepository};
use super::{
    ActorLoader, CommunityCode, Error, Page, PageRequest, Post, PostDraft, PostId, PostView,
    Role, UserId, require_community, require_same_community,
};

const POSTING_ROLES: &[Role] = &[Role::Resident, Role::President];

/// Post operations for residents and presidents.
#[derive(Clone)]
pub struct PostService {
    actors: ActorLoader,
    communities: Arc<dyn CommunityRepository>,
    posts: Arc<dyn PostRepository>,
    clock: Arc<dyn Clock>,
}

impl PostService {
    /// Assemble the service from its ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        communities: Arc<dyn CommunityRepository>,
        posts: Arc<dyn PostRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            actors: ActorLoader::new(users),
            communities,
            posts,
            clock,
        }
    }

    /// Publish a post in the actor's community.
    pub async fn create(&self, actor: &UserId, draft: PostDraft) -> Result<PostView, Error> {
        let actor = self.actors.load_with_role(actor, POSTING_ROLES).await?;
        let community_id = require_community(&actor)?;
        let post = Post {
            id: PostId::random(),
            title: draft.title,
            content: draft.content,
            author_id: actor.id,
            community_id,
            created_at: self.clock.utc(),
        };
        self.posts.insert(&post).await?;
        info!(post_id = %post.id, community_id = %community_id, "post published");
        Ok(PostView {
            post,
            author_name: actor.full_name.to_string(),
            author_role: actor.role,
        })
    }

    /// Posts of the community with join code `code`, newest first.
    ///
    /// Members may only read the feed of their own community.
    pub async fn list_by_community(
        &self,
        actor: &UserId,
        code: &str,
        page: PageRequest,
    ) -> Result<Page<PostView>, Error> {
        if code.trim().is_empty() {
            return Err(Error::invalid_field(
                "communityCode",
                "empty_value",
                "community code must not be empty",
            ));
        }
        let actor = self.actors.load_with_role(actor, POSTING_ROLES).await?;
        let code = CommunityCode::new(code)?;
        let community = self
            .communities
            .find_by_code(&code)
            .await?
            .ok_or_else(|| Error::not_found(format!("community {code} not found")))?;
        require_same_community(&actor, community.id)?;
        Ok(self.posts.list_by_community(&community.id, page).await?)
    }

    /// Delete a post. Presidents may delete any post of their community,
    /// residents only their own.
    pub async fn delete(&self, actor: &UserId, id: &PostId) -> Result<(), Error> {
        let actor = self.actors.load_with_role(actor, POSTING_ROLES).await?;
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("post {id} not found")))?;
        require_same_community(&actor, post.community_id)?;
        let allowed = match actor.role {
            Role::President => true,
            Role::Resident => post.author_id == actor.id,
            Role::Administrator => false,
        };
        if !allowed {
            return Err(Error::forbidden("you may not delete this post"));
        }
        self.posts.delete(id).await?;
        info!(post_id = %id, "post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockCommunityRepository, MockPostRepository, MockUserRepository};
    use crate::domain::test_support::{FixtureClock, fixture_date, user_with_role};
    use crate::domain::{CommunityId, ErrorCode, NewCommunity, User};
    use rstest::rstest;

    fn users_with(user: User) -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        users
    }

    fn service(
        actor: User,
        communities: MockCommunityRepository,
        posts: MockPostRepository,
    ) -> PostService {
        PostService::new(
            Arc::new(users_with(actor)),
            Arc::new(communities),
            Arc::new(posts),
            Arc::new(FixtureClock::at(fixture_date(), 18, 0)),
        )
    }

    fn post(community: CommunityId, author: UserId) -> Post {
        Post {
            id: PostId::random(),
            title: "Garage door".to_owned(),
            content: "Fixed on Monday".to_owned(),
            author_id: author,
            community_id: community,
            created_at: FixtureClock::at(fixture_date(), 8, 0).utc_now,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn administrators_cannot_post() {
        let admin = user_with_role(Role::Administrator, Some(CommunityId::random()));
        let id = admin.id;
        let draft = PostDraft::try_new("Hi", "Hello").expect("draft");
        let error = service(admin, MockCommunityRepository::new(), MockPostRepository::new())
            .create(&id, draft)
            .await
            .expect_err("forbidden");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn created_posts_carry_author_role() {
        let president = user_with_role(Role::President, Some(CommunityId::random()));
        let id = president.id;
        let mut posts = MockPostRepository::new();
        posts.expect_insert().times(1).returning(|_| Ok(()));
        let draft = PostDraft::try_new("Hi", "Hello").expect("draft");

        let view = service(president, MockCommunityRepository::new(), posts)
            .create(&id, draft)
            .await
            .expect("created");
        assert_eq!(view.author_role, Role::President);
    }

    #[rstest]
    #[tokio::test]
    async fn blank_code_is_rejected() {
        let resident = user_with_role(Role::Resident, Some(CommunityId::random()));
        let id = resident.id;
        let error = service(resident, MockCommunityRepository::new(), MockPostRepository::new())
            .list_by_community(&id, "  ", PageRequest::default())
            .await
            .expect_err("blank");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn lists_own_community_feed() {
        let community = CommunityId::random();
        let resident = user_with_role(Role::Resident, Some(community));
        let id = resident.id;
        let mut communities = MockCommunityRepository::new();
        communities.expect_find_by_code().returning(move |code| {
            Ok(Some(
                NewCommunity::try_new("Los Olmos", "Calle Mayor 1", "28001", code.as_ref())
                    .expect("community")
                    .into_community(community, UserId::random()),
            ))
        });
        let mut posts = MockPostRepository::new();
        posts
            .expect_list_by_community()
            .withf(move |id, _| *id == community)
            .returning(|_, page| Ok(page.slice::<PostView>(&[])));

        let page = service(resident, communities, posts)
            .list_by_community(&id, "OLMOS", PageRequest::default())
            .await
            .expect("listed");
        assert!(page.content.is_empty());
    }

    #[rstest]
    #[case::president_any(Role::President, false, true)]
    #[case::resident_own(Role::Resident, true, true)]
    #[case::resident_other(Role::Resident, false, false)]
    #[tokio::test]
    async fn delete_permissions(
        #[case] role: Role,
        #[case] is_author: bool,
        #[case] allowed: bool,
    ) {
        let community = CommunityId::random();
        let actor = user_with_role(role, Some(community));
        let actor_id = actor.id;
        let author = if is_author { actor_id } else { UserId::random() };
        let existing = post(community, author);
        let post_id = existing.id;
        let mut posts = MockPostRepository::new();
        posts
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(existing)));
        posts
            .expect_delete()
            .times(usize::from(allowed))
            .returning(|_| Ok(()));

        let result = service(actor, MockCommunityRepository::new(), posts)
            .delete(&actor_id, &post_id)
            .await;
        assert_eq!(result.is_ok(), allowed);
    }
}
