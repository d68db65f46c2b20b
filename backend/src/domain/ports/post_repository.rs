//! Port abstraction for bulletin posts.
use async_trait::async_trait;

use crate::domain::{CommunityId, Page, PageRequest, Post, PostId, PostView};

use super::RepositoryError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Store a new post.
    async fn insert(&self, post: &Post) -> Result<(), RepositoryError>;

    /// Fetch a post by identifier.
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, RepositoryError>;

    /// Remove a post.
    async fn delete(&self, id: &PostId) -> Result<(), RepositoryError>;

    /// Posts of `community` with author details, newest first.
    async fn list_by_community(
        &self,
        community: &CommunityId,
        page: PageRequest,
    ) -> Result<Page<PostView>, RepositoryError>;
}
