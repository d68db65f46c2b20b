//! Port abstraction for polls and their votes.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{CommunityId, Poll, PollId, UserId, Vote};

use super::RepositoryError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PollRepository: Send + Sync {
    /// Store a new poll.
    async fn insert(&self, poll: &Poll) -> Result<(), RepositoryError>;

    /// Fetch a poll by identifier.
    async fn find_by_id(&self, id: &PollId) -> Result<Option<Poll>, RepositoryError>;

    /// Remove a poll and its votes.
    async fn delete(&self, id: &PollId) -> Result<(), RepositoryError>;

    /// Polls of `community` still open at `now`, closing soonest first.
    async fn list_open(
        &self,
        community: &CommunityId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Poll>, RepositoryError>;

    /// Polls of `community` closed at `now`, most recently closed first.
    async fn list_closed(
        &self,
        community: &CommunityId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Poll>, RepositoryError>;

    /// Record a vote. A second vote by the same user on the same poll yields
    /// [`RepositoryError::Duplicate`].
    async fn insert_vote(&self, vote: &Vote) -> Result<(), RepositoryError>;

    /// Whether `user` already voted on `poll`.
    async fn has_voted(&self, poll: &PollId, user: &UserId) -> Result<bool, RepositoryError>;

    /// Every vote cast on `poll`.
    async fn votes_for(&self, poll: &PollId) -> Result<Vec<Vote>, RepositoryError>;
}
