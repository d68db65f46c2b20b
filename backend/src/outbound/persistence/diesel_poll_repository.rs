//! PostgreSQL-backed `PollRepository` implementation using Diesel ORM.
//!
//! The `votes_poll_user_key` unique constraint backs one vote per member;
//! removing a poll cascades to its votes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PollRepository, RepositoryError};
use crate::domain::{CommunityId, Poll, PollId, UserId, Vote, VoteId};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{NewPollRow, PollRow, VoteRow};
use super::pool::DbPool;
use super::schema::{polls, votes};

/// Diesel-backed implementation of the poll repository port.
#[derive(Clone)]
pub struct DieselPollRepository {
    pool: DbPool,
}

impl DieselPollRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_poll(row: PollRow) -> Poll {
    Poll {
        id: PollId::from_uuid(row.id),
        title: row.title,
        description: row.description,
        options: [row.option1, row.option2, row.option3],
        created_at: row.created_at,
        closes_at: row.closes_at,
        creator_id: UserId::from_uuid(row.creator_id),
        community_id: CommunityId::from_uuid(row.community_id),
    }
}

fn row_to_vote(row: VoteRow) -> Vote {
    Vote {
        id: VoteId::from_uuid(row.id),
        poll_id: PollId::from_uuid(row.poll_id),
        user_id: UserId::from_uuid(row.user_id),
        option: row.option,
        cast_at: row.cast_at,
    }
}

#[async_trait]
impl PollRepository for DieselPollRepository {
    async fn insert(&self, poll: &Poll) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let [option1, option2, option3] = &poll.options;
        let row = NewPollRow {
            id: *poll.id.as_uuid(),
            title: &poll.title,
            description: &poll.description,
            option1,
            option2,
            option3,
            created_at: poll.created_at,
            closes_at: poll.closes_at,
            creator_id: *poll.creator_id.as_uuid(),
            community_id: *poll.community_id.as_uuid(),
        };
        diesel::insert_into(polls::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &PollId) -> Result<Option<Poll>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = polls::table
            .filter(polls::id.eq(id.as_uuid()))
            .select(PollRow::as_select())
            .first::<PollRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_poll))
    }

    async fn delete(&self, id: &PollId) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(polls::table.filter(polls::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_open(
        &self,
        community: &CommunityId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Poll>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PollRow> = polls::table
            .filter(polls::community_id.eq(community.as_uuid()))
            .filter(polls::closes_at.gt(now))
            .order((polls::closes_at.asc(), polls::id.asc()))
            .select(PollRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_poll).collect())
    }

    async fn list_closed(
        &self,
        community: &CommunityId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Poll>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PollRow> = polls::table
            .filter(polls::community_id.eq(community.as_uuid()))
            .filter(polls::closes_at.le(now))
            .order((polls::closes_at.desc(), polls::id.asc()))
            .select(PollRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_poll).collect())
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = VoteRow {
            id: *vote.id.as_uuid(),
            poll_id: *vote.poll_id.as_uuid(),
            user_id: *vote.user_id.as_uuid(),
            option: vote.option.clone(),
            cast_at: vote.cast_at,
        };
        diesel::insert_into(votes::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn has_voted(&self, poll: &PollId, user: &UserId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            votes::table
                .filter(votes::poll_id.eq(poll.as_uuid()))
                .filter(votes::user_id.eq(user.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn votes_for(&self, poll: &PollId) -> Result<Vec<Vote>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<VoteRow> = votes::table
            .filter(votes::poll_id.eq(poll.as_uuid()))
            .order(votes::cast_at.asc())
            .select(VoteRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_vote).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    #[rstest]
    fn poll_rows_keep_option_order() {
        let row = PollRow {
            id: Uuid::new_v4(),
            title: "Facade colour".to_owned(),
            description: "Pick one".to_owned(),
            option1: "Blue".to_owned(),
            option2: "Green".to_owned(),
            option3: "White".to_owned(),
            created_at: Utc::now(),
            closes_at: Utc::now(),
            creator_id: Uuid::new_v4(),
            community_id: Uuid::new_v4(),
        };
        let poll = row_to_poll(row);
        assert_eq!(poll.options, ["Blue", "Green", "White"].map(str::to_owned));
    }
}
