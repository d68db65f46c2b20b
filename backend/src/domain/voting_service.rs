//! Community polls and ballots.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{info, warn};

use super::ports::{PollRepository, UserRepository};
use super::{
    ActorLoader, Error, Poll, PollDraft, PollId, PollView, Role, User, UserId, Vote, VoteId,
    require_community, require_same_community,
};

/// Poll operations scoped to the actor's community.
#[derive(Clone)]
pub struct VotingService {
    actors: ActorLoader,
    polls: Arc<dyn PollRepository>,
    clock: Arc<dyn Clock>,
}

impl VotingService {
    /// Assemble the service from its ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        polls: Arc<dyn PollRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            actors: ActorLoader::new(users),
            polls,
            clock,
        }
    }

    /// Open a poll. President only.
    pub async fn create(&self, actor: &UserId, draft: PollDraft) -> Result<Poll, Error> {
        let actor = self.actors.load(actor).await?;
        if actor.role != Role::President {
            return Err(Error::forbidden("only the president can create polls"));
        }
        let community = require_community(&actor)?;
        let poll = draft.open(PollId::random(), actor.id, community, self.clock.utc());
        self.polls.insert(&poll).await?;
        info!(poll_id = %poll.id, closes_at = %poll.closes_at, "poll opened");
        Ok(poll)
    }

    /// Cast the actor's single vote.
    pub async fn vote(&self, actor: &UserId, poll_id: &PollId, option: &str) -> Result<Vote, Error> {
        let actor = self.actors.load(actor).await?;
        let poll = self.find(poll_id).await?;
        require_same_community(&actor, poll.community_id)?;
        let now = self.clock.utc();
        if poll.is_finished(now) {
            return Err(Error::invalid_request("the poll has already closed"));
        }
        if self.polls.has_voted(&poll.id, &actor.id).await? {
            warn!(poll_id = %poll.id, user_id = %actor.id, "repeated vote rejected");
            return Err(Error::invalid_request("you have already voted in this poll"));
        }
        let option = option.trim();
        if !poll.has_option(option) {
            return Err(Error::invalid_field(
                "option",
                "unknown_option",
                format!("{option} is not an option of this poll"),
            ));
        }
        let vote = Vote {
            id: VoteId::random(),
            poll_id: poll.id,
            user_id: actor.id,
            option: option.to_owned(),
            cast_at: now,
        };
        self.polls.insert_vote(&vote).await?;
        info!(poll_id = %poll.id, "vote cast");
        Ok(vote)
    }

    /// Polls still open in the actor's community.
    pub async fn active(&self, actor: &UserId) -> Result<Vec<PollView>, Error> {
        let actor = self.actors.load(actor).await?;
        let community = require_community(&actor)?;
        let now = self.clock.utc();
        let polls = self.polls.list_open(&community, now).await?;
        self.views(&actor, polls, now).await
    }

    /// Polls already closed in the actor's community.
    pub async fn closed(&self, actor: &UserId) -> Result<Vec<PollView>, Error> {
        let actor = self.actors.load(actor).await?;
        let community = require_community(&actor)?;
        let now = self.clock.utc();
        let polls = self.polls.list_closed(&community, now).await?;
        self.views(&actor, polls, now).await
    }

    /// Delete a poll. Only the president who created it may.
    pub async fn delete(&self, actor: &UserId, poll_id: &PollId) -> Result<(), Error> {
        let actor = self.actors.load(actor).await?;
        let poll = self.find(poll_id).await?;
        if actor.role != Role::President || poll.creator_id != actor.id {
            return Err(Error::forbidden(
                "only the president who created a poll can delete it",
            ));
        }
        self.polls.delete(&poll.id).await?;
        info!(poll_id = %poll.id, "poll deleted");
        Ok(())
    }

    async fn find(&self, id: &PollId) -> Result<Poll, Error> {
        self.polls
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("poll {id} not found")))
    }

    async fn views(
        &self,
        viewer: &User,
        polls: Vec<Poll>,
        now: DateTime<Utc>,
    ) -> Result<Vec<PollView>, Error> {
        let mut views = Vec::with_capacity(polls.len());
        for poll in polls {
            let finished = poll.is_finished(now);
            let already_voted = self.polls.has_voted(&poll.id, &viewer.id).await?;
            let results = if finished || already_voted {
                let votes = self.polls.votes_for(&poll.id).await?;
                Some(poll.tally(&votes))
            } else {
                None
            };
            views.push(PollView {
                poll,
                finished,
                already_voted,
                results,
            });
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockPollRepository, MockUserRepository, RepositoryError};
    use crate::domain::test_support::{FixtureClock, fixture_date, user_with_role};
    use crate::domain::{CommunityId, ErrorCode};
    use chrono::Duration;
    use rstest::rstest;

    fn now() -> DateTime<Utc> {
        FixtureClock::at(fixture_date(), 12, 0).utc_now
    }

    fn service(actor: &User, polls: MockPollRepository) -> VotingService {
        let mut users = MockUserRepository::new();
        let actor = actor.clone();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(actor.clone())));
        VotingService::new(
            Arc::new(users),
            Arc::new(polls),
            Arc::new(FixtureClock::at(fixture_date(), 12, 0)),
        )
    }

    fn poll(community: CommunityId, creator: UserId, opened_hours_ago: i64) -> Poll {
        PollDraft::try_new("Paint", "Choose a colour", ["Blue", "Green", "White"], 24)
            .expect("draft")
            .open(
                PollId::random(),
                creator,
                community,
                now() - Duration::hours(opened_hours_ago),
            )
    }

    fn polls_with(existing: Poll, voted: bool) -> MockPollRepository {
        let mut polls = MockPollRepository::new();
        polls
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        polls.expect_has_voted().returning(move |_, _| Ok(voted));
        polls
    }

    #[rstest]
    #[tokio::test]
    async fn only_presidents_open_polls() {
        let resident = user_with_role(Role::Resident, Some(CommunityId::random()));
        let draft = PollDraft::try_new("t", "d", ["a", "b", "c"], 1).expect("draft");
        let error = service(&resident, MockPollRepository::new())
            .create(&resident.id, draft)
            .await
            .expect_err("forbidden");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn poll_closes_after_duration() {
        let president = user_with_role(Role::President, Some(CommunityId::random()));
        let mut polls = MockPollRepository::new();
        polls.expect_insert().times(1).returning(|_| Ok(()));
        let draft = PollDraft::try_new("t", "d", ["a", "b", "c"], 48).expect("draft");

        let poll = service(&president, polls)
            .create(&president.id, draft)
            .await
            .expect("opened");
        assert_eq!(poll.closes_at, now() + Duration::hours(48));
    }

    #[rstest]
    #[case::closed(30, false, "Blue", "the poll has already closed")]
    #[case::repeated(1, true, "Blue", "you have already voted in this poll")]
    #[case::unknown(1, false, "Red", "Red is not an option of this poll")]
    #[tokio::test]
    async fn rejects_invalid_votes(
        #[case] opened_hours_ago: i64,
        #[case] voted: bool,
        #[case] option: &str,
        #[case] message: &str,
    ) {
        let community = CommunityId::random();
        let voter = user_with_role(Role::Resident, Some(community));
        let existing = poll(community, UserId::random(), opened_hours_ago);
        let id = existing.id;
        let mut polls = polls_with(existing, voted);
        polls.expect_insert_vote().never();

        let error = service(&voter, polls)
            .vote(&voter.id, &id, option)
            .await
            .expect_err("rejected");
        assert_eq!(error.message(), message);
    }

    #[rstest]
    #[tokio::test]
    async fn concurrent_second_vote_is_a_conflict() {
        let community = CommunityId::random();
        let voter = user_with_role(Role::Resident, Some(community));
        let existing = poll(community, UserId::random(), 1);
        let id = existing.id;
        let mut polls = polls_with(existing, false);
        polls
            .expect_insert_vote()
            .returning(|_| Err(RepositoryError::duplicate("votes_poll_user_key")));

        let error = service(&voter, polls)
            .vote(&voter.id, &id, "Green")
            .await
            .expect_err("conflict");
        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn votes_from_other_communities_are_forbidden() {
        let voter = user_with_role(Role::Resident, Some(CommunityId::random()));
        let existing = poll(CommunityId::random(), UserId::random(), 1);
        let id = existing.id;
        let error = service(&voter, polls_with(existing, false))
            .vote(&voter.id, &id, "Blue")
            .await
            .expect_err("forbidden");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[case::not_voted(false, false)]
    #[case::voted(true, true)]
    #[tokio::test]
    async fn results_hidden_until_voted(#[case] voted: bool, #[case] visible: bool) {
        let community = CommunityId::random();
        let viewer = user_with_role(Role::Resident, Some(community));
        let open = poll(community, UserId::random(), 1);
        let mut polls = MockPollRepository::new();
        polls
            .expect_list_open()
            .return_once(move |_, _| Ok(vec![open]));
        polls.expect_has_voted().returning(move |_, _| Ok(voted));
        polls.expect_votes_for().returning(|_| Ok(Vec::new()));

        let views = service(&viewer, polls)
            .active(&viewer.id)
            .await
            .expect("listed");
        let view = views.first().expect("one poll");
        assert_eq!(view.results.is_some(), visible);
        assert!(!view.finished);
    }

    #[rstest]
    #[tokio::test]
    async fn closed_polls_show_results() {
        let community = CommunityId::random();
        let viewer = user_with_role(Role::Resident, Some(community));
        let closed = poll(community, UserId::random(), 48);
        let mut polls = MockPollRepository::new();
        polls
            .expect_list_closed()
            .return_once(move |_, _| Ok(vec![closed]));
        polls.expect_has_voted().returning(|_, _| Ok(false));
        polls.expect_votes_for().returning(|_| Ok(Vec::new()));

        let views = service(&viewer, polls)
            .closed(&viewer.id)
            .await
            .expect("listed");
        let results = views
            .first()
            .and_then(|view| view.results.clone())
            .expect("results visible");
        assert_eq!(results.len(), 3);
    }

    #[rstest]
    #[tokio::test]
    async fn only_creator_deletes() {
        let community = CommunityId::random();
        let president = user_with_role(Role::President, Some(community));
        let existing = poll(community, UserId::random(), 1);
        let id = existing.id;
        let mut polls = polls_with(existing, false);
        polls.expect_delete().never();

        let error = service(&president, polls)
            .delete(&president.id, &id)
            .await
            .expect_err("not creator");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }
}
