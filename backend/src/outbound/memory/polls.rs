//! Polls, votes and the chat log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{ChatRepository, PollRepository, RepositoryError};
use crate::domain::{ChatMessage, ChatMessageId, CommunityId, Poll, PollId, UserId, Vote};

use super::MemoryStore;

impl MemoryStore {
    fn polls_where<F>(&self, community: &CommunityId, keep: F) -> Vec<Poll>
    where
        F: Fn(&Poll) -> bool,
    {
        self.tables()
            .polls
            .values()
            .filter(|poll| poll.community_id == *community && keep(poll))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PollRepository for MemoryStore {
    async fn insert(&self, poll: &Poll) -> Result<(), RepositoryError> {
        self.tables().polls.insert(poll.id, poll.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &PollId) -> Result<Option<Poll>, RepositoryError> {
        Ok(self.tables().polls.get(id).cloned())
    }

    async fn delete(&self, id: &PollId) -> Result<(), RepositoryError> {
        let mut tables = self.tables();
        tables.polls.remove(id);
        tables.votes.retain(|vote| vote.poll_id != *id);
        Ok(())
    }

    async fn list_open(
        &self,
        community: &CommunityId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Poll>, RepositoryError> {
        let mut open = self.polls_where(community, |poll| poll.closes_at > now);
        open.sort_by(|a, b| a.closes_at.cmp(&b.closes_at).then_with(|| a.id.cmp(&b.id)));
        Ok(open)
    }

    async fn list_closed(
        &self,
        community: &CommunityId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Poll>, RepositoryError> {
        let mut closed = self.polls_where(community, |poll| poll.closes_at <= now);
        closed.sort_by(|a, b| b.closes_at.cmp(&a.closes_at).then_with(|| a.id.cmp(&b.id)));
        Ok(closed)
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<(), RepositoryError> {
        let mut tables = self.tables();
        if tables
            .votes
            .iter()
            .any(|cast| cast.poll_id == vote.poll_id && cast.user_id == vote.user_id)
        {
            return Err(RepositoryError::duplicate("votes_poll_user_key"));
        }
        tables.votes.push(vote.clone());
        Ok(())
    }

    async fn has_voted(&self, poll: &PollId, user: &UserId) -> Result<bool, RepositoryError> {
        Ok(self
            .tables()
            .votes
            .iter()
            .any(|vote| vote.poll_id == *poll && vote.user_id == *user))
    }

    async fn votes_for(&self, poll: &PollId) -> Result<Vec<Vote>, RepositoryError> {
        let mut votes: Vec<Vote> = self
            .tables()
            .votes
            .iter()
            .filter(|vote| vote.poll_id == *poll)
            .cloned()
            .collect();
        votes.sort_by_key(|vote| vote.cast_at);
        Ok(votes)
    }
}

#[async_trait]
impl ChatRepository for MemoryStore {
    async fn insert(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        self.tables().chat.push(message.clone());
        Ok(())
    }

    async fn latest(&self, limit: usize) -> Result<Vec<ChatMessage>, RepositoryError> {
        let mut log = self.tables().chat.clone();
        log.sort_by(|a, b| a.sent_at.cmp(&b.sent_at).then_with(|| a.id.cmp(&b.id)));
        let skip = log.len().saturating_sub(limit);
        Ok(log.into_iter().skip(skip).collect())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(u64::try_from(self.tables().chat.len()).unwrap_or(u64::MAX))
    }

    async fn delete(&self, id: &ChatMessageId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables();
        let before = tables.chat.len();
        tables.chat.retain(|message| message.id != *id);
        Ok(tables.chat.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::instant;
    use super::*;
    use crate::domain::{PollDraft, VoteId};
    use rstest::rstest;

    fn poll(community: CommunityId, opened_day: u32, hours: i64) -> Poll {
        PollDraft::try_new("Paint", "Facade colour", ["Blue", "Green", "White"], hours)
            .expect("valid draft")
            .open(PollId::random(), UserId::random(), community, instant(opened_day, 9))
    }

    fn ballot(poll: &Poll, user: UserId) -> Vote {
        Vote {
            id: VoteId::random(),
            poll_id: poll.id,
            user_id: user,
            option: "Blue".to_owned(),
            cast_at: instant(10, 10),
        }
    }

    fn message(content: &str, minute_day: u32) -> ChatMessage {
        ChatMessage {
            id: ChatMessageId::random(),
            content: content.to_owned(),
            sender_name: "Ana".to_owned(),
            origin_ip: "127.0.0.1".to_owned(),
            sent_at: instant(minute_day, 12),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn one_vote_per_member() {
        let store = MemoryStore::new();
        let open = poll(CommunityId::random(), 10, 24);
        PollRepository::insert(&store, &open).await.expect("poll");
        let voter = UserId::random();

        store.insert_vote(&ballot(&open, voter)).await.expect("first vote");
        let error = store
            .insert_vote(&ballot(&open, voter))
            .await
            .expect_err("second vote");

        assert_eq!(error, RepositoryError::duplicate("votes_poll_user_key"));
        assert!(store.has_voted(&open.id, &voter).await.expect("lookup"));
    }

    #[rstest]
    #[tokio::test]
    async fn polls_split_on_closing_time() {
        let store = MemoryStore::new();
        let community = CommunityId::random();
        let short = poll(community, 1, 1);
        let long = poll(community, 1, 24 * 30);
        let closed_late = poll(community, 2, 1);
        for entry in [&short, &long, &closed_late] {
            PollRepository::insert(&store, entry).await.expect("poll");
        }
        let now = instant(5, 0);

        let open = store.list_open(&community, now).await.expect("open");
        let closed = store.list_closed(&community, now).await.expect("closed");

        assert_eq!(open.iter().map(|p| p.id).collect::<Vec<_>>(), [long.id]);
        assert_eq!(
            closed.iter().map(|p| p.id).collect::<Vec<_>>(),
            [closed_late.id, short.id]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_a_poll_drops_its_votes() {
        let store = MemoryStore::new();
        let open = poll(CommunityId::random(), 10, 24);
        PollRepository::insert(&store, &open).await.expect("poll");
        store
            .insert_vote(&ballot(&open, UserId::random()))
            .await
            .expect("vote");

        PollRepository::delete(&store, &open.id).await.expect("deleted");

        assert!(store.votes_for(&open.id).await.expect("votes").is_empty());
    }

    #[rstest]
    #[case(2, vec!["third", "fourth"])]
    #[case(10, vec!["first", "second", "third", "fourth"])]
    #[tokio::test]
    async fn latest_messages_come_back_in_order(
        #[case] limit: usize,
        #[case] expected: Vec<&str>,
    ) {
        let store = MemoryStore::new();
        for (content, day) in [("second", 2), ("fourth", 4), ("first", 1), ("third", 3)] {
            ChatRepository::insert(&store, &message(content, day))
                .await
                .expect("message");
        }

        let latest = store.latest(limit).await.expect("history");

        let contents: Vec<_> = latest.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_reports_whether_a_message_existed() {
        let store = MemoryStore::new();
        let kept = message("hello", 1);
        ChatRepository::insert(&store, &kept).await.expect("message");

        assert!(ChatRepository::delete(&store, &kept.id).await.expect("delete"));
        assert!(!ChatRepository::delete(&store, &kept.id).await.expect("delete"));
        assert_eq!(ChatRepository::count(&store).await.expect("count"), 0);
    }
}
