//! Time-bounded community polls with three fixed options.

use chrono::{DateTime, Duration, Utc};

use super::text::required_text;
use super::{CommunityId, Error, PollId, UserId, VoteId};

const TITLE_MAX: usize = 200;
const DESCRIPTION_MAX: usize = 2000;
const OPTION_MAX: usize = 200;
/// Longest poll duration accepted, one year.
pub const MAX_DURATION_HOURS: u32 = 24 * 365;

/// Validated definition of a poll about to be opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollDraft {
    pub title: String,
    pub description: String,
    pub options: [String; 3],
    pub duration_hours: u32,
}

impl PollDraft {
    /// Validate text fields, option uniqueness and the duration.
    pub fn try_new(
        title: &str,
        description: &str,
        options: [&str; 3],
        duration_hours: i64,
    ) -> Result<Self, Error> {
        let title = required_text(title, "title", TITLE_MAX)?;
        let description = required_text(description, "description", DESCRIPTION_MAX)?;
        let [first, second, third] = options;
        let options = [
            required_text(first, "option1", OPTION_MAX)?,
            required_text(second, "option2", OPTION_MAX)?,
            required_text(third, "option3", OPTION_MAX)?,
        ];
        let [a, b, c] = &options;
        if a == b || a == c || b == c {
            return Err(Error::invalid_field(
                "options",
                "duplicate_option",
                "poll options must be distinct",
            ));
        }
        let duration_hours = u32::try_from(duration_hours)
            .ok()
            .filter(|hours| (1..=MAX_DURATION_HOURS).contains(hours))
            .ok_or_else(|| {
                Error::invalid_field(
                    "durationHours",
                    "out_of_range",
                    format!("duration must be between 1 and {MAX_DURATION_HOURS} hours"),
                )
            })?;
        Ok(Self {
            title,
            description,
            options,
            duration_hours,
        })
    }

    /// Open the poll at `now` for `creator` in `community`.
    pub fn open(
        self,
        id: PollId,
        creator: UserId,
        community: CommunityId,
        now: DateTime<Utc>,
    ) -> Poll {
        Poll {
            id,
            title: self.title,
            description: self.description,
            options: self.options,
            created_at: now,
            closes_at: now + Duration::hours(i64::from(self.duration_hours)),
            creator_id: creator,
            community_id: community,
        }
    }
}

/// Poll open to the members of one community.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poll {
    pub id: PollId,
    pub title: String,
    pub description: String,
    pub options: [String; 3],
    pub created_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
    pub creator_id: UserId,
    pub community_id: CommunityId,
}

impl Poll {
    /// Whether voting has closed at `now`.
    pub fn is_finished(&self, now: DateTime<Utc>) -> bool {
        now >= self.closes_at
    }

    /// Whether `option` names one of the three choices.
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|candidate| candidate == option)
    }

    /// Count `votes` per option, listing every option even without votes.
    ///
    /// Votes for unknown options are ignored.
    pub fn tally<'a>(&self, votes: impl IntoIterator<Item = &'a Vote>) -> Vec<(String, u64)> {
        let mut counts: Vec<(String, u64)> =
            self.options.iter().map(|option| (option.clone(), 0)).collect();
        for vote in votes {
            if let Some((_, count)) = counts.iter_mut().find(|(option, _)| *option == vote.option) {
                *count += 1;
            }
        }
        counts
    }
}

/// Single ballot cast by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub id: VoteId,
    pub poll_id: PollId,
    pub user_id: UserId,
    pub option: String,
    pub cast_at: DateTime<Utc>,
}

/// Poll as seen by one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollView {
    pub poll: Poll,
    pub finished: bool,
    pub already_voted: bool,
    /// Present only once the member voted or the poll closed.
    pub results: Option<Vec<(String, u64)>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[fixture]
    fn poll(now: DateTime<Utc>) -> Poll {
        PollDraft::try_new("Paint", "Choose a colour", ["Blue", "Green", "White"], 24)
            .expect("valid draft")
            .open(PollId::random(), UserId::random(), CommunityId::random(), now)
    }

    fn vote(poll: &Poll, option: &str) -> Vote {
        Vote {
            id: VoteId::random(),
            poll_id: poll.id,
            user_id: UserId::random(),
            option: option.to_owned(),
            cast_at: poll.created_at,
        }
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    #[case(i64::from(MAX_DURATION_HOURS) + 1)]
    fn rejects_invalid_durations(#[case] hours: i64) {
        assert!(PollDraft::try_new("t", "d", ["a", "b", "c"], hours).is_err());
    }

    #[rstest]
    fn rejects_duplicate_options() {
        let error = PollDraft::try_new("t", "d", ["a", " a ", "c"], 1).expect_err("duplicate");
        assert_eq!(error.message(), "poll options must be distinct");
    }

    #[rstest]
    fn closes_after_duration(poll: Poll, now: DateTime<Utc>) {
        assert_eq!(poll.closes_at, now + Duration::hours(24));
        assert!(!poll.is_finished(now + Duration::hours(23)));
        assert!(poll.is_finished(now + Duration::hours(24)));
    }

    #[rstest]
    fn tally_lists_every_option(poll: Poll) {
        let votes = vec![vote(&poll, "Blue"), vote(&poll, "Blue"), vote(&poll, "White")];
        assert_eq!(
            poll.tally(&votes),
            vec![
                ("Blue".to_owned(), 2),
                ("Green".to_owned(), 0),
                ("White".to_owned(), 1),
            ]
        );
    }

    #[rstest]
    fn option_membership_is_exact(poll: Poll) {
        assert!(poll.has_option("Green"));
        assert!(!poll.has_option("green"));
    }
}
