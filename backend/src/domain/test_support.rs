//! Builders and fixed clocks shared by domain unit tests.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use mockable::Clock;

use super::{CommunityId, Dni, Email, Floor, FullName, PasswordHash, Role, User, UserId};

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixtureClock {
    pub(crate) utc_now: DateTime<Utc>,
}

impl FixtureClock {
    /// Clock reading `date` at `hour:minute` UTC.
    pub(crate) fn at(date: NaiveDate, hour: u32, minute: u32) -> Self {
        let time = NaiveTime::from_hms_opt(hour, minute, 0).expect("valid fixture time");
        Self {
            utc_now: Utc.from_utc_datetime(&date.and_time(time)),
        }
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// 10 March 2025, the reference date used across the scheduling tests.
pub(crate) fn fixture_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid fixture date")
}

/// A user with `role`, a distinct id and `community`.
pub(crate) fn user_with_role(role: Role, community: Option<CommunityId>) -> User {
    let id = UserId::random();
    let suffix = &id.to_string()[..8];
    User {
        id,
        email: Email::new(format!("user-{suffix}@example.org")).expect("fixture email"),
        dni: Dni::new("12345678Z").expect("fixture dni"),
        full_name: FullName::new(format!("User {suffix}")).expect("fixture name"),
        floor: Floor::new("1A").expect("fixture floor"),
        password_hash: PasswordHash::new("$argon2id$fixture"),
        role,
        community_id: community,
    }
}
