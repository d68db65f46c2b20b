//! Incidents reported by residents and their lifecycle.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::text::required_text;
use super::{CommunityId, Error, IncidentId, StoredFileName, UserId};

/// Maximum description length in characters.
pub const DESCRIPTION_MAX: usize = 1000;
const TITLE_MAX: usize = 200;
const LOCATION_MAX: usize = 200;

/// Lifecycle state of an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IncidentState {
    Open,
    InProgress,
    Resolved,
    Cancelled,
}

impl IncidentState {
    /// Storage and wire label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Cancelled => "cancelled",
        }
    }

    /// States reachable from `self` in one step.
    pub const fn successors(self) -> &'static [Self] {
        match self {
            Self::Open => &[Self::InProgress, Self::Cancelled],
            Self::InProgress => &[Self::Resolved, Self::Cancelled],
            Self::Resolved => &[Self::Cancelled],
            Self::Cancelled => &[],
        }
    }

    /// Validate a transition to `next`.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::IncidentState;
    ///
    /// assert!(IncidentState::Open.transition_to(IncidentState::InProgress).is_ok());
    /// assert!(IncidentState::Open.transition_to(IncidentState::Resolved).is_err());
    /// ```
    pub fn transition_to(self, next: Self) -> Result<Self, Error> {
        if self == Self::Cancelled {
            return Err(Error::invalid_request("a cancelled incident cannot be modified"));
        }
        if !self.successors().contains(&next) {
            let allowed = self
                .successors()
                .iter()
                .map(|state| state.as_str())
                .collect::<Vec<_>>()
                .join(" or ");
            return Err(Error::invalid_request(format!(
                "from {self} an incident can only move to {allowed}"
            )));
        }
        Ok(next)
    }
}

impl fmt::Display for IncidentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown incident state: {other}")),
        }
    }
}

/// Columns an incident listing can be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum IncidentSortField {
    #[default]
    #[serde(rename = "createdAt")]
    CreatedAt,
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "state")]
    State,
}

/// Validated content of a new incident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentDraft {
    pub title: String,
    pub description: String,
    pub location: String,
}

impl IncidentDraft {
    /// Validate title, description and location.
    pub fn try_new(title: &str, description: &str, location: &str) -> Result<Self, Error> {
        Ok(Self {
            title: required_text(title, "title", TITLE_MAX)?,
            description: required_text(description, "description", DESCRIPTION_MAX)?,
            location: required_text(location, "location", LOCATION_MAX)?,
        })
    }
}

/// Reported incident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incident {
    pub id: IncidentId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub image: Option<StoredFileName>,
    pub created_at: DateTime<Utc>,
    pub state: IncidentState,
    pub author_id: UserId,
    pub community_id: CommunityId,
}

/// Incident joined with the display name of its author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentView {
    pub incident: Incident,
    pub author_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use IncidentState::{Cancelled, InProgress, Open, Resolved};

    #[rstest]
    #[case(Open, InProgress, true)]
    #[case(Open, Cancelled, true)]
    #[case(Open, Resolved, false)]
    #[case(Open, Open, false)]
    #[case(InProgress, Resolved, true)]
    #[case(InProgress, Cancelled, true)]
    #[case(InProgress, Open, false)]
    #[case(Resolved, Cancelled, true)]
    #[case(Resolved, InProgress, false)]
    #[case(Cancelled, Open, false)]
    #[case(Cancelled, Cancelled, false)]
    fn follows_transition_table(
        #[case] from: IncidentState,
        #[case] to: IncidentState,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.transition_to(to).is_ok(), allowed);
    }

    #[rstest]
    fn cancelled_reports_immutability() {
        let error = Cancelled.transition_to(Open).expect_err("immutable");
        assert_eq!(error.message(), "a cancelled incident cannot be modified");
    }

    #[rstest]
    fn description_limit_is_enforced() {
        let long = "d".repeat(DESCRIPTION_MAX + 1);
        assert!(IncidentDraft::try_new("Leak", &long, "Garage").is_err());
        let exact = "d".repeat(DESCRIPTION_MAX);
        assert!(IncidentDraft::try_new("Leak", &exact, "Garage").is_ok());
    }

    #[rstest]
    fn state_round_trips_through_label() {
        for state in [Open, InProgress, Resolved, Cancelled] {
            assert_eq!(state.as_str().parse::<IncidentState>(), Ok(state));
        }
    }
}
