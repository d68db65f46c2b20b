//! Typed UUID identifiers for domain entities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

macro_rules! define_id {
    ($( $(#[$meta:meta])* $name:ident ),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(
                Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
                ToSchema,
            )]
            #[serde(transparent)]
            pub struct $name(Uuid);

            impl $name {
                /// Generate a fresh random identifier.
                #[must_use]
                pub fn random() -> Self {
                    Self(Uuid::new_v4())
                }

                /// Wrap an existing UUID.
                #[must_use]
                pub const fn from_uuid(uuid: Uuid) -> Self {
                    Self(uuid)
                }

                /// Access the underlying UUID.
                #[must_use]
                pub const fn as_uuid(&self) -> &Uuid {
                    &self.0
                }
            }

            impl From<Uuid> for $name {
                fn from(value: Uuid) -> Self {
                    Self(value)
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl FromStr for $name {
                type Err = uuid::Error;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Uuid::parse_str(s.trim()).map(Self)
                }
            }
        )*
    };
}

define_id! {
    /// Identifier of a registered user.
    UserId,
    /// Identifier of a residential community.
    CommunityId,
    /// Identifier of a reported incident.
    IncidentId,
    /// Identifier of a complaint.
    ComplaintId,
    /// Identifier of a published document.
    DocumentId,
    /// Identifier of a bulletin post.
    PostId,
    /// Identifier of a bookable common zone.
    ZoneId,
    /// Identifier of a zone reservation.
    ReservationId,
    /// Identifier of a poll.
    PollId,
    /// Identifier of a cast vote.
    VoteId,
    /// Identifier of a persisted chat message.
    ChatMessageId,
}
