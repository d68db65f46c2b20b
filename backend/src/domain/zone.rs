//! Bookable common zones.

use super::text::required_text;
use super::{CommunityId, Error, ZoneId};

const NAME_MAX: usize = 100;

/// Validated zone name.
pub fn zone_name(raw: &str) -> Result<String, Error> {
    required_text(raw, "name", NAME_MAX)
}

/// Shared amenity residents can reserve, e.g. a paddle court.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonZone {
    pub id: ZoneId,
    pub name: String,
    pub community_id: CommunityId,
}
