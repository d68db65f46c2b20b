//! Bulletin posts shared within a community.

use chrono::{DateTime, Utc};

use super::text::required_text;
use super::{CommunityId, Error, PostId, Role, UserId};

/// Maximum post body length in characters.
pub const CONTENT_MAX: usize = 2000;
const TITLE_MAX: usize = 200;

/// Validated title and body of a new post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
}

impl PostDraft {
    /// Validate title and content lengths.
    pub fn try_new(title: &str, content: &str) -> Result<Self, Error> {
        Ok(Self {
            title: required_text(title, "title", TITLE_MAX)?,
            content: required_text(content, "content", CONTENT_MAX)?,
        })
    }
}

/// Published post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub community_id: CommunityId,
    pub created_at: DateTime<Utc>,
}

/// Post joined with its author's name and role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostView {
    pub post: Post,
    pub author_name: String,
    pub author_role: Role,
}
