//! Complaints raised by residents, optionally anonymously.

use chrono::{DateTime, Utc};

use super::text::required_text;
use super::{CommunityId, ComplaintId, Error, StoredFileName, UserId};

const CONTENT_MAX: usize = 2000;
const RESPONSE_MAX: usize = 2000;

/// Author label shown instead of the name of an anonymous complainer.
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// Validated complaint text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintContent(String);

impl ComplaintContent {
    /// Trim and bound the complaint text.
    pub fn try_new(raw: &str) -> Result<Self, Error> {
        required_text(raw, "content", CONTENT_MAX).map(Self)
    }

    /// Validated text.
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Validated reply to a complaint.
pub fn complaint_response(raw: &str) -> Result<String, Error> {
    required_text(raw, "response", RESPONSE_MAX)
}

/// Complaint lodged within a community.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Complaint {
    pub id: ComplaintId,
    pub content: String,
    pub anonymous: bool,
    pub image: Option<StoredFileName>,
    pub created_at: DateTime<Utc>,
    pub response: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
    pub author_id: UserId,
    pub community_id: CommunityId,
}

/// Complaint joined with its author's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintView {
    pub complaint: Complaint,
    pub author_name: String,
}

impl ComplaintView {
    /// Name to show to readers, hiding anonymous authors.
    ///
    /// # Examples
    /// ```
    /// # use backend::domain::*;
    /// # use chrono::Utc;
    /// let complaint = Complaint {
    ///     id: ComplaintId::random(),
    ///     content: "Noise".into(),
    ///     anonymous: true,
    ///     image: None,
    ///     created_at: Utc::now(),
    ///     response: None,
    ///     responded_at: None,
    ///     author_id: UserId::random(),
    ///     community_id: CommunityId::random(),
    /// };
    /// let view = ComplaintView { complaint, author_name: "Ana".into() };
    /// assert_eq!(view.display_author(), "Anonymous");
    /// ```
    pub fn display_author(&self) -> &str {
        if self.complaint.anonymous {
            ANONYMOUS_AUTHOR
        } else {
            self.author_name.as_str()
        }
    }
}
