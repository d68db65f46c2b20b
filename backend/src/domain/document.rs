//! Documents published by the community president.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::text::optional_text;
use super::{CommunityId, DocumentId, Error, StoredFileName, UserId};

const COMMENT_MAX: usize = 1000;

/// Category a document is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Minutes,
    Notice,
    Regulation,
    Invoice,
    Other,
}

impl DocumentType {
    /// Storage and wire label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minutes => "minutes",
            Self::Notice => "notice",
            Self::Regulation => "regulation",
            Self::Invoice => "invoice",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minutes" => Ok(Self::Minutes),
            "notice" => Ok(Self::Notice),
            "regulation" => Ok(Self::Regulation),
            "invoice" => Ok(Self::Invoice),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown document type: {other}")),
        }
    }
}

/// Validated optional comment attached to a document.
pub fn document_comment(raw: Option<&str>) -> Result<Option<String>, Error> {
    optional_text(raw, "comment", COMMENT_MAX)
}

/// Optional calendar filters on the publication date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublicationFilter {
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl PublicationFilter {
    /// Validate the ranges of day and month.
    pub fn try_new(day: Option<u32>, month: Option<u32>, year: Option<i32>) -> Result<Self, Error> {
        if day.is_some_and(|d| !(1..=31).contains(&d)) {
            return Err(Error::invalid_field("day", "out_of_range", "day must be between 1 and 31"));
        }
        if month.is_some_and(|m| !(1..=12).contains(&m)) {
            return Err(Error::invalid_field(
                "month",
                "out_of_range",
                "month must be between 1 and 12",
            ));
        }
        Ok(Self { day, month, year })
    }

    /// Whether `published_at` satisfies every supplied component.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::PublicationFilter;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let at = Utc.with_ymd_and_hms(2024, 5, 17, 9, 0, 0).unwrap();
    /// let filter = PublicationFilter::try_new(None, Some(5), Some(2024)).unwrap();
    /// assert!(filter.matches(at));
    /// ```
    pub fn matches(&self, published_at: DateTime<Utc>) -> bool {
        self.day.is_none_or(|d| published_at.day() == d)
            && self.month.is_none_or(|m| published_at.month() == m)
            && self.year.is_none_or(|y| published_at.year() == y)
    }
}

/// Published document with one or more stored files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocumentId,
    pub comment: Option<String>,
    pub doc_type: DocumentType,
    pub published_at: DateTime<Utc>,
    pub files: Vec<StoredFileName>,
    pub author_id: UserId,
    pub community_id: CommunityId,
}

/// Document joined with its author's details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentView {
    pub document: Document,
    pub author_name: String,
    pub author_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case(Some(17), None, None, true)]
    #[case(Some(18), None, None, false)]
    #[case(None, Some(5), Some(2024), true)]
    #[case(None, None, Some(2023), false)]
    #[case(None, None, None, true)]
    fn filters_by_date_components(
        #[case] day: Option<u32>,
        #[case] month: Option<u32>,
        #[case] year: Option<i32>,
        #[case] expected: bool,
    ) {
        let at = Utc
            .with_ymd_and_hms(2024, 5, 17, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        let filter = PublicationFilter::try_new(day, month, year).expect("valid filter");
        assert_eq!(filter.matches(at), expected);
    }

    #[rstest]
    #[case(Some(0), None)]
    #[case(Some(32), None)]
    #[case(None, Some(13))]
    fn rejects_out_of_range_components(#[case] day: Option<u32>, #[case] month: Option<u32>) {
        assert!(PublicationFilter::try_new(day, month, None).is_err());
    }

    #[rstest]
    fn parses_every_type_label() {
        for ty in [
            DocumentType::Minutes,
            DocumentType::Notice,
            DocumentType::Regulation,
            DocumentType::Invoice,
            DocumentType::Other,
        ] {
            assert_eq!(ty.as_str().parse::<DocumentType>(), Ok(ty));
        }
    }
}
