//! Residential communities and their join codes.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::{CommunityId, Error, UserId};

const CODE_MAX: usize = 32;
const TEXT_MAX: usize = 200;

/// Validation errors raised when describing a community.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommunityValidationError {
    EmptyCode,
    CodeTooLong { max: usize },
    EmptyName,
    EmptyAddress,
    TextTooLong { field: &'static str, max: usize },
    InvalidPostalCode,
}

impl CommunityValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::EmptyCode | Self::CodeTooLong { .. } => "communityCode",
            Self::EmptyName => "communityName",
            Self::EmptyAddress => "address",
            Self::TextTooLong { field, .. } => field,
            Self::InvalidPostalCode => "postalCode",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::EmptyCode | Self::EmptyName | Self::EmptyAddress => "empty_value",
            Self::CodeTooLong { .. } | Self::TextTooLong { .. } => "too_long",
            Self::InvalidPostalCode => "invalid_postal_code",
        }
    }
}

impl fmt::Display for CommunityValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCode => write!(f, "community code must not be empty"),
            Self::CodeTooLong { max } => {
                write!(f, "community code must be at most {max} characters")
            }
            Self::EmptyName => write!(f, "community name must not be empty"),
            Self::EmptyAddress => write!(f, "address must not be empty"),
            Self::TextTooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
            Self::InvalidPostalCode => write!(f, "postal code must have five digits"),
        }
    }
}

impl std::error::Error for CommunityValidationError {}

impl From<CommunityValidationError> for Error {
    fn from(value: CommunityValidationError) -> Self {
        Self::invalid_field(value.field(), value.code(), value.to_string())
    }
}

fn postal_code_regex() -> &'static Regex {
    static POSTAL_CODE_RE: OnceLock<Regex> = OnceLock::new();
    POSTAL_CODE_RE.get_or_init(|| {
        Regex::new(r"^[0-9]{5}$")
            .unwrap_or_else(|error| panic!("postal code regex failed to compile: {error}"))
    })
}

/// Public code residents type to join a community.
///
/// # Examples
/// ```
/// use backend::domain::CommunityCode;
///
/// let code = CommunityCode::new("  SUNSET-12 ").unwrap();
/// assert_eq!(code.as_ref(), "SUNSET-12");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommunityCode(String);

impl CommunityCode {
    /// Validate a trimmed, non-empty code.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CommunityValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CommunityValidationError::EmptyCode);
        }
        if trimmed.chars().count() > CODE_MAX {
            return Err(CommunityValidationError::CodeTooLong { max: CODE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for CommunityCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommunityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn bounded_text(
    raw: &str,
    field: &'static str,
    empty: CommunityValidationError,
) -> Result<String, CommunityValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(empty);
    }
    if trimmed.chars().count() > TEXT_MAX {
        return Err(CommunityValidationError::TextTooLong {
            field,
            max: TEXT_MAX,
        });
    }
    Ok(trimmed.to_owned())
}

/// Validated description of a community about to be founded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommunity {
    name: String,
    address: String,
    postal_code: String,
    code: CommunityCode,
}

impl NewCommunity {
    /// Validate the founding details of a community.
    pub fn try_new(
        name: &str,
        address: &str,
        postal_code: &str,
        code: &str,
    ) -> Result<Self, CommunityValidationError> {
        let name = bounded_text(name, "communityName", CommunityValidationError::EmptyName)?;
        let address = bounded_text(address, "address", CommunityValidationError::EmptyAddress)?;
        let postal_code = postal_code.trim();
        if !postal_code_regex().is_match(postal_code) {
            return Err(CommunityValidationError::InvalidPostalCode);
        }
        Ok(Self {
            name,
            address,
            postal_code: postal_code.to_owned(),
            code: CommunityCode::new(code)?,
        })
    }

    /// Join code requested for the community.
    pub fn code(&self) -> &CommunityCode {
        &self.code
    }

    /// Materialise the community with `id` and its founding president.
    pub fn into_community(self, id: CommunityId, president: UserId) -> Community {
        Community {
            id,
            name: self.name,
            address: self.address,
            postal_code: self.postal_code,
            code: self.code,
            president_id: Some(president),
        }
    }
}

/// Residential community.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Community {
    pub id: CommunityId,
    pub name: String,
    pub address: String,
    pub postal_code: String,
    pub code: CommunityCode,
    pub president_id: Option<UserId>,
}
