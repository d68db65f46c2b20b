//! Users, roles and the validated values that describe them.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CommunityId, Error, UserId};

const FULL_NAME_MAX: usize = 100;
const FLOOR_MAX: usize = 20;

/// Validation errors raised by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    InvalidEmail,
    InvalidDni,
    EmptyFullName,
    FullNameTooLong { max: usize },
    EmptyFloor,
    FloorTooLong { max: usize },
}

impl UserValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "email",
            Self::InvalidDni => "dni",
            Self::EmptyFullName | Self::FullNameTooLong { .. } => "fullName",
            Self::EmptyFloor | Self::FloorTooLong { .. } => "floor",
        }
    }

    /// Stable machine-readable code for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "invalid_email",
            Self::InvalidDni => "invalid_dni",
            Self::EmptyFullName | Self::EmptyFloor => "empty_value",
            Self::FullNameTooLong { .. } | Self::FloorTooLong { .. } => "too_long",
        }
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::InvalidDni => write!(f, "dni must be eight digits followed by a letter"),
            Self::EmptyFullName => write!(f, "full name must not be empty"),
            Self::FullNameTooLong { max } => {
                write!(f, "full name must be at most {max} characters")
            }
            Self::EmptyFloor => write!(f, "floor must not be empty"),
            Self::FloorTooLong { max } => write!(f, "floor must be at most {max} characters"),
        }
    }
}

impl std::error::Error for UserValidationError {}

impl From<UserValidationError> for Error {
    fn from(value: UserValidationError) -> Self {
        Self::invalid_field(value.field(), value.code(), value.to_string())
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn dni_regex() -> &'static Regex {
    static DNI_RE: OnceLock<Regex> = OnceLock::new();
    DNI_RE.get_or_init(|| {
        Regex::new(r"^[0-9]{8}[A-Z]$")
            .unwrap_or_else(|error| panic!("dni regex failed to compile: {error}"))
    })
}

/// Lower-cased e-mail address used as the login name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and normalise an e-mail address.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::Email;
    ///
    /// let email = Email::new("  Ana@Example.org ").unwrap();
    /// assert_eq!(email.as_ref(), "ana@example.org");
    /// ```
    pub fn new(value: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = value.as_ref().trim().to_lowercase();
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// National identity document number (eight digits and a control letter).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dni(String);

impl Dni {
    /// Validate a DNI, upper-casing the control letter.
    pub fn new(value: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = value.as_ref().trim().to_uppercase();
        if !dni_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidDni);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Dni {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Human-readable full name of a resident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullName(String);

impl FullName {
    /// Validate a trimmed, non-empty full name.
    pub fn new(value: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyFullName);
        }
        if trimmed.chars().count() > FULL_NAME_MAX {
            return Err(UserValidationError::FullNameTooLong { max: FULL_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for FullName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Floor or door label within the building, e.g. `3B`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Floor(String);

impl Floor {
    /// Validate a trimmed, non-empty floor label.
    pub fn new(value: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyFloor);
        }
        if trimmed.chars().count() > FLOOR_MAX {
            return Err(UserValidationError::FloorTooLong { max: FLOOR_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Floor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Role governing what a user may do inside their community.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A regular neighbour.
    Resident,
    /// The elected community president.
    President,
    /// Property administrator acting on behalf of the community.
    Administrator,
}

impl Role {
    /// Stable storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resident => "resident",
            Self::President => "president",
            Self::Administrator => "administrator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored or submitted role label is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resident" => Ok(Self::Resident),
            "president" => Ok(Self::President),
            "administrator" => Ok(Self::Administrator),
            other => Err(RoleParseError(other.to_owned())),
        }
    }
}

/// Opaque password hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a password hasher.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded hash string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub dni: Dni,
    pub full_name: FullName,
    pub floor: Floor,
    pub password_hash: PasswordHash,
    pub role: Role,
    pub community_id: Option<CommunityId>,
}

impl User {
    /// Whether the user holds one of `roles`.
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    /// Whether the user belongs to `community`.
    pub fn belongs_to(&self, community: CommunityId) -> bool {
        self.community_id == Some(community)
    }
}
