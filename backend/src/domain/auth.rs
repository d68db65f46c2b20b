//! Authentication primitives: credentials, passwords and registration drafts.
//!
//! Constructors validate raw strings so handlers can hand the domain fully
//! checked values. Plaintext passwords live in [`Zeroizing`] buffers and are
//! wiped on drop.

use std::fmt;

use zeroize::Zeroizing;

use super::{CommunityCode, Dni, Email, Error, Floor, FullName, NewCommunity, Role};

/// Minimum accepted password length in characters.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when credential or password values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
    /// Password shorter than [`PASSWORD_MIN`].
    PasswordTooShort { min: usize },
    /// Password and its confirmation differ.
    PasswordMismatch,
    /// Self-registration asked for a role that must be granted otherwise.
    RoleNotAllowed { role: Role },
}

impl AuthValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::EmptyEmail => "email",
            Self::EmptyPassword | Self::PasswordTooShort { .. } => "password",
            Self::PasswordMismatch => "confirmPassword",
            Self::RoleNotAllowed { .. } => "role",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::EmptyEmail | Self::EmptyPassword => "empty_value",
            Self::PasswordTooShort { .. } => "too_short",
            Self::PasswordMismatch => "mismatch",
            Self::RoleNotAllowed { .. } => "not_allowed",
        }
    }
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordMismatch => write!(f, "passwords do not match"),
            Self::RoleNotAllowed { role } => write!(f, "role {role} cannot be self-assigned"),
        }
    }
}

impl std::error::Error for AuthValidationError {}

impl From<AuthValidationError> for Error {
    fn from(value: AuthValidationError) -> Self {
        Self::invalid_field(value.field(), value.code(), value.to_string())
    }
}

/// Validated login credentials used by the authentication service.
///
/// ## Invariants
/// - `email` is trimmed, lower-cased and non-empty.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Ana@Example.org", "secret").unwrap();
/// assert_eq!(creds.email(), "ana@example.org");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        let normalised = email.trim().to_lowercase();
        if normalised.is_empty() {
            return Err(AuthValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalised,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for the user lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Plaintext password that satisfies the length policy.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate a new password against the length policy.
    pub fn new(raw: &str) -> Result<Self, AuthValidationError> {
        if raw.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        if raw.chars().count() < PASSWORD_MIN {
            return Err(AuthValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Validate a password typed twice, requiring both copies to match.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{AuthValidationError, Password};
    ///
    /// assert!(Password::confirmed("secret1", "secret1").is_ok());
    /// assert_eq!(
    ///     Password::confirmed("secret1", "secret2").err(),
    ///     Some(AuthValidationError::PasswordMismatch)
    /// );
    /// ```
    pub fn confirmed(raw: &str, confirmation: &str) -> Result<Self, AuthValidationError> {
        if raw != confirmation {
            return Err(AuthValidationError::PasswordMismatch);
        }
        Self::new(raw)
    }

    /// Plaintext, for handing to a password hasher.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Personal details shared by every registration flow.
#[derive(Debug, Clone)]
pub struct AccountDraft {
    pub email: Email,
    pub dni: Dni,
    pub full_name: FullName,
    pub floor: Floor,
    pub password: Password,
}

/// Request to found a community and become its president.
#[derive(Debug, Clone)]
pub struct PresidentRegistration {
    pub account: AccountDraft,
    pub community: NewCommunity,
}

/// Request to join an existing community.
#[derive(Debug, Clone)]
pub struct ResidentRegistration {
    pub account: AccountDraft,
    pub community_code: CommunityCode,
    pub role: Role,
}

impl ResidentRegistration {
    /// Build a registration, defaulting to [`Role::Resident`].
    ///
    /// Presidents are only created by founding a community or by a handover,
    /// so asking for that role is rejected.
    pub fn new(
        account: AccountDraft,
        community_code: CommunityCode,
        role: Option<Role>,
    ) -> Result<Self, AuthValidationError> {
        let role = role.unwrap_or(Role::Resident);
        if role == Role::President {
            return Err(AuthValidationError::RoleNotAllowed { role });
        }
        Ok(Self {
            account,
            community_code,
            role,
        })
    }
}
