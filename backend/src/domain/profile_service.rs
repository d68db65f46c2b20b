//! Own-profile reads and password changes.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};
use zeroize::Zeroizing;

use super::ports::{PasswordHasher, UserRepository};
use super::{ActorLoader, AuthValidationError, Error, Password, Role, User, UserId, require_role};

/// Validated password change request.
#[derive(Clone)]
pub struct PasswordChange {
    current: Zeroizing<String>,
    new: Password,
}

impl fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordChange(<redacted>)")
    }
}

impl PasswordChange {
    /// Require the current password and a confirmed new one.
    pub fn try_new(current: &str, new: &str, repeat: &str) -> Result<Self, Error> {
        if current.is_empty() {
            return Err(Error::invalid_field(
                "currentPassword",
                "empty_value",
                "current password must not be empty",
            ));
        }
        let new = Password::confirmed(new, repeat).map_err(|error| match error {
            AuthValidationError::PasswordMismatch => Error::invalid_field(
                "repeatPassword",
                "mismatch",
                "new passwords do not match",
            ),
            other => other.into(),
        })?;
        Ok(Self {
            current: Zeroizing::new(current.to_owned()),
            new,
        })
    }
}

/// Profile operations for residents and presidents.
#[derive(Clone)]
pub struct ProfileService {
    actors: ActorLoader,
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

const PROFILE_ROLES: &[Role] = &[Role::Resident, Role::President];

impl ProfileService {
    /// Assemble the service from its ports.
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            actors: ActorLoader::new(Arc::clone(&users)),
            users,
            hasher,
        }
    }

    /// Profile of the acting user.
    pub async fn get_profile(&self, actor: &UserId) -> Result<User, Error> {
        self.actors.load_with_role(actor, PROFILE_ROLES).await
    }

    /// Replace the password after verifying the current one.
    pub async fn change_password(
        &self,
        actor: &UserId,
        change: PasswordChange,
    ) -> Result<(), Error> {
        let mut user = self.actors.load(actor).await?;
        require_role(&user, PROFILE_ROLES)?;
        if !self.hasher.verify(&change.current, &user.password_hash)? {
            warn!(user_id = %user.id, "password change with wrong current password");
            return Err(Error::invalid_field(
                "currentPassword",
                "incorrect",
                "current password is incorrect",
            ));
        }
        if change.current.as_str() == change.new.expose() {
            return Err(Error::invalid_field(
                "newPassword",
                "unchanged",
                "new password must differ from the current one",
            ));
        }
        user.password_hash = self.hasher.hash(&change.new)?;
        self.users.update(&user).await?;
        info!(user_id = %user.id, "password changed");
        Ok(())
    }
}
