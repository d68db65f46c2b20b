//! Session cookie configuration and validation.
//!
//! Turns the session keys of [`AppSettings`] into a signing key and cookie
//! policy. Debug builds tolerate bad values with a warning; release builds
//! refuse to start.

use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};
use tracing::warn;
use zeroize::Zeroize;

use crate::settings::AppSettings;

pub mod fingerprint;
mod parsing;

use parsing::{debug_warn_or_error, parse_same_site};

const SESSION_KEY_MIN_LEN: usize = 64;

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings.
    Debug,
    /// Release builds require valid values and a full-length key.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated session cookie settings.
pub struct SessionSettings {
    /// Signing and encryption key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("invalid value for session_same_site='{value}'; expected Strict|Lax|None")]
    InvalidSameSite { value: String },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` without `Secure` is rejected by browsers.
    #[error("session_same_site=None requires session_cookie_secure=true")]
    InsecureSameSiteNone,
}

/// Build session settings from application settings and build mode.
///
/// # Examples
///
/// ```rust
/// use backend::inbound::http::session_config::{BuildMode, session_settings};
/// use backend::settings::AppSettings;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// let key_path = dir.path().join("session_key");
/// std::fs::write(&key_path, vec![b'a'; 64])?;
///
/// let settings = AppSettings {
///     session_key_file: Some(key_path),
///     session_same_site: Some("Strict".to_owned()),
///     ..AppSettings::default()
/// };
/// let session = session_settings(&settings, BuildMode::Release)?;
/// assert!(session.cookie_secure);
/// # Ok(())
/// # }
/// ```
pub fn session_settings(
    settings: &AppSettings,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = settings.session_cookie_secure();
    let same_site = parse_same_site(settings.session_same_site.as_deref(), mode, cookie_secure)?;
    let key = session_key(
        &settings.session_key_file(),
        mode,
        settings.session_allow_ephemeral,
    )?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

fn session_key(
    path: &Path,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    match std::fs::read(path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return debug_warn_or_error(
                    mode,
                    Key::generate(),
                    SessionConfigError::KeyTooShort {
                        path: path.to_owned(),
                        length,
                        min_len: SESSION_KEY_MIN_LEN,
                    },
                    || {
                        warn!(
                            path = %path.display(),
                            length,
                            "session key too short; using temporary key"
                        );
                    },
                );
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key; sessions will not survive a restart"
            );
            Ok(Key::generate())
        }
        Err(error) => Err(SessionConfigError::KeyRead {
            path: path.to_owned(),
            source: error,
        }),
    }
}

#[cfg(test)]
mod tests;
