//! Value parsing helpers for session configuration.

use actix_web::cookie::SameSite;
use tracing::warn;

use super::{BuildMode, SessionConfigError};

/// Return `fallback` after warning in debug builds, `error` otherwise.
pub(super) fn debug_warn_or_error<T, F>(
    mode: BuildMode,
    fallback: T,
    error: SessionConfigError,
    warn_fn: F,
) -> Result<T, SessionConfigError>
where
    F: FnOnce(),
{
    if mode.is_debug() {
        warn_fn();
        Ok(fallback)
    } else {
        Err(error)
    }
}

/// Parse the `SameSite` policy. Unset means `Lax`.
pub(super) fn parse_same_site(
    value: Option<&str>,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let Some(value) = value else {
        return Ok(SameSite::Lax);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" => {
            if !cookie_secure {
                debug_warn_or_error(mode, (), SessionConfigError::InsecureSameSiteNone, || {
                    warn!("SameSite=None without Secure; browsers may reject the cookie");
                })?;
            }
            Ok(SameSite::None)
        }
        _ => debug_warn_or_error(
            mode,
            SameSite::Lax,
            SessionConfigError::InvalidSameSite {
                value: value.to_owned(),
            },
            || warn!(value, "invalid session_same_site; using Lax"),
        ),
    }
}
