//! Application settings loaded via OrthoConfig.
//!
//! Values come from `COMMUNITY_*` environment variables, CLI flags or a
//! configuration file. Unset keys fall back to the defaults exposed by the
//! accessor methods.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::domain::{ReservationLimits, UploadPolicy};
use crate::inbound::ws::parse_allowed_origins;
use crate::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_WS_ORIGINS: &str = "http://localhost:3000";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Invalid setting values.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid WebSocket origin allow-list: {0}")]
    Origins(#[source] url::ParseError),
}

/// Runtime configuration for the backend.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "COMMUNITY")]
pub struct AppSettings {
    /// Listen address.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. In-memory adapters are used when absent.
    pub database_url: Option<String>,
    /// Connection pool size.
    pub db_max_connections: Option<u32>,
    /// Root directory for stored attachments.
    pub upload_dir: Option<PathBuf>,
    /// Allowed document extensions, comma-separated in the environment.
    #[serde(default, deserialize_with = "list_setting")]
    pub document_extensions: Option<Vec<String>>,
    /// Largest accepted document, in bytes.
    pub document_max_bytes: Option<u64>,
    /// Largest accepted incident or complaint image, in bytes.
    pub image_max_bytes: Option<u64>,
    /// Active reservations per user, zone and date.
    pub zone_daily_limit: Option<u32>,
    /// Optional cap on upcoming active reservations per user.
    pub user_active_limit: Option<u32>,
    /// WebSocket Origin allow-list, comma-separated in the environment.
    #[serde(default, deserialize_with = "list_setting")]
    pub ws_allowed_origins: Option<Vec<String>>,
    /// Session key material.
    pub session_key_file: Option<PathBuf>,
    /// Accept a generated session key when the key file cannot be read.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// `Secure` cookie attribute; on unless set to `false`. Read from the
    /// environment or a file only.
    #[ortho_config(skip_cli)]
    pub session_cookie_secure: Option<bool>,
    /// `Strict`, `Lax` or `None`.
    pub session_same_site: Option<String>,
}

/// A list setting as it arrives from a layer: a bare string when the
/// environment holds a single value, a sequence otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListSetting {
    One(String),
    Many(Vec<String>),
}

fn list_setting<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<ListSetting>::deserialize(deserializer)?;
    Ok(raw.map(|list| match list {
        ListSetting::One(item) => split_list(&item).map(str::to_owned).collect(),
        ListSetting::Many(items) => items
            .iter()
            .flat_map(|item| split_list(item))
            .map(str::to_owned)
            .collect(),
    }))
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty())
}

impl AppSettings {
    /// Socket address to listen on.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Pool configuration, if a database is configured.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url.as_ref().map(|url| {
            PoolConfig::new(url.clone())
                .with_max_size(self.db_max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS))
                .with_connection_timeout(POOL_CONNECTION_TIMEOUT)
        })
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR))
    }

    /// Upload limits, falling back to [`UploadPolicy::default`] per key.
    pub fn upload_policy(&self) -> UploadPolicy {
        let defaults = UploadPolicy::default();
        UploadPolicy {
            document_extensions: self.document_extensions.as_ref().map_or(
                defaults.document_extensions,
                |extensions| {
                    extensions
                        .iter()
                        .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                        .collect()
                },
            ),
            document_max_bytes: self
                .document_max_bytes
                .unwrap_or(defaults.document_max_bytes),
            image_max_bytes: self.image_max_bytes.unwrap_or(defaults.image_max_bytes),
        }
    }

    pub fn reservation_limits(&self) -> ReservationLimits {
        let defaults = ReservationLimits::default();
        ReservationLimits {
            per_zone_and_day: self.zone_daily_limit.unwrap_or(defaults.per_zone_and_day),
            per_user_upcoming: self.user_active_limit.or(defaults.per_user_upcoming),
        }
    }

    /// Parsed WebSocket Origin allow-list.
    pub fn allowed_origins(&self) -> Result<Vec<Url>, SettingsError> {
        match &self.ws_allowed_origins {
            Some(origins) => origins
                .iter()
                .map(|origin| Url::parse(origin))
                .collect::<Result<_, _>>(),
            None => parse_allowed_origins(DEFAULT_WS_ORIGINS),
        }
        .map_err(SettingsError::Origins)
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Whether session cookies carry `Secure`; defaults to `true`.
    pub fn session_cookie_secure(&self) -> bool {
        self.session_cookie_secure.unwrap_or(true)
    }
}
