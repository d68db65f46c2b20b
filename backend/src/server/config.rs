//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use backend::inbound::http::state::HttpStateOptions;
use backend::outbound::persistence::DbPool;
use url::Url;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) upload_dir: PathBuf,
    pub(crate) options: HttpStateOptions,
    pub(crate) allowed_origins: Vec<Url>,
}

impl ServerConfig {
    /// Construct a server configuration from the session cookie settings.
    ///
    /// Attachments default to `./uploads`, the WebSocket allow-list starts
    /// empty and service limits use their defaults.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            upload_dir: PathBuf::from("uploads"),
            options: HttpStateOptions::default(),
            allowed_origins: Vec::new(),
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without one every repository port is served from process memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_upload_dir(mut self, dir: PathBuf) -> Self {
        self.upload_dir = dir;
        self
    }

    /// Upload and reservation limits handed to the services.
    #[must_use]
    pub fn with_options(mut self, options: HttpStateOptions) -> Self {
        self.options = options;
        self
    }

    /// Origins allowed to open the chat WebSocket.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<Url>) -> Self {
        self.allowed_origins = origins;
        self
    }
}
