//! Backend entry-point: loads settings, prepares storage and serves the API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::inbound::http::session_config::fingerprint::key_fingerprint;
use backend::inbound::http::session_config::{BuildMode, session_settings};
use backend::inbound::http::state::HttpStateOptions;
use backend::outbound::persistence::{DbPool, run_migrations};
use backend::settings::AppSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let session = session_settings(&settings, BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        "session key loaded"
    );

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        settings.bind_addr()?,
    )
    .with_upload_dir(settings.upload_dir())
    .with_options(HttpStateOptions {
        uploads: settings.upload_policy(),
        reservations: settings.reservation_limits(),
    })
    .with_allowed_origins(settings.allowed_origins()?);

    if let Some(pool_config) = settings.pool_config() {
        let url = pool_config.database_url().to_owned();
        run_migrations(&url)
            .await
            .wrap_err("failed to apply database migrations")?;
        let pool = DbPool::new(pool_config)
            .await
            .wrap_err("failed to create database pool")?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).wrap_err("failed to start server")?;
    info!(addr = %settings.bind_addr()?, "listening");
    server.await.wrap_err("server terminated with an error")
}
