//! Builders for the HTTP and WebSocket adapter state.

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;

use backend::domain::ports::{
    ChatRepository, CommunityRepository, ComplaintRepository, DocumentRepository,
    IncidentRepository, PollRepository, PostRepository, ReservationRepository, UserRepository,
    ZoneRepository,
};
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::inbound::ws::ChatHub;
use backend::inbound::ws::state::WsState;
use backend::outbound::memory::MemoryStore;
use backend::outbound::persistence::{
    DbPool, DieselChatRepository, DieselCommunityRepository, DieselComplaintRepository,
    DieselDocumentRepository, DieselIncidentRepository, DieselPollRepository,
    DieselPostRepository, DieselReservationRepository, DieselUserRepository,
    DieselZoneRepository,
};
use backend::outbound::security::Argon2PasswordHasher;
use backend::outbound::storage::DirFileStorage;
use tracing::{info, warn};

use super::ServerConfig;

/// Repository half of [`HttpStatePorts`].
struct RepositoryPorts {
    users: Arc<dyn UserRepository>,
    communities: Arc<dyn CommunityRepository>,
    incidents: Arc<dyn IncidentRepository>,
    complaints: Arc<dyn ComplaintRepository>,
    documents: Arc<dyn DocumentRepository>,
    posts: Arc<dyn PostRepository>,
    zones: Arc<dyn ZoneRepository>,
    reservations: Arc<dyn ReservationRepository>,
    polls: Arc<dyn PollRepository>,
    chat: Arc<dyn ChatRepository>,
}

fn diesel_ports(pool: &DbPool) -> RepositoryPorts {
    RepositoryPorts {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        communities: Arc::new(DieselCommunityRepository::new(pool.clone())),
        incidents: Arc::new(DieselIncidentRepository::new(pool.clone())),
        complaints: Arc::new(DieselComplaintRepository::new(pool.clone())),
        documents: Arc::new(DieselDocumentRepository::new(pool.clone())),
        posts: Arc::new(DieselPostRepository::new(pool.clone())),
        zones: Arc::new(DieselZoneRepository::new(pool.clone())),
        reservations: Arc::new(DieselReservationRepository::new(pool.clone())),
        polls: Arc::new(DieselPollRepository::new(pool.clone())),
        chat: Arc::new(DieselChatRepository::new(pool.clone())),
    }
}

fn memory_ports() -> RepositoryPorts {
    let store = Arc::new(MemoryStore::new());
    RepositoryPorts {
        users: store.clone(),
        communities: store.clone(),
        incidents: store.clone(),
        complaints: store.clone(),
        documents: store.clone(),
        posts: store.clone(),
        zones: store.clone(),
        reservations: store.clone(),
        polls: store.clone(),
        chat: store,
    }
}

/// Pick repositories: Diesel when a pool is present, process memory otherwise.
fn select_ports<Pool>(
    pool: Option<&Pool>,
    make_db_ports: impl FnOnce(&Pool) -> RepositoryPorts,
) -> RepositoryPorts {
    match pool {
        Some(pool) => {
            info!("using PostgreSQL repositories");
            make_db_ports(pool)
        }
        None => {
            warn!("no database configured; data lives in process memory only");
            memory_ports()
        }
    }
}

/// Shared state for both adapters, wired around one [`ChatHub`].
pub(super) struct AdapterState {
    pub(super) http: web::Data<HttpState>,
    pub(super) ws: web::Data<WsState>,
}

/// Build the adapter state from configured ports.
///
/// # Errors
/// Fails when the upload directory cannot be created or opened.
pub(super) fn build_state(config: &ServerConfig) -> io::Result<AdapterState> {
    let repos = select_ports(config.db_pool.as_ref(), diesel_ports);
    let files = Arc::new(DirFileStorage::open(&config.upload_dir)?);
    let clock = Arc::new(DefaultClock);
    let hub = ChatHub::default();

    let ports = HttpStatePorts {
        users: repos.users,
        communities: repos.communities,
        incidents: repos.incidents,
        complaints: repos.complaints,
        documents: repos.documents,
        posts: repos.posts,
        zones: repos.zones,
        reservations: repos.reservations,
        polls: repos.polls,
        chat: repos.chat,
        files,
        hasher: Arc::new(Argon2PasswordHasher::new()),
        clock,
    };
    let http = HttpState::new(ports, config.options.clone(), hub.clone());
    let ws = WsState::new(http.chat.clone(), hub, config.allowed_origins.clone());
    Ok(AdapterState {
        http: web::Data::new(http),
        ws: web::Data::new(ws),
    })
}
