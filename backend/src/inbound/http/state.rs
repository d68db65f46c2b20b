//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services, which in turn depend on ports. Swapping the
//! port implementations (PostgreSQL or in-memory) never touches a handler.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    ChatRepository, CommunityRepository, ComplaintRepository, DocumentRepository, FileStorage,
    IncidentRepository, PasswordHasher, PollRepository, PostRepository, ReservationRepository,
    UserRepository, ZoneRepository,
};
use crate::domain::{
    AuthService, ChatService, CommunityService, ComplaintService, DocumentService,
    IncidentService, PostService, ProfileService, ReservationLimits, ReservationService,
    UploadPolicy, Uploader, VotingService, ZoneService,
};
use crate::inbound::ws::ChatHub;

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub communities: Arc<dyn CommunityRepository>,
    pub incidents: Arc<dyn IncidentRepository>,
    pub complaints: Arc<dyn ComplaintRepository>,
    pub documents: Arc<dyn DocumentRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub zones: Arc<dyn ZoneRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub polls: Arc<dyn PollRepository>,
    pub chat: Arc<dyn ChatRepository>,
    pub files: Arc<dyn FileStorage>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub clock: Arc<dyn Clock>,
}

/// Tunables applied to the services.
#[derive(Debug, Clone, Default)]
pub struct HttpStateOptions {
    pub uploads: UploadPolicy,
    pub reservations: ReservationLimits,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: AuthService,
    pub profile: ProfileService,
    pub community: CommunityService,
    pub incidents: IncidentService,
    pub complaints: ComplaintService,
    pub documents: DocumentService,
    pub posts: PostService,
    pub zones: ZoneService,
    pub reservations: ReservationService,
    pub voting: VotingService,
    pub chat: ChatService,
    /// Live WebSocket sessions, reported by the chat stats endpoint.
    pub chat_hub: ChatHub,
}

impl HttpState {
    /// Wire every service from one ports bundle.
    pub fn new(ports: HttpStatePorts, options: HttpStateOptions, chat_hub: ChatHub) -> Self {
        let HttpStatePorts {
            users,
            communities,
            incidents,
            complaints,
            documents,
            posts,
            zones,
            reservations,
            polls,
            chat,
            files,
            hasher,
            clock,
        } = ports;
        let uploader = Uploader::new(files, options.uploads);
        Self {
            auth: AuthService::new(users.clone(), communities.clone(), hasher.clone()),
            profile: ProfileService::new(users.clone(), hasher),
            community: CommunityService::new(users.clone(), communities.clone()),
            incidents: IncidentService::new(
                users.clone(),
                incidents,
                uploader.clone(),
                clock.clone(),
            ),
            complaints: ComplaintService::new(
                users.clone(),
                complaints,
                uploader.clone(),
                clock.clone(),
            ),
            documents: DocumentService::new(users.clone(), documents, uploader, clock.clone()),
            posts: PostService::new(users.clone(), communities, posts, clock.clone()),
            zones: ZoneService::new(
                users.clone(),
                zones.clone(),
                reservations.clone(),
                clock.clone(),
            ),
            reservations: ReservationService::new(
                users.clone(),
                zones,
                reservations,
                options.reservations,
                clock.clone(),
            ),
            voting: VotingService::new(users.clone(), polls, clock.clone()),
            chat: ChatService::new(users, chat, clock),
            chat_hub,
        }
    }
}
