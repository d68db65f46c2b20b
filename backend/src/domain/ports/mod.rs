//! Domain ports for the hexagonal boundary.
//!
//! Driven ports only: repositories, file storage and password hashing.
//! Inbound adapters call the services in [`crate::domain`] directly.

mod macros;
pub(crate) use macros::define_port_error;

mod chat_repository;
mod community_repository;
mod complaint_repository;
mod document_repository;
mod file_storage;
mod incident_repository;
mod password_hasher;
mod poll_repository;
mod post_repository;
mod repository_error;
mod reservation_repository;
mod user_repository;
mod zone_repository;

pub use chat_repository::ChatRepository;
#[cfg(test)]
pub use chat_repository::MockChatRepository;
pub use community_repository::CommunityRepository;
#[cfg(test)]
pub use community_repository::MockCommunityRepository;
pub use complaint_repository::ComplaintRepository;
#[cfg(test)]
pub use complaint_repository::MockComplaintRepository;
pub use document_repository::{DocumentListing, DocumentRepository};
#[cfg(test)]
pub use document_repository::MockDocumentRepository;
pub use file_storage::{FileStorage, FileStorageError};
#[cfg(test)]
pub use file_storage::MockFileStorage;
pub use incident_repository::{IncidentListing, IncidentRepository};
#[cfg(test)]
pub use incident_repository::MockIncidentRepository;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use poll_repository::PollRepository;
#[cfg(test)]
pub use poll_repository::MockPollRepository;
pub use post_repository::PostRepository;
#[cfg(test)]
pub use post_repository::MockPostRepository;
pub use repository_error::RepositoryError;
pub use reservation_repository::{HistoryFilter, ReservationRepository};
#[cfg(test)]
pub use reservation_repository::MockReservationRepository;
pub use user_repository::UserRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use zone_repository::ZoneRepository;
#[cfg(test)]
pub use zone_repository::MockZoneRepository;
