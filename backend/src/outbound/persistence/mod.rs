//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL through `diesel-async` with `bb8` pooling.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Business rules stay in the domain services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Constraint backed**: uniqueness and reservation overlap are enforced
//!   by the schema and surface as [`RepositoryError::Duplicate`].
//!
//! [`RepositoryError::Duplicate`]: crate::domain::ports::RepositoryError::Duplicate
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/community")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_chat_repository;
mod diesel_community_repository;
mod diesel_complaint_repository;
mod diesel_document_repository;
pub(crate) mod diesel_helpers;
mod diesel_incident_repository;
mod diesel_poll_repository;
mod diesel_post_repository;
mod diesel_reservation_repository;
mod diesel_user_repository;
mod diesel_zone_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_chat_repository::DieselChatRepository;
pub use diesel_community_repository::DieselCommunityRepository;
pub use diesel_complaint_repository::DieselComplaintRepository;
pub use diesel_document_repository::DieselDocumentRepository;
pub use diesel_incident_repository::DieselIncidentRepository;
pub use diesel_poll_repository::DieselPollRepository;
pub use diesel_post_repository::DieselPostRepository;
pub use diesel_reservation_repository::DieselReservationRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_zone_repository::DieselZoneRepository;
pub use migrations::run_migrations;
pub use pool::{DbPool, PoolConfig, PoolError};
