//! In-memory adapters for every repository port.
//!
//! Used when no database URL is configured and by the HTTP test suites. All
//! tables live behind a single mutex so multi-table operations such as
//! founding a community are atomic, and the same uniqueness and overlap rules
//! the PostgreSQL schema enforces are reported as
//! [`RepositoryError::Duplicate`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::ports::RepositoryError;
use crate::domain::{
    ChatMessage, CommonZone, Community, CommunityId, Complaint, ComplaintId, Document, DocumentId,
    Incident, IncidentId, Poll, PollId, Post, PostId, Reservation, ReservationId, User, UserId,
    Vote, ZoneId,
};

mod accounts;
mod bulletin;
mod files;
mod polls;
mod reservations;

pub use files::MemoryFileStorage;

/// Shared in-memory store implementing every repository port.
///
/// Wrap it in an `Arc` and hand clones to each service.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    communities: HashMap<CommunityId, Community>,
    users: HashMap<UserId, User>,
    incidents: HashMap<IncidentId, Incident>,
    complaints: HashMap<ComplaintId, Complaint>,
    documents: HashMap<DocumentId, Document>,
    posts: HashMap<PostId, Post>,
    zones: HashMap<ZoneId, CommonZone>,
    reservations: HashMap<ReservationId, Reservation>,
    polls: HashMap<PollId, Poll>,
    votes: Vec<Vote>,
    chat: Vec<ChatMessage>,
}

impl Tables {
    fn user(&self, id: &UserId) -> Option<&User> {
        self.users.get(id)
    }

    /// Email or DNI collisions with existing users.
    fn check_user_unique(&self, candidate: &User) -> Result<(), RepositoryError> {
        for user in self.users.values().filter(|user| user.id != candidate.id) {
            if user.email == candidate.email {
                return Err(RepositoryError::duplicate("users_email_key"));
            }
            if user.dni == candidate.dni {
                return Err(RepositoryError::duplicate("users_dni_key"));
            }
        }
        Ok(())
    }
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the tables. A poisoned lock still holds consistent data because
    /// every mutation completes before the guard drops.
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
