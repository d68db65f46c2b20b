//! Error shared by every persistence port.

use super::define_port_error;
use crate::domain::Error;

define_port_error! {
    /// Persistence errors raised by repository adapters.
    pub enum RepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "repository query failed: {message}",
        /// A unique or exclusion constraint rejected the write.
        Duplicate { message: String } => "repository rejected duplicate: {message}",
    }
}

impl From<RepositoryError> for Error {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Connection { message } => {
                Self::service_unavailable(format!("database unavailable: {message}"))
            }
            RepositoryError::Query { message } => {
                Self::internal(format!("database error: {message}"))
            }
            RepositoryError::Duplicate { message } => {
                Self::conflict(format!("conflicting write: {message}"))
            }
        }
    }
}
