//! Transport-agnostic error envelope.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::TraceId;

/// Failure category shared by every adapter.
///
/// HTTP maps each variant to one status code; WebSocket frames only carry
/// the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Bad input or a broken community rule (overlap, quota, double vote).
    InvalidRequest,
    /// No session, or wrong credentials.
    Unauthorized,
    /// Signed in but the role or community does not allow it.
    Forbidden,
    NotFound,
    /// Lost a race against a concurrent write.
    Conflict,
    /// The database could not be reached.
    ServiceUnavailable,
    InternalError,
}

/// Error envelope returned by services and serialised to clients.
///
/// The trace id in scope at construction time is captured so a response
/// body can be matched against request logs.
///
/// # Examples
/// ```
/// use backend::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("zone not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.to_string(), "zone not found");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    #[schema(example = "invalid_request")]
    code: ErrorCode,
    #[schema(example = "the zone is already reserved at that time")]
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Field-level context, e.g. `{"field": "dni", "code": "invalid_dni"}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

macro_rules! error_constructors {
    ($($(#[$doc:meta])* $name:ident => $code:ident;)+) => {
        $(
            $(#[$doc])*
            pub fn $name(message: impl Into<String>) -> Self {
                Self::new(ErrorCode::$code, message)
            }
        )+
    };
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    error_constructors! {
        invalid_request => InvalidRequest;
        unauthorized => Unauthorized;
        forbidden => Forbidden;
        not_found => NotFound;
        conflict => Conflict;
        service_unavailable => ServiceUnavailable;
        /// The message is replaced before it reaches a client.
        internal => InternalError;
    }

    /// Validation failure on one request field.
    pub fn invalid_field(field: &str, code: &str, message: impl Into<String>) -> Self {
        Self::invalid_request(message).with_details(serde_json::json!({
            "field": field,
            "code": code,
        }))
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Overwrite the captured trace id.
    pub fn with_trace_id(self, id: impl Into<String>) -> Self {
        Self {
            trace_id: Some(id.into()),
            ..self
        }
    }

    /// Replace the details payload.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("slot taken").with_details(json!({ "start": "10:00" }));
    /// assert_eq!(err.details(), Some(&json!({ "start": "10:00" })));
    /// ```
    pub fn with_details(self, details: Value) -> Self {
        Self {
            details: Some(details),
            ..self
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests;
