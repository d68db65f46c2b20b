//! Shared validation helpers for inbound HTTP adapters.
//!
//! Path segments and query strings arrive as raw strings so failures can be
//! reported per field with the offending value.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde_json::json;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidDate,
    InvalidTime,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidDate => "invalid_date",
            Self::InvalidTime => "invalid_time",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn invalid_value(field: FieldName, code: ErrorCode, message: String, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

/// Parse a typed identifier such as `IncidentId` from a raw string.
pub(crate) fn parse_id<T: FromStr>(value: &str, field: FieldName) -> Result<T, Error> {
    value.trim().parse().map_err(|_| {
        invalid_value(
            field,
            ErrorCode::InvalidUuid,
            format!("{} must be a valid UUID", field.as_str()),
            value,
        )
    })
}

/// Parse an ISO `YYYY-MM-DD` date.
pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        invalid_value(
            field,
            ErrorCode::InvalidDate,
            format!("{} must be a date formatted YYYY-MM-DD", field.as_str()),
            value,
        )
    })
}

pub(crate) fn parse_optional_date(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_date(raw, field))
        .transpose()
}

/// Parse a wall-clock time formatted `HH:MM` (seconds are tolerated).
pub(crate) fn parse_time(value: &str, field: FieldName) -> Result<NaiveTime, Error> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| {
            invalid_value(
                field,
                ErrorCode::InvalidTime,
                format!("{} must be a time formatted HH:MM", field.as_str()),
                value,
            )
        })
}

/// Render a time as `HH:MM`.
pub(crate) fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
