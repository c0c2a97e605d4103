//! Request bodies accepted by the CRM JSON API.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod activity;
pub mod customer;
pub mod dashboard;
pub mod reminder;
pub mod tag;
pub mod todo;
pub mod user;

#[derive(Debug, Error)]
/// Errors that can occur when processing request data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Constraint(#[from] TypeConstraintError),

    #[error("invalid date time: {0}")]
    InvalidDateTime(String),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid csv: {0}")]
    InvalidCsv(String),
}

/// Parses a timestamp sent by clients into local naive time.
///
/// RFC 3339 values are converted to the server's local zone; the plain
/// `YYYY-MM-DD[ HH:MM[:SS]]` forms are taken as local already.
pub fn parse_datetime(raw: &str) -> Result<NaiveDateTime, FormError> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Local).naive_local());
    }
    for format in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(at) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(at);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
        .map_err(|_| FormError::InvalidDateTime(raw.to_string()))
}

/// Like [`parse_datetime`], treating blank input as absent.
pub fn parse_optional_datetime(raw: Option<&str>) -> Result<Option<NaiveDateTime>, FormError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_datetime(value).map(Some),
    }
}
