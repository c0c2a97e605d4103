//! Core domain entities of the CRM.
//!
//! Entities here are persistence-agnostic; conversion to and from Diesel rows
//! lives in [`crate::models`].

pub mod activity;
pub mod customer;
pub mod dashboard;
pub mod reminder;
pub mod tag;
pub mod todo;
pub mod types;
pub mod user;

/// Current wall-clock time. Day based filters ("today", "yesterday") are
/// evaluated in local time, so timestamps are stored the same way.
pub fn local_now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Start of the local day containing `at`.
pub fn start_of_day(at: chrono::NaiveDateTime) -> chrono::NaiveDateTime {
    at.date().and_time(chrono::NaiveTime::MIN)
}
