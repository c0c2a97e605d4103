//! Business workflows invoked by the HTTP handlers and the dispatch binary.
//!
//! Every function is generic over the repository traits it needs so it can
//! run against [`crate::repository::DieselRepository`] or a mock.

pub mod activity;
pub mod customer;
pub mod dashboard;
pub mod errors;
pub mod notifier;
pub mod reminder;
pub mod tag;
pub mod todo;
pub mod user;

pub use errors::{ServiceError, ServiceResult};
