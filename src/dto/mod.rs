//! DTO modules that bridge services with the JSON API.

pub mod activity;
pub mod api;
pub mod customer;
pub mod dashboard;
pub mod reminder;
pub mod tag;
pub mod todo;
pub mod user;
