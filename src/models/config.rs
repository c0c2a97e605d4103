//! Configuration model loaded from external sources.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Settings shared by the HTTP server and the reminder dispatcher.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    /// Directory served under `/static`.
    pub static_dir: String,
    /// Acting user when a request carries no `X-User-Id` header.
    pub default_user_id: i32,
    /// Maximum number of reminders handled by one dispatch sweep.
    pub reminder_batch_size: usize,
}
