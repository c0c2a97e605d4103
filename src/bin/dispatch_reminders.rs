//! One-shot reminder dispatcher, meant to be run periodically (e.g. from cron).
//!
//! Delivers every due reminder through the logging notifier and exits.

use std::env;

use config::Config;
use dotenvy::dotenv;

use crm_backend::db::{establish_connection_pool, run_migrations};
use crm_backend::domain::local_now;
use crm_backend::models::config::ServerConfig;
use crm_backend::repository::DieselRepository;
use crm_backend::services::notifier::LogNotifier;
use crm_backend::services::reminder::dispatch_due_reminders;

fn load_config() -> Result<ServerConfig, config::ConfigError> {
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    Config::builder()
        .add_source(config::File::with_name("config/default"))
        .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(config::Environment::with_prefix("APP"))
        .build()?
        .try_deserialize::<ServerConfig>()
}

fn main() {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = match load_config() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = run_migrations(&pool) {
        log::error!("{e}");
        std::process::exit(1);
    }

    let repo = DieselRepository::new(pool);

    match dispatch_due_reminders(
        &repo,
        &LogNotifier,
        local_now(),
        server_config.reminder_batch_size,
    ) {
        Ok(report) => log::info!(
            "Processed {} reminders: {} sent, {} failed, {} rescheduled",
            report.processed,
            report.sent,
            report.failed,
            report.rescheduled
        ),
        Err(e) => {
            log::error!("Reminder dispatch failed: {e}");
            std::process::exit(1);
        }
    }
}
