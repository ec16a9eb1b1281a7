pub mod app;
pub mod config;
pub mod database;
mod error;
pub mod store;
pub mod templ_manager;
pub mod web;

pub use app::{App, AppState};
pub use error::{Error, Result};
pub use web::serve;

use tracing_subscriber::EnvFilter;

/// Compact console logging for development, `RUST_LOG` overrides the default `debug` filter.
pub fn init_dbg_tracing() {
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_env_filter(env_filter_or("debug"))
        .compact()
        .init();
}

/// Logging for release builds, `RUST_LOG` overrides the default `info` filter.
pub fn init_production_tracing() {
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter_or("info"))
        .init();
}

fn env_filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
