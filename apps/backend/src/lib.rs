#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod extractors;
pub mod game;
pub mod health;
pub mod routes;
pub mod state;
pub mod ws;

// Re-exports for public API
pub use config::game::GameConfig;
pub use error::AppError;
pub use extractors::current_user::CurrentUser;
pub use game::registry::SessionRegistry;
pub use state::app_state::AppState;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::logging::init();
}
