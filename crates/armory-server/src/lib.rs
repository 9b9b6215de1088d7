//! HTTP server for Armory.
//!
//! Serves the nation and vehicle catalog as a JSON REST API under `/api` and
//! hosts the static front-end from the public directory for every other path.
//! Every failure is rendered as `{"error": {"message", "details"}}`.

pub mod config;
pub mod docs;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod router;
pub mod server;
pub mod state;

pub use config::{Environment, ServerConfig};
pub use error::{ApiError, ServerError, ServerResult};
pub use router::build_router;
pub use server::ArmoryServer;
pub use state::AppState;
