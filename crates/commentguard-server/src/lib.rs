//! CommentGuard Server
//!
//! Moderation service for embedded comment widgets. Visitors submit comments
//! through the embed routes; each one runs through the safety classifier and
//! the website's active policies before it can be published. Owners manage
//! policies, re-run moderation over the pending backlog, and override
//! decisions by hand through the `/api` routes.

pub mod cli;
pub mod config;
pub mod error;
pub mod manual;
pub mod moderation;
pub mod policies;
pub mod rerun;
pub mod routes;
pub mod security;
pub mod state;
pub mod store;
pub mod submission;
pub mod websites;

pub use cli::Cli;
pub use config::ServerConfig;
pub use error::{ApiJson, AppError};
pub use moderation::{CommentModerator, ModerationService};
pub use rerun::{RerunCoordinator, RerunReport};
pub use routes::create_router;
pub use state::AppState;
pub use store::{InMemoryStore, Store};
