// Tribe server - social feed backend over SQLite

// HTTP routes, handlers and extractors
pub mod api;
pub mod app_state;
pub mod config;

// Core types and primitives
pub mod core;

// Entities - typed rows and their queries
pub mod entities;

// Infrastructure - database, security, time and external collaborators
pub mod infrastructure;

// Request and response shapes
pub mod models;

// Business rules
pub mod services;

// Common utilities
pub mod error;

// Re-exports for convenience
pub use api::create_router;
pub use app_state::AppState;
pub use error::{AppError, AppResult};
