//! # atelier-api
//!
//! HTTP API layer for Atelier notifications built on Axum.
//!
//! Serves the caller's inbox, accepts domain events from the business layer,
//! and exposes the authenticated trigger for the daily-log reminder sweep.

pub mod app;
pub mod auth;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, serve, shutdown_signal};
pub use auth::JwtDecoder;
pub use error::ApiError;
pub use state::AppState;
