//! Axum HTTP API server.
//!
//! This crate provides:
//! - Full REST API parity with the Python backend
//! - Bearer-token authentication (HS256) over bcrypt credentials
//! - Role-gated admin/recruiter/candidate surfaces
//! - Security headers and request logging

pub mod auth;
pub mod config;
pub mod credential;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{AccountService, AdminBootstrap, BoardService};
pub use state::AppState;
