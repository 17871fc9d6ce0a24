//! Request handlers.

pub mod admin;
pub mod auth;
pub mod candidate;
pub mod health;
pub mod recruiter;
