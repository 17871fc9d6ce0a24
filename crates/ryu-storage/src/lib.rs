//! Profile picture storage.
//!
//! This crate provides:
//! - Saving uploaded picture bytes under a per-user name
//! - Public-path mapping for serving the uploads directory
//! - Best-effort cleanup on account deletion

pub mod error;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use store::ProfileStorage;
