//! Document store client for the RecruiterYu collections.
//!
//! This crate provides:
//! - A dependency-injected [`DocumentStore`] over schemaless JSON documents
//!   with store-generated string ids
//! - Unique indexes enforced atomically at write time
//! - Atomic multi-collection batch deletes for cascades
//! - Typed repositories for users, jobs, applications, settings, and backups

pub mod error;
pub mod repos;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use repos::{
    build_store, collections, ApplicationRepo, BackupRepo, JobRepo, SettingsRepo, UserRepo,
};
pub use store::{DeleteSpec, DocumentStore, JsonMap};
