//! Domain services.

pub mod account;
pub mod board;

pub use account::{AccountService, AdminBootstrap};
pub use board::{AdminStats, BoardService, NewJob, RecruiterStats};
