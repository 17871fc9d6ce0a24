//! Application state.

use std::sync::Arc;

use ryu_storage::ProfileStorage;
use ryu_store::{build_store, DocumentStore, UserRepo};

use crate::auth::TokenService;
use crate::config::ApiConfig;
use crate::services::{AccountService, BoardService};

/// Shared application state. Constructed once at process start; every
/// component receives its collaborators from here instead of reaching for
/// ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<DocumentStore>,
    pub storage: Arc<ProfileStorage>,
    pub tokens: Arc<TokenService>,
    pub users: UserRepo,
    pub accounts: AccountService,
    pub board: BoardService,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store = Arc::new(build_store());
        let storage = Arc::new(ProfileStorage::new(&config.upload_dir)?);
        let tokens = Arc::new(TokenService::new(&config.token_secret, config.token_ttl));

        let users = UserRepo::new(Arc::clone(&store));
        let accounts = AccountService::new(
            Arc::clone(&store),
            Arc::clone(&storage),
            Arc::clone(&tokens),
            config.password_cost,
        );
        let board = BoardService::new(Arc::clone(&store));

        Ok(Self {
            config,
            store,
            storage,
            tokens,
            users,
            accounts,
            board,
        })
    }
}
