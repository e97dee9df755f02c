use std::sync::Arc;

use ironlog::Config;
use ironlog::auth::{IdentityVerifier, TokenIssuer};
use ironlog::db::Repository;

/// Shared by every request. Built once at startup and never mutated.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tokens: Arc<TokenIssuer>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub repo: Arc<dyn Repository>,
}

impl AppState {
    pub fn new(
        config: Config,
        repo: Arc<dyn Repository>,
        identity: Arc<dyn IdentityVerifier>,
    ) -> Self {
        let tokens = Arc::new(TokenIssuer::new(&config.signing_key));
        Self {
            config: Arc::new(config),
            tokens,
            identity,
            repo,
        }
    }
}
