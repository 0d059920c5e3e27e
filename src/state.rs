/*
 * Responsibility
 * - shared context bound to the Router (AppState)
 * - store / authenticator / token codec, all behind Arc (Clone cheap)
 * - injected at startup; tests build it with a MemoryStore instead
 */
use std::sync::Arc;

use crate::repos::DealsStore;
use crate::services::auth::{Authenticator, TokenCodec};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DealsStore>,
    pub authenticator: Arc<dyn Authenticator>,
    pub token_codec: Arc<TokenCodec>,
    /// TTL applied to tokens issued by `/getToken`.
    pub signed_token_ttl: chrono::Duration,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DealsStore>,
        authenticator: Arc<dyn Authenticator>,
        token_codec: Arc<TokenCodec>,
        signed_token_ttl: chrono::Duration,
    ) -> Self {
        Self {
            store,
            authenticator,
            token_codec,
            signed_token_ttl,
        }
    }
}
