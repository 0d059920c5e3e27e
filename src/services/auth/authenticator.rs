/*
 * Responsibility
 * - `Authenticator`: the one bearer-verification capability the auth
 *   middleware depends on
 * - two implementations: `FirebaseAuthenticator` (provider JWKS) and
 *   `SignedTokenAuthenticator` (self-issued HS256)
 *
 * The 401 body message differs per scheme ("Unauthorized access" vs
 * "unauthorized access"); each implementation owns its message.
 */
use async_trait::async_trait;
use thiserror::Error;

/// Verified identity attached to the request for ownership checks.
/// Derived per request, never persisted.
#[derive(Debug, Clone)]
pub struct Identity {
    pub email: String,
}

/// Why a bearer token was rejected. Logged server-side only; clients
/// see the scheme's generic 401 message.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token expired")]
    Expired,
    #[error("token rejected: {0}")]
    Rejected(String),
    #[error("token carries no email claim")]
    MissingEmail,
    #[error("verification keys unavailable: {0}")]
    KeysUnavailable(String),
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Verify the raw bearer token and derive the caller's identity.
    async fn authenticate(&self, token: &str) -> Result<Identity, AuthError>;

    /// 401 body message for this scheme.
    fn unauthorized_message(&self) -> &'static str;
}
