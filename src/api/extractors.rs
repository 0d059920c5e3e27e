/*
 * Responsibility
 * - the "authenticated context" type handlers see
 * - the auth middleware verifies the token and stores this in request
 *   extensions; handlers only ever receive the type, never the token
 */
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

/// Context attached to an authenticated request.
///
/// `email` is the identity claim used for ownership comparison
/// (e.g. `buyer_email` on bids).
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub email: String,
}

impl<S> FromRequestParts<S> for AuthCtx
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only reachable on routes behind the bearer guard; a miss means
        // the route table is wired wrong.
        parts.extensions.get::<AuthCtx>().cloned().ok_or_else(|| {
            tracing::error!("AuthCtx requested on a route without the bearer guard");
            AppError::Internal
        })
    }
}
