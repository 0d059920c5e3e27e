/*
 * Responsibility
 * - bearer token guard: header extraction → verification → reject or
 *   attach `AuthCtx` to request extensions
 * - which scheme verifies the token is decided by the `Authenticator`
 *   in AppState; the guard itself is scheme-agnostic
 * - any failure short-circuits with 401 and the scheme's message; the
 *   verifier's error detail is logged, never sent to the client
 */
use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

pub async fn require_bearer(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let message = state.authenticator.unauthorized_message();

    let Some(authorization) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    else {
        return Err(AppError::unauthorized(message));
    };

    // "Bearer <token>": anything without a second segment is rejected.
    let Some(token) = authorization.split_whitespace().nth(1) else {
        return Err(AppError::unauthorized(message));
    };

    let identity = match state.authenticator.authenticate(token).await {
        Ok(identity) => identity,
        Err(err) => {
            tracing::warn!(error = %err, "bearer token verification failed");
            return Err(AppError::unauthorized(message));
        }
    };

    // middleware → extractor handoff
    req.extensions_mut().insert(AuthCtx {
        email: identity.email,
    });

    Ok(next.run(req).await)
}
