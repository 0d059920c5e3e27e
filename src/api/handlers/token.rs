/*
 * Responsibility
 * - POST /getToken: sign whatever JSON object the client sends and
 *   return `{token}` (1h expiry by default, configurable)
 */
use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;
use crate::services::auth::TokenError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

pub async fn issue_token(
    State(state): State<AppState>,
    Json(claims): Json<Value>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = state
        .token_codec
        .issue(&claims, state.signed_token_ttl)
        .map_err(|e| match e {
            TokenError::NotAnObject => AppError::bad_request("claims must be a JSON object"),
            other => {
                tracing::error!(error = %other, "token signing failed");
                AppError::Internal
            }
        })?;

    Ok(Json(TokenResponse { token }))
}
