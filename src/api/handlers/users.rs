/*
 * Responsibility
 * - POST /users: signup, insert verbatim
 * - email uniqueness is enforced by the store (unique index), so a
 *   duplicate signup gets a 409 instead of silence; two concurrent
 *   identical signups yield exactly one success
 */
use axum::{Json, extract::State};
use mongodb::bson::to_document;
use serde_json::Value;

use crate::error::AppError;
use crate::repos::{InsertAck, StoreError};
use crate::state::AppState;

pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<InsertAck>, AppError> {
    let Some(email) = body.get("email").and_then(Value::as_str) else {
        return Err(AppError::bad_request("email is required"));
    };

    let user = to_document(&body).map_err(|_| AppError::bad_request("body must be an object"))?;

    match state.store.insert_user(user).await {
        Ok(ack) => {
            tracing::debug!(email, "user created");
            Ok(Json(ack))
        }
        Err(StoreError::Duplicate) => Err(AppError::conflict("user already exists")),
        Err(e) => Err(e.into()),
    }
}
