/*
 * Responsibility
 * - /bids handlers
 * - GET /bids is the one ownership-checked route: the email query
 *   parameter must equal the authenticated identity's email, else 403.
 *   An absent parameter also fails the comparison, so the only
 *   reachable query is the caller's own.
 * - create/delete are unauthenticated, as in the original surface
 */
use axum::{
    Json,
    extract::{Path, Query, State},
};
use mongodb::bson::{Document, oid::ObjectId, to_document};
use serde::Deserialize;
use serde_json::Value;

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::repos::{DeleteAck, InsertAck};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BidsQuery {
    pub email: Option<String>,
}

pub async fn list_bids(
    State(state): State<AppState>,
    ctx: AuthCtx,
    Query(query): Query<BidsQuery>,
) -> Result<Json<Vec<Document>>, AppError> {
    // Ownership check: the requested buyer must be the caller.
    if query.email.as_deref() != Some(ctx.email.as_str()) {
        return Err(AppError::Forbidden);
    }

    let bids = state.store.bids_by_buyer(query.email.as_deref()).await?;
    Ok(Json(bids))
}

/// Bearer-guarded, but not ownership-restricted: any authenticated
/// identity may view any product's bids.
pub async fn list_bids_for_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Vec<Document>>, AppError> {
    // Bids reference products by raw string id.
    let bids = state.store.bids_by_product(&product_id).await?;
    Ok(Json(bids))
}

pub async fn create_bid(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<InsertAck>, AppError> {
    let bid = to_document(&body).map_err(|_| AppError::bad_request("body must be an object"))?;
    Ok(Json(state.store.insert_bid(bid).await?))
}

pub async fn delete_bid(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteAck>, AppError> {
    let id = ObjectId::parse_str(&id).map_err(|_| AppError::bad_request("invalid id"))?;
    Ok(Json(state.store.delete_bid(id).await?))
}
