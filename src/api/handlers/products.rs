/*
 * Responsibility
 * - /products CRUD handlers
 * - path ids are parsed to ObjectId at this boundary, uniformly, so
 *   the store only ever sees the native identifier type
 * - PATCH applies exactly `name` and `price`; extra body fields are
 *   ignored even if present
 */
use axum::{
    Json,
    extract::{Path, State},
};
use mongodb::bson::{Bson, Document, doc, oid::ObjectId, to_document};
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::repos::{DeleteAck, InsertAck, UpdateAck};
use crate::state::AppState;

const LATEST_PRODUCTS_LIMIT: i64 = 6;

fn parse_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::bad_request("invalid id"))
}

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, AppError> {
    Ok(Json(state.store.products_by_price_min().await?))
}

pub async fn latest_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, AppError> {
    Ok(Json(state.store.latest_products(LATEST_PRODUCTS_LIMIT).await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Document>>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.store.product_by_id(id).await?))
}

/// Bearer-guarded: only authenticated submitters create products. The
/// body is inserted verbatim; the store is the only schema.
pub async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<InsertAck>, AppError> {
    let product =
        to_document(&body).map_err(|_| AppError::bad_request("body must be an object"))?;
    Ok(Json(state.store.insert_product(product).await?))
}

/// Only these two fields are writable; anything else in the body is
/// dropped here.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<Bson>,
    pub price: Option<Bson>,
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<UpdateAck>, AppError> {
    let id = parse_id(&id)?;

    let mut changes = doc! {};
    if let Some(name) = req.name {
        changes.insert("name", name);
    }
    if let Some(price) = req.price {
        changes.insert("price", price);
    }
    if changes.is_empty() {
        return Err(AppError::bad_request("nothing to update"));
    }

    Ok(Json(state.store.update_product(id, changes).await?))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteAck>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.store.delete_product(id).await?))
}
