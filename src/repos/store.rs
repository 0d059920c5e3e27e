/*
 * Responsibility
 * - `DealsStore`: the document-store capability the handlers depend on
 * - ack types mirroring the driver result shapes the wire format exposes
 *
 * The trait is the substitution point: `MongoStore` in production,
 * `MemoryStore` in the test suite. Handlers never see a driver type
 * beyond `Document` / `ObjectId`.
 */
use async_trait::async_trait;
use mongodb::bson::{Bson, Document, oid::ObjectId};
use serde::Serialize;

use crate::repos::error::StoreError;

/// Insert acknowledgment (`{acknowledged, insertedId}` on the wire).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    pub inserted_id: Bson,
}

/// Update acknowledgment (`{matchedCount, modifiedCount}` on the wire).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Delete acknowledgment. Deleting a nonexistent id is success with
/// `deletedCount: 0`, not an error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub deleted_count: u64,
}

#[async_trait]
pub trait DealsStore: Send + Sync {
    /// Insert a user. The store enforces email uniqueness natively and
    /// reports `StoreError::Duplicate` (no check-then-insert race).
    async fn insert_user(&self, user: Document) -> Result<InsertAck, StoreError>;

    /// All products, `price_min` descending.
    async fn products_by_price_min(&self) -> Result<Vec<Document>, StoreError>;

    /// The `limit` most recent products, `created_at` descending.
    async fn latest_products(&self, limit: i64) -> Result<Vec<Document>, StoreError>;

    async fn product_by_id(&self, id: ObjectId) -> Result<Option<Document>, StoreError>;

    async fn insert_product(&self, product: Document) -> Result<InsertAck, StoreError>;

    /// Apply `changes` as a field-level update. Callers restrict the
    /// change set; the store applies it verbatim.
    async fn update_product(
        &self,
        id: ObjectId,
        changes: Document,
    ) -> Result<UpdateAck, StoreError>;

    async fn delete_product(&self, id: ObjectId) -> Result<DeleteAck, StoreError>;

    /// Bids filtered by `buyer_email` when given, unfiltered otherwise.
    async fn bids_by_buyer(&self, buyer_email: Option<&str>)
    -> Result<Vec<Document>, StoreError>;

    /// Bids referencing a product (raw string reference), `bid_price`
    /// descending.
    async fn bids_by_product(&self, product_id: &str) -> Result<Vec<Document>, StoreError>;

    async fn insert_bid(&self, bid: Document) -> Result<InsertAck, StoreError>;

    async fn delete_bid(&self, id: ObjectId) -> Result<DeleteAck, StoreError>;
}
