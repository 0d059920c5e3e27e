/*
 * Responsibility
 * - `DealsStore` over the MongoDB driver
 * - one shared `Database` handle reused by every request
 * - `ensure_indexes` installs the unique email index the users insert
 *   relies on (run once at startup)
 */
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc, oid::ObjectId},
    options::IndexOptions,
};

use crate::repos::error::StoreError;
use crate::repos::store::{DealsStore, DeleteAck, InsertAck, UpdateAck};

pub struct MongoStore {
    users: Collection<Document>,
    products: Collection<Document>,
    bids: Collection<Document>,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self {
            users: db.collection("users"),
            products: db.collection("products"),
            bids: db.collection("bids"),
        }
    }

    /// Unique index on `users.email`. Duplicate inserts then fail at the
    /// store (E11000) instead of racing a separate existence check.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.users.create_index(index).await?;
        Ok(())
    }
}

#[async_trait]
impl DealsStore for MongoStore {
    async fn insert_user(&self, user: Document) -> Result<InsertAck, StoreError> {
        let result = self.users.insert_one(user).await?;
        Ok(InsertAck {
            acknowledged: true,
            inserted_id: result.inserted_id,
        })
    }

    async fn products_by_price_min(&self) -> Result<Vec<Document>, StoreError> {
        let cursor = self
            .products
            .find(doc! {})
            .sort(doc! { "price_min": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn latest_products(&self, limit: i64) -> Result<Vec<Document>, StoreError> {
        let cursor = self
            .products
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn product_by_id(&self, id: ObjectId) -> Result<Option<Document>, StoreError> {
        Ok(self.products.find_one(doc! { "_id": id }).await?)
    }

    async fn insert_product(&self, product: Document) -> Result<InsertAck, StoreError> {
        let result = self.products.insert_one(product).await?;
        Ok(InsertAck {
            acknowledged: true,
            inserted_id: result.inserted_id,
        })
    }

    async fn update_product(
        &self,
        id: ObjectId,
        changes: Document,
    ) -> Result<UpdateAck, StoreError> {
        let result = self
            .products
            .update_one(doc! { "_id": id }, doc! { "$set": changes })
            .await?;
        Ok(UpdateAck {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn delete_product(&self, id: ObjectId) -> Result<DeleteAck, StoreError> {
        let result = self.products.delete_one(doc! { "_id": id }).await?;
        Ok(DeleteAck {
            deleted_count: result.deleted_count,
        })
    }

    async fn bids_by_buyer(
        &self,
        buyer_email: Option<&str>,
    ) -> Result<Vec<Document>, StoreError> {
        let mut filter = doc! {};
        if let Some(email) = buyer_email {
            filter.insert("buyer_email", email);
        }
        let cursor = self.bids.find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn bids_by_product(&self, product_id: &str) -> Result<Vec<Document>, StoreError> {
        let cursor = self
            .bids
            .find(doc! { "product": product_id })
            .sort(doc! { "bid_price": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert_bid(&self, bid: Document) -> Result<InsertAck, StoreError> {
        let result = self.bids.insert_one(bid).await?;
        Ok(InsertAck {
            acknowledged: true,
            inserted_id: result.inserted_id,
        })
    }

    async fn delete_bid(&self, id: ObjectId) -> Result<DeleteAck, StoreError> {
        let result = self.bids.delete_one(doc! { "_id": id }).await?;
        Ok(DeleteAck {
            deleted_count: result.deleted_count,
        })
    }
}
