/*
 * Responsibility
 * - in-process `DealsStore` used by the test suite
 * - one mutex around all three collections, so the unique-email insert
 *   is atomic (same guarantee the unique index gives `MongoStore`)
 */
use std::cmp::Ordering;
use std::sync::Mutex;

use async_trait::async_trait;
use mongodb::bson::{Bson, Document, oid::ObjectId};

use crate::repos::error::StoreError;
use crate::repos::store::{DealsStore, DeleteAck, InsertAck, UpdateAck};

#[derive(Default)]
struct Collections {
    users: Vec<Document>,
    products: Vec<Document>,
    bids: Vec<Document>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Collections> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn ensure_id(doc: &mut Document) -> Bson {
    match doc.get("_id") {
        Some(id) => id.clone(),
        None => {
            let id = ObjectId::new();
            doc.insert("_id", id);
            Bson::ObjectId(id)
        }
    }
}

fn bson_as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(*n as f64),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        Bson::DateTime(dt) => Some(dt.timestamp_millis() as f64),
        _ => None,
    }
}

fn cmp_field(a: &Document, b: &Document, field: &str) -> Ordering {
    match (a.get(field), b.get(field)) {
        (Some(x), Some(y)) => match (bson_as_f64(x), bson_as_f64(y)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => match (x.as_str(), y.as_str()) {
                (Some(x), Some(y)) => x.cmp(y),
                _ => Ordering::Equal,
            },
        },
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

fn sorted_desc(docs: &[Document], field: &str) -> Vec<Document> {
    let mut out = docs.to_vec();
    out.sort_by(|a, b| cmp_field(b, a, field));
    out
}

fn delete_by_id(docs: &mut Vec<Document>, id: ObjectId) -> DeleteAck {
    let target = Bson::ObjectId(id);
    let before = docs.len();
    docs.retain(|d| d.get("_id") != Some(&target));
    DeleteAck {
        deleted_count: (before - docs.len()) as u64,
    }
}

#[async_trait]
impl DealsStore for MemoryStore {
    async fn insert_user(&self, mut user: Document) -> Result<InsertAck, StoreError> {
        let mut cols = self.lock();
        if let Some(email) = user.get("email")
            && cols.users.iter().any(|u| u.get("email") == Some(email))
        {
            return Err(StoreError::Duplicate);
        }
        let inserted_id = ensure_id(&mut user);
        cols.users.push(user);
        Ok(InsertAck {
            acknowledged: true,
            inserted_id,
        })
    }

    async fn products_by_price_min(&self) -> Result<Vec<Document>, StoreError> {
        Ok(sorted_desc(&self.lock().products, "price_min"))
    }

    async fn latest_products(&self, limit: i64) -> Result<Vec<Document>, StoreError> {
        let mut out = sorted_desc(&self.lock().products, "created_at");
        out.truncate(limit.max(0) as usize);
        Ok(out)
    }

    async fn product_by_id(&self, id: ObjectId) -> Result<Option<Document>, StoreError> {
        let target = Bson::ObjectId(id);
        Ok(self
            .lock()
            .products
            .iter()
            .find(|d| d.get("_id") == Some(&target))
            .cloned())
    }

    async fn insert_product(&self, mut product: Document) -> Result<InsertAck, StoreError> {
        let inserted_id = ensure_id(&mut product);
        self.lock().products.push(product);
        Ok(InsertAck {
            acknowledged: true,
            inserted_id,
        })
    }

    async fn update_product(
        &self,
        id: ObjectId,
        changes: Document,
    ) -> Result<UpdateAck, StoreError> {
        let target = Bson::ObjectId(id);
        let mut cols = self.lock();
        match cols
            .products
            .iter_mut()
            .find(|d| d.get("_id") == Some(&target))
        {
            Some(doc) => {
                let mut modified = 0;
                for (key, value) in changes {
                    if doc.get(&key) != Some(&value) {
                        modified = 1;
                    }
                    doc.insert(key, value);
                }
                Ok(UpdateAck {
                    matched_count: 1,
                    modified_count: modified,
                })
            }
            None => Ok(UpdateAck {
                matched_count: 0,
                modified_count: 0,
            }),
        }
    }

    async fn delete_product(&self, id: ObjectId) -> Result<DeleteAck, StoreError> {
        Ok(delete_by_id(&mut self.lock().products, id))
    }

    async fn bids_by_buyer(
        &self,
        buyer_email: Option<&str>,
    ) -> Result<Vec<Document>, StoreError> {
        let cols = self.lock();
        let out = cols
            .bids
            .iter()
            .filter(|d| match buyer_email {
                Some(email) => d.get("buyer_email").and_then(Bson::as_str) == Some(email),
                None => true,
            })
            .cloned()
            .collect();
        Ok(out)
    }

    async fn bids_by_product(&self, product_id: &str) -> Result<Vec<Document>, StoreError> {
        let cols = self.lock();
        let matching: Vec<Document> = cols
            .bids
            .iter()
            .filter(|d| d.get("product").and_then(Bson::as_str) == Some(product_id))
            .cloned()
            .collect();
        Ok(sorted_desc(&matching, "bid_price"))
    }

    async fn insert_bid(&self, mut bid: Document) -> Result<InsertAck, StoreError> {
        let inserted_id = ensure_id(&mut bid);
        self.lock().bids.push(bid);
        Ok(InsertAck {
            acknowledged: true,
            inserted_id,
        })
    }

    async fn delete_bid(&self, id: ObjectId) -> Result<DeleteAck, StoreError> {
        Ok(delete_by_id(&mut self.lock().bids, id))
    }
}
