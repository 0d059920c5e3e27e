/*
 * Responsibility
 * - store seam public interface (re-export)
 */
pub mod error;
pub mod memory;
pub mod mongo;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use store::{DealsStore, DeleteAck, InsertAck, UpdateAck};
