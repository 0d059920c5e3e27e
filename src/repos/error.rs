/*
 * Responsibility
 * - the meaning a store implementation reports upward
 * - `Duplicate` is the only classified failure (unique-email insert);
 *   everything else is an opaque backend error
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key")]
    Duplicate,
    #[error("store error: {0}")]
    Backend(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        use mongodb::error::{ErrorKind, WriteFailure};

        // E11000: unique index violation
        if let ErrorKind::Write(WriteFailure::WriteError(we)) = e.kind.as_ref()
            && we.code == 11000
        {
            return StoreError::Duplicate;
        }
        StoreError::Backend(e.to_string())
    }
}
