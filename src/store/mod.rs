//! Owner-scoped record storage and live queries

pub mod live;
pub mod memory;

pub use live::{Snapshot, SnapshotStream};
pub use memory::InMemoryRecordStore;

use crate::core::error::AppResult;
use crate::core::record::Record;
use async_trait::async_trait;
use uuid::Uuid;

/// Service trait for owner-scoped record storage
///
/// Every operation takes the calling user's id and enforces the owner-only
/// rule: records belonging to another user behave as if they did not exist.
/// Implementations are agnostic to the record type.
#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    /// Persist a new record
    async fn create(&self, record: T) -> AppResult<T>;

    /// Get a record by ID, if it exists and is owned by `owner`
    async fn get(&self, owner: Uuid, id: &Uuid) -> AppResult<Option<T>>;

    /// List all records owned by `owner`, in creation order
    async fn list_owned(&self, owner: Uuid) -> AppResult<Vec<T>>;

    /// Replace an existing record owned by `owner`
    ///
    /// Fails with a not-found error when the record is missing or owned by
    /// someone else.
    async fn update(&self, owner: Uuid, record: T) -> AppResult<T>;

    /// Delete a record owned by `owner`
    ///
    /// Fails with a not-found error when the record is missing or owned by
    /// someone else.
    async fn delete(&self, owner: Uuid, id: &Uuid) -> AppResult<()>;
}
