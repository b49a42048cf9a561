//! Record trait defining the shared shape of schema-declared models
//!
//! All records are owned: the identity that created a record is the only one
//! allowed to read or mutate it. The store and the live-query layer rely on
//! this trait to stay generic over the declared models.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Base trait for all schema-declared record types.
///
/// Every record has:
/// - id: unique identifier, assigned by the store on creation
/// - owner_id: the user who created the record
/// - created_at: creation timestamp
/// - updated_at: last modification timestamp
pub trait Record: Clone + Send + Sync + 'static {
    /// The singular record type name used in events and errors (e.g. "invoice")
    fn record_type() -> &'static str;

    /// The plural resource name used in URLs (e.g. "invoices")
    fn resource_name() -> &'static str;

    /// Get the unique identifier for this record
    fn id(&self) -> Uuid;

    /// Get the owner of this record
    fn owner_id(&self) -> Uuid;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;

    /// Get the last update timestamp
    fn updated_at(&self) -> DateTime<Utc>;

    /// Check whether the given user owns this record
    fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id() == user_id
    }
}
