//! In-memory implementation of RecordStore
//!
//! Backs the service in development and tests. Uses a `std::sync::RwLock`
//! around a `HashMap`; the lock is held only for the map operation itself,
//! never across an await point or an event publish.
//!
//! Every successful mutation publishes a [`ChangeEvent`] on the shared
//! [`EventBus`], which is what drives live-query snapshot streams.

use crate::core::error::{AppResult, RecordError, StorageError};
use crate::core::events::{ChangeEvent, EventBus};
use crate::core::record::Record;
use crate::store::RecordStore;
use crate::store::live::SnapshotStream;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

struct Entry<T> {
    record: T,
    /// Insertion sequence, defines listing order
    seq: u64,
}

/// In-memory record store
///
/// Cheap to clone; all clones share the same backing map and event bus.
#[derive(Clone)]
pub struct InMemoryRecordStore<T: Record> {
    records: Arc<RwLock<HashMap<Uuid, Entry<T>>>>,
    next_seq: Arc<AtomicU64>,
    bus: EventBus,
}

impl<T: Record> InMemoryRecordStore<T> {
    /// Create a new store publishing changes on `bus`
    pub fn new(bus: EventBus) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            next_seq: Arc::new(AtomicU64::new(0)),
            bus,
        }
    }

    /// Open a live query over all records owned by `owner`
    ///
    /// The returned stream yields the current collection immediately, then a
    /// fresh full snapshot after every mutation affecting that owner.
    /// Dropping the stream cancels the subscription.
    pub fn observe_query(&self, owner: Uuid) -> SnapshotStream<T> {
        SnapshotStream::new(self.clone(), self.bus.subscribe(), owner)
    }

    /// The event bus this store publishes on
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    fn not_found(id: &Uuid) -> RecordError {
        RecordError::NotFound {
            record_type: T::record_type().to_string(),
            id: *id,
        }
    }
}

#[cfg(test)]
impl<T: Record> InMemoryRecordStore<T> {
    /// Poison the backing lock so every subsequent operation fails
    pub(crate) fn poison(&self) {
        let records = self.records.clone();
        let _ = std::thread::spawn(move || {
            let _guard = records.write().unwrap();
            panic!("poisoning record store lock");
        })
        .join();
    }
}

impl<T: Record> Default for InMemoryRecordStore<T> {
    fn default() -> Self {
        Self::new(EventBus::default())
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for InMemoryRecordStore<T> {
    async fn create(&self, record: T) -> AppResult<T> {
        {
            let mut records = self.records.write().map_err(|e| {
                StorageError::LockPoisoned {
                    message: e.to_string(),
                }
            })?;
            let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
            records.insert(
                record.id(),
                Entry {
                    record: record.clone(),
                    seq,
                },
            );
        }

        tracing::debug!(
            record_type = T::record_type(),
            record_id = %record.id(),
            "record created"
        );
        self.bus.publish(ChangeEvent::Created {
            record_type: T::record_type().to_string(),
            record_id: record.id(),
            owner_id: record.owner_id(),
        });

        Ok(record)
    }

    async fn get(&self, owner: Uuid, id: &Uuid) -> AppResult<Option<T>> {
        let records = self.records.read().map_err(|e| {
            StorageError::LockPoisoned {
                message: e.to_string(),
            }
        })?;

        Ok(records
            .get(id)
            .filter(|entry| entry.record.is_owned_by(owner))
            .map(|entry| entry.record.clone()))
    }

    async fn list_owned(&self, owner: Uuid) -> AppResult<Vec<T>> {
        let records = self.records.read().map_err(|e| {
            StorageError::LockPoisoned {
                message: e.to_string(),
            }
        })?;

        let mut owned: Vec<(u64, T)> = records
            .values()
            .filter(|entry| entry.record.is_owned_by(owner))
            .map(|entry| (entry.seq, entry.record.clone()))
            .collect();
        owned.sort_by_key(|(seq, _)| *seq);

        Ok(owned.into_iter().map(|(_, record)| record).collect())
    }

    async fn update(&self, owner: Uuid, record: T) -> AppResult<T> {
        let id = record.id();
        {
            let mut records = self.records.write().map_err(|e| {
                StorageError::LockPoisoned {
                    message: e.to_string(),
                }
            })?;

            let entry = records
                .get_mut(&id)
                .filter(|entry| entry.record.is_owned_by(owner))
                .ok_or_else(|| Self::not_found(&id))?;
            // Ownership of a record never changes through an update
            if record.owner_id() != entry.record.owner_id() {
                return Err(StorageError::IntegrityError {
                    message: format!("update would change owner of {} '{}'", T::record_type(), id),
                }
                .into());
            }
            entry.record = record.clone();
        }

        tracing::debug!(
            record_type = T::record_type(),
            record_id = %id,
            "record updated"
        );
        self.bus.publish(ChangeEvent::Updated {
            record_type: T::record_type().to_string(),
            record_id: id,
            owner_id: record.owner_id(),
        });

        Ok(record)
    }

    async fn delete(&self, owner: Uuid, id: &Uuid) -> AppResult<()> {
        {
            let mut records = self.records.write().map_err(|e| {
                StorageError::LockPoisoned {
                    message: e.to_string(),
                }
            })?;

            let owned = records
                .get(id)
                .map(|entry| entry.record.is_owned_by(owner))
                .unwrap_or(false);
            if !owned {
                return Err(Self::not_found(id).into());
            }
            records.remove(id);
        }

        tracing::debug!(
            record_type = T::record_type(),
            record_id = %id,
            "record deleted"
        );
        self.bus.publish(ChangeEvent::Deleted {
            record_type: T::record_type().to_string(),
            record_id: *id,
            owner_id: owner,
        });

        Ok(())
    }
}
