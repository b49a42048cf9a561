//! Live queries: streams of full-collection snapshots
//!
//! A [`SnapshotStream`] is the inbound half of the subscribe-and-replace
//! pattern: consumers never patch their local collection, they replace it
//! wholesale with each [`Snapshot`]. The stream is decoupled from any UI
//! lifecycle; whoever owns it decides when it ends, and dropping it releases
//! the underlying subscription exactly once.
//!
//! Snapshots are rebuilt from the store on every relevant change event, so a
//! lagged event receiver is not a failure mode: missing N events and then
//! re-listing produces the same authoritative snapshot.

use crate::core::error::AppResult;
use crate::core::record::Record;
use crate::store::RecordStore;
use crate::store::memory::InMemoryRecordStore;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

/// An immutable full-collection snapshot
///
/// `seq` increases by one per snapshot yielded by a stream, so consumers can
/// tell replacements apart even when the item list is unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    pub seq: u64,
    pub items: Vec<T>,
}

impl<T> Snapshot<T> {
    /// An empty snapshot, used as the initial state before the first push
    pub fn empty() -> Self {
        Self {
            seq: 0,
            items: Vec::new(),
        }
    }
}

/// A continuous query over all records visible to one owner
///
/// Obtained from [`InMemoryRecordStore::observe_query`]. The first call to
/// [`next`](Self::next) yields the current collection; each later call waits
/// for a mutation affecting this owner's records and yields a fresh listing.
pub struct SnapshotStream<T: Record> {
    store: InMemoryRecordStore<T>,
    rx: broadcast::Receiver<crate::core::events::EventEnvelope>,
    owner: Uuid,
    seq: u64,
    primed: bool,
}

impl<T: Record> SnapshotStream<T> {
    pub(crate) fn new(
        store: InMemoryRecordStore<T>,
        rx: broadcast::Receiver<crate::core::events::EventEnvelope>,
        owner: Uuid,
    ) -> Self {
        Self {
            store,
            rx,
            owner,
            seq: 0,
            primed: false,
        }
    }

    /// The owner this query is scoped to
    pub fn owner(&self) -> Uuid {
        self.owner
    }

    /// Wait for the next snapshot
    ///
    /// Returns `Ok(None)` when the store side of the bus has shut down, and
    /// `Err` when listing the store fails; sync failures are never silent.
    pub async fn next(&mut self) -> AppResult<Option<Snapshot<T>>> {
        if !self.primed {
            self.primed = true;
            return self.capture().await.map(Some);
        }

        loop {
            match self.rx.recv().await {
                Ok(envelope) => {
                    let event = &envelope.event;
                    if event.record_type() != T::record_type() || event.owner_id() != self.owner {
                        continue;
                    }
                    return self.capture().await.map(Some);
                }
                // Missed events are fine, the re-listing is authoritative
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(
                        owner = %self.owner,
                        skipped,
                        "snapshot stream lagged, re-listing"
                    );
                    return self.capture().await.map(Some);
                }
                Err(RecvError::Closed) => return Ok(None),
            }
        }
    }

    async fn capture(&mut self) -> AppResult<Snapshot<T>> {
        let items = self.store.list_owned(self.owner).await?;
        self.seq += 1;
        Ok(Snapshot {
            seq: self.seq,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::invoice::{Invoice, InvoiceDraft};
    use chrono::NaiveDate;

    fn draft(customer: &str) -> InvoiceDraft {
        InvoiceDraft {
            customer_name: customer.to_string(),
            customer_address: "1 Main St".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            invoice_no: "INV-001".to_string(),
            description: "Consulting".to_string(),
            invoice_total: 250.0,
        }
    }

    #[tokio::test]
    async fn test_first_snapshot_is_immediate() {
        let store = InMemoryRecordStore::<Invoice>::default();
        let owner = Uuid::new_v4();
        store
            .create(Invoice::from_draft(owner, draft("Acme")))
            .await
            .unwrap();

        let mut stream = store.observe_query(owner);
        let snapshot = stream.next().await.unwrap().unwrap();
        assert_eq!(snapshot.seq, 1);
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].customer_name, "Acme");
    }

    #[tokio::test]
    async fn test_snapshot_follows_mutations() {
        let store = InMemoryRecordStore::<Invoice>::default();
        let owner = Uuid::new_v4();

        let mut stream = store.observe_query(owner);
        let initial = stream.next().await.unwrap().unwrap();
        assert!(initial.items.is_empty());

        let created = store
            .create(Invoice::from_draft(owner, draft("Acme")))
            .await
            .unwrap();
        let after_create = stream.next().await.unwrap().unwrap();
        assert_eq!(after_create.items.len(), 1);

        store.delete(owner, &created.id).await.unwrap();
        let after_delete = stream.next().await.unwrap().unwrap();
        assert!(after_delete.items.is_empty());
        assert_eq!(after_delete.seq, 3);
    }

    #[tokio::test]
    async fn test_other_owners_changes_are_skipped() {
        let store = InMemoryRecordStore::<Invoice>::default();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let mut stream = store.observe_query(alice);
        stream.next().await.unwrap().unwrap(); // initial

        // Bob's mutation must not produce a snapshot for Alice
        store
            .create(Invoice::from_draft(bob, draft("Bob's")))
            .await
            .unwrap();
        store
            .create(Invoice::from_draft(alice, draft("Alice's")))
            .await
            .unwrap();

        let snapshot = stream.next().await.unwrap().unwrap();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].customer_name, "Alice's");
    }

    #[tokio::test]
    async fn test_snapshot_is_full_replacement_not_a_diff() {
        let store = InMemoryRecordStore::<Invoice>::default();
        let owner = Uuid::new_v4();

        store
            .create(Invoice::from_draft(owner, draft("First")))
            .await
            .unwrap();
        store
            .create(Invoice::from_draft(owner, draft("Second")))
            .await
            .unwrap();

        let mut stream = store.observe_query(owner);
        stream.next().await.unwrap().unwrap();

        store
            .create(Invoice::from_draft(owner, draft("Third")))
            .await
            .unwrap();
        let snapshot = stream.next().await.unwrap().unwrap();

        // Each snapshot carries the whole collection
        let names: Vec<_> = snapshot
            .items
            .iter()
            .map(|i| i.customer_name.as_str())
            .collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_listing_failure_is_an_error_not_silence() {
        use crate::core::events::ChangeEvent;

        let store = InMemoryRecordStore::<Invoice>::default();
        let owner = Uuid::new_v4();

        let mut stream = store.observe_query(owner);
        stream.next().await.unwrap().unwrap(); // initial

        store.poison();
        // Wake the stream; the re-listing behind the snapshot now fails
        store.bus().publish(ChangeEvent::Created {
            record_type: "invoice".to_string(),
            record_id: Uuid::new_v4(),
            owner_id: owner,
        });

        let err = stream.next().await.unwrap_err();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
    }

    #[tokio::test]
    async fn test_first_snapshot_failure_is_an_error() {
        let store = InMemoryRecordStore::<Invoice>::default();
        store.poison();

        let mut stream = store.observe_query(Uuid::new_v4());
        assert!(stream.next().await.is_err());
    }

    #[tokio::test]
    async fn test_lagged_stream_recovers_with_full_snapshot() {
        use crate::core::events::EventBus;

        // Capacity 1 guarantees the receiver lags behind a mutation burst
        let store = InMemoryRecordStore::<Invoice>::new(EventBus::new(1));
        let owner = Uuid::new_v4();

        let mut stream = store.observe_query(owner);
        stream.next().await.unwrap().unwrap(); // initial

        for name in ["First", "Second", "Third"] {
            store
                .create(Invoice::from_draft(owner, draft(name)))
                .await
                .unwrap();
        }

        // The missed events do not matter: the next snapshot is authoritative
        let snapshot = stream.next().await.unwrap().unwrap();
        assert_eq!(snapshot.items.len(), 3);
    }
}
