//! Reactive invoice list backed by a live query
//!
//! The list never mutates its collection in place: a background task drives
//! the [`SnapshotStream`] and replaces the whole collection on every push.
//! The subscription lives exactly as long as the list store; dropping the
//! store aborts the task, which drops the stream and releases the
//! subscription exactly once.

use crate::schema::invoice::Invoice;
use crate::store::live::{Snapshot, SnapshotStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;

/// Whether the live query behind the list is still running
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// Snapshots are flowing
    Live,
    /// The stream ended cleanly (store shut down)
    Ended,
    /// The stream failed; the collection shows the last good snapshot
    Failed(String),
}

/// The displayed collection plus its sync status
#[derive(Debug, Clone, PartialEq)]
pub struct ListState {
    pub snapshot: Snapshot<Invoice>,
    pub sync: SyncStatus,
}

impl ListState {
    fn initial() -> Self {
        Self {
            snapshot: Snapshot::empty(),
            sync: SyncStatus::Live,
        }
    }
}

/// Ordered invoice collection kept consistent with the store
pub struct InvoiceListStore {
    state: watch::Receiver<ListState>,
    task: JoinHandle<()>,
}

impl InvoiceListStore {
    /// Spawn the background task driving `stream` into the list
    pub fn spawn(mut stream: SnapshotStream<Invoice>) -> Self {
        let (tx, rx) = watch::channel(ListState::initial());

        let task = tokio::spawn(async move {
            loop {
                match stream.next().await {
                    Ok(Some(snapshot)) => {
                        let state = ListState {
                            snapshot,
                            sync: SyncStatus::Live,
                        };
                        if tx.send(state).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        tx.send_modify(|state| state.sync = SyncStatus::Ended);
                        break;
                    }
                    Err(e) => {
                        // Sync failures are surfaced, never swallowed
                        tracing::warn!(error = %e, "live query failed");
                        tx.send_modify(|state| {
                            state.sync = SyncStatus::Failed(e.to_string())
                        });
                        break;
                    }
                }
            }
        });

        Self { state: rx, task }
    }

    /// The currently displayed collection (the latest snapshot's item list)
    pub fn items(&self) -> Vec<Invoice> {
        self.state.borrow().snapshot.items.clone()
    }

    /// The current state including sync status
    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    /// Wait until the displayed collection is replaced
    ///
    /// Returns `false` once no further replacement can happen.
    pub async fn changed(&mut self) -> bool {
        self.state.changed().await.is_ok()
    }

    /// All state replacements as a stream, starting from the current state
    pub fn updates(&self) -> WatchStream<ListState> {
        WatchStream::new(self.state.clone())
    }
}

impl Drop for InvoiceListStore {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::invoice::InvoiceDraft;
    use crate::store::RecordStore;
    use crate::store::memory::InMemoryRecordStore;
    use chrono::NaiveDate;
    use uuid::Uuid;

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
    async fn test_list_mirrors_snapshots() {
        let store = InMemoryRecordStore::<Invoice>::default();
        let owner = Uuid::new_v4();

        let mut list = InvoiceListStore::spawn(store.observe_query(owner));
        assert!(list.changed().await); // initial snapshot
        assert!(list.items().is_empty());

        store
            .create(Invoice::from_draft(owner, draft("Acme")))
            .await
            .unwrap();
        assert!(list.changed().await);

        let items = list.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].customer_name, "Acme");
        assert_eq!(list.state().sync, SyncStatus::Live);
    }

    #[tokio::test]
    async fn test_deletion_only_shows_after_snapshot() {
        let store = InMemoryRecordStore::<Invoice>::default();
        let owner = Uuid::new_v4();

        let created = store
            .create(Invoice::from_draft(owner, draft("Acme")))
            .await
            .unwrap();

        let mut list = InvoiceListStore::spawn(store.observe_query(owner));
        assert!(list.changed().await);
        assert_eq!(list.items().len(), 1);

        // The displayed collection is untouched until the next push
        store.delete(owner, &created.id).await.unwrap();
        assert!(list.changed().await);
        assert!(list.items().is_empty());
    }

    #[tokio::test]
    async fn test_collection_is_replaced_not_merged() {
        let store = InMemoryRecordStore::<Invoice>::default();
        let owner = Uuid::new_v4();

        let mut list = InvoiceListStore::spawn(store.observe_query(owner));
        assert!(list.changed().await);

        for name in ["First", "Second"] {
            store
                .create(Invoice::from_draft(owner, draft(name)))
                .await
                .unwrap();
            assert!(list.changed().await);
        }

        let state = list.state();
        let listed = store.list_owned(owner).await.unwrap();
        assert_eq!(state.snapshot.items, listed);
    }

    #[tokio::test]
    async fn test_stream_failure_is_surfaced_and_keeps_last_snapshot() {
        use crate::core::events::ChangeEvent;

        let store = InMemoryRecordStore::<Invoice>::default();
        let owner = Uuid::new_v4();

        store
            .create(Invoice::from_draft(owner, draft("Acme")))
            .await
            .unwrap();

        let mut list = InvoiceListStore::spawn(store.observe_query(owner));
        assert!(list.changed().await);
        assert_eq!(list.items().len(), 1);

        store.poison();
        // Wake the live query; the re-listing behind the snapshot now fails
        store.bus().publish(ChangeEvent::Created {
            record_type: "invoice".to_string(),
            record_id: Uuid::new_v4(),
            owner_id: owner,
        });
        assert!(list.changed().await);

        let state = list.state();
        assert!(matches!(state.sync, SyncStatus::Failed(_)));
        // The last good snapshot stays on display
        assert_eq!(state.snapshot.items.len(), 1);
        assert_eq!(state.snapshot.items[0].customer_name, "Acme");
    }

    #[tokio::test]
    async fn test_drop_releases_the_subscription() {
        let store = InMemoryRecordStore::<Invoice>::default();
        let owner = Uuid::new_v4();

        let list = InvoiceListStore::spawn(store.observe_query(owner));
        // The spawned task plus its stream hold one bus subscription
        tokio::task::yield_now().await;
        assert_eq!(store.bus().receiver_count(), 1);

        drop(list);
        for _ in 0..50 {
            if store.bus().receiver_count() == 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(store.bus().receiver_count(), 0);
    }
}
