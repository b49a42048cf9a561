//! Session-bound data client
//!
//! The typed facade the application layer talks to, bound to the schema and
//! to one session token. Every call authenticates first: the token is
//! resolved to its owning user, and the resulting owner id scopes the store
//! operation. A revoked or unknown token fails the call with an auth error
//! instead of silently operating on stale identity.

use crate::auth::session::{SessionStore, SessionToken};
use crate::core::error::{AppResult, RecordError};
use crate::schema::invoice::{Invoice, InvoiceDraft};
use crate::store::live::SnapshotStream;
use crate::store::memory::InMemoryRecordStore;
use crate::store::RecordStore;
use uuid::Uuid;

/// Typed client over the declared schema, authenticated per call
#[derive(Clone)]
pub struct DataClient {
    sessions: SessionStore,
    invoices: InMemoryRecordStore<Invoice>,
    token: SessionToken,
}

impl DataClient {
    pub fn new(
        sessions: SessionStore,
        invoices: InMemoryRecordStore<Invoice>,
        token: SessionToken,
    ) -> Self {
        Self {
            sessions,
            invoices,
            token,
        }
    }

    /// The token this client authenticates with
    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    fn owner(&self) -> AppResult<Uuid> {
        self.sessions.resolve(&self.token)
    }

    /// Create an invoice from a validated draft
    pub async fn create_invoice(&self, draft: InvoiceDraft) -> AppResult<Invoice> {
        draft.check()?;
        let owner = self.owner()?;
        self.invoices.create(Invoice::from_draft(owner, draft)).await
    }

    /// Update the invoice with `id`, replacing its fields with the draft
    pub async fn update_invoice(&self, id: Uuid, draft: InvoiceDraft) -> AppResult<Invoice> {
        draft.check()?;
        let owner = self.owner()?;

        let mut invoice = self.invoices.get(owner, &id).await?.ok_or_else(|| {
            RecordError::NotFound {
                record_type: "invoice".to_string(),
                id,
            }
        })?;
        invoice.apply_draft(draft);
        self.invoices.update(owner, invoice).await
    }

    /// Delete the invoice with `id`
    pub async fn delete_invoice(&self, id: Uuid) -> AppResult<()> {
        let owner = self.owner()?;
        self.invoices.delete(owner, &id).await
    }

    /// One-shot listing of the caller's invoices
    pub async fn list_invoices(&self) -> AppResult<Vec<Invoice>> {
        let owner = self.owner()?;
        self.invoices.list_owned(owner).await
    }

    /// Open a continuous query over the caller's invoices
    pub fn observe_invoices(&self) -> AppResult<SnapshotStream<Invoice>> {
        let owner = self.owner()?;
        Ok(self.invoices.observe_query(owner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draft(total: f64) -> InvoiceDraft {
        InvoiceDraft {
            customer_name: "Acme".to_string(),
            customer_address: "1 Main St".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            invoice_no: "INV-001".to_string(),
            description: "Consulting".to_string(),
            invoice_total: total,
        }
    }

    fn client() -> DataClient {
        let sessions = SessionStore::new();
        let session = sessions.issue(Uuid::new_v4()).unwrap();
        DataClient::new(sessions, InMemoryRecordStore::default(), session.token)
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let client = client();
        let created = client.create_invoice(draft(250.0)).await.unwrap();

        let invoices = client.list_invoices().await.unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].id, created.id);
        assert_eq!(invoices[0].invoice_total, 250.0);
    }

    #[tokio::test]
    async fn test_update_keeps_identity() {
        let client = client();
        let created = client.create_invoice(draft(100.0)).await.unwrap();

        let updated = client
            .update_invoice(created.id, draft(300.0))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.invoice_total, 300.0);
    }

    #[tokio::test]
    async fn test_update_missing_invoice_is_not_found() {
        let client = client();
        let err = client
            .update_invoice(Uuid::new_v4(), draft(100.0))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "RECORD_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_the_store() {
        let client = client();
        assert!(client.create_invoice(draft(f64::NAN)).await.is_err());
        assert!(client.list_invoices().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_revoked_session_fails_every_call() {
        let sessions = SessionStore::new();
        let session = sessions.issue(Uuid::new_v4()).unwrap();
        let client = DataClient::new(
            sessions.clone(),
            InMemoryRecordStore::default(),
            session.token.clone(),
        );

        sessions.revoke(&session.token).unwrap();

        assert!(client.create_invoice(draft(250.0)).await.is_err());
        assert!(client.list_invoices().await.is_err());
        assert!(client.observe_invoices().is_err());
    }

    #[tokio::test]
    async fn test_clients_are_owner_isolated() {
        let sessions = SessionStore::new();
        let invoices = InMemoryRecordStore::default();

        let alice = DataClient::new(
            sessions.clone(),
            invoices.clone(),
            sessions.issue(Uuid::new_v4()).unwrap().token,
        );
        let bob = DataClient::new(
            sessions.clone(),
            invoices.clone(),
            sessions.issue(Uuid::new_v4()).unwrap().token,
        );

        let created = alice.create_invoice(draft(250.0)).await.unwrap();

        assert!(bob.list_invoices().await.unwrap().is_empty());
        assert!(bob.delete_invoice(created.id).await.is_err());
        assert_eq!(alice.list_invoices().await.unwrap().len(), 1);
    }
}
