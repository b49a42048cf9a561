//! The authenticated shell
//!
//! [`Shell`] is the entry point for interactive use; the only way to reach
//! the invoice form and list is [`Shell::sign_in`], so an unauthenticated
//! caller can never observe invoice data. [`AuthenticatedShell`] wires the
//! record-level actions (edit, delete, sign out) to the form controller and
//! the reactive list.

use crate::app::form::FormController;
use crate::app::list_store::InvoiceListStore;
use crate::auth::provider::UserPool;
use crate::client::DataClient;
use crate::core::error::{AppResult, RecordError};
use crate::schema::invoice::Invoice;
use crate::store::memory::InMemoryRecordStore;
use std::sync::Arc;
use uuid::Uuid;

/// A viewport effect the presentation layer should perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEffect {
    /// Bring the (now pre-populated) form into view
    ScrollToTop,
}

/// The sign-in gate in front of the invoice UI
pub struct Shell {
    pool: Arc<UserPool>,
    invoices: InMemoryRecordStore<Invoice>,
}

impl Shell {
    pub fn new(pool: Arc<UserPool>, invoices: InMemoryRecordStore<Invoice>) -> Self {
        Self { pool, invoices }
    }

    /// Sign in and enter the invoice UI
    ///
    /// This is the only constructor for [`AuthenticatedShell`]; failing
    /// authentication means the invoice form and list stay unreachable.
    pub fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthenticatedShell> {
        let session = self.pool.sign_in(email, password)?;
        let client = DataClient::new(
            self.pool.sessions().clone(),
            self.invoices.clone(),
            session.token,
        );
        let list = InvoiceListStore::spawn(client.observe_invoices()?);

        Ok(AuthenticatedShell {
            pool: self.pool.clone(),
            form: FormController::new(client.clone()),
            client,
            list,
        })
    }
}

/// The invoice UI for one signed-in user
pub struct AuthenticatedShell {
    pool: Arc<UserPool>,
    client: DataClient,
    form: FormController,
    list: InvoiceListStore,
}

impl AuthenticatedShell {
    /// The form controller
    pub fn form(&mut self) -> &mut FormController {
        &mut self.form
    }

    /// The currently displayed invoice collection
    pub fn invoices(&self) -> Vec<Invoice> {
        self.list.items()
    }

    /// Wait for the displayed collection to be replaced by the next snapshot
    pub async fn refreshed(&mut self) -> bool {
        self.list.changed().await
    }

    /// The reactive list itself
    pub fn list(&self) -> &InvoiceListStore {
        &self.list
    }

    /// Load a displayed record into the form for editing
    ///
    /// Returns the viewport effect so the presentation layer can scroll the
    /// pre-populated form into view.
    pub fn edit(&mut self, id: Uuid) -> AppResult<ViewEffect> {
        let invoice = self
            .list
            .items()
            .into_iter()
            .find(|invoice| invoice.id == id)
            .ok_or_else(|| RecordError::NotFound {
                record_type: "invoice".to_string(),
                id,
            })?;

        self.form.begin_edit(invoice);
        Ok(ViewEffect::ScrollToTop)
    }

    /// Delete a record by id
    ///
    /// No confirmation step and no local removal; the displayed collection
    /// changes only when the next snapshot arrives.
    pub async fn delete(&mut self, id: Uuid) -> AppResult<()> {
        self.client.delete_invoice(id).await
    }

    /// Terminate the session and leave the invoice UI
    ///
    /// Consumes the shell: the list subscription is dropped and the session
    /// token stops resolving.
    pub fn sign_out(self) -> AppResult<()> {
        self.pool.sign_out(self.client.token())
    }
}
