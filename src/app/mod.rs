//! Application layer: the reactive list, the form, and the shell
//!
//! This layer reproduces the interactive side of the invoice tracker:
//! a list that mirrors the live query, a form that creates or updates
//! depending on its edit mode, and an authenticated shell wiring the two to
//! record-level actions. None of it touches the store directly; everything
//! goes through a session-bound [`DataClient`](crate::client::DataClient).

pub mod form;
pub mod list_store;
pub mod shell;

pub use form::{FormController, FormFields, FormMode, SubmitOutcome};
pub use list_store::{InvoiceListStore, ListState, SyncStatus};
pub use shell::{AuthenticatedShell, Shell, ViewEffect};
