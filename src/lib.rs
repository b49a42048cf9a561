//! # Billtrack
//!
//! An owner-scoped invoice tracking service with live-query snapshots.
//!
//! ## Features
//!
//! - **Declared Schema**: Invoice and Expense record types with an
//!   owner-only authorization rule enforced on every operation
//! - **Live Queries**: continuous queries push full-collection snapshots;
//!   consumers replace, never merge
//! - **Email/Password Auth**: code-verified sign-up, bcrypt-hashed
//!   credentials, opaque session tokens
//! - **Session-Bound Client**: a typed data client that authenticates every
//!   call against the session store
//! - **Reactive Application Layer**: list store, edit-mode form controller,
//!   and an authenticated shell that gates all invoice UI behind sign-in
//! - **HTTP + WebSocket Surface**: axum routes for auth and invoice CRUD,
//!   plus a snapshot-streaming WebSocket endpoint
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use billtrack::prelude::*;
//! use std::sync::Arc;
//!
//! let config = AppConfig::default();
//! let state = AppState::new(&config, Arc::new(InboxMailer::new()));
//! let router = build_router(state);
//! // axum::serve(listener, router).await?;
//! ```

pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod core;
pub mod schema;
pub mod server;
pub mod store;

/// Re-exports of commonly used types
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::{AppError, AppResult},
        events::{ChangeEvent, EventBus, EventEnvelope},
        record::Record,
    };

    // === Schema ===
    pub use crate::schema::{
        AuthRule, Schema,
        expense::{Expense, ExpenseDraft},
        invoice::{Invoice, InvoiceDraft},
    };

    // === Auth ===
    pub use crate::auth::{
        email::{EmailMessage, InboxMailer, Mailer},
        provider::UserPool,
        session::{Session, SessionStore, SessionToken},
    };

    // === Storage ===
    pub use crate::store::{
        RecordStore,
        live::{Snapshot, SnapshotStream},
        memory::InMemoryRecordStore,
    };

    // === Client & App ===
    pub use crate::app::{
        form::{FormController, FormFields, FormMode, SubmitOutcome},
        list_store::{InvoiceListStore, ListState, SyncStatus},
        shell::{AuthenticatedShell, Shell, ViewEffect},
    };
    pub use crate::client::DataClient;

    // === Config & Server ===
    pub use crate::config::{AppConfig, VerificationEmailConfig};
    pub use crate::server::{AppState, build_router};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, NaiveDate, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
