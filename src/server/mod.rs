//! HTTP surface: auth routes, invoice CRUD routes, and the live-query
//! WebSocket endpoint

pub mod handlers;
pub mod routes;
pub mod ws;

use crate::auth::email::Mailer;
use crate::auth::provider::UserPool;
use crate::auth::session::SessionStore;
use crate::config::AppConfig;
use crate::core::events::EventBus;
use crate::schema::invoice::Invoice;
use crate::store::memory::InMemoryRecordStore;
use std::sync::Arc;

pub use routes::build_router;

/// Shared state behind every route
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<UserPool>,
    pub sessions: SessionStore,
    pub invoices: InMemoryRecordStore<Invoice>,
}

impl AppState {
    /// Wire up the full service from configuration
    pub fn new(config: &AppConfig, mailer: Arc<dyn Mailer>) -> Self {
        let bus = EventBus::new(config.event_capacity);
        let sessions = SessionStore::new();
        let pool = Arc::new(UserPool::new(
            sessions.clone(),
            mailer,
            config.verification_email.clone(),
        ));

        Self {
            pool,
            sessions,
            invoices: InMemoryRecordStore::new(bus),
        }
    }
}
