//! Router assembly

use crate::server::handlers::{
    confirm, create_invoice, delete_invoice, list_invoices, sign_in, sign_out, sign_up,
    update_invoice,
};
use crate::server::ws::ws_handler;
use crate::server::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the full application router
///
/// - POST /auth/sign-up, /auth/confirm, /auth/sign-in, /auth/sign-out
/// - GET/POST /invoices, PUT/DELETE /invoices/{id}
/// - GET /ws?token=... — live-query snapshot stream
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/confirm", post(confirm))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/sign-out", post(sign_out))
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route(
            "/invoices/{id}",
            axum::routing::put(update_invoice).delete(delete_invoice),
        )
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
