//! REST handlers for auth and invoice routes
//!
//! Invoice handlers never touch the store directly: each request builds a
//! session-bound [`DataClient`] from its bearer token, so authentication and
//! owner scoping follow exactly the same path as the interactive shell.

use crate::auth::session::SessionToken;
use crate::client::DataClient;
use crate::core::error::{AppResult, RequestError};
use crate::schema::invoice::{Invoice, InvoiceDraft};
use crate::server::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub token: String,
}

/// Extract the bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> AppResult<SessionToken> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(RequestError::MissingToken)?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or(RequestError::MissingToken)?;

    Ok(SessionToken::from(token))
}

fn client_for(state: &AppState, headers: &HeaderMap) -> AppResult<DataClient> {
    let token = bearer_token(headers)?;
    // Fail fast on unknown tokens instead of deferring to the first store call
    state.sessions.resolve(&token)?;
    Ok(DataClient::new(
        state.sessions.clone(),
        state.invoices.clone(),
        token,
    ))
}

// =============================================================================
// Auth routes
// =============================================================================

pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> AppResult<StatusCode> {
    state.pool.sign_up(&req.email, &req.password)?;
    Ok(StatusCode::CREATED)
}

pub async fn confirm(
    State(state): State<AppState>,
    Json(req): Json<ConfirmRequest>,
) -> AppResult<StatusCode> {
    state.pool.confirm(&req.email, &req.code)?;
    Ok(StatusCode::OK)
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> AppResult<Json<SignInResponse>> {
    let session = state.pool.sign_in(&req.email, &req.password)?;
    Ok(Json(SignInResponse {
        token: session.token.to_string(),
    }))
}

pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<StatusCode> {
    let token = bearer_token(&headers)?;
    state.pool.sign_out(&token)?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Invoice routes
// =============================================================================

pub async fn list_invoices(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<Invoice>>> {
    let client = client_for(&state, &headers)?;
    Ok(Json(client.list_invoices().await?))
}

pub async fn create_invoice(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(draft): Json<InvoiceDraft>,
) -> AppResult<(StatusCode, Json<Invoice>)> {
    let client = client_for(&state, &headers)?;
    let created = client.create_invoice(draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(draft): Json<InvoiceDraft>,
) -> AppResult<Json<Invoice>> {
    let client = client_for(&state, &headers)?;
    Ok(Json(client.update_invoice(id, draft).await?))
}

pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> AppResult<StatusCode> {
    let client = client_for(&state, &headers)?;
    client.delete_invoice(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
