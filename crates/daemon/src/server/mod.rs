// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Daemon Server (spec §4.H): the axum `Router` shared by the trusted
//! Unix-domain-socket listener and the optional bearer-token-gated TCP
//! gateway listener.

mod auth;
mod deadline;
mod handlers;
mod metrics;
mod request_id;
mod sse;

use std::sync::Arc;

use axum::routing::{delete, get};
use axum::Router;
use chrono::{DateTime, Utc};
use hack_core::Clock;
use hack_status::GatewayConfig;
use hack_storage::{RegistryStore, RuntimeCountersStore, TokenStore};
use parking_lot::RwLock;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::logs::LogHub;

pub use metrics::Metrics;
pub use sse::StatusHub;

/// Shared daemon state, cloned cheaply into every handler (spec §4.H, §9
/// "single shared app state behind `Arc`").
#[derive(Clone)]
pub struct AppState<C: Clock + 'static> {
    pub config: Config,
    pub clock: C,
    pub started_at: DateTime<Utc>,
    pub registry: Arc<RegistryStore<C>>,
    pub tokens: Arc<TokenStore<C>>,
    pub runtime_counters: Arc<RuntimeCountersStore>,
    pub gateway_config: Arc<RwLock<GatewayConfig>>,
    pub log_hub: LogHub,
    pub status_hub: sse::StatusHub,
    pub metrics: Arc<Metrics>,
}

/// Build the full router. `trusted` selects whether bearer-token auth is
/// enforced: the Unix socket is trusted by its 0600 file permissions, the
/// TCP gateway bind is not (spec §4.H "Auth").
///
/// Every response carries an `x-request-id` header correlating to the
/// `tracing` span each request's log lines are emitted under (spec §4.H
/// "every response includes a `requestId` header correlating to the log
/// line emitted by the server"): `SetRequestIdLayer` stamps the id onto
/// the incoming request, the `TraceLayer` span picks it up, and
/// `PropagateRequestIdLayer` copies it back onto the outgoing response.
pub fn build_router<C: Clock + 'static>(state: AppState<C>, trusted: bool) -> Router {
    let mut router = Router::new()
        .route("/v1/status", get(handlers::get_status::<C>))
        .route("/v1/metrics", get(handlers::get_metrics::<C>))
        .route("/v1/projects", get(handlers::list_projects::<C>).post(handlers::upsert_project::<C>))
        .route("/v1/projects/{id}", delete(handlers::delete_project::<C>))
        .route("/v1/tokens", get(handlers::list_tokens::<C>).post(handlers::mint_token::<C>))
        .route("/v1/tokens/{id}", delete(handlers::revoke_token::<C>))
        .route("/v1/logs", get(sse::stream_logs::<C>))
        .route("/v1/events", get(sse::stream_events::<C>))
        .layer(axum::middleware::from_fn(deadline::enforce_deadline));

    if !trusted {
        router = router.layer(axum::middleware::from_fn_with_state(state.clone(), auth::require_bearer_token::<C>));
    }

    router
        .with_state(state)
        .layer(PropagateRequestIdLayer::new(request_id::REQUEST_ID_HEADER))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "request",
                request_id = %request_id::extract(request),
                method = %request.method(),
                uri = %request.uri(),
            )
        }))
        .layer(SetRequestIdLayer::new(request_id::REQUEST_ID_HEADER, request_id::GenerateRequestId))
}
