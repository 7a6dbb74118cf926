// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! REST handlers for `/v1/projects`, `/v1/tokens`, `/v1/status`, and
//! `/v1/metrics` (spec §4.H).

use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hack_core::{ApiError, Clock, ErrorCode, ProjectContext, ProjectId, TokenId};
use hack_storage::{RegistryError, TokenError, UpsertOutcome as StoreUpsertOutcome};
use hack_wire::{
    ListProjectsResponse, ListTokensResponse, MintTokenRequest, MintTokenResponse, TokenRecordView,
    UpsertOutcome, UpsertProjectRequest, UpsertProjectResponse,
};

use super::AppState;

fn api_error(code: ErrorCode, message: impl Into<String>) -> Response {
    let status = match code {
        ErrorCode::UnknownProject | ErrorCode::UnknownToken => StatusCode::NOT_FOUND,
        ErrorCode::ProjectConflict => StatusCode::CONFLICT,
        ErrorCode::InvalidRequest | ErrorCode::InvalidScope => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::ConcurrentModification | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorCode::RuntimeUnavailable | ErrorCode::NotReady | ErrorCode::StaleState | ErrorCode::AlreadyRunning => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    (status, Json(ApiError::new(code, message))).into_response()
}

pub async fn get_status<C: Clock + 'static>(State(state): State<AppState<C>>) -> Response {
    state.metrics.record_request("/v1/status");
    let start = Instant::now();
    let snapshot = crate::status_gather::gather_snapshot(&state).await;
    state.metrics.record_status_generation(start.elapsed().as_millis() as u64);
    let _ = state.status_hub.notify(snapshot.version);
    Json(snapshot).into_response()
}

pub async fn get_metrics<C: Clock + 'static>(State(state): State<AppState<C>>) -> Response {
    state.metrics.record_request("/v1/metrics");
    state.metrics.set_log_queue_depth("broadcast", state.log_hub.queue_depth());
    Json(state.metrics.snapshot()).into_response()
}

pub async fn list_projects<C: Clock + 'static>(State(state): State<AppState<C>>) -> Response {
    state.metrics.record_request("/v1/projects");
    Json(ListProjectsResponse { projects: state.registry.list() }).into_response()
}

pub async fn upsert_project<C: Clock + 'static>(
    State(state): State<AppState<C>>,
    Json(body): Json<UpsertProjectRequest>,
) -> Response {
    state.metrics.record_request("/v1/projects");
    let ctx = ProjectContext {
        repo_root: body.repo_root.clone(),
        project_dir: body.project_dir.clone(),
        name: body.name.clone(),
        dev_host: body.dev_host.clone(),
        config_fingerprint: body.config_fingerprint.clone(),
    };
    match state.registry.upsert(ctx) {
        Ok(StoreUpsertOutcome::Inserted(project)) => {
            (StatusCode::CREATED, Json(UpsertProjectResponse::Accepted { status: UpsertOutcome::Inserted, id: project.id }))
                .into_response()
        }
        Ok(StoreUpsertOutcome::Updated(project)) => {
            Json(UpsertProjectResponse::Accepted { status: UpsertOutcome::Updated, id: project.id }).into_response()
        }
        Ok(StoreUpsertOutcome::Conflict { incumbent }) => (
            StatusCode::CONFLICT,
            Json(UpsertProjectResponse::Conflict {
                status: UpsertOutcome::Conflict,
                incumbent: Box::new(incumbent),
                incoming: Box::new(body),
            }),
        )
            .into_response(),
        Err(RegistryError::UnknownProject(id)) => api_error(ErrorCode::UnknownProject, id),
        Err(RegistryError::ConcurrentModification(e)) => api_error(ErrorCode::ConcurrentModification, e.to_string()),
    }
}

pub async fn delete_project<C: Clock + 'static>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
) -> Response {
    state.metrics.record_request("/v1/projects/:id");
    match state.registry.remove(&ProjectId::from_string(id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(RegistryError::UnknownProject(id)) => api_error(ErrorCode::UnknownProject, id),
        Err(RegistryError::ConcurrentModification(e)) => api_error(ErrorCode::ConcurrentModification, e.to_string()),
    }
}

pub async fn list_tokens<C: Clock + 'static>(State(state): State<AppState<C>>) -> Response {
    state.metrics.record_request("/v1/tokens");
    let tokens = state.tokens.list().iter().map(TokenRecordView::from).collect();
    Json(ListTokensResponse { tokens }).into_response()
}

pub async fn mint_token<C: Clock + 'static>(
    State(state): State<AppState<C>>,
    Json(body): Json<MintTokenRequest>,
) -> Response {
    state.metrics.record_request("/v1/tokens");
    match state.tokens.mint(body.scope, body.label, body.project_id) {
        Ok(minted) => (
            StatusCode::CREATED,
            Json(MintTokenResponse { record: TokenRecordView::from(&minted.record), secret: minted.secret }),
        )
            .into_response(),
        Err(TokenError::UnknownToken(id)) => api_error(ErrorCode::UnknownToken, id),
        Err(TokenError::ConcurrentModification(e)) => api_error(ErrorCode::ConcurrentModification, e.to_string()),
    }
}

pub async fn revoke_token<C: Clock + 'static>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
) -> Response {
    state.metrics.record_request("/v1/tokens/:id");
    match state.tokens.revoke(&TokenId::from_string(id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(TokenError::UnknownToken(id)) => api_error(ErrorCode::UnknownToken, id),
        Err(TokenError::ConcurrentModification(e)) => api_error(ErrorCode::ConcurrentModification, e.to_string()),
    }
}
