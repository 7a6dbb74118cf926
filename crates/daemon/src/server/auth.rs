// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bearer-token auth for the TCP gateway listener (spec §4.H "Auth",
//! invariant T2): every request needs a valid, un-revoked token; non-GET
//! methods need `write` scope, and so does `GET /v1/logs` when the
//! gateway's `allowWrites` exposure policy is set.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hack_core::{ApiError, Clock, ErrorCode, Scope};

use super::AppState;

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(ApiError::new(ErrorCode::Unauthorized, message))).into_response()
}

pub async fn require_bearer_token<C: Clock + 'static>(
    State(state): State<AppState<C>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let secret = match request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        Some(s) => s,
        None => return unauthorized("missing bearer token"),
    };

    let Some(token) = state.tokens.verify(secret) else {
        return unauthorized("invalid or revoked token");
    };

    let logs_need_write = request.uri().path() == "/v1/logs" && state.gateway_config.read().allow_writes;
    let required = if request.method() != axum::http::Method::GET || logs_need_write { Scope::Write } else { Scope::Read };
    if !token.scope.permits(required) {
        return (StatusCode::FORBIDDEN, Json(ApiError::new(ErrorCode::InvalidScope, "token lacks required scope")))
            .into_response();
    }

    next.run(request).await
}
