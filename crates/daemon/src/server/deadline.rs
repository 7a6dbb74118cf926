// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request deadline enforcement (spec §5 "Cancellation"): every handler is
//! bounded by 5s, or the client's `X-Deadline-Ms` header when that is
//! shorter.

use std::time::Duration;

use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hack_core::{ApiError, ErrorCode};

const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);

pub async fn enforce_deadline(request: Request<Body>, next: Next) -> Response {
    let requested_ms = request
        .headers()
        .get("X-Deadline-Ms")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis);

    let deadline = match requested_ms {
        Some(requested) if requested < DEFAULT_DEADLINE => requested,
        _ => DEFAULT_DEADLINE,
    };

    match tokio::time::timeout(deadline, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            (StatusCode::GATEWAY_TIMEOUT, Json(ApiError::new(ErrorCode::Timeout, "handler exceeded its deadline")))
                .into_response()
        }
    }
}
