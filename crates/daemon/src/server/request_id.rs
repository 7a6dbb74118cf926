// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request-id correlation (spec §4.H: "every response includes a
//! `requestId` header correlating to the log line emitted by the
//! server"). `SetRequestIdLayer` stamps the id into the request's
//! extensions, `TraceLayer`'s span carries it into every log record, and
//! `PropagateRequestIdLayer` copies it back out onto the response.

use axum::http::{HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

#[derive(Clone, Default)]
pub struct GenerateRequestId;

impl MakeRequestId for GenerateRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = nanoid::nanoid!(21);
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Pull the id a prior `SetRequestIdLayer` stamped onto the request, for
/// use as a tracing span field.
pub fn extract<B>(request: &Request<B>) -> &str {
    request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("unknown")
}
