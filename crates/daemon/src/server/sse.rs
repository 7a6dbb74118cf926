// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/v1/logs` and `/v1/events` SSE endpoints (spec §4.G, §4.H).

use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use hack_core::Clock;
use hack_wire::{LogQuery, LogStreamEvent, StatusEvent};
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};

use super::AppState;

const SSE_CHANNEL_DEPTH: usize = 64;

/// Broadcasts `changed` notifications when the status version advances
/// (spec §4.H design note: pull-model snapshot plus a push nudge).
#[derive(Clone)]
pub struct StatusHub {
    sender: broadcast::Sender<StatusEvent>,
    last_version: Arc<AtomicU64>,
}

impl StatusHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(SSE_CHANNEL_DEPTH);
        Self { sender, last_version: Arc::new(AtomicU64::new(0)) }
    }

    pub fn notify(&self, version: u64) {
        if self.last_version.swap(version, Ordering::SeqCst) != version {
            let _ = self.sender.send(StatusEvent::Changed { version });
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.sender.subscribe()
    }
}

impl Default for StatusHub {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn stream_events<C: Clock + 'static>(
    State(state): State<AppState<C>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    state.metrics.record_request("/v1/events");
    let mut rx = state.status_hub.subscribe();
    let (tx, out_rx) = mpsc::channel(SSE_CHANNEL_DEPTH);

    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            let payload = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
            if tx.send(Event::default().data(payload)).await.is_err() {
                break;
            }
        }
    });

    Sse::new(ReceiverStream::new(out_rx).map(Ok)).keep_alive(KeepAlive::default())
}

pub async fn stream_logs<C: Clock + 'static>(
    State(state): State<AppState<C>>,
    Query(query): Query<LogQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    state.metrics.record_request("/v1/logs");
    let (tx, out_rx) = mpsc::channel(SSE_CHANNEL_DEPTH);
    let hub = state.log_hub.clone();

    let selector =
        format!("project={:?} service={:?} tail={:?} since={:?}", query.project, query.service, query.tail, query.since);

    tokio::spawn(async move {
        if tx.send(sse_payload(&LogStreamEvent::Start { selector })).await.is_err() {
            return;
        }

        for entry in hub.replay(query.tail, query.since, query.project.as_deref(), query.service.as_deref()) {
            if tx.send(sse_payload(&LogStreamEvent::Log { entry })).await.is_err() {
                return;
            }
        }

        if !query.follow {
            let _ = tx.send(sse_payload(&LogStreamEvent::End { reason: "eof".to_string() })).await;
            return;
        }

        let mut rx = hub.subscribe();
        while let Some(event) = crate::logs::next_event(&mut rx).await {
            let keep_going = matches!(event, LogStreamEvent::Log { .. } | LogStreamEvent::Error { .. });
            if tx.send(sse_payload(&event)).await.is_err() {
                return;
            }
            if !keep_going {
                return;
            }
        }
    });

    Sse::new(ReceiverStream::new(out_rx).map(Ok)).keep_alive(KeepAlive::default())
}

fn sse_payload(event: &LogStreamEvent) -> Event {
    Event::default().data(serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string()))
}
