// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scheduled-trigger route called by Cloud Scheduler, not directly by users.

use crate::db::FirestoreDb;
use crate::services::{
    CollectorService, ListenBrainzClient, MonkeytypeClient, WakaTimeClient,
};
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Router};
use std::sync::Arc;

/// Trigger routes (called by Cloud Scheduler).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/tasks/collect", post(collect_activities))
}

/// Build a collector from app state for one run.
fn create_collector(state: &AppState) -> CollectorService<FirestoreDb> {
    CollectorService::new(
        WakaTimeClient::new(state.http.clone(), state.config.wakatime_api_key.clone()),
        MonkeytypeClient::new(state.http.clone(), state.config.monkeytype_api_key.clone()),
        ListenBrainzClient::new(
            state.http.clone(),
            state.config.listenbrainz_username.clone(),
        ),
        state.db.clone(),
    )
}

/// Run one collection pass (called by Cloud Scheduler).
///
/// The deployment schedules runs back-to-back, never overlapping; if a
/// deployment ever allows overlap, an external mutual-exclusion lock must be
/// added around the run — concurrent overlapping upserts are only safe
/// because upsert-by-id is idempotent, not because they are coordinated.
async fn collect_activities(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
) -> StatusCode {
    // Security Check: Ensure request comes from Cloud Scheduler.
    // Cloud Run strips this header from external requests, so its presence
    // guarantees internal origin.
    if headers.get("x-cloudscheduler").is_none() {
        tracing::warn!("Security Alert: Blocked unauthorized access to collect_activities");
        return StatusCode::FORBIDDEN;
    }

    let collector = create_collector(&state);

    match collector.run().await {
        Ok(summary) => {
            tracing::info!(
                coding = summary.coding,
                typing = summary.typing,
                listening = summary.listening,
                written = summary.written,
                "Collection run complete"
            );
            StatusCode::OK
        }
        Err(e) => {
            tracing::error!(error = %e, "Collection run failed");
            // Return 500 so the scheduler's retry policy applies.
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
