// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read-only activity feed consumed by the site frontend.

use crate::db::ActivityStore;
use crate::error::Result;
use crate::models::Activity;
use crate::time_utils::{day_bounds, format_utc_rfc3339, today_at_offset};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Feed routes (public, read-only).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/activity", get(get_activity_feed))
}

#[derive(Deserialize)]
struct ActivityFeedQuery {
    /// Calendar date (YYYY-MM-DD) in the configured display offset;
    /// defaults to today.
    date: Option<String>,
}

/// Activity feed response, grouped by source.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityFeedResponse {
    pub date: String,
    pub activities: BTreeMap<String, Vec<Activity>>,
    pub total: usize,
}

/// All activities whose `completed_at` falls within the requested calendar
/// day at the configured fixed offset, grouped by source.
///
/// A day with no records returns empty groups and `total: 0`, never an
/// error.
async fn get_activity_feed(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActivityFeedQuery>,
) -> Result<Json<ActivityFeedResponse>> {
    let offset = state.config.display_utc_offset;

    let date = match query.date.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            crate::error::AppError::BadRequest(
                "Invalid 'date' parameter: must be YYYY-MM-DD".to_string(),
            )
        })?,
        None => today_at_offset(offset),
    };

    let (start, end) = day_bounds(date, offset);
    let activities = state
        .db
        .activities_completed_between(&format_utc_rfc3339(start), &format_utc_rfc3339(end))
        .await?;

    let total = activities.len();

    Ok(Json(ActivityFeedResponse {
        date: date.to_string(),
        activities: group_by_source(activities),
        total,
    }))
}

/// Group records by source, preserving the store's ordering within each
/// group.
fn group_by_source(activities: Vec<Activity>) -> BTreeMap<String, Vec<Activity>> {
    let mut grouped: BTreeMap<String, Vec<Activity>> = BTreeMap::new();
    for activity in activities {
        grouped
            .entry(activity.source.to_string())
            .or_default()
            .push(activity);
    }
    grouped
}
