// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! WakaTime adapter: today's coding time, one record per active project.

use crate::error::AppError;
use crate::models::{Activity, ActivityKind, Source};
use crate::services::check_response_json;
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

const WAKATIME_BASE_URL: &str = "https://wakatime.com/api/v1";
const PROVIDER: &str = "wakatime";

/// Title used when the provider reports time not attributed to any project.
const UNKNOWN_PROJECT: &str = "Unknown Project";

/// WakaTime API client (bearer token auth).
#[derive(Clone)]
pub struct WakaTimeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WakaTimeClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self {
            http,
            base_url: WAKATIME_BASE_URL.to_string(),
            api_key,
        }
    }

    /// Point the client at a different base URL (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Collect today's coding activity.
    ///
    /// This is the adapter's failure boundary: transport errors, non-2xx
    /// statuses, malformed payloads and a missing credential are all logged
    /// here and resolved to an empty list so the rest of the batch survives.
    pub async fn collect(&self) -> Vec<Activity> {
        match self.fetch_today().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    provider = PROVIDER,
                    error = %e,
                    "Adapter failed, continuing with empty result"
                );
                Vec::new()
            }
        }
    }

    async fn fetch_today(&self) -> Result<Vec<Activity>, AppError> {
        if self.api_key.is_empty() {
            return Err(AppError::provider(PROVIDER, "WAKATIME_API_KEY not configured"));
        }

        let url = format!("{}/users/current/summaries", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("range", "Today")])
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AppError::provider(PROVIDER, e.to_string()))?;

        let body = check_response_json(PROVIDER, response).await?;
        summaries_to_activities(&body)
    }
}

/// Summaries response, one entry per day in the requested range.
#[derive(Debug, Deserialize)]
struct SummariesResponse {
    data: Vec<SummaryDay>,
}

#[derive(Debug, Deserialize)]
struct SummaryDay {
    #[serde(default)]
    projects: Vec<Value>,
    range: SummaryRange,
}

#[derive(Debug, Deserialize)]
struct SummaryRange {
    date: String,
    start: String,
    end: String,
}

#[derive(Debug, Deserialize)]
struct SummaryProject {
    name: Option<String>,
    total_seconds: f64,
}

/// Normalize a summaries payload into canonical records.
///
/// One record per project with nonzero reported time; the id embeds the
/// reporting-window date and project name, so re-collecting the same day
/// refreshes the document in place as the totals grow.
fn summaries_to_activities(body: &Value) -> Result<Vec<Activity>, AppError> {
    let response: SummariesResponse = serde_json::from_value(body.clone())
        .map_err(|e| AppError::provider(PROVIDER, format!("Malformed summaries payload: {}", e)))?;

    let mut records = Vec::new();

    for day in &response.data {
        let started_at = parse_instant(&day.range.start)?;
        let completed_at = parse_instant(&day.range.end)?;

        for raw_project in &day.projects {
            let project: SummaryProject = serde_json::from_value(raw_project.clone())
                .map_err(|e| {
                    AppError::provider(PROVIDER, format!("Malformed project entry: {}", e))
                })?;

            if project.total_seconds <= 0.0 {
                continue;
            }

            let title = project
                .name
                .clone()
                .unwrap_or_else(|| UNKNOWN_PROJECT.to_string());

            records.push(Activity {
                id: format!("coding-{}-{}", day.range.date, title),
                source: Source::Coding,
                kind: ActivityKind::CodingSession,
                title,
                creators: None,
                url: None,
                started_at: Some(format_utc_rfc3339(started_at)),
                completed_at: format_utc_rfc3339(completed_at),
                duration_seconds: Some(project.total_seconds.round() as u32),
                raw: raw_project.clone(),
            });
        }
    }

    Ok(records)
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::provider(PROVIDER, format!("Invalid range timestamp '{}': {}", raw, e)))
}
