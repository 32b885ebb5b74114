// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Monkeytype adapter: recent typing-test results.

use crate::error::AppError;
use crate::models::{Activity, ActivityKind, Source};
use crate::services::check_response_json;
use crate::time_utils::format_utc_rfc3339;
use chrono::DateTime;
use reqwest::header;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

const MONKEYTYPE_BASE_URL: &str = "https://api.monkeytype.com";
const PROVIDER: &str = "monkeytype";

/// How many recent results to pull per run. Freshness relies on this small
/// window plus idempotent overwrite, not on a cross-run cursor.
const RECENT_RESULTS_LIMIT: usize = 5;

/// Monkeytype API client (ApeKey header auth).
#[derive(Clone)]
pub struct MonkeytypeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MonkeytypeClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self {
            http,
            base_url: MONKEYTYPE_BASE_URL.to_string(),
            api_key,
        }
    }

    /// Point the client at a different base URL (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Collect recent typing-test results.
    ///
    /// Failure boundary: any error is logged and resolved to an empty list.
    pub async fn collect(&self) -> Vec<Activity> {
        match self.fetch_recent_results().await {
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

    async fn fetch_recent_results(&self) -> Result<Vec<Activity>, AppError> {
        if self.api_key.is_empty() {
            return Err(AppError::provider(PROVIDER, "MONKEYTYPE_API_KEY not configured"));
        }

        let url = format!("{}/results", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("limit", RECENT_RESULTS_LIMIT)])
            .header(header::AUTHORIZATION, format!("ApeKey {}", self.api_key))
            .send()
            .await
            .map_err(|e| AppError::provider(PROVIDER, e.to_string()))?;

        let body = check_response_json(PROVIDER, response).await?;
        results_to_activities(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ResultsResponse {
    data: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct TypingResult {
    #[serde(rename = "_id")]
    id: String,
    wpm: f64,
    acc: f64,
    mode: String,
    #[serde(deserialize_with = "mode2_as_string")]
    mode2: String,
    /// Milliseconds since epoch.
    timestamp: i64,
    #[serde(rename = "testDuration")]
    test_duration: f64,
}

/// `mode2` arrives as a string for most tests but as a bare number in older
/// payloads; normalize both to a string.
fn mode2_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "unexpected mode2 value: {}",
            other
        ))),
    }
}

/// Normalize a results payload into canonical records, newest first as the
/// provider returns them.
fn results_to_activities(body: &Value) -> Result<Vec<Activity>, AppError> {
    let response: ResultsResponse = serde_json::from_value(body.clone())
        .map_err(|e| AppError::provider(PROVIDER, format!("Malformed results payload: {}", e)))?;

    let mut records = Vec::new();

    for raw_result in response.data.iter().take(RECENT_RESULTS_LIMIT) {
        let result: TypingResult = serde_json::from_value(raw_result.clone())
            .map_err(|e| AppError::provider(PROVIDER, format!("Malformed result entry: {}", e)))?;

        let completed_at = DateTime::from_timestamp_millis(result.timestamp)
            .ok_or_else(|| {
                AppError::provider(
                    PROVIDER,
                    format!("Result timestamp out of range: {}", result.timestamp),
                )
            })
            .map(format_utc_rfc3339)?;

        records.push(Activity {
            id: format!("typing-{}", result.id),
            source: Source::Typing,
            kind: ActivityKind::TypingTest,
            title: compose_title(result.wpm, result.acc, &result.mode, &result.mode2),
            creators: None,
            url: Some(format!("https://monkeytype.com/results/{}", result.id)),
            // The provider reports a single instant per test.
            started_at: Some(completed_at.clone()),
            completed_at,
            duration_seconds: Some(result.test_duration.round() as u32),
            raw: raw_result.clone(),
        });
    }

    Ok(records)
}

/// `"88 WPM - 96% accuracy (30s)"`.
fn compose_title(wpm: f64, acc: f64, mode: &str, mode2: &str) -> String {
    format!(
        "{} WPM - {}% accuracy ({})",
        wpm.round(),
        acc.round(),
        mode_label(mode, mode2)
    )
}

/// Time-based tests render as "{duration}s", word-count tests as
/// "{count} words"; anything else keeps the raw mode name.
fn mode_label(mode: &str, mode2: &str) -> String {
    match mode {
        "time" => format!("{}s", mode2),
        "words" => format!("{} words", mode2),
        _ => mode.to_string(),
    }
}
