// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! ListenBrainz adapter: recent music listens.

use crate::error::AppError;
use crate::models::{Activity, ActivityKind, Source};
use crate::services::check_response_json;
use crate::time_utils::format_utc_rfc3339;
use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

const LISTENBRAINZ_BASE_URL: &str = "https://api.listenbrainz.org";
const PROVIDER: &str = "listenbrainz";

/// How many recent listens to pull per run.
const RECENT_LISTENS_LIMIT: usize = 5;

/// ListenBrainz API client. Listens are public and fetched anonymously by
/// username; no credential is involved.
#[derive(Clone)]
pub struct ListenBrainzClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
}

impl ListenBrainzClient {
    pub fn new(http: reqwest::Client, username: String) -> Self {
        Self {
            http,
            base_url: LISTENBRAINZ_BASE_URL.to_string(),
            username,
        }
    }

    /// Point the client at a different base URL (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Collect recent listens.
    ///
    /// Failure boundary: any error is logged and resolved to an empty list.
    pub async fn collect(&self) -> Vec<Activity> {
        match self.fetch_recent_listens().await {
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

    async fn fetch_recent_listens(&self) -> Result<Vec<Activity>, AppError> {
        if self.username.is_empty() {
            return Err(AppError::provider(
                PROVIDER,
                "LISTENBRAINZ_USERNAME not configured",
            ));
        }

        let url = format!("{}/1/user/{}/listens", self.base_url, self.username);
        let response = self
            .http
            .get(&url)
            .query(&[("count", RECENT_LISTENS_LIMIT)])
            .send()
            .await
            .map_err(|e| AppError::provider(PROVIDER, e.to_string()))?;

        let body = check_response_json(PROVIDER, response).await?;
        listens_to_activities(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ListensResponse {
    payload: ListensPayload,
}

#[derive(Debug, Deserialize)]
struct ListensPayload {
    listens: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Listen {
    /// Seconds since epoch.
    listened_at: i64,
    track_metadata: TrackMetadata,
}

#[derive(Debug, Deserialize)]
struct TrackMetadata {
    track_name: String,
    artist_name: String,
    #[serde(default)]
    additional_info: Option<AdditionalInfo>,
    #[serde(default)]
    mbid_mapping: Option<MbidMapping>,
}

#[derive(Debug, Deserialize)]
struct AdditionalInfo {
    #[serde(default)]
    recording_mbid: Option<String>,
    /// Full Spotify track URL when the listen was cross-referenced.
    #[serde(default)]
    spotify_id: Option<String>,
    #[serde(default)]
    duration_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct MbidMapping {
    #[serde(default)]
    recording_mbid: Option<String>,
}

/// Normalize a listens payload into canonical records, newest first as the
/// provider returns them.
fn listens_to_activities(body: &Value) -> Result<Vec<Activity>, AppError> {
    let response: ListensResponse = serde_json::from_value(body.clone())
        .map_err(|e| AppError::provider(PROVIDER, format!("Malformed listens payload: {}", e)))?;

    let mut records = Vec::new();

    for raw_listen in response.payload.listens.iter().take(RECENT_LISTENS_LIMIT) {
        let listen: Listen = serde_json::from_value(raw_listen.clone())
            .map_err(|e| AppError::provider(PROVIDER, format!("Malformed listen entry: {}", e)))?;

        let completed_at = DateTime::from_timestamp(listen.listened_at, 0)
            .ok_or_else(|| {
                AppError::provider(
                    PROVIDER,
                    format!("Listen timestamp out of range: {}", listen.listened_at),
                )
            })
            .map(format_utc_rfc3339)?;

        let info = listen.track_metadata.additional_info.as_ref();

        // Prefer the submitted recording MBID, then the server-side mapping.
        // Listens with neither get a random token: such records may not
        // dedupe across runs, a documented looseness of this source.
        let recording_id = info
            .and_then(|i| i.recording_mbid.clone())
            .or_else(|| {
                listen
                    .track_metadata
                    .mbid_mapping
                    .as_ref()
                    .and_then(|m| m.recording_mbid.clone())
            })
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        records.push(Activity {
            id: format!("listening-{}-{}", listen.listened_at, recording_id),
            source: Source::Listening,
            kind: ActivityKind::MusicListen,
            title: listen.track_metadata.track_name.clone(),
            creators: Some(vec![listen.track_metadata.artist_name.clone()]),
            url: info.and_then(|i| i.spotify_id.clone()),
            // Only the listen instant is reported.
            started_at: None,
            completed_at,
            duration_seconds: info
                .and_then(|i| i.duration_ms)
                .map(|ms| (ms as f64 / 1000.0).round() as u32),
            raw: raw_listen.clone(),
        });
    }

    Ok(records)
}
