// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - provider adapters and the collection pipeline.

pub mod collector;
pub mod listenbrainz;
pub mod monkeytype;
pub mod wakatime;

pub use collector::{CollectorService, RunSummary};
pub use listenbrainz::ListenBrainzClient;
pub use monkeytype::MonkeytypeClient;
pub use wakatime::WakaTimeClient;

use crate::error::AppError;

/// Check response status and parse the JSON body.
///
/// Non-2xx responses keep the status and body text in the error so a
/// provider outage can be diagnosed from logs alone.
pub(crate) async fn check_response_json(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<serde_json::Value, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::provider(
            provider,
            format!("HTTP {}: {}", status, body),
        ));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::provider(provider, format!("JSON parse error: {}", e)))
}
