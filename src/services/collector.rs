// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Collection pipeline: fan out to every provider, merge, write once.

use crate::db::ActivityStore;
use crate::error::AppError;
use crate::models::Activity;
use crate::services::{ListenBrainzClient, MonkeytypeClient, WakaTimeClient};

/// Outcome of one collection run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub coding: usize,
    pub typing: usize,
    pub listening: usize,
    /// Records actually sent to the store (zero when the batch was empty).
    pub written: usize,
}

/// Runs all adapters concurrently and upserts the merged batch.
///
/// Generic over the store so tests can substitute an in-memory fake. One
/// instance handles one run; there is no retry logic here — the next
/// scheduled run re-covers the same small window, and upsert-by-id makes
/// re-sending the overlap harmless.
pub struct CollectorService<S> {
    wakatime: WakaTimeClient,
    monkeytype: MonkeytypeClient,
    listenbrainz: ListenBrainzClient,
    store: S,
}

impl<S: ActivityStore> CollectorService<S> {
    pub fn new(
        wakatime: WakaTimeClient,
        monkeytype: MonkeytypeClient,
        listenbrainz: ListenBrainzClient,
        store: S,
    ) -> Self {
        Self {
            wakatime,
            monkeytype,
            listenbrainz,
            store,
        }
    }

    /// One aggregate-then-write pass.
    ///
    /// Adapters fail independently (each resolves its own errors to an empty
    /// list), so the batch always contains the full output of the healthy
    /// sources. A store failure fails the whole run.
    pub async fn run(&self) -> Result<RunSummary, AppError> {
        tracing::info!("Starting activity collection");

        let (coding, typing, listening) = tokio::join!(
            self.wakatime.collect(),
            self.monkeytype.collect(),
            self.listenbrainz.collect(),
        );

        let mut summary = RunSummary {
            coding: coding.len(),
            typing: typing.len(),
            listening: listening.len(),
            written: 0,
        };

        let mut batch: Vec<Activity> = coding;
        batch.extend(typing);
        batch.extend(listening);

        if batch.is_empty() {
            tracing::info!("No new activities found, skipping write");
            return Ok(summary);
        }

        self.store.upsert_activities(&batch).await?;
        summary.written = batch.len();

        tracing::info!(
            coding = summary.coding,
            typing = summary.typing,
            listening = summary.listening,
            written = summary.written,
            "Activities stored"
        );

        Ok(summary)
    }
}
