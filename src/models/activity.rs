// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Canonical activity record shared by every source adapter.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Which adapter produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Coding,
    Typing,
    Listening,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Coding => "coding",
            Source::Typing => "typing",
            Source::Listening => "listening",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of event a record describes.
///
/// Redundant with [`Source`] today, but modeled independently so one source
/// can emit several kinds later without a schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
    CodingSession,
    TypingTest,
    MusicListen,
}

/// Stored activity record in Firestore.
///
/// `id` is derived deterministically from `(source, provider-native id)` and
/// doubles as the upsert key: re-ingesting the same provider event overwrites
/// the document instead of duplicating it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Activity {
    /// Idempotency key, e.g. `"typing-65a1f0..."`.
    pub id: String,
    pub source: Source,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    /// Human-readable summary (project name, WPM string, track title).
    pub title: String,
    /// Ordered creator list (track artists); absent for coding/typing.
    pub creators: Option<Vec<String>>,
    /// Deep link to the originating artifact, when the provider has one.
    pub url: Option<String>,
    /// RFC3339 UTC; absent when the provider only reports a single instant.
    pub started_at: Option<String>,
    /// RFC3339 UTC. Always present; all time-range queries filter on this.
    pub completed_at: String,
    pub duration_seconds: Option<u32>,
    /// Opaque copy of the provider payload item, kept so records can be
    /// reprocessed later without re-fetching.
    pub raw: serde_json::Value,
}
