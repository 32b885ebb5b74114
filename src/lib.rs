// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity Collector: aggregate personal-tracking feeds into one store.
//!
//! This crate provides the backend that polls WakaTime, Monkeytype and
//! ListenBrainz, normalizes their payloads into canonical activity records
//! and upserts them into Firestore for the site's activity feed.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    /// Shared HTTP client for all provider calls (bounded by a request timeout).
    pub http: reqwest::Client,
}
