// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity Collector API Server
//!
//! Polls WakaTime, Monkeytype and ListenBrainz on a schedule, normalizes
//! their payloads into canonical activity records and stores them in
//! Firestore for the site's activity feed.

use activity_collector::{config::Config, db::FirestoreDb, AppState};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upper bound on any single provider request; a slow provider must not be
/// able to stall a collection run indefinitely.
const PROVIDER_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Activity Collector API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Shared HTTP client for all provider calls
    let http = reqwest::Client::builder()
        .timeout(PROVIDER_REQUEST_TIMEOUT)
        .build()?;

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        http,
    });

    // Build router
    let app = activity_collector::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("activity_collector=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
