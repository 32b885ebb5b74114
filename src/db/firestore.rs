// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.

use crate::db::{collections, ActivityStore};
use crate::error::AppError;
use crate::models::Activity;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Activity Operations ─────────────────────────────────────

    /// Get an activity by its canonical id.
    pub async fn get_activity(&self, id: &str) -> Result<Option<Activity>, AppError> {
        let doc_id = urlencoding::encode(id);
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ACTIVITIES)
            .obj()
            .one(doc_id.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Upsert a batch of activities keyed on `Activity.id`.
    ///
    /// Each chunk commits in a single Firestore transaction, so from the
    /// collector's perspective a normal-sized batch is one atomic write.
    async fn upsert_batch(&self, activities: &[Activity]) -> Result<(), AppError> {
        let client = self.get_client()?;

        for chunk in activities.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for activity in chunk {
                // Percent-encode: canonical ids can contain characters that
                // are invalid in Firestore document ids (e.g. '/').
                let doc_id = urlencoding::encode(&activity.id);

                client
                    .fluent()
                    .update()
                    .in_col(collections::ACTIVITIES)
                    .document_id(doc_id.as_ref())
                    .object(activity)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!("Failed to add activity to transaction: {}", e))
                    })?;
            }

            transaction
                .commit()
                .await
                .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;
        }

        Ok(())
    }

    /// Range query on `completed_at`, inclusive bounds, newest first.
    async fn query_completed_between(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<Activity>, AppError> {
        let start = start.to_string();
        let end = end.to_string();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .filter(move |q| {
                q.for_all([
                    q.field("completed_at").greater_than_or_equal(start.clone()),
                    q.field("completed_at").less_than_or_equal(end.clone()),
                ])
            })
            .order_by([(
                "completed_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

impl ActivityStore for FirestoreDb {
    async fn upsert_activities(&self, activities: &[Activity]) -> Result<(), AppError> {
        self.upsert_batch(activities).await
    }

    async fn activities_completed_between(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<Activity>, AppError> {
        self.query_completed_between(start, end).await
    }
}
