// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore, plus an in-memory store for tests).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::Activity;

/// Collection names as constants.
pub mod collections {
    pub const ACTIVITIES: &str = "activity";
}

/// Store operations the collector and feed query depend on.
///
/// The collector is generic over this trait so tests can substitute
/// [`MemoryStore`] for the real Firestore client.
#[allow(async_fn_in_trait)]
pub trait ActivityStore {
    /// Upsert a batch keyed on `Activity.id` with full-document replace
    /// semantics. One call per collection run.
    async fn upsert_activities(&self, activities: &[Activity]) -> Result<(), AppError>;

    /// All activities with `completed_at` in `[start, end]` inclusive,
    /// ordered by `completed_at` descending. Bounds are RFC3339 UTC strings
    /// from [`crate::time_utils::format_utc_rfc3339`].
    async fn activities_completed_between(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<Activity>, AppError>;
}
