// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory [`ActivityStore`] used by tests.
//!
//! Mirrors the store contract (upsert-by-id with full replace, inclusive
//! range query ordered descending) and counts upsert calls so tests can
//! assert the collector's short-circuit behavior.

use crate::db::ActivityStore;
use crate::error::AppError;
use crate::models::Activity;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MemoryStoreInner {
    records: Mutex<BTreeMap<String, Activity>>,
    upsert_calls: AtomicUsize,
    fail_writes: AtomicBool,
}

/// Cheaply clonable in-memory store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryStoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.inner.records.lock().expect("store lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch a stored record by id.
    pub fn get(&self, id: &str) -> Option<Activity> {
        self.inner
            .records
            .lock()
            .expect("store lock")
            .get(id)
            .cloned()
    }

    /// How many times `upsert_activities` was invoked.
    pub fn upsert_call_count(&self) -> usize {
        self.inner.upsert_calls.load(Ordering::SeqCst)
    }

    /// Make every subsequent write fail with a database error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl ActivityStore for MemoryStore {
    async fn upsert_activities(&self, activities: &[Activity]) -> Result<(), AppError> {
        self.inner.upsert_calls.fetch_add(1, Ordering::SeqCst);

        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database("simulated write failure".to_string()));
        }

        let mut records = self.inner.records.lock().expect("store lock");
        for activity in activities {
            // Full-document replace, matching the Firestore upsert.
            records.insert(activity.id.clone(), activity.clone());
        }
        Ok(())
    }

    async fn activities_completed_between(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<Activity>, AppError> {
        let records = self.inner.records.lock().expect("store lock");
        let mut matching: Vec<Activity> = records
            .values()
            .filter(|a| a.completed_at.as_str() >= start && a.completed_at.as_str() <= end)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(matching)
    }
}
