// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory storage for deterministic testing.
//!
//! `MemoryStorage` keeps records per resource type in a map and understands
//! `equals` processed filters as produced by [`EqualsFilter`](crate::EqualsFilter).
//! Fault injection covers mid-batch create failures, start failures, and a
//! `stop()` that never returns.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use strato_core::{Lifecycle, ProcessedFilter, Record, Storage, StratoError};

/// Snapshot of how often each method was called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub initialize: usize,
    pub start: usize,
    pub stop: usize,
    pub get: usize,
    pub create: usize,
    pub update: usize,
    pub delete: usize,
}

#[derive(Default)]
struct Counters {
    initialize: AtomicUsize,
    start: AtomicUsize,
    stop: AtomicUsize,
    get: AtomicUsize,
    create: AtomicUsize,
    update: AtomicUsize,
    delete: AtomicUsize,
}

/// A storage backed by a `HashMap` of resource type to records.
pub struct MemoryStorage {
    resources: RwLock<HashMap<String, Vec<Record>>>,
    counters: Counters,
    shutdown: CancellationToken,
    fail_create_after: Option<usize>,
    start_error: Option<String>,
    hang_on_stop: bool,
}

impl MemoryStorage {
    /// Create an empty storage with no faults injected.
    pub fn new() -> Self {
        Self {
            resources: RwLock::new(HashMap::new()),
            counters: Counters::default(),
            shutdown: CancellationToken::new(),
            fail_create_after: None,
            start_error: None,
            hang_on_stop: false,
        }
    }

    /// Fail any create call once `n` records of the batch have been staged.
    ///
    /// Nothing from the failing batch is committed.
    pub fn fail_create_after(mut self, n: usize) -> Self {
        self.fail_create_after = Some(n);
        self
    }

    /// Make `start()` return a backend error immediately.
    pub fn fail_start(mut self, message: impl Into<String>) -> Self {
        self.start_error = Some(message.into());
        self
    }

    /// Make `stop()` never complete.
    pub fn hang_on_stop(mut self) -> Self {
        self.hang_on_stop = true;
        self
    }

    /// Seed `resource` with records, bypassing validation and counters.
    pub async fn seed(&self, resource: &str, records: Vec<Record>) {
        self.resources
            .write()
            .await
            .entry(resource.to_string())
            .or_default()
            .extend(records);
    }

    /// All records currently stored for `resource`.
    pub async fn records(&self, resource: &str) -> Vec<Record> {
        self.resources
            .read()
            .await
            .get(resource)
            .cloned()
            .unwrap_or_default()
    }

    /// Current call counts.
    pub fn calls(&self) -> CallCounts {
        let c = &self.counters;
        CallCounts {
            initialize: c.initialize.load(Ordering::SeqCst),
            start: c.start.load(Ordering::SeqCst),
            stop: c.stop.load(Ordering::SeqCst),
            get: c.get.load(Ordering::SeqCst),
            create: c.create.load(Ordering::SeqCst),
            update: c.update.load(Ordering::SeqCst),
            delete: c.delete.load(Ordering::SeqCst),
        }
    }

    /// Number of storage operations (get/create/update/delete) served.
    pub fn operation_count(&self) -> usize {
        let calls = self.calls();
        calls.get + calls.create + calls.update + calls.delete
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns true if `record` satisfies every filter.
///
/// Only `equals` filters are understood; anything else is a validation error.
pub fn record_matches(record: &Record, filters: &[ProcessedFilter]) -> Result<bool, StratoError> {
    for filter in filters {
        if filter.filter_type != "equals" {
            return Err(StratoError::Validation(format!(
                "unsupported filter type `{}`",
                filter.filter_type
            )));
        }
        let field = filter.data.get("field").and_then(Value::as_str);
        let expected = filter.data.get("value").and_then(Value::as_str);
        let (Some(field), Some(expected)) = (field, expected) else {
            return Err(StratoError::Validation(format!(
                "malformed equals filter: {}",
                filter.data
            )));
        };
        let matched = match record.get(field) {
            Some(Value::String(actual)) => actual == expected,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string() == expected,
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

#[async_trait]
impl Lifecycle for MemoryStorage {
    async fn initialize(&self) -> Result<(), StratoError> {
        self.counters.initialize.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn start(&self) -> Result<(), StratoError> {
        self.counters.start.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.start_error {
            return Err(StratoError::backend(message.clone()));
        }
        self.shutdown.cancelled().await;
        Ok(())
    }

    async fn stop(&self) -> Result<(), StratoError> {
        self.counters.stop.fetch_add(1, Ordering::SeqCst);
        if self.hang_on_stop {
            std::future::pending::<()>().await;
        }
        self.shutdown.cancel();
        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_resources(
        &self,
        resource: &str,
        filters: &[ProcessedFilter],
    ) -> Result<Vec<Record>, StratoError> {
        self.counters.get.fetch_add(1, Ordering::SeqCst);
        let resources = self.resources.read().await;
        let mut matched = Vec::new();
        for record in resources.get(resource).into_iter().flatten() {
            if record_matches(record, filters)? {
                matched.push(record.clone());
            }
        }
        Ok(matched)
    }

    async fn create_resources(
        &self,
        resource: &str,
        records: Vec<Record>,
    ) -> Result<(), StratoError> {
        self.counters.create.fetch_add(1, Ordering::SeqCst);

        let mut staged = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            if record.is_empty() {
                return Err(StratoError::Validation(format!(
                    "record {index} for `{resource}` has no fields"
                )));
            }
            if self.fail_create_after == Some(index) {
                return Err(StratoError::backend(format!(
                    "injected failure writing record {index} of `{resource}`"
                )));
            }
            staged.push(record);
        }

        self.resources
            .write()
            .await
            .entry(resource.to_string())
            .or_default()
            .extend(staged);
        Ok(())
    }

    async fn update_resources(
        &self,
        resource: &str,
        records: Vec<Record>,
        filters: &[ProcessedFilter],
    ) -> Result<(), StratoError> {
        self.counters.update.fetch_add(1, Ordering::SeqCst);
        let mut resources = self.resources.write().await;
        let stored = resources.get_mut(resource);

        let mut updated = 0;
        if let Some(stored) = stored {
            let matched = stored
                .iter()
                .map(|record| record_matches(record, filters))
                .collect::<Result<Vec<bool>, _>>()?;
            for (existing, _) in stored.iter_mut().zip(matched).filter(|(_, hit)| *hit) {
                for patch in &records {
                    for (key, value) in patch {
                        existing.insert(key.clone(), value.clone());
                    }
                }
                updated += 1;
            }
        }

        if updated == 0 {
            return Err(StratoError::NotFound {
                resource: resource.to_string(),
            });
        }
        Ok(())
    }

    async fn delete_resources(
        &self,
        resource: &str,
        filters: &[ProcessedFilter],
    ) -> Result<(), StratoError> {
        self.counters.delete.fetch_add(1, Ordering::SeqCst);
        let mut resources = self.resources.write().await;
        let Some(stored) = resources.get_mut(resource) else {
            return Ok(());
        };

        // Decide every match before removing anything, so a bad filter leaves
        // the resource untouched.
        let matched = stored
            .iter()
            .map(|record| record_matches(record, filters))
            .collect::<Result<Vec<bool>, _>>()?;
        let mut matched = matched.into_iter();
        stored.retain(|_| !matched.next().unwrap_or(false));
        Ok(())
    }
}
