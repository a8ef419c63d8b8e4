// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage trait for persistence backends.

use async_trait::async_trait;

use crate::error::StratoError;
use crate::traits::lifecycle::Lifecycle;
use crate::types::{ProcessedFilter, Record};

/// Persists and retrieves resource records, scoped by already-validated filters.
///
/// `filters` is always a conjunction; an empty slice means no filtering.
/// [`Lifecycle::start`] blocks until the storage is stopped.
#[async_trait]
pub trait Storage: Lifecycle {
    /// Returns every `resource` record matching all `filters`.
    async fn get_resources(
        &self,
        resource: &str,
        filters: &[ProcessedFilter],
    ) -> Result<Vec<Record>, StratoError>;

    /// Creates `records` atomically: either all of them become visible or none do.
    async fn create_resources(
        &self,
        resource: &str,
        records: Vec<Record>,
    ) -> Result<(), StratoError>;

    /// Applies the fields of each record in `records` to every existing record
    /// matching `filters`.
    ///
    /// Returns [`StratoError::NotFound`] when nothing matches.
    async fn update_resources(
        &self,
        resource: &str,
        records: Vec<Record>,
        filters: &[ProcessedFilter],
    ) -> Result<(), StratoError>;

    /// Removes every record matching `filters`. Matching nothing is a success.
    async fn delete_resources(
        &self,
        resource: &str,
        filters: &[ProcessedFilter],
    ) -> Result<(), StratoError>;
}
