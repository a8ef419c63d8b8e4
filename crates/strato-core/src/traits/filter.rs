// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filter trait for components that materialize filter specifications.

use crate::error::StratoError;
use crate::traits::lifecycle::Lifecycle;
use crate::types::ProcessedFilter;

/// Validates and constructs [`ProcessedFilter`] values that scope storage
/// operations.
///
/// Unlike facades and storages, [`Lifecycle::start`] must not block: it is
/// either a no-op or spawns background work and returns.
pub trait Filter: Lifecycle {
    /// Checks whether a processed filter is well-formed for this filter kind.
    ///
    /// `Ok(false)` means the filter is invalid; `Err` means validation itself
    /// could not be carried out.
    fn validate_filter(&self, filter: &ProcessedFilter) -> Result<bool, StratoError>;

    /// Parses a textual specification into the processed form storages consume.
    fn create_filter(&self, spec: &str) -> Result<ProcessedFilter, StratoError>;
}
