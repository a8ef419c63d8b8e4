// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Equality filter parsing `field=value` specifications.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{json, Value};

use strato_core::{Filter, Lifecycle, ProcessedFilter, StratoError};

/// Filter type tag produced by [`EqualsFilter`].
pub const EQUALS: &str = "equals";

/// A filter matching records whose `field` equals `value`.
#[derive(Debug, Default)]
pub struct EqualsFilter {
    created: AtomicUsize,
    validated: AtomicUsize,
    starts: AtomicUsize,
    stops: AtomicUsize,
}

impl EqualsFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `create_filter` calls so far.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Number of `validate_filter` calls so far.
    pub fn validated(&self) -> usize {
        self.validated.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Lifecycle for EqualsFilter {
    async fn initialize(&self) -> Result<(), StratoError> {
        Ok(())
    }

    async fn start(&self) -> Result<(), StratoError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<(), StratoError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Filter for EqualsFilter {
    fn validate_filter(&self, filter: &ProcessedFilter) -> Result<bool, StratoError> {
        self.validated.fetch_add(1, Ordering::SeqCst);
        if filter.filter_type != EQUALS {
            return Ok(false);
        }
        let field = filter.data.get("field").and_then(Value::as_str);
        let value = filter.data.get("value").and_then(Value::as_str);
        Ok(matches!((field, value), (Some(f), Some(_)) if !f.is_empty()))
    }

    fn create_filter(&self, spec: &str) -> Result<ProcessedFilter, StratoError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        let (field, value) = spec.split_once('=').ok_or_else(|| {
            StratoError::Validation(format!("expected `field=value`, got `{spec}`"))
        })?;
        let field = field.trim();
        if field.is_empty() {
            return Err(StratoError::Validation(format!(
                "missing field name in `{spec}`"
            )));
        }
        Ok(ProcessedFilter::new(
            EQUALS,
            json!({ "field": field, "value": value.trim() }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_equals_filter() {
        let filter = EqualsFilter::new();
        let processed = filter.create_filter("email = a@x.com").unwrap();
        assert_eq!(processed.filter_type, EQUALS);
        assert_eq!(processed.data, json!({"field": "email", "value": "a@x.com"}));
        assert!(filter.validate_filter(&processed).unwrap());
    }

    #[test]
    fn value_may_contain_equals_sign() {
        let processed = EqualsFilter::new().create_filter("token=a=b").unwrap();
        assert_eq!(processed.data["value"], "a=b");
    }

    #[test]
    fn malformed_specs_are_rejected() {
        let filter = EqualsFilter::new();
        assert!(filter.create_filter("no-separator").is_err());
        assert!(filter.create_filter("=value").is_err());
        assert_eq!(filter.created(), 2);
    }

    #[test]
    fn foreign_filters_do_not_validate() {
        let filter = EqualsFilter::new();
        let foreign = ProcessedFilter::new("range", json!({"field": "age"}));
        assert!(!filter.validate_filter(&foreign).unwrap());
        let empty_field = ProcessedFilter::new(EQUALS, json!({"field": "", "value": "x"}));
        assert!(!filter.validate_filter(&empty_field).unwrap());
    }
}
