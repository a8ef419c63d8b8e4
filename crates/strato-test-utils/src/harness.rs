// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end composition tests.
//!
//! `TestHarness` assembles a registry from in-memory storages, equality
//! filters, and mock facades, applies the requested associations, and hands
//! out a [`Supervisor`] configured with the harness lifecycle settings.

use std::collections::HashMap;
use std::sync::Arc;

use strato_config::model::LifecycleConfig;
use strato_core::StratoError;
use strato_registry::{Registry, Supervisor};

use crate::equals_filter::EqualsFilter;
use crate::memory_storage::MemoryStorage;
use crate::mock_facade::MockFacade;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    storages: Vec<(String, MemoryStorage)>,
    filters: Vec<String>,
    facades: Vec<(String, String)>,
    associations: Vec<(String, String)>,
    lifecycle: LifecycleConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            storages: Vec::new(),
            filters: Vec::new(),
            facades: Vec::new(),
            associations: Vec::new(),
            lifecycle: LifecycleConfig::default(),
        }
    }

    /// Register `storage` under `name`.
    pub fn with_storage(mut self, name: &str, storage: MemoryStorage) -> Self {
        self.storages.push((name.to_string(), storage));
        self
    }

    /// Register an [`EqualsFilter`] under `name`.
    pub fn with_filter(mut self, name: &str) -> Self {
        self.filters.push(name.to_string());
        self
    }

    /// Register a [`MockFacade`] under `name` bound to `storage`.
    pub fn with_facade(mut self, name: &str, storage: &str) -> Self {
        self.facades.push((name.to_string(), storage.to_string()));
        self
    }

    /// Associate `filter` with `storage` once everything is registered.
    pub fn with_association(mut self, filter: &str, storage: &str) -> Self {
        self.associations
            .push((filter.to_string(), storage.to_string()));
        self
    }

    /// Override the lifecycle deadlines used by [`TestHarness::supervisor`].
    pub fn with_lifecycle(mut self, lifecycle: LifecycleConfig) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Register everything and apply associations.
    pub fn build(self) -> Result<TestHarness, StratoError> {
        let registry = Arc::new(Registry::new());

        let mut storages = HashMap::new();
        for (name, storage) in self.storages {
            let storage = Arc::new(storage);
            registry.register_storage(&name, storage.clone())?;
            storages.insert(name, storage);
        }

        let mut filters = HashMap::new();
        for name in self.filters {
            let filter = Arc::new(EqualsFilter::new());
            registry.register_filter(&name, filter.clone())?;
            filters.insert(name, filter);
        }

        let mut facades = HashMap::new();
        for (name, storage) in self.facades {
            let facade = Arc::new(MockFacade::new(&registry, storage));
            registry.register_facade(&name, facade.clone())?;
            facades.insert(name, facade);
        }

        for (filter, storage) in &self.associations {
            registry.associate_filter(filter, storage)?;
        }

        Ok(TestHarness {
            registry,
            storages,
            filters,
            facades,
            lifecycle: self.lifecycle,
        })
    }
}

/// A registry populated with test components, plus typed handles to them.
pub struct TestHarness {
    /// The populated registry.
    pub registry: Arc<Registry>,
    storages: HashMap<String, Arc<MemoryStorage>>,
    filters: HashMap<String, Arc<EqualsFilter>>,
    facades: HashMap<String, Arc<MockFacade>>,
    lifecycle: LifecycleConfig,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn storage(&self, name: &str) -> Option<Arc<MemoryStorage>> {
        self.storages.get(name).cloned()
    }

    pub fn filter(&self, name: &str) -> Option<Arc<EqualsFilter>> {
        self.filters.get(name).cloned()
    }

    pub fn facade(&self, name: &str) -> Option<Arc<MockFacade>> {
        self.facades.get(name).cloned()
    }

    /// A supervisor over the harness registry.
    pub fn supervisor(&self) -> Supervisor {
        Supervisor::new(self.registry.clone(), self.lifecycle.clone())
    }
}

#[cfg(test)]
mod tests {
    use strato_core::ComponentKind;

    use super::*;

    #[test]
    fn build_registers_and_associates() {
        let harness = TestHarness::builder()
            .with_storage("users-db", MemoryStorage::new())
            .with_filter("by-email")
            .with_facade("api", "users-db")
            .with_association("by-email", "users-db")
            .build()
            .unwrap();

        assert_eq!(harness.registry.len(), 3);
        assert!(harness.registry.contains(ComponentKind::Facade, "api"));
        assert!(harness.registry.is_associated("by-email", "users-db"));
        assert!(harness.storage("users-db").is_some());
        assert!(harness.filter("by-email").is_some());
        assert_eq!(harness.facade("api").unwrap().storage(), "users-db");
    }

    #[test]
    fn build_fails_on_unknown_association() {
        let result = TestHarness::builder()
            .with_filter("by-email")
            .with_association("by-email", "users-db")
            .build();
        assert!(matches!(result, Err(StratoError::UnknownReference { .. })));
    }
}
