// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The composition root.
//!
//! `Registry` stores facades, storages, and filters in three independent
//! namespaces keyed by name, and records which filters may be used against
//! which storages. It is constructed once by the host and shared as
//! `Arc<Registry>` with plugin entrypoints, facades, and the supervisor.

use std::collections::BTreeSet;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use strato_config::model::AssociationConfig;
use strato_core::{
    ComponentKind, Facade, Filter, LifecycleState, Registrar, Storage, StratoError,
};
use tracing::{debug, info, warn};

/// A registered component together with its lifecycle state.
struct Slot<T: ?Sized> {
    component: Arc<T>,
    state: LifecycleState,
}

/// A type-erased handle used by the supervisor to drive lifecycle hooks.
#[derive(Clone)]
pub(crate) enum Handle {
    Facade(Arc<dyn Facade>),
    Storage(Arc<dyn Storage>),
    Filter(Arc<dyn Filter>),
}

impl Handle {
    pub(crate) async fn initialize(&self) -> Result<(), StratoError> {
        match self {
            Handle::Facade(c) => c.initialize().await,
            Handle::Storage(c) => c.initialize().await,
            Handle::Filter(c) => c.initialize().await,
        }
    }

    pub(crate) async fn start(&self) -> Result<(), StratoError> {
        match self {
            Handle::Facade(c) => c.start().await,
            Handle::Storage(c) => c.start().await,
            Handle::Filter(c) => c.start().await,
        }
    }

    pub(crate) async fn stop(&self) -> Result<(), StratoError> {
        match self {
            Handle::Facade(c) => c.stop().await,
            Handle::Storage(c) => c.stop().await,
            Handle::Filter(c) => c.stop().await,
        }
    }
}

/// Registry of named facades, storages, and filters plus filter associations.
///
/// Each namespace is a sharded concurrent map, so lookups made by facades at
/// request time are never blocked behind registration of an unrelated name.
pub struct Registry {
    facades: DashMap<String, Slot<dyn Facade>>,
    storages: DashMap<String, Slot<dyn Storage>>,
    filters: DashMap<String, Slot<dyn Filter>>,
    /// storage name -> filter names permitted against it
    associations: DashMap<String, BTreeSet<String>>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            facades: DashMap::new(),
            storages: DashMap::new(),
            filters: DashMap::new(),
            associations: DashMap::new(),
        }
    }

    /// Register a facade.
    ///
    /// Fails with [`StratoError::DuplicateRegistration`] if the name is taken;
    /// the existing entry is left untouched.
    pub fn register_facade(&self, name: &str, facade: Arc<dyn Facade>) -> Result<(), StratoError> {
        insert(&self.facades, ComponentKind::Facade, name, facade)
    }

    /// Register a storage. Same duplicate rules as [`Registry::register_facade`].
    pub fn register_storage(
        &self,
        name: &str,
        storage: Arc<dyn Storage>,
    ) -> Result<(), StratoError> {
        insert(&self.storages, ComponentKind::Storage, name, storage)
    }

    /// Register a filter. Same duplicate rules as [`Registry::register_facade`].
    pub fn register_filter(&self, name: &str, filter: Arc<dyn Filter>) -> Result<(), StratoError> {
        insert(&self.filters, ComponentKind::Filter, name, filter)
    }

    /// Permit `filter` to be used against `storage`.
    ///
    /// Both names must already be registered. Associating the same pair twice
    /// is a no-op.
    pub fn associate_filter(&self, filter: &str, storage: &str) -> Result<(), StratoError> {
        if !self.filters.contains_key(filter) {
            return Err(unknown(ComponentKind::Filter, filter));
        }
        if !self.storages.contains_key(storage) {
            return Err(unknown(ComponentKind::Storage, storage));
        }

        let inserted = self
            .associations
            .entry(storage.to_string())
            .or_default()
            .insert(filter.to_string());

        if inserted {
            info!(filter, storage, "filter associated with storage");
        } else {
            debug!(filter, storage, "filter already associated with storage");
        }
        Ok(())
    }

    /// Apply associations declared in configuration, stopping at the first
    /// one that references an unregistered name.
    pub fn apply_associations(&self, associations: &[AssociationConfig]) -> Result<(), StratoError> {
        associations
            .iter()
            .try_for_each(|a| self.associate_filter(&a.filter, &a.storage))
    }

    /// Returns true if `filter` may be used against `storage`.
    pub fn is_associated(&self, filter: &str, storage: &str) -> bool {
        self.associations
            .get(storage)
            .is_some_and(|filters| filters.contains(filter))
    }

    /// Filters associated with `storage`, sorted by name.
    pub fn filters_for(&self, storage: &str) -> Vec<String> {
        self.associations
            .get(storage)
            .map(|filters| filters.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Every `(filter, storage)` association, sorted.
    pub fn associations(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .associations
            .iter()
            .flat_map(|entry| {
                let storage = entry.key().clone();
                entry
                    .value()
                    .iter()
                    .map(|filter| (filter.clone(), storage.clone()))
                    .collect::<Vec<_>>()
            })
            .collect();
        pairs.sort();
        pairs
    }

    /// Look up a facade by name.
    pub fn facade(&self, name: &str) -> Result<Arc<dyn Facade>, StratoError> {
        lookup(&self.facades, ComponentKind::Facade, name)
    }

    /// Look up a storage by name.
    pub fn storage(&self, name: &str) -> Result<Arc<dyn Storage>, StratoError> {
        lookup(&self.storages, ComponentKind::Storage, name)
    }

    /// Look up a filter by name.
    pub fn filter(&self, name: &str) -> Result<Arc<dyn Filter>, StratoError> {
        lookup(&self.filters, ComponentKind::Filter, name)
    }

    /// Returns true if `name` is registered in the `kind` namespace.
    pub fn contains(&self, kind: ComponentKind, name: &str) -> bool {
        match kind {
            ComponentKind::Facade => self.facades.contains_key(name),
            ComponentKind::Storage => self.storages.contains_key(name),
            ComponentKind::Filter => self.filters.contains_key(name),
        }
    }

    /// Registered names in the `kind` namespace, sorted.
    pub fn names(&self, kind: ComponentKind) -> Vec<String> {
        let mut names: Vec<String> = match kind {
            ComponentKind::Facade => self.facades.iter().map(|e| e.key().clone()).collect(),
            ComponentKind::Storage => self.storages.iter().map(|e| e.key().clone()).collect(),
            ComponentKind::Filter => self.filters.iter().map(|e| e.key().clone()).collect(),
        };
        names.sort();
        names
    }

    /// Current lifecycle state of a component, or `None` if not registered.
    pub fn state(&self, kind: ComponentKind, name: &str) -> Option<LifecycleState> {
        match kind {
            ComponentKind::Facade => self.facades.get(name).map(|s| s.state),
            ComponentKind::Storage => self.storages.get(name).map(|s| s.state),
            ComponentKind::Filter => self.filters.get(name).map(|s| s.state),
        }
    }

    /// Total number of registered components across all namespaces.
    pub fn len(&self) -> usize {
        self.facades.len() + self.storages.len() + self.filters.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handles for every component of `kind`, sorted by name.
    pub(crate) fn handles(&self, kind: ComponentKind) -> Vec<(String, Handle)> {
        let mut handles: Vec<(String, Handle)> = match kind {
            ComponentKind::Facade => self
                .facades
                .iter()
                .map(|e| (e.key().clone(), Handle::Facade(e.component.clone())))
                .collect(),
            ComponentKind::Storage => self
                .storages
                .iter()
                .map(|e| (e.key().clone(), Handle::Storage(e.component.clone())))
                .collect(),
            ComponentKind::Filter => self
                .filters
                .iter()
                .map(|e| (e.key().clone(), Handle::Filter(e.component.clone())))
                .collect(),
        };
        handles.sort_by(|a, b| a.0.cmp(&b.0));
        handles
    }

    /// Move a component to `to`, provided its current state is one of `from`.
    ///
    /// Returns the state the component was in.
    pub(crate) fn transition(
        &self,
        kind: ComponentKind,
        name: &str,
        from: &[LifecycleState],
        to: LifecycleState,
    ) -> Result<LifecycleState, StratoError> {
        let apply = |state: &mut LifecycleState| {
            let previous = *state;
            if from.contains(&previous) {
                *state = to;
                Ok(previous)
            } else {
                Err(StratoError::Lifecycle {
                    kind,
                    name: name.to_string(),
                    message: format!("cannot move from {previous} to {to}"),
                })
            }
        };

        let result = match kind {
            ComponentKind::Facade => self.facades.get_mut(name).map(|mut s| apply(&mut s.state)),
            ComponentKind::Storage => self.storages.get_mut(name).map(|mut s| apply(&mut s.state)),
            ComponentKind::Filter => self.filters.get_mut(name).map(|mut s| apply(&mut s.state)),
        };
        result.unwrap_or_else(|| Err(unknown(kind, name)))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("facades", &self.names(ComponentKind::Facade))
            .field("storages", &self.names(ComponentKind::Storage))
            .field("filters", &self.names(ComponentKind::Filter))
            .field("associations", &self.associations())
            .finish()
    }
}

impl Registrar for Registry {
    fn register_facade(&self, name: &str, facade: Arc<dyn Facade>) -> Result<(), StratoError> {
        Registry::register_facade(self, name, facade)
    }

    fn register_storage(&self, name: &str, storage: Arc<dyn Storage>) -> Result<(), StratoError> {
        Registry::register_storage(self, name, storage)
    }

    fn register_filter(&self, name: &str, filter: Arc<dyn Filter>) -> Result<(), StratoError> {
        Registry::register_filter(self, name, filter)
    }

    fn associate_filter(&self, filter: &str, storage: &str) -> Result<(), StratoError> {
        Registry::associate_filter(self, filter, storage)
    }
}

fn unknown(kind: ComponentKind, name: &str) -> StratoError {
    StratoError::UnknownReference {
        kind,
        name: name.to_string(),
    }
}

fn insert<T: ?Sized>(
    map: &DashMap<String, Slot<T>>,
    kind: ComponentKind,
    name: &str,
    component: Arc<T>,
) -> Result<(), StratoError> {
    if name.trim().is_empty() {
        return Err(StratoError::Validation(format!(
            "{kind} name must not be empty"
        )));
    }

    match map.entry(name.to_string()) {
        Entry::Occupied(_) => {
            warn!(%kind, component = name, "rejected duplicate registration");
            Err(StratoError::DuplicateRegistration {
                kind,
                name: name.to_string(),
            })
        }
        Entry::Vacant(slot) => {
            slot.insert(Slot {
                component,
                state: LifecycleState::Uninitialized,
            });
            debug!(%kind, component = name, "component registered");
            Ok(())
        }
    }
}

fn lookup<T: ?Sized>(
    map: &DashMap<String, Slot<T>>,
    kind: ComponentKind,
    name: &str,
) -> Result<Arc<T>, StratoError> {
    map.get(name)
        .map(|slot| slot.component.clone())
        .ok_or_else(|| unknown(kind, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use strato_core::{Lifecycle, ProcessedFilter, Record};

    struct NoopFacade;

    #[async_trait]
    impl Lifecycle for NoopFacade {
        async fn initialize(&self) -> Result<(), StratoError> {
            Ok(())
        }
        async fn start(&self) -> Result<(), StratoError> {
            Ok(())
        }
        async fn stop(&self) -> Result<(), StratoError> {
            Ok(())
        }
    }

    impl Facade for NoopFacade {}

    struct NoopStorage;

    #[async_trait]
    impl Lifecycle for NoopStorage {
        async fn initialize(&self) -> Result<(), StratoError> {
            Ok(())
        }
        async fn start(&self) -> Result<(), StratoError> {
            Ok(())
        }
        async fn stop(&self) -> Result<(), StratoError> {
            Ok(())
        }
    }

    #[async_trait]
    impl Storage for NoopStorage {
        async fn get_resources(
            &self,
            _resource: &str,
            _filters: &[ProcessedFilter],
        ) -> Result<Vec<Record>, StratoError> {
            Ok(Vec::new())
        }
        async fn create_resources(
            &self,
            _resource: &str,
            _records: Vec<Record>,
        ) -> Result<(), StratoError> {
            Ok(())
        }
        async fn update_resources(
            &self,
            _resource: &str,
            _records: Vec<Record>,
            _filters: &[ProcessedFilter],
        ) -> Result<(), StratoError> {
            Ok(())
        }
        async fn delete_resources(
            &self,
            _resource: &str,
            _filters: &[ProcessedFilter],
        ) -> Result<(), StratoError> {
            Ok(())
        }
    }

    struct NoopFilter;

    #[async_trait]
    impl Lifecycle for NoopFilter {
        async fn initialize(&self) -> Result<(), StratoError> {
            Ok(())
        }
        async fn start(&self) -> Result<(), StratoError> {
            Ok(())
        }
        async fn stop(&self) -> Result<(), StratoError> {
            Ok(())
        }
    }

    impl Filter for NoopFilter {
        fn validate_filter(&self, _filter: &ProcessedFilter) -> Result<bool, StratoError> {
            Ok(true)
        }
        fn create_filter(&self, spec: &str) -> Result<ProcessedFilter, StratoError> {
            Ok(ProcessedFilter::new("noop", serde_json::json!(spec)))
        }
    }

    #[test]
    fn duplicate_registration_keeps_original() {
        let registry = Registry::new();
        let original: Arc<dyn Storage> = Arc::new(NoopStorage);
        registry
            .register_storage("users-db", original.clone())
            .unwrap();

        let err = registry
            .register_storage("users-db", Arc::new(NoopStorage))
            .unwrap_err();
        assert!(matches!(
            err,
            StratoError::DuplicateRegistration { kind: ComponentKind::Storage, ref name } if name == "users-db"
        ));

        let current = registry.storage("users-db").unwrap();
        assert!(Arc::ptr_eq(&original, &current));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn namespaces_are_independent() {
        let registry = Registry::new();
        registry.register_facade("auth", Arc::new(NoopFacade)).unwrap();
        registry.register_filter("auth", Arc::new(NoopFilter)).unwrap();
        registry.register_storage("auth", Arc::new(NoopStorage)).unwrap();

        assert!(registry.contains(ComponentKind::Facade, "auth"));
        assert!(registry.contains(ComponentKind::Filter, "auth"));
        assert!(registry.contains(ComponentKind::Storage, "auth"));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn empty_names_are_rejected() {
        let registry = Registry::new();
        let err = registry.register_filter("  ", Arc::new(NoopFilter)).unwrap_err();
        assert!(matches!(err, StratoError::Validation(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn associate_requires_both_endpoints() {
        let registry = Registry::new();
        registry.register_filter("by-email", Arc::new(NoopFilter)).unwrap();

        let err = registry.associate_filter("by-email", "users-db").unwrap_err();
        assert!(matches!(
            err,
            StratoError::UnknownReference { kind: ComponentKind::Storage, .. }
        ));

        registry.register_storage("users-db", Arc::new(NoopStorage)).unwrap();
        let err = registry.associate_filter("by-name", "users-db").unwrap_err();
        assert!(matches!(
            err,
            StratoError::UnknownReference { kind: ComponentKind::Filter, .. }
        ));
        assert!(registry.associations().is_empty());
    }

    #[test]
    fn associate_is_idempotent() {
        let registry = Registry::new();
        registry.register_filter("by-email", Arc::new(NoopFilter)).unwrap();
        registry.register_storage("users-db", Arc::new(NoopStorage)).unwrap();

        registry.associate_filter("by-email", "users-db").unwrap();
        let after_first = registry.associations();
        registry.associate_filter("by-email", "users-db").unwrap();

        assert_eq!(registry.associations(), after_first);
        assert_eq!(
            after_first,
            vec![("by-email".to_string(), "users-db".to_string())]
        );
    }

    #[test]
    fn associations_are_many_to_many() {
        let registry = Registry::new();
        registry.register_filter("by-email", Arc::new(NoopFilter)).unwrap();
        registry.register_filter("by-id", Arc::new(NoopFilter)).unwrap();
        registry.register_storage("users-db", Arc::new(NoopStorage)).unwrap();
        registry.register_storage("audit-db", Arc::new(NoopStorage)).unwrap();

        registry.associate_filter("by-email", "users-db").unwrap();
        registry.associate_filter("by-email", "audit-db").unwrap();
        registry.associate_filter("by-id", "users-db").unwrap();

        assert_eq!(registry.filters_for("users-db"), vec!["by-email", "by-id"]);
        assert_eq!(registry.filters_for("audit-db"), vec!["by-email"]);
        assert!(registry.is_associated("by-email", "audit-db"));
        assert!(!registry.is_associated("by-id", "audit-db"));
        assert!(registry.filters_for("orders-db").is_empty());
    }

    #[test]
    fn apply_associations_from_config() {
        let registry = Registry::new();
        registry.register_filter("by-email", Arc::new(NoopFilter)).unwrap();
        registry.register_storage("users-db", Arc::new(NoopStorage)).unwrap();

        let declared = vec![AssociationConfig {
            filter: "by-email".to_string(),
            storage: "users-db".to_string(),
        }];
        registry.apply_associations(&declared).unwrap();
        assert!(registry.is_associated("by-email", "users-db"));

        let bad = vec![AssociationConfig {
            filter: "by-email".to_string(),
            storage: "orders-db".to_string(),
        }];
        assert!(registry.apply_associations(&bad).is_err());
    }

    #[test]
    fn lookup_of_missing_name_is_unknown_reference() {
        let registry = Registry::new();
        assert!(matches!(
            registry.facade("http"),
            Err(StratoError::UnknownReference { kind: ComponentKind::Facade, .. })
        ));
        assert!(registry.state(ComponentKind::Facade, "http").is_none());
    }

    #[test]
    fn transitions_are_compare_and_set() {
        let registry = Registry::new();
        registry.register_filter("by-email", Arc::new(NoopFilter)).unwrap();
        assert_eq!(
            registry.state(ComponentKind::Filter, "by-email"),
            Some(LifecycleState::Uninitialized)
        );

        let err = registry
            .transition(
                ComponentKind::Filter,
                "by-email",
                &[LifecycleState::Initialized],
                LifecycleState::Started,
            )
            .unwrap_err();
        assert!(matches!(err, StratoError::Lifecycle { .. }));

        let previous = registry
            .transition(
                ComponentKind::Filter,
                "by-email",
                &[LifecycleState::Uninitialized],
                LifecycleState::Initialized,
            )
            .unwrap();
        assert_eq!(previous, LifecycleState::Uninitialized);
        assert_eq!(
            registry.state(ComponentKind::Filter, "by-email"),
            Some(LifecycleState::Initialized)
        );
    }

    #[test]
    fn registry_works_through_registrar_trait() {
        let registry = Registry::new();
        let registrar: &dyn Registrar = &registry;
        registrar.register_storage("users-db", Arc::new(NoopStorage)).unwrap();
        registrar.register_filter("by-email", Arc::new(NoopFilter)).unwrap();
        registrar.associate_filter("by-email", "users-db").unwrap();
        assert!(registry.is_associated("by-email", "users-db"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registration_of_one_name_admits_exactly_one() {
        let registry = Arc::new(Registry::new());
        let storages: Vec<Arc<dyn Storage>> =
            (0..16).map(|_| Arc::new(NoopStorage) as Arc<dyn Storage>).collect();

        let mut tasks = tokio::task::JoinSet::new();
        for storage in &storages {
            let registry = registry.clone();
            let storage = storage.clone();
            tasks.spawn(async move {
                let result = registry.register_storage("users-db", storage.clone());
                (storage, result)
            });
        }

        let mut winners = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (storage, result) = joined.unwrap();
            match result {
                Ok(()) => winners.push(storage),
                Err(e) => assert!(matches!(e, StratoError::DuplicateRegistration { .. })),
            }
        }

        assert_eq!(winners.len(), 1);
        let current = registry.storage("users-db").unwrap();
        assert!(Arc::ptr_eq(&winners[0], &current));
        assert_eq!(registry.len(), 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn reused_names_are_always_rejected(names in proptest::collection::vec("[a-z]{1,6}", 1..20)) {
                let registry = Registry::new();
                let mut seen = std::collections::HashSet::new();
                for name in &names {
                    let result = registry.register_filter(name, Arc::new(NoopFilter));
                    if seen.insert(name.clone()) {
                        prop_assert!(result.is_ok());
                    } else {
                        let is_duplicate = matches!(result, Err(StratoError::DuplicateRegistration { .. }));
                        prop_assert!(is_duplicate);
                    }
                }
                prop_assert_eq!(registry.names(ComponentKind::Filter).len(), seen.len());
            }
        }
    }
}
