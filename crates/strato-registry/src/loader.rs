// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin loader.
//!
//! `PluginLoader` holds the plugins a host has linked in, keyed by name,
//! together with an optional manifest and an enable switch. Loading runs each
//! enabled plugin's entrypoint exactly once against the registry and then
//! checks that everything the manifest declares was registered by that
//! plugin. A name already owned by another plugin does not count.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex};

use strato_core::{ComponentKind, Facade, Filter, Plugin, Registrar, Storage, StratoError};
use tracing::{info, warn};

use crate::manifest::PluginManifest;
use crate::registry::Registry;

/// Status of a plugin in the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginStatus {
    /// Entrypoint will run on the next load.
    Enabled,
    /// Explicitly disabled by configuration.
    Disabled,
}

impl fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginStatus::Enabled => write!(f, "enabled"),
            PluginStatus::Disabled => write!(f, "disabled"),
        }
    }
}

/// What happened to a plugin during [`PluginLoader::load_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Entrypoint ran and every declared component is registered.
    Loaded,
    /// Plugin is disabled; entrypoint not run.
    Skipped,
    /// Entrypoint already ran in an earlier load.
    AlreadyLoaded,
    /// Entrypoint ran but some components are missing: declared in the
    /// manifest and not registered by this plugin, or (without a manifest)
    /// rejected by the registry.
    Incomplete { missing: Vec<(ComponentKind, String)> },
}

/// Per-plugin load result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub plugin: String,
    pub outcome: LoadOutcome,
}

/// A single plugin held by the loader.
pub struct PluginEntry {
    /// The plugin module.
    pub plugin: Box<dyn Plugin>,
    /// What the plugin declares it registers, if known.
    pub manifest: Option<PluginManifest>,
    /// Current status.
    pub status: PluginStatus,
    /// Whether the entrypoint has already run.
    pub loaded: bool,
}

impl fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginEntry")
            .field("plugin", &self.plugin.name())
            .field("manifest", &self.manifest)
            .field("status", &self.status)
            .field("loaded", &self.loaded)
            .finish()
    }
}

/// Loader for plugin modules.
#[derive(Debug, Default)]
pub struct PluginLoader {
    entries: HashMap<String, PluginEntry>,
}

impl PluginLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an enabled plugin.
    pub fn add(
        &mut self,
        plugin: Box<dyn Plugin>,
        manifest: Option<PluginManifest>,
    ) -> Result<(), StratoError> {
        self.add_with_status(plugin, manifest, PluginStatus::Enabled)
    }

    /// Add a plugin with an explicit status.
    ///
    /// The plugin name must be non-empty, unique within the loader, and match
    /// the manifest name when a manifest is given.
    pub fn add_with_status(
        &mut self,
        plugin: Box<dyn Plugin>,
        manifest: Option<PluginManifest>,
        status: PluginStatus,
    ) -> Result<(), StratoError> {
        let name = plugin.name().to_string();
        if name.trim().is_empty() {
            return Err(StratoError::Validation(
                "plugin name must not be empty".to_string(),
            ));
        }
        if let Some(manifest) = &manifest
            && manifest.name != name
        {
            return Err(StratoError::Config(format!(
                "plugin `{name}` has a manifest for `{}`",
                manifest.name
            )));
        }
        if self.entries.contains_key(&name) {
            return Err(StratoError::Config(format!(
                "plugin `{name}` is already added"
            )));
        }

        self.entries.insert(
            name,
            PluginEntry {
                plugin,
                manifest,
                status,
                loaded: false,
            },
        );
        Ok(())
    }

    /// Get a plugin entry by name.
    pub fn get(&self, name: &str) -> Option<&PluginEntry> {
        self.entries.get(name)
    }

    /// All entries, sorted by name.
    pub fn list_all(&self) -> Vec<&PluginEntry> {
        let mut entries: Vec<&PluginEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.plugin.name().cmp(b.plugin.name()));
        entries
    }

    /// Toggle a plugin's enabled status.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), StratoError> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| StratoError::Config(format!("unknown plugin `{name}`")))?;
        entry.status = if enabled {
            PluginStatus::Enabled
        } else {
            PluginStatus::Disabled
        };
        Ok(())
    }

    /// Apply the `[plugins]` switches from configuration.
    ///
    /// Returns the configured names that match no plugin; those are logged
    /// and otherwise ignored.
    pub fn apply_config(&mut self, switches: &BTreeMap<String, bool>) -> Vec<String> {
        let mut unknown = Vec::new();
        for (name, &enabled) in switches {
            if self.set_enabled(name, enabled).is_err() {
                warn!(plugin = %name, "configuration refers to an unknown plugin");
                unknown.push(name.clone());
            }
        }
        unknown
    }

    /// Run every enabled plugin's entrypoint against `registry`, in name order.
    pub fn load_all(&mut self, registry: &Registry) -> Vec<LoadReport> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();

        let mut reports = Vec::with_capacity(names.len());
        for name in names {
            let Some(entry) = self.entries.get_mut(&name) else {
                continue;
            };
            let outcome = load_entry(entry, registry);
            reports.push(LoadReport {
                plugin: name,
                outcome,
            });
        }

        let loaded = reports
            .iter()
            .filter(|r| r.outcome == LoadOutcome::Loaded)
            .count();
        info!(total = reports.len(), loaded, "plugins loaded");
        reports
    }

    /// Returns the number of plugins held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no plugins are held.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn load_entry(entry: &mut PluginEntry, registry: &Registry) -> LoadOutcome {
    let name = entry.plugin.name().to_string();
    if entry.status == PluginStatus::Disabled {
        info!(plugin = %name, "plugin disabled, skipping entrypoint");
        return LoadOutcome::Skipped;
    }
    if entry.loaded {
        return LoadOutcome::AlreadyLoaded;
    }

    let recorder = RecordingRegistrar::new(registry, &name);
    entry.plugin.entrypoint(&recorder);
    entry.loaded = true;
    let (registered, rejected) = recorder.into_parts();

    let missing: Vec<(ComponentKind, String)> = match &entry.manifest {
        Some(manifest) => manifest
            .components()
            .filter(|(kind, component)| !registered.contains(&(*kind, component.to_string())))
            .map(|(kind, component)| (kind, component.to_string()))
            .collect(),
        None => rejected,
    };

    if missing.is_empty() {
        info!(plugin = %name, "plugin loaded");
        LoadOutcome::Loaded
    } else {
        warn!(
            plugin = %name,
            missing = ?missing,
            "plugin did not register everything its manifest declares"
        );
        LoadOutcome::Incomplete { missing }
    }
}

/// Registrar handed to a single entrypoint call.
///
/// Delegates to the registry and remembers which registrations went through
/// and which were rejected.
struct RecordingRegistrar<'a> {
    registry: &'a Registry,
    plugin: &'a str,
    registered: Mutex<HashSet<(ComponentKind, String)>>,
    rejected: Mutex<Vec<(ComponentKind, String)>>,
}

impl<'a> RecordingRegistrar<'a> {
    fn new(registry: &'a Registry, plugin: &'a str) -> Self {
        Self {
            registry,
            plugin,
            registered: Mutex::new(HashSet::new()),
            rejected: Mutex::new(Vec::new()),
        }
    }

    fn record(
        &self,
        kind: ComponentKind,
        name: &str,
        result: Result<(), StratoError>,
    ) -> Result<(), StratoError> {
        match &result {
            Ok(()) => {
                if let Ok(mut registered) = self.registered.lock() {
                    registered.insert((kind, name.to_string()));
                }
            }
            Err(e) => {
                warn!(plugin = self.plugin, %kind, component = name, error = %e, "registration rejected");
                if let Ok(mut rejected) = self.rejected.lock() {
                    rejected.push((kind, name.to_string()));
                }
            }
        }
        result
    }

    fn into_parts(self) -> (HashSet<(ComponentKind, String)>, Vec<(ComponentKind, String)>) {
        let registered = self.registered.into_inner().unwrap_or_else(|e| e.into_inner());
        let rejected = self.rejected.into_inner().unwrap_or_else(|e| e.into_inner());
        (registered, rejected)
    }
}

impl Registrar for RecordingRegistrar<'_> {
    fn register_facade(&self, name: &str, facade: Arc<dyn Facade>) -> Result<(), StratoError> {
        let result = self.registry.register_facade(name, facade);
        self.record(ComponentKind::Facade, name, result)
    }

    fn register_storage(&self, name: &str, storage: Arc<dyn Storage>) -> Result<(), StratoError> {
        let result = self.registry.register_storage(name, storage);
        self.record(ComponentKind::Storage, name, result)
    }

    fn register_filter(&self, name: &str, filter: Arc<dyn Filter>) -> Result<(), StratoError> {
        let result = self.registry.register_filter(name, filter);
        self.record(ComponentKind::Filter, name, result)
    }

    fn associate_filter(&self, filter: &str, storage: &str) -> Result<(), StratoError> {
        self.registry.associate_filter(filter, storage).inspect_err(|e| {
            warn!(plugin = self.plugin, filter, storage, error = %e, "association rejected");
        })
    }
}
