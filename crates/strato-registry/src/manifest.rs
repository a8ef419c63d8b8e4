// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin manifest parsing from `plugin.toml` files.
//!
//! A manifest declares which facades, storages, and filters a plugin's
//! entrypoint is expected to register. Since entrypoints cannot report
//! errors, the loader compares the registry against the manifest to detect
//! plugins that failed to register.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strato_core::{ComponentKind, StratoError};

/// Parsed plugin manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Unique plugin name; must match [`Plugin::name`](strato_core::Plugin::name).
    pub name: String,
    /// Plugin version.
    pub version: semver::Version,
    /// Human-readable description.
    pub description: String,
    /// Optional author identifier.
    pub author: Option<String>,
    /// Facade names the entrypoint registers.
    pub facades: Vec<String>,
    /// Storage names the entrypoint registers.
    pub storages: Vec<String>,
    /// Filter names the entrypoint registers.
    pub filters: Vec<String>,
}

impl PluginManifest {
    /// Every declared component as `(kind, name)`.
    pub fn components(&self) -> impl Iterator<Item = (ComponentKind, &str)> {
        let facades = self.facades.iter().map(|n| (ComponentKind::Facade, n.as_str()));
        let storages = self.storages.iter().map(|n| (ComponentKind::Storage, n.as_str()));
        let filters = self.filters.iter().map(|n| (ComponentKind::Filter, n.as_str()));
        facades.chain(storages).chain(filters)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    plugin: PluginSection,
}

/// The `[plugin]` section of a `plugin.toml` file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PluginSection {
    name: String,
    version: String,
    #[serde(default)]
    description: String,
    author: Option<String>,
    #[serde(default)]
    facades: Vec<String>,
    #[serde(default)]
    storages: Vec<String>,
    #[serde(default)]
    filters: Vec<String>,
}

/// Parse a plugin manifest from TOML content.
///
/// Requires a non-empty name, a semver version, and non-empty, unique
/// component names within each namespace.
pub fn parse_plugin_manifest(toml_content: &str) -> Result<PluginManifest, StratoError> {
    let file: ManifestFile = toml::from_str(toml_content)
        .map_err(|e| StratoError::Config(format!("invalid plugin manifest: {e}")))?;
    let section = file.plugin;

    if section.name.trim().is_empty() {
        return Err(StratoError::Config(
            "plugin manifest: name must not be empty".to_string(),
        ));
    }

    let version = semver::Version::parse(&section.version).map_err(|e| {
        StratoError::Config(format!(
            "plugin manifest `{}`: invalid version '{}': {e}",
            section.name, section.version
        ))
    })?;

    let manifest = PluginManifest {
        name: section.name,
        version,
        description: section.description,
        author: section.author,
        facades: section.facades,
        storages: section.storages,
        filters: section.filters,
    };

    let mut seen = HashSet::new();
    for (kind, name) in manifest.components() {
        if name.trim().is_empty() {
            return Err(StratoError::Config(format!(
                "plugin manifest `{}`: empty {kind} name",
                manifest.name
            )));
        }
        if !seen.insert((kind, name)) {
            return Err(StratoError::Config(format!(
                "plugin manifest `{}`: {kind} `{name}` declared twice",
                manifest.name
            )));
        }
    }

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_manifest() {
        let toml = r#"
[plugin]
name = "users"
version = "0.3.1"
description = "User directory backed by an in-memory store"
author = "Strato Contributors"
storages = ["users-db"]
filters = ["by-email", "by-id"]
"#;
        let manifest = parse_plugin_manifest(toml).unwrap();
        assert_eq!(manifest.name, "users");
        assert_eq!(manifest.version, semver::Version::new(0, 3, 1));
        assert_eq!(manifest.author.as_deref(), Some("Strato Contributors"));
        assert!(manifest.facades.is_empty());

        let components: Vec<_> = manifest.components().collect();
        assert_eq!(
            components,
            vec![
                (ComponentKind::Storage, "users-db"),
                (ComponentKind::Filter, "by-email"),
                (ComponentKind::Filter, "by-id"),
            ]
        );
    }

    #[test]
    fn same_name_in_different_namespaces_is_allowed() {
        let toml = r#"
[plugin]
name = "auth"
version = "1.0.0"
facades = ["auth"]
filters = ["auth"]
"#;
        assert!(parse_plugin_manifest(toml).is_ok());
    }

    #[test]
    fn duplicate_component_is_rejected() {
        let toml = r#"
[plugin]
name = "users"
version = "1.0.0"
filters = ["by-email", "by-email"]
"#;
        let err = parse_plugin_manifest(toml).unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn invalid_version_is_rejected() {
        let toml = r#"
[plugin]
name = "users"
version = "one"
"#;
        let err = parse_plugin_manifest(toml).unwrap_err();
        assert!(err.to_string().contains("invalid version"));
    }

    #[test]
    fn empty_name_is_rejected() {
        let toml = r#"
[plugin]
name = ""
version = "1.0.0"
"#;
        assert!(parse_plugin_manifest(toml).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml = r#"
[plugin]
name = "users"
version = "1.0.0"
adapter_type = "Storage"
"#;
        assert!(parse_plugin_manifest(toml).is_err());
    }
}
