// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./strato.toml` > `~/.config/strato/strato.toml` > `/etc/strato/strato.toml`
//! with environment variable overrides via `STRATO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use tracing::debug;

use crate::model::StratoConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/strato/strato.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "strato.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/strato/strato.toml` (system-wide)
/// 3. `~/.config/strato/strato.toml` (user XDG config)
/// 4. `./strato.toml` (local directory)
/// 5. `STRATO_*` environment variables
pub fn load_config() -> Result<StratoConfig, figment::Error> {
    let config: StratoConfig = build_figment().extract()?;
    debug!(
        host = %config.host.name,
        associations = config.associations.len(),
        "configuration loaded"
    );
    Ok(config)
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<StratoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StratoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<StratoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StratoConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(StratoConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Path of the per-user configuration file, if the platform has a config directory.
pub fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("strato/strato.toml"))
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that underscore-containing
/// keys survive: `STRATO_LIFECYCLE_STOP_TIMEOUT_SECS` must map to
/// `lifecycle.stop_timeout_secs`, not `lifecycle.stop.timeout.secs`.
fn env_provider() -> Env {
    // figment strips the prefix but keeps the original case of the rest.
    Env::prefixed("STRATO_").map(|key| map_env_key(key.as_str()).into())
}

/// Sections that take env overrides, as `(env prefix, dotted prefix)`.
const ENV_SECTIONS: &[(&str, &str)] = &[
    ("host_", "host."),
    ("lifecycle_", "lifecycle."),
    ("plugins_", "plugins."),
];

/// Map a prefix-stripped env var name onto its dotted config path.
///
/// Only a leading section name is rewritten; the remainder keeps its
/// underscores. Keys outside any section pass through lowercased.
fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    ENV_SECTIONS
        .iter()
        .find_map(|(env, dotted)| key.strip_prefix(env).map(|rest| format!("{dotted}{rest}")))
        .unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("host_log_level"), "host.log_level");
        assert_eq!(
            map_env_key("lifecycle_stop_timeout_secs"),
            "lifecycle.stop_timeout_secs"
        );
        assert_eq!(map_env_key("plugins_users"), "plugins.users");
    }

    #[test]
    fn env_keys_are_case_insensitive() {
        assert_eq!(
            map_env_key("LIFECYCLE_STOP_TIMEOUT_SECS"),
            "lifecycle.stop_timeout_secs"
        );
        assert_eq!(map_env_key("HOST_NAME"), "host.name");
    }

    #[test]
    fn only_leading_section_is_rewritten() {
        assert_eq!(map_env_key("plugins_ghost_cache"), "plugins.ghost_cache");
        assert_eq!(map_env_key("plugins_lifecycle_host_x"), "plugins.lifecycle_host_x");
    }

    #[test]
    fn env_overrides_apply_to_file_config() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "strato.toml",
                r#"
[host]
name = "catalog"

[lifecycle]
stop_timeout_secs = 10
"#,
            )?;
            jail.set_env("STRATO_LIFECYCLE_STOP_TIMEOUT_SECS", "45");
            jail.set_env("STRATO_HOST_LOG_LEVEL", "debug");
            jail.set_env("STRATO_PLUGINS_GHOST_CACHE", "false");

            let config = load_config_from_path(Path::new("strato.toml"))?;
            assert_eq!(config.host.name, "catalog");
            assert_eq!(config.host.log_level, "debug");
            assert_eq!(config.lifecycle.stop_timeout_secs, 45);
            assert_eq!(config.plugins.get("ghost_cache"), Some(&false));
            Ok(())
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        // Inside a jail so env overrides set by other tests cannot leak in.
        figment::Jail::expect_with(|_jail| {
            let config = load_config_from_path(Path::new("/nonexistent/strato.toml"))?;
            assert_eq!(config.lifecycle.stop_timeout_secs, 30);
            Ok(())
        });
    }
}
