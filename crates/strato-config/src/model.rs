// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Strato host.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Strato configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StratoConfig {
    /// Host identity and logging settings.
    #[serde(default)]
    pub host: HostConfig,

    /// Lifecycle deadlines applied by the supervisor.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    /// Filter-to-storage associations applied after plugins have loaded.
    #[serde(default)]
    pub associations: Vec<AssociationConfig>,

    /// Per-plugin enable switches keyed by plugin name. Plugins not listed are enabled.
    #[serde(default)]
    pub plugins: BTreeMap<String, bool>,
}

/// Host identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// Display name of the host process.
    #[serde(default = "default_host_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            name: default_host_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_host_name() -> String {
    "strato".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Deadlines for lifecycle stages.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LifecycleConfig {
    /// Grace period for each component's `stop()` before the host moves on.
    #[serde(default = "default_stop_timeout_secs")]
    pub stop_timeout_secs: u64,

    /// How long a filter's non-blocking `start()` may take before it is
    /// treated as a contract violation.
    #[serde(default = "default_filter_start_timeout_secs")]
    pub filter_start_timeout_secs: u64,
}

impl LifecycleConfig {
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }

    pub fn filter_start_timeout(&self) -> Duration {
        Duration::from_secs(self.filter_start_timeout_secs)
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            stop_timeout_secs: default_stop_timeout_secs(),
            filter_start_timeout_secs: default_filter_start_timeout_secs(),
        }
    }
}

fn default_stop_timeout_secs() -> u64 {
    30
}

fn default_filter_start_timeout_secs() -> u64 {
    5
}

/// A single `[[associations]]` entry permitting `filter` to be used against `storage`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssociationConfig {
    /// Registered filter name.
    pub filter: String,
    /// Registered storage name.
    pub storage: String,
}
