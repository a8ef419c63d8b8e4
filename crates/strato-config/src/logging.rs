// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracing subscriber setup for hosts.
//!
//! Library crates only emit events; a host calls [`init_tracing`] once at
//! startup. `RUST_LOG` takes precedence over `[host] log_level`.

use tracing_subscriber::EnvFilter;

use crate::model::HostConfig;

/// Crate targets that follow the configured level. Everything else logs at `warn`.
const STRATO_TARGETS: &[&str] = &["strato_core", "strato_config", "strato_registry"];

/// Default filter directives for `log_level`.
pub fn default_directives(log_level: &str) -> String {
    let level = log_level.to_ascii_lowercase();
    let mut directives: Vec<String> = STRATO_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect();
    directives.push("warn".to_string());
    directives.join(",")
}

/// Build the filter: `RUST_LOG` if set and valid, else the host level.
pub fn env_filter(host: &HostConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&host.log_level)))
}

/// Install a global fmt subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(
    host: &HostConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(host))
        .with_target(true)
        .with_thread_names(false)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_every_crate() {
        let directives = default_directives("DEBUG");
        assert_eq!(
            directives,
            "strato_core=debug,strato_config=debug,strato_registry=debug,warn"
        );
    }

    #[test]
    fn directives_parse_as_filter() {
        let filter = EnvFilter::try_new(default_directives("trace"));
        assert!(filter.is_ok());
    }
}
