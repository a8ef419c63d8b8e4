// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Strato plugin host.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use strato_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("stop timeout: {}s", config.lifecycle.stop_timeout_secs);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod logging;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError, ConfigSource};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use logging::init_tracing;
pub use model::{AssociationConfig, HostConfig, LifecycleConfig, StratoConfig};

/// Load configuration from the XDG hierarchy and validate it.
///
/// 1. Loads config from TOML files + env vars via Figment
/// 2. On success: runs post-deserialization validation
/// 3. On Figment error: converts to miette diagnostics with typo suggestions
pub fn load_and_validate() -> Result<StratoConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<StratoConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = [ConfigSource::new("<inline>", toml_content)];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Read every config file in the lookup hierarchy that exists, for span resolution.
fn collect_toml_sources() -> Vec<ConfigSource> {
    let local = std::env::current_dir()
        .map(|d| d.join(loader::LOCAL_CONFIG_FILE))
        .unwrap_or_else(|_| loader::LOCAL_CONFIG_FILE.into());

    [
        Some(local),
        loader::user_config_path(),
        Some(loader::SYSTEM_CONFIG_PATH.into()),
    ]
    .into_iter()
    .flatten()
    .filter_map(|path| {
        std::fs::read_to_string(&path)
            .ok()
            .map(|content| ConfigSource::new(path.display().to_string(), content))
    })
    .collect()
}
