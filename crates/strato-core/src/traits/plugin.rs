// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait for loadable modules and the registration surface handed to them.

use std::sync::Arc;

use crate::error::StratoError;
use crate::traits::{Facade, Filter, Storage};

/// The registration surface a plugin sees during [`Plugin::entrypoint`].
///
/// Names are unique per namespace; the facade, storage, and filter
/// namespaces are independent of each other.
pub trait Registrar: Send + Sync {
    /// Registers a facade under `name`.
    fn register_facade(&self, name: &str, facade: Arc<dyn Facade>) -> Result<(), StratoError>;

    /// Registers a storage under `name`.
    fn register_storage(&self, name: &str, storage: Arc<dyn Storage>) -> Result<(), StratoError>;

    /// Registers a filter under `name`.
    fn register_filter(&self, name: &str, filter: Arc<dyn Filter>) -> Result<(), StratoError>;

    /// Permits `filter` to be used against `storage`. Both must already be registered.
    fn associate_filter(&self, filter: &str, storage: &str) -> Result<(), StratoError>;
}

/// A loadable module.
///
/// Every plugin has a stable, non-empty name and a single entrypoint that the
/// host invokes once to let the plugin register its components.
pub trait Plugin: Send + Sync + 'static {
    /// Returns the plugin's unique display name.
    fn name(&self) -> &str;

    /// Hands control to the plugin.
    ///
    /// There is no error channel: a plugin that cannot complete registration
    /// simply leaves its components unregistered, and callers must not assume
    /// success.
    fn entrypoint(&self, registrar: &dyn Registrar);
}
