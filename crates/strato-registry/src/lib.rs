// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Component registry, request dispatch, lifecycle supervisor, and plugin loader.
//!
//! Plugins register facades, storages, and filters into a shared [`Registry`]
//! by name. Filters are associated with the storages they may be used
//! against, and every facade request is routed through the registry so that
//! the association policy is enforced. The [`Supervisor`] drives every
//! registered component through initialize, start, and an ordered,
//! deadline-bounded stop.

mod dispatch;
pub mod loader;
pub mod manifest;
pub mod registry;
pub mod shutdown;
pub mod supervisor;

pub use loader::{LoadOutcome, LoadReport, PluginEntry, PluginLoader, PluginStatus};
pub use manifest::{parse_plugin_manifest, PluginManifest};
pub use registry::Registry;
pub use shutdown::install_signal_handler;
pub use supervisor::{ComponentExit, ComponentReport, ShutdownReport, StopOutcome, Supervisor};
