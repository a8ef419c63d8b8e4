// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base lifecycle trait shared by every registered component.

use async_trait::async_trait;

use crate::error::StratoError;

/// Lifecycle hooks driven by the host, in the order
/// `initialize` → `start` → `stop`, each exactly once.
///
/// Whether `start` blocks depends on the capability: see
/// [`ComponentKind::start_mode`](crate::types::ComponentKind::start_mode).
/// Facades and storages block until stopped, filters return promptly.
#[async_trait]
pub trait Lifecycle: Send + Sync + 'static {
    /// Allocates internal state and validates configuration.
    async fn initialize(&self) -> Result<(), StratoError>;

    /// Starts the component.
    async fn start(&self) -> Result<(), StratoError>;

    /// Stops the component. The host gives this 30 seconds by default and
    /// proceeds with teardown regardless once the deadline passes.
    async fn stop(&self) -> Result<(), StratoError>;
}
