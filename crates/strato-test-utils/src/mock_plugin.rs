// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Closure-driven plugin for loader tests.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use strato_core::{Plugin, Registrar};

type Entrypoint = Box<dyn Fn(&dyn Registrar) + Send + Sync>;

/// A plugin whose entrypoint runs a caller-supplied closure.
pub struct MockPlugin {
    name: String,
    entrypoint: Entrypoint,
    calls: Arc<AtomicUsize>,
}

impl MockPlugin {
    pub fn new(
        name: impl Into<String>,
        entrypoint: impl Fn(&dyn Registrar) + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            entrypoint: Box::new(entrypoint),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of times the entrypoint ran.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Shared call counter that stays readable after the plugin is boxed
    /// into a loader.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl fmt::Debug for MockPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockPlugin")
            .field("name", &self.name)
            .field("calls", &self.calls())
            .finish()
    }
}

impl Plugin for MockPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn entrypoint(&self, registrar: &dyn Registrar) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.entrypoint)(registrar);
    }
}
