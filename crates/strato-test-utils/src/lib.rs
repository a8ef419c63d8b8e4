// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Strato integration tests.
//!
//! Provides in-memory components and harness infrastructure for fast,
//! deterministic tests without external backends.
//!
//! # Components
//!
//! - [`MemoryStorage`] - In-memory storage with fault injection
//! - [`EqualsFilter`] - `field=value` equality filter
//! - [`MockFacade`] - Facade routing requests through the registry
//! - [`MockPlugin`] - Plugin with a closure entrypoint

pub mod equals_filter;
pub mod harness;
pub mod memory_storage;
pub mod mock_facade;
pub mod mock_plugin;

pub use equals_filter::{EqualsFilter, EQUALS};
pub use harness::{TestHarness, TestHarnessBuilder};
pub use memory_storage::{record_matches, CallCounts, MemoryStorage};
pub use mock_facade::MockFacade;
pub use mock_plugin::MockPlugin;
