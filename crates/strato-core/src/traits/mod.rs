// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability trait definitions for the Strato plugin architecture.
//!
//! Facades, storages, and filters all extend the [`Lifecycle`] base trait and
//! use `#[async_trait]` for dynamic dispatch compatibility. Loadable modules
//! implement [`Plugin`] and register their components through a [`Registrar`].

pub mod facade;
pub mod filter;
pub mod lifecycle;
pub mod plugin;
pub mod storage;

pub use facade::Facade;
pub use filter::Filter;
pub use lifecycle::Lifecycle;
pub use plugin::{Plugin, Registrar};
pub use storage::Storage;
