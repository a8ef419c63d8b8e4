// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Strato plugin framework.
//!
//! This crate provides the capability contracts (facade, storage, filter,
//! plugin), error types, and common types used throughout the Strato
//! workspace. Every plugin component implements traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::StratoError;
pub use types::{
    ComponentKind, FilterRequest, LifecycleStage, LifecycleState, ProcessedFilter, Record,
    StartMode,
};

// Re-export all capability traits at crate root.
pub use traits::{Facade, Filter, Lifecycle, Plugin, Registrar, Storage};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strato_error_has_all_variants() {
        let _config = StratoError::Config("test".into());
        let _dup = StratoError::DuplicateRegistration {
            kind: ComponentKind::Facade,
            name: "test".into(),
        };
        let _unknown = StratoError::UnknownReference {
            kind: ComponentKind::Storage,
            name: "test".into(),
        };
        let _validation = StratoError::Validation("test".into());
        let _backend = StratoError::Backend {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _not_found = StratoError::NotFound {
            resource: "user".into(),
        };
        let _timeout = StratoError::LifecycleTimeout {
            kind: ComponentKind::Storage,
            name: "test".into(),
            stage: LifecycleStage::Stop,
            duration: std::time::Duration::from_secs(30),
        };
        let _policy = StratoError::PolicyViolation {
            filter: "f".into(),
            storage: "s".into(),
        };
        let _lifecycle = StratoError::Lifecycle {
            kind: ComponentKind::Filter,
            name: "test".into(),
            message: "not initialized".into(),
        };
        let _internal = StratoError::Internal("test".into());
    }

    #[test]
    fn all_trait_modules_are_exported() {
        // Fails to compile if any capability trait is missing from the public API.
        fn _assert_plugin<T: Plugin>() {}
        fn _assert_registrar<T: Registrar>() {}
        fn _assert_lifecycle<T: Lifecycle>() {}
        fn _assert_facade<T: Facade>() {}
        fn _assert_storage<T: Storage>() {}
        fn _assert_filter<T: Filter>() {}
    }

    #[test]
    fn traits_are_object_safe() {
        fn _facade(_: &dyn Facade) {}
        fn _storage(_: &dyn Storage) {}
        fn _filter(_: &dyn Filter) {}
        fn _plugin(_: &dyn Plugin) {}
        fn _registrar(_: &dyn Registrar) {}
    }
}
