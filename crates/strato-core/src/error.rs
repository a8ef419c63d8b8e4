// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Strato plugin framework.

use std::time::Duration;

use thiserror::Error;

use crate::types::{ComponentKind, LifecycleStage};

/// The primary error type used across all Strato capability traits, the
/// registry, and lifecycle orchestration.
#[derive(Debug, Error)]
pub enum StratoError {
    /// Configuration errors (invalid TOML, missing prerequisites such as an
    /// unbound storage).
    #[error("configuration error: {0}")]
    Config(String),

    /// A name is already taken in the given namespace.
    #[error("{kind} `{name}` is already registered")]
    DuplicateRegistration { kind: ComponentKind, name: String },

    /// A name was referenced that is not registered in the given namespace.
    #[error("unknown {kind} `{name}`")]
    UnknownReference { kind: ComponentKind, name: String },

    /// A filter specification, resource record, or plugin name is structurally invalid.
    #[error("validation error: {0}")]
    Validation(String),

    /// An underlying storage or facade operation failed for reasons opaque to
    /// the contract.
    #[error("backend error: {message}")]
    Backend {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No records matched an operation that requires at least one match.
    #[error("no `{resource}` records matched")]
    NotFound { resource: String },

    /// A lifecycle stage exceeded its deadline.
    #[error("{kind} `{name}` did not finish {stage} within {duration:?}")]
    LifecycleTimeout {
        kind: ComponentKind,
        name: String,
        stage: LifecycleStage,
        duration: Duration,
    },

    /// A filter was used against a storage it is not associated with.
    #[error("filter `{filter}` is not associated with storage `{storage}`")]
    PolicyViolation { filter: String, storage: String },

    /// A lifecycle transition was requested out of order.
    #[error("{kind} `{name}`: {message}")]
    Lifecycle {
        kind: ComponentKind,
        name: String,
        message: String,
    },

    /// A component returned an error while being driven through a lifecycle stage.
    #[error("{kind} `{name}` failed during {stage}: {source}")]
    ComponentFailed {
        kind: ComponentKind,
        name: String,
        stage: LifecycleStage,
        source: Box<StratoError>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StratoError {
    /// Convenience constructor for a backend error without an underlying source.
    pub fn backend(message: impl Into<String>) -> Self {
        StratoError::Backend {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true for the errors the registry raises itself (duplicate
    /// registration, unknown reference, policy violation).
    pub fn is_registry_error(&self) -> bool {
        matches!(
            self,
            StratoError::DuplicateRegistration { .. }
                | StratoError::UnknownReference { .. }
                | StratoError::PolicyViolation { .. }
        )
    }
}
