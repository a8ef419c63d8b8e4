// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the capability traits and the registry.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One unit of stored data: an open mapping from field name to a dynamically
/// typed value.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Identifies which capability namespace a component belongs to.
///
/// Namespaces are independent: `"auth"` may name both a facade and a filter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Facade,
    Storage,
    Filter,
}

impl ComponentKind {
    /// How `start()` behaves for components of this kind.
    pub fn start_mode(self) -> StartMode {
        match self {
            ComponentKind::Facade | ComponentKind::Storage => StartMode::Blocking,
            ComponentKind::Filter => StartMode::Detached,
        }
    }
}

/// Whether a component's `start()` blocks for the component's lifetime or
/// returns promptly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum StartMode {
    /// `start()` resolves only once the component is stopped or fails.
    Blocking,
    /// `start()` returns immediately, optionally after spawning background work.
    Detached,
}

/// Linear lifecycle of a registered component. There is no re-entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
    Started,
    Stopped,
}

/// A lifecycle stage driven by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum LifecycleStage {
    Initialize,
    Start,
    Stop,
}

/// Backend-consumable form of a filter, produced by `Filter::create_filter`.
///
/// `filter_type` tags which filter kind produced the value so storages can
/// reject payloads they do not understand; `data` is filter-defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedFilter {
    pub filter_type: String,
    pub data: serde_json::Value,
}

impl ProcessedFilter {
    pub fn new(filter_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            filter_type: filter_type.into(),
            data,
        }
    }
}

/// A filter a caller wants applied to a storage operation: the registered
/// filter name plus the raw specification to hand to `create_filter`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRequest {
    pub filter: String,
    pub spec: String,
}

impl FilterRequest {
    pub fn new(filter: impl Into<String>, spec: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            spec: spec.into(),
        }
    }
}
