// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Facade trait for components exposing resources to external callers.

use crate::traits::lifecycle::Lifecycle;

/// A request-facing component (HTTP listener, gRPC server, ...).
///
/// Facades translate inbound requests into storage and filter operations,
/// normally by calling the registry's dispatch methods so that filter
/// associations are enforced. [`Lifecycle::start`] must block until the
/// facade is told to stop or hits a fatal error; a startup failure such as a
/// bind error is returned and is not retried by the host.
pub trait Facade: Lifecycle {}
