// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock facade bound to a single storage.
//!
//! `MockFacade` stands in for a protocol front-end: its request helpers go
//! through the registry's dispatch methods, so association policy applies
//! exactly as it would for a real facade.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use strato_core::{Facade, FilterRequest, Lifecycle, Record, StratoError};
use strato_registry::Registry;

/// A facade that serves requests against one storage until stopped.
pub struct MockFacade {
    registry: Weak<Registry>,
    storage: String,
    shutdown: CancellationToken,
    requests: AtomicUsize,
}

impl MockFacade {
    /// Create a facade serving `storage` from `registry`.
    ///
    /// Holds the registry weakly since the registry owns the facade.
    pub fn new(registry: &Arc<Registry>, storage: impl Into<String>) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            storage: storage.into(),
            shutdown: CancellationToken::new(),
            requests: AtomicUsize::new(0),
        }
    }

    /// Name of the bound storage.
    pub fn storage(&self) -> &str {
        &self.storage
    }

    /// Number of requests handled, successful or not.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub async fn get(
        &self,
        resource: &str,
        filters: &[FilterRequest],
    ) -> Result<Vec<Record>, StratoError> {
        let registry = self.begin_request()?;
        registry.get_resources(&self.storage, resource, filters).await
    }

    pub async fn create(&self, resource: &str, records: Vec<Record>) -> Result<(), StratoError> {
        let registry = self.begin_request()?;
        registry.create_resources(&self.storage, resource, records).await
    }

    pub async fn update(
        &self,
        resource: &str,
        records: Vec<Record>,
        filters: &[FilterRequest],
    ) -> Result<(), StratoError> {
        let registry = self.begin_request()?;
        registry
            .update_resources(&self.storage, resource, records, filters)
            .await
    }

    pub async fn delete(&self, resource: &str, filters: &[FilterRequest]) -> Result<(), StratoError> {
        let registry = self.begin_request()?;
        registry.delete_resources(&self.storage, resource, filters).await
    }

    fn begin_request(&self) -> Result<Arc<Registry>, StratoError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.registry()
    }

    fn registry(&self) -> Result<Arc<Registry>, StratoError> {
        self.registry
            .upgrade()
            .ok_or_else(|| StratoError::Internal("registry dropped".to_string()))
    }
}

#[async_trait]
impl Lifecycle for MockFacade {
    async fn initialize(&self) -> Result<(), StratoError> {
        let registry = self.registry()?;
        registry.storage(&self.storage).map_err(|_| {
            StratoError::Config(format!(
                "facade bound to unregistered storage `{}`",
                self.storage
            ))
        })?;
        Ok(())
    }

    async fn start(&self) -> Result<(), StratoError> {
        self.shutdown.cancelled().await;
        Ok(())
    }

    async fn stop(&self) -> Result<(), StratoError> {
        self.shutdown.cancel();
        Ok(())
    }
}

impl Facade for MockFacade {}
