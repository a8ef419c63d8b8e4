// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request-time routing of resource operations through filters into storages.
//!
//! Facades call these methods instead of talking to storages directly so that
//! filter associations are enforced. Every policy check runs before any filter
//! or storage method is invoked.

use strato_core::{ComponentKind, FilterRequest, ProcessedFilter, Record, StratoError};
use tracing::{debug, warn};

use crate::registry::Registry;

impl Registry {
    /// Resolve `requests` into processed filters usable against `storage`.
    ///
    /// Checks, in order: the storage is registered, every requested filter is
    /// registered, and every requested filter is associated with the storage.
    /// Only then is each filter asked to `create_filter` and
    /// `validate_filter` its specification. A filter that rejects its own
    /// output yields [`StratoError::Validation`].
    pub fn resolve_filters(
        &self,
        storage: &str,
        requests: &[FilterRequest],
    ) -> Result<Vec<ProcessedFilter>, StratoError> {
        if !self.contains(ComponentKind::Storage, storage) {
            return Err(StratoError::UnknownReference {
                kind: ComponentKind::Storage,
                name: storage.to_string(),
            });
        }

        let mut filters = Vec::with_capacity(requests.len());
        for request in requests {
            let filter = self.filter(&request.filter)?;
            if !self.is_associated(&request.filter, storage) {
                warn!(
                    filter = %request.filter,
                    storage,
                    "rejected filter not associated with storage"
                );
                return Err(StratoError::PolicyViolation {
                    filter: request.filter.clone(),
                    storage: storage.to_string(),
                });
            }
            filters.push(filter);
        }

        requests
            .iter()
            .zip(filters)
            .map(|(request, filter)| {
                let processed = filter.create_filter(&request.spec)?;
                if !filter.validate_filter(&processed)? {
                    return Err(StratoError::Validation(format!(
                        "filter `{}` rejected specification `{}`",
                        request.filter, request.spec
                    )));
                }
                Ok(processed)
            })
            .collect()
    }

    /// Fetch `resource` records from `storage` matching every requested filter.
    pub async fn get_resources(
        &self,
        storage: &str,
        resource: &str,
        requests: &[FilterRequest],
    ) -> Result<Vec<Record>, StratoError> {
        let filters = self.resolve_filters(storage, requests)?;
        let backend = self.storage(storage)?;
        let records = backend.get_resources(resource, &filters).await?;
        debug!(storage, resource, count = records.len(), "resources fetched");
        Ok(records)
    }

    /// Create `records` in `storage`. No filters are involved.
    pub async fn create_resources(
        &self,
        storage: &str,
        resource: &str,
        records: Vec<Record>,
    ) -> Result<(), StratoError> {
        let backend = self.storage(storage)?;
        let count = records.len();
        backend.create_resources(resource, records).await?;
        debug!(storage, resource, count, "resources created");
        Ok(())
    }

    /// Apply `records` to every `resource` record in `storage` matching the
    /// requested filters.
    pub async fn update_resources(
        &self,
        storage: &str,
        resource: &str,
        records: Vec<Record>,
        requests: &[FilterRequest],
    ) -> Result<(), StratoError> {
        let filters = self.resolve_filters(storage, requests)?;
        let backend = self.storage(storage)?;
        backend.update_resources(resource, records, &filters).await
    }

    /// Delete every `resource` record in `storage` matching the requested filters.
    pub async fn delete_resources(
        &self,
        storage: &str,
        resource: &str,
        requests: &[FilterRequest],
    ) -> Result<(), StratoError> {
        let filters = self.resolve_filters(storage, requests)?;
        let backend = self.storage(storage)?;
        backend.delete_resources(resource, &filters).await
    }
}
