// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

use std::sync::Arc;

use tracing::debug;

use crate::domain::error::WorkflowError;
use crate::domain::repository::TechnicianRepository;
use crate::domain::technician::Technician;
use crate::domain::tenant::TenantId;

/// Availability listing used by assignment UIs. Pure read; the dispatch
/// service re-validates the same predicate at assignment time because a
/// listing is stale the moment it is produced.
pub struct TechnicianDirectory {
    technicians: Arc<dyn TechnicianRepository>,
}

impl TechnicianDirectory {
    pub fn new(technicians: Arc<dyn TechnicianRepository>) -> Self {
        Self { technicians }
    }

    /// Technicians that are free and identity-verified, tenant-scoped.
    pub async fn list_available(&self, org_id: TenantId) -> Result<Vec<Technician>, WorkflowError> {
        debug!(org_id = %org_id, "listing available technicians");
        let all = self
            .technicians
            .list(org_id)
            .await
            .map_err(|e| WorkflowError::from_store(e, vec![]))?;
        Ok(all.into_iter().filter(Technician::is_available).collect())
    }
}
