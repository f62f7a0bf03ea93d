// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

//! Service-request aggregate: the single-approval variant of the assignment
//! pattern. No pending/approved distinction; assignment takes effect
//! immediately and owns the technician's busy/free flips.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::order::DeviceId;
use crate::domain::technician::TechnicianId;
use crate::domain::tenant::{TenantId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Open,
    Assigned,
    Closed,
}

/// What a status transition asked the caller to do with technician
/// availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionEffects {
    /// Technician whose `work_status` must be reset to free.
    pub released: Option<TechnicianId>,
}

/// Service request. Identity: `(org_id, request_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub org_id: TenantId,
    pub request_id: RequestId,
    pub user_id: UserId,
    pub device_id: DeviceId,
    pub issue: String,
    status: RequestStatus,
    assigned_to: Option<TechnicianId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency token, owned by the store.
    pub version: u64,
}

impl ServiceRequest {
    pub fn new(
        org_id: TenantId,
        user_id: UserId,
        device_id: DeviceId,
        issue: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            org_id,
            request_id: RequestId::new(),
            user_id,
            device_id,
            issue: issue.into(),
            status: RequestStatus::Open,
            assigned_to: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn assigned_to(&self) -> Option<TechnicianId> {
        self.assigned_to
    }

    /// Hand the request to a technician. Only an open request may be
    /// assigned: a busy technician holds exactly one open assignment, and
    /// overwriting an existing one would strand the previous technician as
    /// busy.
    pub fn assign(&mut self, technician: TechnicianId) -> Result<(), RequestError> {
        if self.status != RequestStatus::Open {
            return Err(RequestError::NotOpen);
        }
        self.assigned_to = Some(technician);
        self.status = RequestStatus::Assigned;
        self.touch();
        Ok(())
    }

    /// Move the request to `new_status`, applying two independent cleanup
    /// rules: entering `closed` with a live assignment releases the
    /// technician, and leaving `closed` clears a stale assignment left by an
    /// interrupted closure. Both are evaluated on every transition.
    pub fn transition(&mut self, new_status: RequestStatus) -> TransitionEffects {
        let mut released = None;

        if new_status == RequestStatus::Closed {
            if let Some(technician) = self.assigned_to.take() {
                released = Some(technician);
            }
        }

        if self.status == RequestStatus::Closed && new_status != RequestStatus::Closed {
            if let Some(technician) = self.assigned_to.take() {
                released.get_or_insert(technician);
            }
        }

        self.status = new_status;
        self.touch();
        TransitionEffects { released }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("request must be open")]
    NotOpen,
}
