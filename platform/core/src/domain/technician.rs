// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::customer::{DeviceLinkStatus, KycStatus};
use crate::domain::tenant::{TenantId, UserId};

/// Store-assigned reference id for a technician record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TechnicianId(pub Uuid);

impl TechnicianId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for TechnicianId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TechnicianId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a technician currently holds an open assignment.
///
/// Invariant: `Busy` exactly when one open order or service request holds a
/// pending-or-confirmed assignment to this technician.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkStatus {
    Free,
    Busy,
}

/// Technician record. Identity: `(org_id, user_id)` plus the store-assigned
/// reference id used by assignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technician {
    pub id: TechnicianId,
    pub org_id: TenantId,
    pub user_id: UserId,
    pub name: String,
    pub phone: String,
    /// Onboarding gate, reviewer-controlled. Inactive technicians are never
    /// assignable.
    pub is_active: bool,
    pub kyc_status: KycStatus,
    pub work_status: WorkStatus,
    pub device_link_status: DeviceLinkStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency token, owned by the store.
    pub version: u64,
}

impl Technician {
    pub fn new(
        org_id: TenantId,
        user_id: UserId,
        name: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TechnicianId::new(),
            org_id,
            user_id,
            name: name.into(),
            phone: phone.into(),
            is_active: false,
            kyc_status: KycStatus::Pending,
            work_status: WorkStatus::Free,
            device_link_status: DeviceLinkStatus::Unlinked,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.updated_at = Utc::now();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    pub fn review_kyc(&mut self, verdict: KycStatus) {
        self.kyc_status = verdict;
        self.updated_at = Utc::now();
    }

    /// The availability-listing predicate: idle and identity-verified.
    pub fn is_available(&self) -> bool {
        self.work_status == WorkStatus::Free && self.kyc_status.is_approved()
    }

    /// Take the technician for an assignment.
    pub fn acquire(&mut self) -> Result<(), TechnicianError> {
        if self.work_status == WorkStatus::Busy {
            return Err(TechnicianError::AlreadyBusy(self.id));
        }
        self.work_status = WorkStatus::Busy;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Return the technician to the idle pool.
    pub fn release(&mut self) {
        self.work_status = WorkStatus::Free;
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TechnicianError {
    #[error("technician {0} already holds an open assignment")]
    AlreadyBusy(TechnicianId),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn technician() -> Technician {
        Technician::new(
            TenantId::new(),
            UserId::new(),
            "Ravi Kumar",
            "+91-97000-44556",
        )
    }

    #[test]
    fn test_new_technician_is_inactive_and_free() {
        let tech = technician();
        assert!(!tech.is_active);
        assert_eq!(tech.work_status, WorkStatus::Free);
        assert!(!tech.is_available());
    }

    #[test]
    fn test_availability_requires_free_and_approved() {
        let mut tech = technician();
        tech.review_kyc(KycStatus::Approved);
        assert!(tech.is_available());

        tech.acquire().unwrap();
        assert!(!tech.is_available());

        tech.release();
        assert!(tech.is_available());
    }

    #[test]
    fn test_acquire_twice_is_rejected() {
        let mut tech = technician();
        tech.acquire().unwrap();
        let err = tech.acquire().unwrap_err();
        assert_eq!(err, TechnicianError::AlreadyBusy(tech.id));
        assert_eq!(tech.work_status, WorkStatus::Busy);
    }
}
