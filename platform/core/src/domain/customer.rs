// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::storage::FileRef;
use crate::domain::tenant::{TenantId, UserId};

/// Identity-level verification status, reviewed per person.
///
/// Deliberately a different type from the order-local
/// [`ApprovalStatus`](crate::domain::order::ApprovalStatus): customer KYC
/// verifies who the person is, order KYC approves one specific installation.
/// The two share vocabulary but are never conflated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KycStatus {
    Pending,
    Approved,
    Rejected,
}

impl KycStatus {
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

/// Whether a purifier device is paired with this account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceLinkStatus {
    Linked,
    Unlinked,
    Declined,
}

/// Customer record. Identity: `(org_id, user_id)`.
///
/// Created by registration (outside the workflow engine) and never deleted
/// by it; the engine only reviews `kyc_status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub org_id: TenantId,
    pub user_id: UserId,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub kyc_status: KycStatus,
    /// Opaque reference into the file-storage collaborator; the record never
    /// holds image bytes.
    pub kyc_document: Option<FileRef>,
    pub device_link_status: DeviceLinkStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency token, owned by the store.
    pub version: u64,
}

impl Customer {
    pub fn new(
        org_id: TenantId,
        user_id: UserId,
        name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            org_id,
            user_id,
            name: name.into(),
            phone: phone.into(),
            address: address.into(),
            kyc_status: KycStatus::Pending,
            kyc_document: None,
            device_link_status: DeviceLinkStatus::Unlinked,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Apply a reviewer verdict to the identity-level status.
    pub fn review_kyc(&mut self, verdict: KycStatus) {
        self.kyc_status = verdict;
        self.updated_at = Utc::now();
    }

    pub fn attach_kyc_document(&mut self, document: FileRef) {
        self.kyc_document = Some(document);
        self.updated_at = Utc::now();
    }
}
