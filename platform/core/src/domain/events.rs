// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::customer::KycStatus;
use crate::domain::order::{ApprovalStatus, OrderId};
use crate::domain::service_request::{RequestId, RequestStatus};
use crate::domain::technician::TechnicianId;
use crate::domain::tenant::{TenantId, UserId};

/// Domain events emitted by the workflow engine, one per accepted mutation.
/// Consumed by observers (audit, dashboards, the sandbox CLI); never awaited
/// by the operations that publish them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorkflowEvent {
    OrderPlaced {
        org_id: TenantId,
        order_id: OrderId,
        user_id: UserId,
        placed_at: DateTime<Utc>,
    },
    PaymentRecorded {
        org_id: TenantId,
        order_id: OrderId,
        recorded_at: DateTime<Utc>,
    },
    TechnicianAssigned {
        org_id: TenantId,
        order_id: OrderId,
        technician_id: TechnicianId,
        assigned_at: DateTime<Utc>,
    },
    AssignmentApproved {
        org_id: TenantId,
        order_id: OrderId,
        technician_id: TechnicianId,
        decided_at: DateTime<Utc>,
    },
    AssignmentRejected {
        org_id: TenantId,
        order_id: OrderId,
        technician_id: TechnicianId,
        decided_at: DateTime<Utc>,
    },
    AssignmentRemoved {
        org_id: TenantId,
        order_id: OrderId,
        technician_id: TechnicianId,
        removed_at: DateTime<Utc>,
    },
    InstallationCompleted {
        org_id: TenantId,
        order_id: OrderId,
        completed_at: DateTime<Utc>,
    },
    CustomerKycReviewed {
        org_id: TenantId,
        user_id: UserId,
        status: KycStatus,
        orders_synced: usize,
        reviewed_at: DateTime<Utc>,
    },
    OrderKycReviewed {
        org_id: TenantId,
        order_id: OrderId,
        status: ApprovalStatus,
        reviewed_at: DateTime<Utc>,
    },
    RequestOpened {
        org_id: TenantId,
        request_id: RequestId,
        user_id: UserId,
        opened_at: DateTime<Utc>,
    },
    RequestAssigned {
        org_id: TenantId,
        request_id: RequestId,
        technician_id: TechnicianId,
        assigned_at: DateTime<Utc>,
    },
    RequestStatusChanged {
        org_id: TenantId,
        request_id: RequestId,
        from: RequestStatus,
        to: RequestStatus,
        released_technician: Option<TechnicianId>,
        changed_at: DateTime<Utc>,
    },
}
