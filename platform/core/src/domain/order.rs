// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

//! Installation-order aggregate.
//!
//! The order is the single source of truth for its own progress: the
//! top-level status, the assignment sub-state, and the completion timestamp
//! are stored once, and the stage flags callers read (`technician_assigned`,
//! `installation_completed`) are derived projections. The two can never
//! disagree because there is nothing to disagree with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::technician::TechnicianId;
use crate::domain::tenant::{TenantId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a subscription plan in the plan catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanId(pub Uuid);

impl PlanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlanId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Purifier device serial.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub String);

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Open,
    Closed,
}

/// Order-local approval verdict, used both for the order's installation KYC
/// and for the technician's two-phase assignment decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

/// Assignment sub-state machine of an installation order.
///
/// `Unassigned → Pending → {Approved, Rejected}`; removal of a pending
/// decision returns to `Unassigned`, and a rejected or approved order may be
/// re-assigned (which overwrites the previous technician reference).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Assignment {
    Unassigned,
    Pending { technician: TechnicianId },
    Approved { technician: TechnicianId },
    Rejected { technician: TechnicianId },
}

impl Assignment {
    pub fn technician(&self) -> Option<TechnicianId> {
        match self {
            Self::Unassigned => None,
            Self::Pending { technician }
            | Self::Approved { technician }
            | Self::Rejected { technician } => Some(*technician),
        }
    }

    pub fn approval_status(&self) -> Option<ApprovalStatus> {
        match self {
            Self::Unassigned => None,
            Self::Pending { .. } => Some(ApprovalStatus::Pending),
            Self::Approved { .. } => Some(ApprovalStatus::Approved),
            Self::Rejected { .. } => Some(ApprovalStatus::Rejected),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// Stage milestones of an order, as callers read them. Derived projection;
/// never stored or set directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderStages {
    pub payment_received: bool,
    pub kyc_verified: bool,
    pub technician_assigned: bool,
    pub installation_completed: bool,
}

/// Installation order. Identity: `(org_id, order_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationOrder {
    pub org_id: TenantId,
    pub order_id: OrderId,
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub device_id: DeviceId,
    status: OrderStatus,
    payment_received: bool,
    /// Mirror of the owning customer's identity KYC, kept in sync by the
    /// customer-review propagation. Distinct from `kyc_approval_status`.
    kyc_verified: bool,
    /// Order-local installation KYC, reviewed per order.
    kyc_approval_status: ApprovalStatus,
    assignment: Assignment,
    completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency token, owned by the store.
    pub version: u64,
}

impl InstallationOrder {
    pub fn new(org_id: TenantId, user_id: UserId, plan_id: PlanId, device_id: DeviceId) -> Self {
        let now = Utc::now();
        Self {
            org_id,
            order_id: OrderId::new(),
            user_id,
            plan_id,
            device_id,
            status: OrderStatus::Open,
            payment_received: false,
            kyc_verified: false,
            kyc_approval_status: ApprovalStatus::Pending,
            assignment: Assignment::Unassigned,
            completed_at: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    // ========================================================================
    // Projections
    // ========================================================================

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    pub fn assigned_to(&self) -> Option<TechnicianId> {
        self.assignment.technician()
    }

    pub fn technician_approval_status(&self) -> Option<ApprovalStatus> {
        self.assignment.approval_status()
    }

    pub fn kyc_approval_status(&self) -> ApprovalStatus {
        self.kyc_approval_status
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn stages(&self) -> OrderStages {
        OrderStages {
            payment_received: self.payment_received,
            kyc_verified: self.kyc_verified,
            technician_assigned: matches!(self.assignment, Assignment::Approved { .. }),
            installation_completed: self.completed_at.is_some(),
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Mark the payment stage reached.
    pub fn record_payment(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Open {
            return Err(OrderError::NotOpen);
        }
        self.payment_received = true;
        self.touch();
        Ok(())
    }

    /// Apply an order-local installation-KYC verdict. Also refreshes the
    /// `kyc_verified` stage for this one order; the customer record is not
    /// involved.
    pub fn review_kyc(&mut self, verdict: ApprovalStatus) {
        self.kyc_approval_status = verdict;
        self.kyc_verified = verdict.is_approved();
        self.touch();
    }

    /// Overwrite the `kyc_verified` stage from a customer-level review.
    /// Unconditional: applied to open and closed orders alike.
    pub(crate) fn sync_customer_kyc(&mut self, verified: bool) {
        self.kyc_verified = verified;
        self.touch();
    }

    /// Put a technician's assignment up for decision.
    ///
    /// Guards are checked in the order they are listed so a caller always
    /// learns the first unmet one.
    pub fn begin_assignment(&mut self, technician: TechnicianId) -> Result<(), OrderError> {
        if self.status != OrderStatus::Open {
            return Err(OrderError::NotOpen);
        }
        if !self.payment_received {
            return Err(OrderError::PaymentOutstanding);
        }
        if !self.kyc_approval_status.is_approved() {
            return Err(OrderError::KycNotApproved);
        }
        if self.assignment.is_pending() {
            return Err(OrderError::DecisionOutstanding);
        }
        self.assignment = Assignment::Pending { technician };
        self.touch();
        Ok(())
    }

    /// Confirm a pending assignment. This is the completion hook for the
    /// technician-facing acceptance action.
    pub fn approve_assignment(&mut self) -> Result<TechnicianId, OrderError> {
        match self.assignment {
            Assignment::Pending { technician } => {
                self.assignment = Assignment::Approved { technician };
                self.touch();
                Ok(technician)
            }
            _ => Err(OrderError::NoPendingDecision),
        }
    }

    /// Decline a pending assignment. The technician reference is retained on
    /// the record; re-assignment overwrites it.
    pub fn reject_assignment(&mut self) -> Result<TechnicianId, OrderError> {
        match self.assignment {
            Assignment::Pending { technician } => {
                self.assignment = Assignment::Rejected { technician };
                self.touch();
                Ok(technician)
            }
            _ => Err(OrderError::NoPendingDecision),
        }
    }

    /// Undo a pending assignment, restoring the pre-assignment sub-state.
    /// Decided assignments cannot be removed this way.
    pub fn clear_assignment(&mut self) -> Result<TechnicianId, OrderError> {
        match self.assignment {
            Assignment::Pending { technician } => {
                self.assignment = Assignment::Unassigned;
                self.touch();
                Ok(technician)
            }
            _ => Err(OrderError::NoPendingDecision),
        }
    }

    /// Close the order as installed. Existence is the only precondition:
    /// an order can be completed without ever having been assigned, and
    /// completing again refreshes the timestamp.
    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
        self.status = OrderStatus::Closed;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("order must be open")]
    NotOpen,

    #[error("payment must be received")]
    PaymentOutstanding,

    #[error("kyc must be approved")]
    KycNotApproved,

    #[error("an assignment decision is already pending")]
    DecisionOutstanding,

    #[error("order has no pending assignment decision")]
    NoPendingDecision,
}
