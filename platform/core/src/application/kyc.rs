// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

//! KYC review service.
//!
//! Two separate write paths that share vocabulary and nothing else:
//! customer-level review mutates the customer record and bulk-propagates the
//! `kyc_verified` stage to every order of that customer; order-level review
//! mutates one order's `kyc_approval_status` and never touches the customer.

use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use tracing::{info, warn};

use crate::domain::customer::{Customer, KycStatus};
use crate::domain::error::WorkflowError;
use crate::domain::events::WorkflowEvent;
use crate::domain::notify::NotificationDispatch;
use crate::domain::order::{ApprovalStatus, InstallationOrder, OrderId};
use crate::domain::repository::{CustomerRepository, OrderRepository};
use crate::domain::tenant::{TenantId, UserId};
use crate::infrastructure::event_bus::EventBus;

pub struct KycService {
    customers: Arc<dyn CustomerRepository>,
    orders: Arc<dyn OrderRepository>,
    event_bus: Arc<EventBus>,
    notifier: Arc<dyn NotificationDispatch>,
}

impl KycService {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        orders: Arc<dyn OrderRepository>,
        event_bus: Arc<EventBus>,
        notifier: Arc<dyn NotificationDispatch>,
    ) -> Self {
        Self {
            customers,
            orders,
            event_bus,
            notifier,
        }
    }

    /// Review a customer's identity KYC, then propagate the verdict to the
    /// `kyc_verified` stage of every order the customer owns in this tenant.
    ///
    /// The propagation is bulk and unconditional: closed orders are touched
    /// too, and re-applying the same verdict is idempotent. A store failure
    /// after the customer write reports that write as completed so a
    /// reconciler can finish the fan-out.
    pub async fn review_customer(
        &self,
        org_id: TenantId,
        user_id: UserId,
        verdict: KycStatus,
    ) -> Result<Customer, WorkflowError> {
        let mut customer = self
            .customers
            .find(org_id, user_id)
            .await
            .map_err(|e| WorkflowError::from_store(e, vec![]))?
            .ok_or_else(|| WorkflowError::not_found("customer"))?;

        customer.review_kyc(verdict);
        let customer = self
            .customers
            .update(&customer)
            .await
            .map_err(|e| WorkflowError::from_store(e, vec![]))?;

        let orders_synced = self
            .orders
            .set_kyc_verified_for_customer(org_id, user_id, verdict.is_approved())
            .await
            .map_err(|e| {
                warn!(org_id = %org_id, user_id = %user_id, "kyc propagation interrupted");
                WorkflowError::from_store(e, vec!["customer.kyc_status"])
            })?;

        info!(
            org_id = %org_id,
            user_id = %user_id,
            verdict = ?verdict,
            orders_synced,
            "customer kyc reviewed"
        );
        counter!("aquaflow_kyc_reviews_total").increment(1);
        self.event_bus.publish(WorkflowEvent::CustomerKycReviewed {
            org_id,
            user_id,
            status: verdict,
            orders_synced,
            reviewed_at: Utc::now(),
        });
        // Fire-and-forget; delivery is the notification subsystem's problem.
        let message = match verdict {
            KycStatus::Approved => "Your identity verification was approved.",
            KycStatus::Rejected => "Your identity verification was rejected.",
            KycStatus::Pending => "Your identity verification is back under review.",
        };
        self.notifier.dispatch(user_id, message);

        Ok(customer)
    }

    /// Review one order's installation KYC. The customer record is not
    /// involved; this is the approval the assignment guard reads.
    pub async fn review_order(
        &self,
        org_id: TenantId,
        order_id: OrderId,
        verdict: ApprovalStatus,
    ) -> Result<InstallationOrder, WorkflowError> {
        let mut order = self
            .orders
            .find(org_id, order_id)
            .await
            .map_err(|e| WorkflowError::from_store(e, vec![]))?
            .ok_or_else(|| WorkflowError::not_found("order"))?;

        order.review_kyc(verdict);
        let order = self
            .orders
            .update(&order)
            .await
            .map_err(|e| WorkflowError::from_store(e, vec![]))?;

        info!(org_id = %org_id, order_id = %order_id, verdict = ?verdict, "order kyc reviewed");
        self.event_bus.publish(WorkflowEvent::OrderKycReviewed {
            org_id,
            order_id,
            status: verdict,
            reviewed_at: Utc::now(),
        });

        Ok(order)
    }
}
