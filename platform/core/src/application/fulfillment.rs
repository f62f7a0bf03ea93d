//! Installation-order workflow engine (application service).
//!
//! Coordinates the order record store, the technician availability store and
//! the customer KYC store through guarded transitions. Each operation reads
//! its guards, applies the aggregate transition, and writes through the
//! repository's version compare-and-swap, so a guard always gates exactly
//! the state it observed. No cross-store lock is ever held.

use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use tracing::{debug, info};

use crate::domain::error::WorkflowError;
use crate::domain::events::WorkflowEvent;
use crate::domain::order::{DeviceId, InstallationOrder, OrderId, PlanId};
use crate::domain::repository::{CustomerRepository, OrderRepository, TechnicianRepository};
use crate::domain::technician::TechnicianId;
use crate::domain::tenant::{TenantId, UserId};
use crate::infrastructure::event_bus::EventBus;

pub struct FulfillmentEngine {
    orders: Arc<dyn OrderRepository>,
    technicians: Arc<dyn TechnicianRepository>,
    customers: Arc<dyn CustomerRepository>,
    event_bus: Arc<EventBus>,
}

impl FulfillmentEngine {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        technicians: Arc<dyn TechnicianRepository>,
        customers: Arc<dyn CustomerRepository>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            orders,
            technicians,
            customers,
            event_bus,
        }
    }

    /// Create a new open order for an existing customer.
    pub async fn place_order(
        &self,
        org_id: TenantId,
        user_id: UserId,
        plan_id: PlanId,
        device_id: DeviceId,
    ) -> Result<InstallationOrder, WorkflowError> {
        self.customers
            .find(org_id, user_id)
            .await
            .map_err(|e| WorkflowError::from_store(e, vec![]))?
            .ok_or_else(|| WorkflowError::not_found("customer"))?;

        let order = InstallationOrder::new(org_id, user_id, plan_id, device_id);
        self.orders
            .insert(&order)
            .await
            .map_err(|e| WorkflowError::from_store(e, vec![]))?;

        info!(org_id = %org_id, order_id = %order.order_id, user_id = %user_id, "order placed");
        counter!("aquaflow_orders_placed_total").increment(1);
        self.event_bus.publish(WorkflowEvent::OrderPlaced {
            org_id,
            order_id: order.order_id,
            user_id,
            placed_at: Utc::now(),
        });

        Ok(order)
    }

    /// Mark the payment stage reached for an open order.
    pub async fn record_payment(
        &self,
        org_id: TenantId,
        order_id: OrderId,
    ) -> Result<InstallationOrder, WorkflowError> {
        let mut order = self.load_order(org_id, order_id).await?;
        order
            .record_payment()
            .map_err(|e| WorkflowError::precondition(e.to_string()))?;
        let order = self
            .orders
            .update(&order)
            .await
            .map_err(|e| WorkflowError::from_store(e, vec![]))?;

        info!(org_id = %org_id, order_id = %order_id, "payment recorded");
        self.event_bus.publish(WorkflowEvent::PaymentRecorded {
            org_id,
            order_id,
            recorded_at: Utc::now(),
        });

        Ok(order)
    }

    /// Put a technician up for the order's assignment decision.
    ///
    /// Guards: order open, payment received, order KYC approved, technician
    /// present in the tenant and active, no decision already pending. Each
    /// failure names its guard. Two concurrent calls race on the order's
    /// version; the loser gets a definite `Conflict`.
    ///
    /// Availability is owned by the service-request path: installation
    /// assignment does not touch the technician's `work_status`.
    pub async fn assign_technician(
        &self,
        org_id: TenantId,
        order_id: OrderId,
        technician_id: TechnicianId,
    ) -> Result<InstallationOrder, WorkflowError> {
        let mut order = self.load_order(org_id, order_id).await?;

        let technician = self
            .technicians
            .find(org_id, technician_id)
            .await
            .map_err(|e| WorkflowError::from_store(e, vec![]))?
            .ok_or_else(|| WorkflowError::not_found("technician"))?;
        if !technician.is_active {
            return Err(WorkflowError::precondition("technician must be active"));
        }

        order
            .begin_assignment(technician.id)
            .map_err(|e| WorkflowError::precondition(e.to_string()))?;
        let order = self
            .orders
            .update(&order)
            .await
            .map_err(|e| WorkflowError::from_store(e, vec![]))?;

        info!(
            org_id = %org_id,
            order_id = %order_id,
            technician_id = %technician_id,
            "technician assigned, decision pending"
        );
        counter!("aquaflow_order_assignments_total").increment(1);
        self.event_bus.publish(WorkflowEvent::TechnicianAssigned {
            org_id,
            order_id,
            technician_id,
            assigned_at: Utc::now(),
        });

        Ok(order)
    }

    /// Completion hook for the technician-facing acceptance action: confirm
    /// the pending assignment, which flips the `technician_assigned` stage.
    pub async fn approve_assignment(
        &self,
        org_id: TenantId,
        order_id: OrderId,
    ) -> Result<InstallationOrder, WorkflowError> {
        let mut order = self.load_order(org_id, order_id).await?;
        let technician_id = order
            .approve_assignment()
            .map_err(|e| WorkflowError::precondition(e.to_string()))?;
        let order = self
            .orders
            .update(&order)
            .await
            .map_err(|e| WorkflowError::from_store(e, vec![]))?;

        info!(org_id = %org_id, order_id = %order_id, technician_id = %technician_id, "assignment approved");
        self.event_bus.publish(WorkflowEvent::AssignmentApproved {
            org_id,
            order_id,
            technician_id,
            decided_at: Utc::now(),
        });

        Ok(order)
    }

    /// Completion hook for the technician-facing decline action.
    pub async fn reject_assignment(
        &self,
        org_id: TenantId,
        order_id: OrderId,
    ) -> Result<InstallationOrder, WorkflowError> {
        let mut order = self.load_order(org_id, order_id).await?;
        let technician_id = order
            .reject_assignment()
            .map_err(|e| WorkflowError::precondition(e.to_string()))?;
        let order = self
            .orders
            .update(&order)
            .await
            .map_err(|e| WorkflowError::from_store(e, vec![]))?;

        info!(org_id = %org_id, order_id = %order_id, technician_id = %technician_id, "assignment rejected");
        self.event_bus.publish(WorkflowEvent::AssignmentRejected {
            org_id,
            order_id,
            technician_id,
            decided_at: Utc::now(),
        });

        Ok(order)
    }

    /// Undo a pending assignment; returns the order to its pre-assignment
    /// sub-state. Decided assignments are rejected.
    pub async fn remove_assignment(
        &self,
        org_id: TenantId,
        order_id: OrderId,
    ) -> Result<InstallationOrder, WorkflowError> {
        let mut order = self.load_order(org_id, order_id).await?;
        let technician_id = order
            .clear_assignment()
            .map_err(|e| WorkflowError::precondition(e.to_string()))?;
        let order = self
            .orders
            .update(&order)
            .await
            .map_err(|e| WorkflowError::from_store(e, vec![]))?;

        info!(org_id = %org_id, order_id = %order_id, technician_id = %technician_id, "assignment removed");
        self.event_bus.publish(WorkflowEvent::AssignmentRemoved {
            org_id,
            order_id,
            technician_id,
            removed_at: Utc::now(),
        });

        Ok(order)
    }

    /// Close the order as installed. Existence is the only guard.
    pub async fn complete_installation(
        &self,
        org_id: TenantId,
        order_id: OrderId,
    ) -> Result<InstallationOrder, WorkflowError> {
        let mut order = self.load_order(org_id, order_id).await?;
        order.complete();
        let order = self
            .orders
            .update(&order)
            .await
            .map_err(|e| WorkflowError::from_store(e, vec![]))?;

        info!(org_id = %org_id, order_id = %order_id, "installation completed");
        counter!("aquaflow_installations_completed_total").increment(1);
        self.event_bus.publish(WorkflowEvent::InstallationCompleted {
            org_id,
            order_id,
            completed_at: order.completed_at().unwrap_or_else(Utc::now),
        });

        Ok(order)
    }

    async fn load_order(
        &self,
        org_id: TenantId,
        order_id: OrderId,
    ) -> Result<InstallationOrder, WorkflowError> {
        debug!(org_id = %org_id, order_id = %order_id, "loading order");
        self.orders
            .find(org_id, order_id)
            .await
            .map_err(|e| WorkflowError::from_store(e, vec![]))?
            .ok_or_else(|| WorkflowError::not_found("order"))
    }
}
