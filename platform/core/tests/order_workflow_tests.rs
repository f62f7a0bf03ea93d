// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

//! Integration tests for the installation-order workflow:
//! guard behavior, assignment sub-state transitions, stage projections and
//! tenant isolation, driven end-to-end through the engine.

use std::sync::Arc;

use aquaflow_core::application::{FulfillmentEngine, KycService};
use aquaflow_core::domain::customer::{Customer, KycStatus};
use aquaflow_core::domain::error::WorkflowError;
use aquaflow_core::domain::events::WorkflowEvent;
use aquaflow_core::domain::order::{
    ApprovalStatus, Assignment, DeviceId, InstallationOrder, OrderId, PlanId,
};
use aquaflow_core::domain::repository::{
    CustomerRepository, OrderRepository, TechnicianRepository,
};
use aquaflow_core::domain::technician::{Technician, TechnicianId};
use aquaflow_core::domain::tenant::{TenantId, UserId};
use aquaflow_core::infrastructure::event_bus::EventBus;
use aquaflow_core::infrastructure::notify::TracingNotifier;
use aquaflow_core::infrastructure::repositories::{
    InMemoryCustomerRepository, InMemoryOrderRepository, InMemoryTechnicianRepository,
};

struct Harness {
    customers: Arc<InMemoryCustomerRepository>,
    technicians: Arc<InMemoryTechnicianRepository>,
    orders: Arc<InMemoryOrderRepository>,
    bus: Arc<EventBus>,
    engine: FulfillmentEngine,
    kyc: KycService,
}

fn harness() -> Harness {
    let customers = Arc::new(InMemoryCustomerRepository::new());
    let technicians = Arc::new(InMemoryTechnicianRepository::new());
    let orders = Arc::new(InMemoryOrderRepository::new());
    let bus = Arc::new(EventBus::with_default_capacity());

    let engine = FulfillmentEngine::new(
        orders.clone(),
        technicians.clone(),
        customers.clone(),
        bus.clone(),
    );
    let kyc = KycService::new(
        customers.clone(),
        orders.clone(),
        bus.clone(),
        Arc::new(TracingNotifier::new()),
    );

    Harness {
        customers,
        technicians,
        orders,
        bus,
        engine,
        kyc,
    }
}

async fn seed_customer(h: &Harness, org_id: TenantId) -> Customer {
    let customer = Customer::new(
        org_id,
        UserId::new(),
        "Asha Verma",
        "+91-98111-22334",
        "8 Canal Street",
    );
    h.customers.insert(&customer).await.unwrap();
    customer
}

async fn seed_active_technician(h: &Harness, org_id: TenantId) -> Technician {
    let mut technician = Technician::new(org_id, UserId::new(), "Ravi Kumar", "+91-97000-11111");
    technician.activate();
    technician.review_kyc(KycStatus::Approved);
    h.technicians.insert(&technician).await.unwrap();
    technician
}

/// Place an order and walk it to the assignable state: paid and
/// order-KYC approved.
async fn assignable_order(h: &Harness, org_id: TenantId, customer: &Customer) -> InstallationOrder {
    let placed = h
        .engine
        .place_order(
            org_id,
            customer.user_id,
            PlanId::new(),
            DeviceId("AQF-9000".to_string()),
        )
        .await
        .unwrap();
    h.engine
        .record_payment(org_id, placed.order_id)
        .await
        .unwrap();
    h.kyc
        .review_order(org_id, placed.order_id, ApprovalStatus::Approved)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_happy_path_assignment_goes_pending() {
    let h = harness();
    let org_id = TenantId::new();
    let customer = seed_customer(&h, org_id).await;
    let technician = seed_active_technician(&h, org_id).await;
    let order = assignable_order(&h, org_id, &customer).await;

    let assigned = h
        .engine
        .assign_technician(org_id, order.order_id, technician.id)
        .await
        .unwrap();

    assert_eq!(assigned.assigned_to(), Some(technician.id));
    assert_eq!(
        assigned.technician_approval_status(),
        Some(ApprovalStatus::Pending)
    );
    // The stage only flips on approval.
    assert!(!assigned.stages().technician_assigned);
}

#[tokio::test]
async fn test_assignment_rejects_unapproved_kyc_with_named_guard() {
    let h = harness();
    let org_id = TenantId::new();
    let customer = seed_customer(&h, org_id).await;
    let technician = seed_active_technician(&h, org_id).await;

    let placed = h
        .engine
        .place_order(
            org_id,
            customer.user_id,
            PlanId::new(),
            DeviceId("AQF-9001".to_string()),
        )
        .await
        .unwrap();
    h.engine
        .record_payment(org_id, placed.order_id)
        .await
        .unwrap();

    let err = h
        .engine
        .assign_technician(org_id, placed.order_id, technician.id)
        .await
        .unwrap_err();
    match err {
        WorkflowError::PreconditionFailed { reason } => {
            assert_eq!(reason, "kyc must be approved")
        }
        other => panic!("expected precondition failure, got {other:?}"),
    }

    // State unchanged.
    let stored = h.orders.find(org_id, placed.order_id).await.unwrap().unwrap();
    assert_eq!(stored.assigned_to(), None);
    assert_eq!(stored.technician_approval_status(), None);
}

#[tokio::test]
async fn test_assignment_rejects_inactive_technician() {
    let h = harness();
    let org_id = TenantId::new();
    let customer = seed_customer(&h, org_id).await;
    let order = assignable_order(&h, org_id, &customer).await;

    let mut technician = Technician::new(org_id, UserId::new(), "Noor Shaikh", "+91-97000-22222");
    technician.review_kyc(KycStatus::Approved);
    h.technicians.insert(&technician).await.unwrap();

    let err = h
        .engine
        .assign_technician(org_id, order.order_id, technician.id)
        .await
        .unwrap_err();
    match err {
        WorkflowError::PreconditionFailed { reason } => {
            assert_eq!(reason, "technician must be active")
        }
        other => panic!("expected precondition failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_assignment_rejects_double_assign_while_pending() {
    let h = harness();
    let org_id = TenantId::new();
    let customer = seed_customer(&h, org_id).await;
    let first = seed_active_technician(&h, org_id).await;
    let second = seed_active_technician(&h, org_id).await;
    let order = assignable_order(&h, org_id, &customer).await;

    h.engine
        .assign_technician(org_id, order.order_id, first.id)
        .await
        .unwrap();

    let err = h
        .engine
        .assign_technician(org_id, order.order_id, second.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "precondition_failed");

    let stored = h.orders.find(org_id, order.order_id).await.unwrap().unwrap();
    assert_eq!(stored.assigned_to(), Some(first.id));
}

/// Build an order record in an arbitrary stage combination, the way a store
/// would materialize it.
fn order_in_state(
    org_id: TenantId,
    user_id: UserId,
    open: bool,
    paid: bool,
    kyc_approved: bool,
    decision_pending: bool,
) -> InstallationOrder {
    let now = chrono::Utc::now();
    let assignment = if decision_pending {
        serde_json::json!({ "state": "pending", "technician": TechnicianId::new() })
    } else {
        serde_json::json!({ "state": "unassigned" })
    };
    serde_json::from_value(serde_json::json!({
        "org_id": org_id,
        "order_id": OrderId::new(),
        "user_id": user_id,
        "plan_id": PlanId::new(),
        "device_id": "AQF-MATRIX",
        "status": if open { "OPEN" } else { "CLOSED" },
        "payment_received": paid,
        "kyc_verified": kyc_approved,
        "kyc_approval_status": if kyc_approved { "APPROVED" } else { "PENDING" },
        "assignment": assignment,
        "completed_at": null,
        "created_at": now,
        "updated_at": now,
        "version": 0,
    }))
    .unwrap()
}

#[tokio::test]
async fn test_assignment_guard_matrix_succeeds_only_when_all_hold() {
    let h = harness();
    let org_id = TenantId::new();
    let customer = seed_customer(&h, org_id).await;

    for mask in 0u32..32 {
        let open = mask & 1 != 0;
        let paid = mask & 2 != 0;
        let kyc_approved = mask & 4 != 0;
        let technician_active = mask & 8 != 0;
        let no_pending_decision = mask & 16 != 0;

        let mut technician =
            Technician::new(org_id, UserId::new(), "Matrix Tech", "+91-90000-00001");
        technician.review_kyc(KycStatus::Approved);
        if technician_active {
            technician.activate();
        }
        h.technicians.insert(&technician).await.unwrap();

        let order = order_in_state(
            org_id,
            customer.user_id,
            open,
            paid,
            kyc_approved,
            !no_pending_decision,
        );
        h.orders.insert(&order).await.unwrap();

        let result = h
            .engine
            .assign_technician(org_id, order.order_id, technician.id)
            .await;

        let all_guards_hold =
            open && paid && kyc_approved && technician_active && no_pending_decision;
        if all_guards_hold {
            let assigned = result.unwrap_or_else(|e| panic!("mask {mask:#07b} rejected: {e}"));
            assert_eq!(
                assigned.technician_approval_status(),
                Some(ApprovalStatus::Pending)
            );
        } else {
            let err = result.err().unwrap_or_else(|| panic!("mask {mask:#07b} passed"));
            assert_eq!(err.code(), "precondition_failed");
        }
    }
}

#[tokio::test]
async fn test_remove_assignment_round_trips_to_pre_assignment_state() {
    let h = harness();
    let org_id = TenantId::new();
    let customer = seed_customer(&h, org_id).await;
    let technician = seed_active_technician(&h, org_id).await;
    let order = assignable_order(&h, org_id, &customer).await;
    let before_stages = order.stages();

    h.engine
        .assign_technician(org_id, order.order_id, technician.id)
        .await
        .unwrap();
    let restored = h
        .engine
        .remove_assignment(org_id, order.order_id)
        .await
        .unwrap();

    assert_eq!(restored.assignment(), &Assignment::Unassigned);
    assert_eq!(restored.assigned_to(), None);
    assert_eq!(restored.technician_approval_status(), None);
    assert_eq!(restored.stages(), before_stages);
}

#[tokio::test]
async fn test_remove_assignment_rejects_decided_assignment() {
    let h = harness();
    let org_id = TenantId::new();
    let customer = seed_customer(&h, org_id).await;
    let technician = seed_active_technician(&h, org_id).await;
    let order = assignable_order(&h, org_id, &customer).await;

    h.engine
        .assign_technician(org_id, order.order_id, technician.id)
        .await
        .unwrap();
    h.engine
        .approve_assignment(org_id, order.order_id)
        .await
        .unwrap();

    let err = h
        .engine
        .remove_assignment(org_id, order.order_id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "precondition_failed");
}

#[tokio::test]
async fn test_approval_hook_flips_assigned_stage() {
    let h = harness();
    let org_id = TenantId::new();
    let customer = seed_customer(&h, org_id).await;
    let technician = seed_active_technician(&h, org_id).await;
    let order = assignable_order(&h, org_id, &customer).await;

    h.engine
        .assign_technician(org_id, order.order_id, technician.id)
        .await
        .unwrap();
    let approved = h
        .engine
        .approve_assignment(org_id, order.order_id)
        .await
        .unwrap();

    assert!(approved.stages().technician_assigned);
    assert_eq!(
        approved.technician_approval_status(),
        Some(ApprovalStatus::Approved)
    );
}

#[tokio::test]
async fn test_rejection_hook_allows_reassignment() {
    let h = harness();
    let org_id = TenantId::new();
    let customer = seed_customer(&h, org_id).await;
    let first = seed_active_technician(&h, org_id).await;
    let second = seed_active_technician(&h, org_id).await;
    let order = assignable_order(&h, org_id, &customer).await;

    h.engine
        .assign_technician(org_id, order.order_id, first.id)
        .await
        .unwrap();
    let rejected = h
        .engine
        .reject_assignment(org_id, order.order_id)
        .await
        .unwrap();
    assert_eq!(
        rejected.technician_approval_status(),
        Some(ApprovalStatus::Rejected)
    );
    assert!(!rejected.stages().technician_assigned);

    let reassigned = h
        .engine
        .assign_technician(org_id, order.order_id, second.id)
        .await
        .unwrap();
    assert_eq!(reassigned.assigned_to(), Some(second.id));
}

#[tokio::test]
async fn test_complete_installation_requires_only_existence() {
    let h = harness();
    let org_id = TenantId::new();
    let customer = seed_customer(&h, org_id).await;

    // Never paid, never verified, never assigned.
    let placed = h
        .engine
        .place_order(
            org_id,
            customer.user_id,
            PlanId::new(),
            DeviceId("AQF-9002".to_string()),
        )
        .await
        .unwrap();

    let completed = h
        .engine
        .complete_installation(org_id, placed.order_id)
        .await
        .unwrap();
    assert!(!completed.is_open());
    assert!(completed.stages().installation_completed);
    assert!(completed.completed_at().is_some());
}

#[tokio::test]
async fn test_operations_are_tenant_scoped() {
    let h = harness();
    let org_a = TenantId::new();
    let org_b = TenantId::new();
    let customer = seed_customer(&h, org_a).await;
    let order = assignable_order(&h, org_a, &customer).await;

    // The same order id under another tenant does not exist.
    let err = h
        .engine
        .complete_installation(org_b, order.order_id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "not_found");
    assert_eq!(err.to_string(), "order not found");

    // A technician from another tenant is invisible to assignment.
    let foreign = seed_active_technician(&h, org_b).await;
    let err = h
        .engine
        .assign_technician(org_a, order.order_id, foreign.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "not_found");
}

#[tokio::test]
async fn test_place_order_requires_known_customer() {
    let h = harness();
    let org_id = TenantId::new();
    let err = h
        .engine
        .place_order(
            org_id,
            UserId::new(),
            PlanId::new(),
            DeviceId("AQF-9003".to_string()),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "not_found");
}

#[tokio::test]
async fn test_assignment_publishes_event() {
    let h = harness();
    let org_id = TenantId::new();
    let customer = seed_customer(&h, org_id).await;
    let technician = seed_active_technician(&h, org_id).await;
    let order = assignable_order(&h, org_id, &customer).await;

    let mut events = h.bus.subscribe();
    h.engine
        .assign_technician(org_id, order.order_id, technician.id)
        .await
        .unwrap();

    let event = events.try_recv().unwrap();
    match event {
        WorkflowEvent::TechnicianAssigned {
            order_id,
            technician_id,
            ..
        } => {
            assert_eq!(order_id, order.order_id);
            assert_eq!(technician_id, technician.id);
        }
        other => panic!("unexpected event {other:?}"),
    }
}
