// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

//! Service-request dispatch: single-phase assignment with availability
//! locking, the closure/reopen cleanup rules, and the availability listing.

use std::sync::Arc;

use aquaflow_core::application::{DispatchService, TechnicianDirectory};
use aquaflow_core::domain::customer::{Customer, KycStatus};
use aquaflow_core::domain::order::DeviceId;
use aquaflow_core::domain::repository::{
    CustomerRepository, ServiceRequestRepository, TechnicianRepository,
};
use aquaflow_core::domain::service_request::{RequestStatus, ServiceRequest};
use aquaflow_core::domain::technician::{Technician, TechnicianId, WorkStatus};
use aquaflow_core::domain::tenant::{TenantId, UserId};
use aquaflow_core::infrastructure::event_bus::EventBus;
use aquaflow_core::infrastructure::repositories::{
    InMemoryCustomerRepository, InMemoryServiceRequestRepository, InMemoryTechnicianRepository,
};

struct Harness {
    customers: Arc<InMemoryCustomerRepository>,
    technicians: Arc<InMemoryTechnicianRepository>,
    requests: Arc<InMemoryServiceRequestRepository>,
    dispatch: DispatchService,
    directory: TechnicianDirectory,
}

fn harness() -> Harness {
    let customers = Arc::new(InMemoryCustomerRepository::new());
    let technicians = Arc::new(InMemoryTechnicianRepository::new());
    let requests = Arc::new(InMemoryServiceRequestRepository::new());
    let bus = Arc::new(EventBus::with_default_capacity());

    let dispatch = DispatchService::new(
        requests.clone(),
        technicians.clone(),
        customers.clone(),
        bus.clone(),
    );
    let directory = TechnicianDirectory::new(technicians.clone());

    Harness {
        customers,
        technicians,
        requests,
        dispatch,
        directory,
    }
}

async fn seed_customer(h: &Harness, org_id: TenantId) -> Customer {
    let customer = Customer::new(
        org_id,
        UserId::new(),
        "Lata Iyer",
        "+91-98444-55667",
        "12 Mill Street",
    );
    h.customers.insert(&customer).await.unwrap();
    customer
}

async fn seed_available_technician(h: &Harness, org_id: TenantId) -> Technician {
    let mut technician = Technician::new(org_id, UserId::new(), "Imran Patel", "+91-97000-44444");
    technician.activate();
    technician.review_kyc(KycStatus::Approved);
    h.technicians.insert(&technician).await.unwrap();
    technician
}

async fn open_request(h: &Harness, org_id: TenantId, customer: &Customer) -> ServiceRequest {
    h.dispatch
        .open_request(
            org_id,
            customer.user_id,
            DeviceId("AQF-3000".to_string()),
            "cloudy output water",
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_assignment_marks_technician_busy() {
    let h = harness();
    let org_id = TenantId::new();
    let customer = seed_customer(&h, org_id).await;
    let technician = seed_available_technician(&h, org_id).await;
    let request = open_request(&h, org_id, &customer).await;

    let assigned = h
        .dispatch
        .assign_technician(org_id, request.request_id, technician.id)
        .await
        .unwrap();
    assert_eq!(assigned.status(), RequestStatus::Assigned);
    assert_eq!(assigned.assigned_to(), Some(technician.id));

    let stored_tech = h
        .technicians
        .find(org_id, technician.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored_tech.work_status, WorkStatus::Busy);
}

#[tokio::test]
async fn test_closing_frees_technician_and_clears_assignment() {
    let h = harness();
    let org_id = TenantId::new();
    let customer = seed_customer(&h, org_id).await;
    let technician = seed_available_technician(&h, org_id).await;
    let request = open_request(&h, org_id, &customer).await;

    h.dispatch
        .assign_technician(org_id, request.request_id, technician.id)
        .await
        .unwrap();
    let closed = h
        .dispatch
        .update_status(org_id, request.request_id, RequestStatus::Closed)
        .await
        .unwrap();

    assert_eq!(closed.status(), RequestStatus::Closed);
    assert_eq!(closed.assigned_to(), None);

    let stored_tech = h
        .technicians
        .find(org_id, technician.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored_tech.work_status, WorkStatus::Free);
}

#[tokio::test]
async fn test_reopening_clears_stale_assignment_and_frees_technician() {
    let h = harness();
    let org_id = TenantId::new();
    let customer = seed_customer(&h, org_id).await;
    let technician = seed_available_technician(&h, org_id).await;

    // A closed request that kept its assignment: the shape an interrupted
    // closure leaves behind.
    let live = ServiceRequest::new(
        org_id,
        customer.user_id,
        DeviceId("AQF-3001".to_string()),
        "pressure drop",
    );
    let mut value = serde_json::to_value(&live).unwrap();
    value["status"] = serde_json::json!("closed");
    value["assigned_to"] = serde_json::to_value(technician.id).unwrap();
    let stale: ServiceRequest = serde_json::from_value(value).unwrap();
    h.requests.insert(&stale).await.unwrap();
    h.technicians
        .set_work_status(org_id, technician.id, WorkStatus::Busy)
        .await
        .unwrap();

    let reopened = h
        .dispatch
        .update_status(org_id, stale.request_id, RequestStatus::Open)
        .await
        .unwrap();

    assert_eq!(reopened.status(), RequestStatus::Open);
    assert_eq!(reopened.assigned_to(), None);
    let stored_tech = h
        .technicians
        .find(org_id, technician.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored_tech.work_status, WorkStatus::Free);
}

#[tokio::test]
async fn test_busy_technician_cannot_be_double_booked() {
    let h = harness();
    let org_id = TenantId::new();
    let customer = seed_customer(&h, org_id).await;
    let technician = seed_available_technician(&h, org_id).await;
    let first = open_request(&h, org_id, &customer).await;
    let second = open_request(&h, org_id, &customer).await;

    h.dispatch
        .assign_technician(org_id, first.request_id, technician.id)
        .await
        .unwrap();
    let err = h
        .dispatch
        .assign_technician(org_id, second.request_id, technician.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "precondition_failed");

    let stored = h
        .requests
        .find(org_id, second.request_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status(), RequestStatus::Open);
}

#[tokio::test]
async fn test_unverified_technician_cannot_be_assigned() {
    let h = harness();
    let org_id = TenantId::new();
    let customer = seed_customer(&h, org_id).await;
    let request = open_request(&h, org_id, &customer).await;

    let mut technician = Technician::new(org_id, UserId::new(), "Vik Rao", "+91-97000-55555");
    technician.activate();
    h.technicians.insert(&technician).await.unwrap();

    let err = h
        .dispatch
        .assign_technician(org_id, request.request_id, technician.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "precondition_failed");

    let stored_tech = h
        .technicians
        .find(org_id, technician.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored_tech.work_status, WorkStatus::Free);
}

#[tokio::test]
async fn test_non_open_request_cannot_be_assigned() {
    let h = harness();
    let org_id = TenantId::new();
    let customer = seed_customer(&h, org_id).await;
    let technician = seed_available_technician(&h, org_id).await;
    let request = open_request(&h, org_id, &customer).await;

    h.dispatch
        .update_status(org_id, request.request_id, RequestStatus::Closed)
        .await
        .unwrap();
    let err = h
        .dispatch
        .assign_technician(org_id, request.request_id, technician.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "precondition_failed");

    // The guard fired before any acquisition: the technician stayed free.
    let stored_tech = h
        .technicians
        .find(org_id, technician.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored_tech.work_status, WorkStatus::Free);
}

#[tokio::test]
async fn test_open_request_validates_input() {
    let h = harness();
    let org_id = TenantId::new();
    let customer = seed_customer(&h, org_id).await;

    let err = h
        .dispatch
        .open_request(
            org_id,
            customer.user_id,
            DeviceId("AQF-3002".to_string()),
            "   ",
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "validation_error");

    let err = h
        .dispatch
        .open_request(
            org_id,
            UserId::new(),
            DeviceId("AQF-3003".to_string()),
            "no such customer",
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "not_found");
}

#[tokio::test]
async fn test_directory_lists_free_and_verified_only() {
    let h = harness();
    let org_id = TenantId::new();
    let customer = seed_customer(&h, org_id).await;

    let available = seed_available_technician(&h, org_id).await;
    let busy = seed_available_technician(&h, org_id).await;
    let unverified = {
        let mut t = Technician::new(org_id, UserId::new(), "Kiran Jo", "+91-97000-66666");
        t.activate();
        h.technicians.insert(&t).await.unwrap();
        t
    };
    let foreign = seed_available_technician(&h, TenantId::new()).await;

    let request = open_request(&h, org_id, &customer).await;
    h.dispatch
        .assign_technician(org_id, request.request_id, busy.id)
        .await
        .unwrap();

    let listed = h.directory.list_available(org_id).await.unwrap();
    let ids: Vec<TechnicianId> = listed.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![available.id]);
    assert!(!ids.contains(&busy.id));
    assert!(!ids.contains(&unverified.id));
    assert!(!ids.contains(&foreign.id));
}

#[tokio::test]
async fn test_closing_twice_stays_closed_and_free() {
    let h = harness();
    let org_id = TenantId::new();
    let customer = seed_customer(&h, org_id).await;
    let technician = seed_available_technician(&h, org_id).await;
    let request = open_request(&h, org_id, &customer).await;

    h.dispatch
        .assign_technician(org_id, request.request_id, technician.id)
        .await
        .unwrap();
    h.dispatch
        .update_status(org_id, request.request_id, RequestStatus::Closed)
        .await
        .unwrap();
    let again = h
        .dispatch
        .update_status(org_id, request.request_id, RequestStatus::Closed)
        .await
        .unwrap();

    assert_eq!(again.status(), RequestStatus::Closed);
    assert_eq!(again.assigned_to(), None);
    let stored_tech = h
        .technicians
        .find(org_id, technician.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored_tech.work_status, WorkStatus::Free);
}
