// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

//! In-memory repository implementations, used for development, the sandbox
//! CLI and tests. A production deployment swaps these for a document-store
//! implementation behind the same traits.
//!
//! Each repository yields to the scheduler once per call so concurrent
//! operations interleave the way real store round-trips do; without it, an
//! in-process call would run load-to-write without a suspension point and
//! races could never be exercised.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::task::yield_now;

use crate::domain::customer::Customer;
use crate::domain::order::{InstallationOrder, OrderId};
use crate::domain::repository::{
    CustomerRepository, OrderRepository, RepositoryError, ServiceRequestRepository,
    TechnicianRepository,
};
use crate::domain::service_request::{RequestId, ServiceRequest};
use crate::domain::technician::{Technician, TechnicianId, WorkStatus};
use crate::domain::tenant::{TenantId, UserId};

#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: DashMap<(TenantId, UserId), Customer>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dump every record, for state export.
    pub fn snapshot(&self) -> Vec<Customer> {
        self.customers.iter().map(|e| e.value().clone()).collect()
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn insert(&self, customer: &Customer) -> Result<(), RepositoryError> {
        yield_now().await;
        match self.customers.entry((customer.org_id, customer.user_id)) {
            Entry::Occupied(_) => Err(RepositoryError::Duplicate(format!(
                "customer {}",
                customer.user_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(customer.clone());
                Ok(())
            }
        }
    }

    async fn find(
        &self,
        org_id: TenantId,
        user_id: UserId,
    ) -> Result<Option<Customer>, RepositoryError> {
        yield_now().await;
        Ok(self.customers.get(&(org_id, user_id)).map(|e| e.clone()))
    }

    async fn update(&self, customer: &Customer) -> Result<Customer, RepositoryError> {
        yield_now().await;
        match self.customers.entry((customer.org_id, customer.user_id)) {
            Entry::Occupied(mut slot) => {
                if slot.get().version != customer.version {
                    return Err(RepositoryError::Conflict(format!(
                        "customer {}",
                        customer.user_id
                    )));
                }
                let mut next = customer.clone();
                next.version += 1;
                slot.insert(next.clone());
                Ok(next)
            }
            Entry::Vacant(_) => Err(RepositoryError::Conflict(format!(
                "customer {} no longer exists",
                customer.user_id
            ))),
        }
    }
}

#[derive(Default)]
pub struct InMemoryTechnicianRepository {
    technicians: DashMap<(TenantId, TechnicianId), Technician>,
}

impl InMemoryTechnicianRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Technician> {
        self.technicians.iter().map(|e| e.value().clone()).collect()
    }
}

#[async_trait]
impl TechnicianRepository for InMemoryTechnicianRepository {
    async fn insert(&self, technician: &Technician) -> Result<(), RepositoryError> {
        yield_now().await;
        // Uniqueness on (tenant, user) mirrors the store constraint.
        let duplicate_user = self.technicians.iter().any(|e| {
            e.key().0 == technician.org_id
                && e.value().user_id == technician.user_id
                && e.key().1 != technician.id
        });
        if duplicate_user {
            return Err(RepositoryError::Duplicate(format!(
                "technician user {}",
                technician.user_id
            )));
        }
        match self.technicians.entry((technician.org_id, technician.id)) {
            Entry::Occupied(_) => Err(RepositoryError::Duplicate(format!(
                "technician {}",
                technician.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(technician.clone());
                Ok(())
            }
        }
    }

    async fn find(
        &self,
        org_id: TenantId,
        id: TechnicianId,
    ) -> Result<Option<Technician>, RepositoryError> {
        yield_now().await;
        Ok(self.technicians.get(&(org_id, id)).map(|e| e.clone()))
    }

    async fn update(&self, technician: &Technician) -> Result<Technician, RepositoryError> {
        yield_now().await;
        match self.technicians.entry((technician.org_id, technician.id)) {
            Entry::Occupied(mut slot) => {
                if slot.get().version != technician.version {
                    return Err(RepositoryError::Conflict(format!(
                        "technician {}",
                        technician.id
                    )));
                }
                let mut next = technician.clone();
                next.version += 1;
                slot.insert(next.clone());
                Ok(next)
            }
            Entry::Vacant(_) => Err(RepositoryError::Conflict(format!(
                "technician {} no longer exists",
                technician.id
            ))),
        }
    }

    async fn set_work_status(
        &self,
        org_id: TenantId,
        id: TechnicianId,
        status: WorkStatus,
    ) -> Result<(), RepositoryError> {
        yield_now().await;
        if let Some(mut slot) = self.technicians.get_mut(&(org_id, id)) {
            slot.work_status = status;
            slot.updated_at = chrono::Utc::now();
            slot.version += 1;
        }
        Ok(())
    }

    async fn list(&self, org_id: TenantId) -> Result<Vec<Technician>, RepositoryError> {
        yield_now().await;
        Ok(self
            .technicians
            .iter()
            .filter(|e| e.key().0 == org_id)
            .map(|e| e.value().clone())
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: DashMap<(TenantId, OrderId), InstallationOrder>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<InstallationOrder> {
        self.orders.iter().map(|e| e.value().clone()).collect()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, order: &InstallationOrder) -> Result<(), RepositoryError> {
        yield_now().await;
        match self.orders.entry((order.org_id, order.order_id)) {
            Entry::Occupied(_) => Err(RepositoryError::Duplicate(format!(
                "order {}",
                order.order_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(order.clone());
                Ok(())
            }
        }
    }

    async fn find(
        &self,
        org_id: TenantId,
        id: OrderId,
    ) -> Result<Option<InstallationOrder>, RepositoryError> {
        yield_now().await;
        Ok(self.orders.get(&(org_id, id)).map(|e| e.clone()))
    }

    async fn update(
        &self,
        order: &InstallationOrder,
    ) -> Result<InstallationOrder, RepositoryError> {
        yield_now().await;
        match self.orders.entry((order.org_id, order.order_id)) {
            Entry::Occupied(mut slot) => {
                if slot.get().version != order.version {
                    return Err(RepositoryError::Conflict(format!("order {}", order.order_id)));
                }
                let mut next = order.clone();
                next.version += 1;
                slot.insert(next.clone());
                Ok(next)
            }
            Entry::Vacant(_) => Err(RepositoryError::Conflict(format!(
                "order {} no longer exists",
                order.order_id
            ))),
        }
    }

    async fn list_by_customer(
        &self,
        org_id: TenantId,
        user_id: UserId,
    ) -> Result<Vec<InstallationOrder>, RepositoryError> {
        yield_now().await;
        Ok(self
            .orders
            .iter()
            .filter(|e| e.key().0 == org_id && e.value().user_id == user_id)
            .map(|e| e.value().clone())
            .collect())
    }

    async fn set_kyc_verified_for_customer(
        &self,
        org_id: TenantId,
        user_id: UserId,
        verified: bool,
    ) -> Result<usize, RepositoryError> {
        yield_now().await;
        let mut touched = 0;
        for mut entry in self.orders.iter_mut() {
            if entry.key().0 == org_id && entry.value().user_id == user_id {
                entry.value_mut().sync_customer_kyc(verified);
                entry.value_mut().version += 1;
                touched += 1;
            }
        }
        Ok(touched)
    }
}

#[derive(Default)]
pub struct InMemoryServiceRequestRepository {
    requests: DashMap<(TenantId, RequestId), ServiceRequest>,
}

impl InMemoryServiceRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<ServiceRequest> {
        self.requests.iter().map(|e| e.value().clone()).collect()
    }
}

#[async_trait]
impl ServiceRequestRepository for InMemoryServiceRequestRepository {
    async fn insert(&self, request: &ServiceRequest) -> Result<(), RepositoryError> {
        yield_now().await;
        match self.requests.entry((request.org_id, request.request_id)) {
            Entry::Occupied(_) => Err(RepositoryError::Duplicate(format!(
                "service request {}",
                request.request_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(request.clone());
                Ok(())
            }
        }
    }

    async fn find(
        &self,
        org_id: TenantId,
        id: RequestId,
    ) -> Result<Option<ServiceRequest>, RepositoryError> {
        yield_now().await;
        Ok(self.requests.get(&(org_id, id)).map(|e| e.clone()))
    }

    async fn update(&self, request: &ServiceRequest) -> Result<ServiceRequest, RepositoryError> {
        yield_now().await;
        match self.requests.entry((request.org_id, request.request_id)) {
            Entry::Occupied(mut slot) => {
                if slot.get().version != request.version {
                    return Err(RepositoryError::Conflict(format!(
                        "service request {}",
                        request.request_id
                    )));
                }
                let mut next = request.clone();
                next.version += 1;
                slot.insert(next.clone());
                Ok(next)
            }
            Entry::Vacant(_) => Err(RepositoryError::Conflict(format!(
                "service request {} no longer exists",
                request.request_id
            ))),
        }
    }
}
