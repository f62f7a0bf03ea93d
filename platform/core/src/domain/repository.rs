// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contracts for each aggregate root: one repository per
//! aggregate, interface defined in the domain layer, implemented in
//! `crate::infrastructure::repositories`.
//!
//! Every method is scoped by `TenantId`; a record in another tenant is
//! indistinguishable from an absent one. `update` is a compare-and-swap on
//! the `version` the record was loaded at, so a guard checked against that
//! load gates exactly the state it observed; the losing side of a race gets
//! [`RepositoryError::Conflict`], never a silent overwrite.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::customer::Customer;
use crate::domain::order::{InstallationOrder, OrderId};
use crate::domain::service_request::{RequestId, ServiceRequest};
use crate::domain::technician::{Technician, TechnicianId, WorkStatus};
use crate::domain::tenant::{TenantId, UserId};

/// Failure inside a record store.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Uniqueness constraint violated on insert.
    #[error("record already exists: {0}")]
    Duplicate(String),

    /// Version compare-and-swap lost against a concurrent writer.
    #[error("concurrent modification of {0}")]
    Conflict(String),

    /// Transient infrastructure failure; safe to retry.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn insert(&self, customer: &Customer) -> Result<(), RepositoryError>;

    async fn find(
        &self,
        org_id: TenantId,
        user_id: UserId,
    ) -> Result<Option<Customer>, RepositoryError>;

    /// Compare-and-swap write; returns the stored record with its new
    /// version.
    async fn update(&self, customer: &Customer) -> Result<Customer, RepositoryError>;
}

#[async_trait]
pub trait TechnicianRepository: Send + Sync {
    async fn insert(&self, technician: &Technician) -> Result<(), RepositoryError>;

    async fn find(
        &self,
        org_id: TenantId,
        id: TechnicianId,
    ) -> Result<Option<Technician>, RepositoryError>;

    /// Compare-and-swap write; the acquisition path (free → busy) relies on
    /// this to serialize concurrent bookings.
    async fn update(&self, technician: &Technician) -> Result<Technician, RepositoryError>;

    /// Unconditional work-status write, used by release paths where the
    /// current version is irrelevant. Missing records are a no-op.
    async fn set_work_status(
        &self,
        org_id: TenantId,
        id: TechnicianId,
        status: WorkStatus,
    ) -> Result<(), RepositoryError>;

    async fn list(&self, org_id: TenantId) -> Result<Vec<Technician>, RepositoryError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert(&self, order: &InstallationOrder) -> Result<(), RepositoryError>;

    async fn find(
        &self,
        org_id: TenantId,
        id: OrderId,
    ) -> Result<Option<InstallationOrder>, RepositoryError>;

    /// Compare-and-swap write; returns the stored record with its new
    /// version.
    async fn update(&self, order: &InstallationOrder)
        -> Result<InstallationOrder, RepositoryError>;

    async fn list_by_customer(
        &self,
        org_id: TenantId,
        user_id: UserId,
    ) -> Result<Vec<InstallationOrder>, RepositoryError>;

    /// Bulk, unconditional `kyc_verified` write across every order of a
    /// customer, open or closed. Returns how many records were touched.
    async fn set_kyc_verified_for_customer(
        &self,
        org_id: TenantId,
        user_id: UserId,
        verified: bool,
    ) -> Result<usize, RepositoryError>;
}

#[async_trait]
pub trait ServiceRequestRepository: Send + Sync {
    async fn insert(&self, request: &ServiceRequest) -> Result<(), RepositoryError>;

    async fn find(
        &self,
        org_id: TenantId,
        id: RequestId,
    ) -> Result<Option<ServiceRequest>, RepositoryError>;

    /// Compare-and-swap write; returns the stored record with its new
    /// version.
    async fn update(&self, request: &ServiceRequest) -> Result<ServiceRequest, RepositoryError>;
}
