// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

//! Service-request dispatch (application service).
//!
//! The single-approval assignment variant. This path owns the technician's
//! busy/free flips: assignment acquires the technician before writing the
//! request, and closure releases them. The acquisition is a version
//! compare-and-swap on the technician record, which is the lock that keeps
//! two requests from booking the same technician; a compensating release
//! runs if the request write loses afterwards.

use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use tracing::{info, warn};

use crate::domain::error::WorkflowError;
use crate::domain::events::WorkflowEvent;
use crate::domain::order::DeviceId;
use crate::domain::repository::{
    CustomerRepository, ServiceRequestRepository, TechnicianRepository,
};
use crate::domain::service_request::{RequestId, RequestStatus, ServiceRequest};
use crate::domain::technician::{TechnicianId, WorkStatus};
use crate::domain::tenant::{TenantId, UserId};
use crate::infrastructure::event_bus::EventBus;

pub struct DispatchService {
    requests: Arc<dyn ServiceRequestRepository>,
    technicians: Arc<dyn TechnicianRepository>,
    customers: Arc<dyn CustomerRepository>,
    event_bus: Arc<EventBus>,
}

impl DispatchService {
    pub fn new(
        requests: Arc<dyn ServiceRequestRepository>,
        technicians: Arc<dyn TechnicianRepository>,
        customers: Arc<dyn CustomerRepository>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            requests,
            technicians,
            customers,
            event_bus,
        }
    }

    /// Open a service request for an existing customer's device.
    pub async fn open_request(
        &self,
        org_id: TenantId,
        user_id: UserId,
        device_id: DeviceId,
        issue: &str,
    ) -> Result<ServiceRequest, WorkflowError> {
        if issue.trim().is_empty() {
            return Err(WorkflowError::validation("issue description must not be empty"));
        }
        self.customers
            .find(org_id, user_id)
            .await
            .map_err(|e| WorkflowError::from_store(e, vec![]))?
            .ok_or_else(|| WorkflowError::not_found("customer"))?;

        let request = ServiceRequest::new(org_id, user_id, device_id, issue);
        self.requests
            .insert(&request)
            .await
            .map_err(|e| WorkflowError::from_store(e, vec![]))?;

        info!(org_id = %org_id, request_id = %request.request_id, "service request opened");
        self.event_bus.publish(WorkflowEvent::RequestOpened {
            org_id,
            request_id: request.request_id,
            user_id,
            opened_at: Utc::now(),
        });

        Ok(request)
    }

    /// Assign a technician to an open request, marking the technician busy.
    ///
    /// The availability listing's predicate (free + KYC approved) is
    /// re-validated here; a listing is never trusted. Order of effects:
    /// technician first (free → busy under version check), then the request.
    /// If the request write loses, the acquisition is compensated back to
    /// free before the rejection is returned.
    pub async fn assign_technician(
        &self,
        org_id: TenantId,
        request_id: RequestId,
        technician_id: TechnicianId,
    ) -> Result<ServiceRequest, WorkflowError> {
        let mut request = self.load_request(org_id, request_id).await?;
        if request.status() != RequestStatus::Open {
            return Err(WorkflowError::precondition("request must be open"));
        }

        let mut technician = self
            .technicians
            .find(org_id, technician_id)
            .await
            .map_err(|e| WorkflowError::from_store(e, vec![]))?
            .ok_or_else(|| WorkflowError::not_found("technician"))?;
        if !technician.kyc_status.is_approved() {
            return Err(WorkflowError::precondition("technician kyc must be approved"));
        }
        technician
            .acquire()
            .map_err(|e| WorkflowError::precondition(e.to_string()))?;

        let technician = self
            .technicians
            .update(&technician)
            .await
            .map_err(|e| WorkflowError::from_store(e, vec![]))?;

        request
            .assign(technician.id)
            .map_err(|e| WorkflowError::precondition(e.to_string()))?;
        match self.requests.update(&request).await {
            Ok(saved) => {
                info!(
                    org_id = %org_id,
                    request_id = %request_id,
                    technician_id = %technician_id,
                    "service request assigned"
                );
                counter!("aquaflow_request_assignments_total").increment(1);
                self.event_bus.publish(WorkflowEvent::RequestAssigned {
                    org_id,
                    request_id,
                    technician_id,
                    assigned_at: Utc::now(),
                });
                Ok(saved)
            }
            Err(e) => {
                // The request write lost; give the technician back.
                if let Err(compensation) = self
                    .technicians
                    .set_work_status(org_id, technician.id, WorkStatus::Free)
                    .await
                {
                    warn!(
                        org_id = %org_id,
                        technician_id = %technician_id,
                        "technician left busy after failed assignment"
                    );
                    return Err(WorkflowError::Storage {
                        completed_writes: vec!["technician.work_status"],
                        source: compensation,
                    });
                }
                Err(WorkflowError::from_store(e, vec![]))
            }
        }
    }

    /// Move a request between `open`, `assigned` and `closed`.
    ///
    /// Entering `closed` with a live assignment frees the technician and
    /// clears the assignment; leaving `closed` clears (and frees) a stale
    /// assignment left behind by an interrupted closure. The rules are
    /// applied independently on every transition.
    pub async fn update_status(
        &self,
        org_id: TenantId,
        request_id: RequestId,
        new_status: RequestStatus,
    ) -> Result<ServiceRequest, WorkflowError> {
        let mut request = self.load_request(org_id, request_id).await?;
        let from = request.status();
        let effects = request.transition(new_status);

        let request = self
            .requests
            .update(&request)
            .await
            .map_err(|e| WorkflowError::from_store(e, vec![]))?;

        if let Some(technician_id) = effects.released {
            self.technicians
                .set_work_status(org_id, technician_id, WorkStatus::Free)
                .await
                .map_err(|e| WorkflowError::Storage {
                    completed_writes: vec!["service_request"],
                    source: e,
                })?;
            info!(org_id = %org_id, technician_id = %technician_id, "technician released");
        }

        info!(
            org_id = %org_id,
            request_id = %request_id,
            from = ?from,
            to = ?new_status,
            "service request status changed"
        );
        self.event_bus.publish(WorkflowEvent::RequestStatusChanged {
            org_id,
            request_id,
            from,
            to: new_status,
            released_technician: effects.released,
            changed_at: Utc::now(),
        });

        Ok(request)
    }

    async fn load_request(
        &self,
        org_id: TenantId,
        request_id: RequestId,
    ) -> Result<ServiceRequest, WorkflowError> {
        self.requests
            .find(org_id, request_id)
            .await
            .map_err(|e| WorkflowError::from_store(e, vec![]))?
            .ok_or_else(|| WorkflowError::not_found("service request"))
    }
}
