// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

//! Sandbox wiring: the engine services over in-memory repositories, hydrated
//! from and persisted to a JSON state file between invocations.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use tracing::debug;

use aquaflow_core::application::{DispatchService, FulfillmentEngine, KycService, TechnicianDirectory};
use aquaflow_core::domain::customer::Customer;
use aquaflow_core::domain::order::InstallationOrder;
use aquaflow_core::domain::repository::{
    CustomerRepository, OrderRepository, ServiceRequestRepository, TechnicianRepository,
};
use aquaflow_core::domain::service_request::ServiceRequest;
use aquaflow_core::domain::technician::Technician;
use aquaflow_core::infrastructure::event_bus::{EventBus, EventReceiver};
use aquaflow_core::infrastructure::notify::TracingNotifier;
use aquaflow_core::infrastructure::repositories::{
    InMemoryCustomerRepository, InMemoryOrderRepository, InMemoryServiceRequestRepository,
    InMemoryTechnicianRepository,
};

/// Everything the sandbox persists between invocations.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SandboxState {
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub technicians: Vec<Technician>,
    #[serde(default)]
    pub orders: Vec<InstallationOrder>,
    #[serde(default)]
    pub requests: Vec<ServiceRequest>,
}

pub struct Sandbox {
    pub customers: Arc<InMemoryCustomerRepository>,
    pub technicians: Arc<InMemoryTechnicianRepository>,
    pub orders: Arc<InMemoryOrderRepository>,
    pub requests: Arc<InMemoryServiceRequestRepository>,
    pub engine: FulfillmentEngine,
    pub kyc: KycService,
    pub dispatch: DispatchService,
    pub directory: TechnicianDirectory,
    events: EventReceiver,
}

impl Sandbox {
    /// Hydrate the repositories from the state file (an absent file is an
    /// empty sandbox).
    pub async fn load(path: &Path) -> Result<Self> {
        let state: SandboxState = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read state file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("State file {} is not valid", path.display()))?
        } else {
            SandboxState::default()
        };
        debug!(
            customers = state.customers.len(),
            technicians = state.technicians.len(),
            orders = state.orders.len(),
            requests = state.requests.len(),
            "sandbox state loaded"
        );

        let customers = Arc::new(InMemoryCustomerRepository::new());
        let technicians = Arc::new(InMemoryTechnicianRepository::new());
        let orders = Arc::new(InMemoryOrderRepository::new());
        let requests = Arc::new(InMemoryServiceRequestRepository::new());

        for customer in &state.customers {
            customers.insert(customer).await?;
        }
        for technician in &state.technicians {
            technicians.insert(technician).await?;
        }
        for order in &state.orders {
            orders.insert(order).await?;
        }
        for request in &state.requests {
            requests.insert(request).await?;
        }

        let bus = Arc::new(EventBus::with_default_capacity());
        let events = bus.subscribe();

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
        let dispatch = DispatchService::new(
            requests.clone(),
            technicians.clone(),
            customers.clone(),
            bus.clone(),
        );
        let directory = TechnicianDirectory::new(technicians.clone());

        Ok(Self {
            customers,
            technicians,
            orders,
            requests,
            engine,
            kyc,
            dispatch,
            directory,
            events,
        })
    }

    /// Write the repositories back to the state file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let state = SandboxState {
            customers: self.customers.snapshot(),
            technicians: self.technicians.snapshot(),
            orders: self.orders.snapshot(),
            requests: self.requests.snapshot(),
        };
        let raw = serde_json::to_string_pretty(&state)?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write state file {}", path.display()))?;
        Ok(())
    }

    /// Print the workflow events the last operation emitted.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            if let Ok(line) = serde_json::to_string(&event) {
                println!("{} {}", "event".blue(), line);
            }
        }
    }
}
