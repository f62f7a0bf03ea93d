// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;
use uuid::Uuid;

use aquaflow_core::domain::customer::KycStatus;
use aquaflow_core::domain::error::WorkflowError;
use aquaflow_core::domain::repository::TechnicianRepository;
use aquaflow_core::domain::technician::Technician;
use aquaflow_core::domain::tenant::{TenantId, UserId};

use super::finish;
use crate::sandbox::Sandbox;

#[derive(Subcommand)]
pub enum TechnicianCommand {
    /// Onboard a technician, active and KYC-approved (sandbox convenience)
    Add {
        #[arg(long)]
        org: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
    },

    /// List technicians that are free and identity-verified
    List {
        #[arg(long)]
        org: Uuid,
    },
}

pub async fn handle_command(command: TechnicianCommand, state_path: &Path) -> Result<()> {
    let mut sandbox = Sandbox::load(state_path).await?;

    match command {
        TechnicianCommand::Add { org, name, phone } => {
            let mut technician = Technician::new(TenantId(org), UserId::new(), name, phone);
            technician.activate();
            technician.review_kyc(KycStatus::Approved);
            let result = match sandbox.technicians.insert(&technician).await {
                Ok(()) => Ok(technician),
                Err(err) => Err(WorkflowError::from_store(err, vec![])),
            };
            finish(&mut sandbox, state_path, result)
        }
        TechnicianCommand::List { org } => {
            let result = sandbox.directory.list_available(TenantId(org)).await;
            finish(&mut sandbox, state_path, result)
        }
    }
}
