// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;
use uuid::Uuid;

use aquaflow_core::domain::order::DeviceId;
use aquaflow_core::domain::service_request::RequestId;
use aquaflow_core::domain::technician::TechnicianId;
use aquaflow_core::domain::tenant::{TenantId, UserId};

use super::{finish, parse_request_status};
use crate::sandbox::Sandbox;

#[derive(Subcommand)]
pub enum RequestCommand {
    /// Open a service request for a customer's device
    Open {
        #[arg(long)]
        org: Uuid,
        #[arg(long)]
        customer: Uuid,
        #[arg(long)]
        device: String,
        #[arg(long)]
        issue: String,
    },

    /// Assign a free technician; marks them busy
    Assign {
        #[arg(long)]
        org: Uuid,
        #[arg(long)]
        request: Uuid,
        #[arg(long)]
        technician: Uuid,
    },

    /// Move the request between open, assigned and closed
    Status {
        #[arg(long)]
        org: Uuid,
        #[arg(long)]
        request: Uuid,
        /// open, assigned or closed
        #[arg(long)]
        to: String,
    },
}

pub async fn handle_command(command: RequestCommand, state_path: &Path) -> Result<()> {
    let mut sandbox = Sandbox::load(state_path).await?;

    match command {
        RequestCommand::Open {
            org,
            customer,
            device,
            issue,
        } => {
            let result = sandbox
                .dispatch
                .open_request(TenantId(org), UserId(customer), DeviceId(device), &issue)
                .await;
            finish(&mut sandbox, state_path, result)
        }
        RequestCommand::Assign {
            org,
            request,
            technician,
        } => {
            let result = sandbox
                .dispatch
                .assign_technician(TenantId(org), RequestId(request), TechnicianId(technician))
                .await;
            finish(&mut sandbox, state_path, result)
        }
        RequestCommand::Status { org, request, to } => {
            let result = match parse_request_status(&to) {
                Ok(status) => {
                    sandbox
                        .dispatch
                        .update_status(TenantId(org), RequestId(request), status)
                        .await
                }
                Err(err) => Err(err),
            };
            finish(&mut sandbox, state_path, result)
        }
    }
}
