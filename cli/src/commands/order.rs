// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

//! Installation-order commands: the full fulfillment workflow from placement
//! through payment, KYC, assignment and completion.

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;
use uuid::Uuid;

use aquaflow_core::domain::order::{DeviceId, OrderId, PlanId};
use aquaflow_core::domain::technician::TechnicianId;
use aquaflow_core::domain::tenant::{TenantId, UserId};

use super::{finish, parse_approval_status};
use crate::sandbox::Sandbox;

#[derive(Subcommand)]
pub enum OrderCommand {
    /// Place a new installation order for a customer
    Place {
        #[arg(long)]
        org: Uuid,
        #[arg(long)]
        customer: Uuid,
        #[arg(long)]
        plan: Uuid,
        #[arg(long)]
        device: String,
    },

    /// Record the order's payment as received
    Pay {
        #[arg(long)]
        org: Uuid,
        #[arg(long)]
        order: Uuid,
    },

    /// Put a technician up for the order's assignment decision
    Assign {
        #[arg(long)]
        org: Uuid,
        #[arg(long)]
        order: Uuid,
        #[arg(long)]
        technician: Uuid,
    },

    /// Confirm the pending assignment (technician accepted)
    Approve {
        #[arg(long)]
        org: Uuid,
        #[arg(long)]
        order: Uuid,
    },

    /// Decline the pending assignment (technician refused)
    Reject {
        #[arg(long)]
        org: Uuid,
        #[arg(long)]
        order: Uuid,
    },

    /// Remove a pending assignment
    Remove {
        #[arg(long)]
        org: Uuid,
        #[arg(long)]
        order: Uuid,
    },

    /// Close the order as installed
    Complete {
        #[arg(long)]
        org: Uuid,
        #[arg(long)]
        order: Uuid,
    },

    /// Review the order-local installation KYC
    ReviewKyc {
        #[arg(long)]
        org: Uuid,
        #[arg(long)]
        order: Uuid,
        /// pending, approved or rejected
        #[arg(long)]
        status: String,
    },
}

pub async fn handle_command(command: OrderCommand, state_path: &Path) -> Result<()> {
    let mut sandbox = Sandbox::load(state_path).await?;

    match command {
        OrderCommand::Place {
            org,
            customer,
            plan,
            device,
        } => {
            let result = sandbox
                .engine
                .place_order(
                    TenantId(org),
                    UserId(customer),
                    PlanId(plan),
                    DeviceId(device),
                )
                .await;
            finish(&mut sandbox, state_path, result)
        }
        OrderCommand::Pay { org, order } => {
            let result = sandbox
                .engine
                .record_payment(TenantId(org), OrderId(order))
                .await;
            finish(&mut sandbox, state_path, result)
        }
        OrderCommand::Assign {
            org,
            order,
            technician,
        } => {
            let result = sandbox
                .engine
                .assign_technician(TenantId(org), OrderId(order), TechnicianId(technician))
                .await;
            finish(&mut sandbox, state_path, result)
        }
        OrderCommand::Approve { org, order } => {
            let result = sandbox
                .engine
                .approve_assignment(TenantId(org), OrderId(order))
                .await;
            finish(&mut sandbox, state_path, result)
        }
        OrderCommand::Reject { org, order } => {
            let result = sandbox
                .engine
                .reject_assignment(TenantId(org), OrderId(order))
                .await;
            finish(&mut sandbox, state_path, result)
        }
        OrderCommand::Remove { org, order } => {
            let result = sandbox
                .engine
                .remove_assignment(TenantId(org), OrderId(order))
                .await;
            finish(&mut sandbox, state_path, result)
        }
        OrderCommand::Complete { org, order } => {
            let result = sandbox
                .engine
                .complete_installation(TenantId(org), OrderId(order))
                .await;
            finish(&mut sandbox, state_path, result)
        }
        OrderCommand::ReviewKyc { org, order, status } => {
            let result = match parse_approval_status(&status) {
                Ok(verdict) => {
                    sandbox
                        .kyc
                        .review_order(TenantId(org), OrderId(order), verdict)
                        .await
                }
                Err(err) => Err(err),
            };
            finish(&mut sandbox, state_path, result)
        }
    }
}
