// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;
use uuid::Uuid;

use aquaflow_core::domain::customer::Customer;
use aquaflow_core::domain::error::WorkflowError;
use aquaflow_core::domain::repository::CustomerRepository;
use aquaflow_core::domain::tenant::{TenantId, UserId};

use super::{finish, parse_kyc_status};
use crate::sandbox::Sandbox;

#[derive(Subcommand)]
pub enum CustomerCommand {
    /// Register a customer record (stands in for the registration flow)
    Add {
        #[arg(long)]
        org: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
    },

    /// Review the customer's identity KYC; propagates to all their orders
    ReviewKyc {
        #[arg(long)]
        org: Uuid,
        #[arg(long)]
        customer: Uuid,
        /// pending, approved or rejected
        #[arg(long)]
        status: String,
    },
}

pub async fn handle_command(command: CustomerCommand, state_path: &Path) -> Result<()> {
    let mut sandbox = Sandbox::load(state_path).await?;

    match command {
        CustomerCommand::Add {
            org,
            name,
            phone,
            address,
        } => {
            let customer = Customer::new(TenantId(org), UserId::new(), name, phone, address);
            let result = match sandbox.customers.insert(&customer).await {
                Ok(()) => Ok(customer),
                Err(err) => Err(WorkflowError::from_store(err, vec![])),
            };
            finish(&mut sandbox, state_path, result)
        }
        CustomerCommand::ReviewKyc {
            org,
            customer,
            status,
        } => {
            let result = match parse_kyc_status(&status) {
                Ok(verdict) => {
                    sandbox
                        .kyc
                        .review_customer(TenantId(org), UserId(customer), verdict)
                        .await
                }
                Err(err) => Err(err),
            };
            finish(&mut sandbox, state_path, result)
        }
    }
}
