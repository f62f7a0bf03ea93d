// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use aquaflow_core::domain::customer::{Customer, KycStatus};
use aquaflow_core::domain::order::PlanId;
use aquaflow_core::domain::repository::{CustomerRepository, TechnicianRepository};
use aquaflow_core::domain::technician::Technician;
use aquaflow_core::domain::tenant::{TenantId, UserId};

use crate::sandbox::Sandbox;

/// Create a demo organization with one pending-KYC customer and one
/// available technician, and print the ids the other commands need.
pub async fn run(state_path: &Path) -> Result<()> {
    let sandbox = Sandbox::load(state_path).await?;

    let org_id = TenantId::new();

    let customer = Customer::new(
        org_id,
        UserId::new(),
        "Asha Verma",
        "+91-98111-22334",
        "8 Canal Street",
    );
    sandbox.customers.insert(&customer).await?;

    let mut technician = Technician::new(org_id, UserId::new(), "Ravi Kumar", "+91-97000-11111");
    technician.activate();
    technician.review_kyc(KycStatus::Approved);
    sandbox.technicians.insert(&technician).await?;

    sandbox.save(state_path)?;

    println!("{}", "Seeded demo organization".green().bold());
    println!("  org:         {org_id}");
    println!("  customer:    {} ({}, kyc pending)", customer.user_id, customer.name);
    println!(
        "  technician:  {} ({}, active, kyc approved)",
        technician.id, technician.name
    );
    println!("  plan:        {} (sample)", PlanId::new());
    println!();
    println!("Next: aquaflow order place --org {org_id} --customer {} --plan <PLAN> --device AQF-0001", customer.user_id);

    Ok(())
}
