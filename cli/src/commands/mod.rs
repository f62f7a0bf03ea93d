// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

pub mod customer;
pub mod order;
pub mod request;
pub mod seed;
pub mod technician;

pub use customer::CustomerCommand;
pub use order::OrderCommand;
pub use request::RequestCommand;
pub use technician::TechnicianCommand;

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use aquaflow_core::domain::customer::KycStatus;
use aquaflow_core::domain::error::WorkflowError;
use aquaflow_core::domain::order::ApprovalStatus;
use aquaflow_core::domain::service_request::RequestStatus;

use crate::sandbox::Sandbox;

/// Drain events, persist the sandbox, then report the outcome. Rejections
/// exit non-zero with the stable reason code; partial effects (e.g. a
/// compensated acquisition) are persisted exactly as the stores hold them.
pub(crate) fn finish<T: Serialize>(
    sandbox: &mut Sandbox,
    state_path: &Path,
    result: Result<T, WorkflowError>,
) -> Result<()> {
    sandbox.drain_events();
    sandbox.save(state_path)?;

    match result {
        Ok(record) => {
            println!("{}", "ok".green().bold());
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Err(err) => {
            eprintln!("{} [{}] {}", "rejected".red().bold(), err.code(), err);
            std::process::exit(1);
        }
    }
}

pub(crate) fn parse_kyc_status(token: &str) -> Result<KycStatus, WorkflowError> {
    match token.to_ascii_lowercase().as_str() {
        "pending" => Ok(KycStatus::Pending),
        "approved" => Ok(KycStatus::Approved),
        "rejected" => Ok(KycStatus::Rejected),
        other => Err(WorkflowError::validation(format!(
            "unknown kyc status '{other}' (expected pending, approved or rejected)"
        ))),
    }
}

pub(crate) fn parse_approval_status(token: &str) -> Result<ApprovalStatus, WorkflowError> {
    match token.to_ascii_lowercase().as_str() {
        "pending" => Ok(ApprovalStatus::Pending),
        "approved" => Ok(ApprovalStatus::Approved),
        "rejected" => Ok(ApprovalStatus::Rejected),
        other => Err(WorkflowError::validation(format!(
            "unknown approval status '{other}' (expected pending, approved or rejected)"
        ))),
    }
}

pub(crate) fn parse_request_status(token: &str) -> Result<RequestStatus, WorkflowError> {
    match token.to_ascii_lowercase().as_str() {
        "open" => Ok(RequestStatus::Open),
        "assigned" => Ok(RequestStatus::Assigned),
        "closed" => Ok(RequestStatus::Closed),
        other => Err(WorkflowError::validation(format!(
            "unknown request status '{other}' (expected open, assigned or closed)"
        ))),
    }
}
