// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0
//! Aquaflow platform core.
//!
//! Domain model and workflow engine for a multi-tenant water-purifier
//! service business: installation orders, service requests, technician
//! dispatch and KYC synchronization.
//!
//! # Architecture
//!
//! - **Domain**: aggregates, repository contracts, collaborator boundaries
//! - **Application**: the workflow engine services
//! - **Infrastructure**: in-memory repositories, event bus, local adapters

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use domain::*;
