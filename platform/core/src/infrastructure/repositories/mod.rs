// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

pub mod memory;

pub use memory::{
    InMemoryCustomerRepository, InMemoryOrderRepository, InMemoryServiceRequestRepository,
    InMemoryTechnicianRepository,
};
