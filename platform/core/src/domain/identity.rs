// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::tenant::{Principal, TenantResolutionError};

/// Boundary to the authentication subsystem. Session issuance, password
/// reset and token formats live on the far side; the engine only consumes
/// resolved principals.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, credential: &str) -> Result<Principal, IdentityError>;
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("credential not recognized")]
    Unknown,

    #[error(transparent)]
    Tenant(#[from] TenantResolutionError),
}
