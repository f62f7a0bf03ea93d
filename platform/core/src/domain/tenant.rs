// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a tenant organization.
///
/// Every record in the platform carries one, and every repository method is
/// scoped by one. No operation may read or write a record whose tenant
/// differs from the caller's resolved tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub Uuid);

impl TenantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a platform user (customer or technician account).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of an authenticated caller.
///
/// Each variant carries its own tenant-resolution strategy; operations never
/// branch on role strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalRole {
    SuperAdmin,
    HeadAdmin,
    Admin,
    Technician,
}

impl PrincipalRole {
    /// Resolve the tenant an operation runs against.
    ///
    /// A super admin operates on an explicitly claimed organization. Every
    /// other role operates on its authenticated home organization; a
    /// client-supplied claim is ignored rather than trusted.
    pub fn resolve_tenant(
        &self,
        home: Option<TenantId>,
        claimed: Option<TenantId>,
    ) -> Result<TenantId, TenantResolutionError> {
        match self {
            Self::SuperAdmin => claimed.ok_or(TenantResolutionError::MissingClaim),
            Self::HeadAdmin | Self::Admin | Self::Technician => {
                home.ok_or(TenantResolutionError::NoHomeTenant)
            }
        }
    }
}

/// Authenticated caller identity, as produced by the identity resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: PrincipalRole,
    /// Home organization. `None` for platform operators without one.
    pub org_id: Option<TenantId>,
}

impl Principal {
    pub fn resolve_tenant(
        &self,
        claimed: Option<TenantId>,
    ) -> Result<TenantId, TenantResolutionError> {
        self.role.resolve_tenant(self.org_id, claimed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TenantResolutionError {
    #[error("a super admin must name the organization it operates on")]
    MissingClaim,

    #[error("principal has no home organization")]
    NoHomeTenant,
}
