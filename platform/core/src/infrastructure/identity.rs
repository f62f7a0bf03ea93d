// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::identity::{IdentityError, IdentityResolver};
use crate::domain::tenant::Principal;

/// Static token-table resolver for development, the sandbox CLI and tests.
/// Production deployments resolve credentials against the authentication
/// subsystem instead.
#[derive(Default)]
pub struct StaticIdentityResolver {
    principals: HashMap<String, Principal>,
}

impl StaticIdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, principal: Principal) -> Self {
        self.principals.insert(token.into(), principal);
        self
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentityResolver {
    async fn resolve(&self, credential: &str) -> Result<Principal, IdentityError> {
        self.principals
            .get(credential)
            .cloned()
            .ok_or(IdentityError::Unknown)
    }
}
