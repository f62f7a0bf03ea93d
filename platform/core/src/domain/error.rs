// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

use thiserror::Error;

use crate::domain::repository::RepositoryError;

/// Typed rejection taxonomy for every workflow operation.
///
/// Guard failures are always local, typed rejections; they never cross the
/// workflow boundary as unannotated panics, and no operation silently no-ops
/// on a failed guard.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Entity absent or belonging to another tenant. Callers cannot tell
    /// which, so existence never leaks across tenants.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// A named guard did not hold. `reason` is a stable string naming the
    /// guard, not a generic failure.
    #[error("precondition failed: {reason}")]
    PreconditionFailed { reason: String },

    /// Lost a concurrent read-modify-write race. The state moved under the
    /// caller; retrying re-evaluates the guards against current state.
    #[error("conflict: {reason}")]
    Conflict { reason: String },

    /// Malformed input, e.g. an unknown status token.
    #[error("invalid input: {reason}")]
    Validation { reason: String },

    /// Transient store failure during a multi-write operation. Lists the
    /// writes that had already completed so a caller or reconciler can
    /// choose between retry and repair.
    #[error("storage unavailable after {n} completed write(s)", n = .completed_writes.len())]
    Storage {
        completed_writes: Vec<&'static str>,
        #[source]
        source: RepositoryError,
    },
}

impl WorkflowError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::PreconditionFailed {
            reason: reason.into(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Lift a store failure into the taxonomy. `completed_writes` names the
    /// writes of the current operation that had already been applied.
    pub fn from_store(source: RepositoryError, completed_writes: Vec<&'static str>) -> Self {
        match source {
            RepositoryError::Conflict(what) | RepositoryError::Duplicate(what) => Self::Conflict {
                reason: what,
            },
            RepositoryError::Unavailable(_) => Self::Storage {
                completed_writes,
                source,
            },
        }
    }

    /// Stable machine-readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::PreconditionFailed { .. } => "precondition_failed",
            Self::Conflict { .. } => "conflict",
            Self::Validation { .. } => "validation_error",
            Self::Storage { .. } => "storage_unavailable",
        }
    }
}
