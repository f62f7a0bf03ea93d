// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque reference to a stored file (KYC image, organization logo).
/// Records persist the reference only; bytes live behind the file store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRef(pub String);

impl std::fmt::Display for FileRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Boundary to the file-upload subsystem.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn store(&self, name: &str, bytes: &[u8]) -> Result<FileRef, FileStoreError>;
}

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("file store io failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid file name: {0}")]
    InvalidName(String),
}
