// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

//! Local filesystem file store.
//!
//! Single-node implementation of the file-storage collaborator for
//! development and testing. Stored files are addressed by an opaque
//! reference; nothing in the domain ever sees a path.

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::storage::{FileRef, FileStore, FileStoreError};

pub struct LocalFileStore {
    base_path: PathBuf,
}

impl LocalFileStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, FileStoreError> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(&self, name: &str, bytes: &[u8]) -> Result<FileRef, FileStoreError> {
        // Path separators in a client-supplied name would escape the base
        // directory.
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(FileStoreError::InvalidName(name.to_string()));
        }

        let reference = format!("{}-{}", Uuid::new_v4(), name);
        tokio::fs::write(self.base_path.join(&reference), bytes).await?;
        Ok(FileRef(reference))
    }
}
