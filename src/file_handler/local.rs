// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;

use super::transfer::{Media, Mode};
use super::traversal::Select;
use super::{FileHandler, PathRef};
use crate::error::{Error, Result};
use crate::status::OperationReport;

/// File handler for the host filesystem. Remote paths are rejected.
pub struct LocalFileHandler {
    media: Media,
}

impl Default for LocalFileHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalFileHandler {
    pub fn new() -> Self {
        Self {
            media: Media::local_only(),
        }
    }
}

fn require_local(paths: &[&PathRef]) -> Result<()> {
    match paths.iter().find(|p| p.is_remote()) {
        Some(remote) => Err(Error::Configuration(format!(
            "local file handler cannot access remote path '{remote}'"
        ))),
        None => Ok(()),
    }
}

#[async_trait]
impl FileHandler for LocalFileHandler {
    async fn exists(&self, path: &PathRef) -> Result<bool> {
        require_local(&[path])?;
        self.media.exists(path).await
    }

    async fn move_path(&self, source: &PathRef, destination: &PathRef) -> Result<OperationReport> {
        require_local(&[source, destination])?;
        self.media.transfer(source, destination, Mode::Move).await
    }

    async fn copy_path(&self, source: &PathRef, destination: &PathRef) -> Result<OperationReport> {
        require_local(&[source, destination])?;
        self.media.transfer(source, destination, Mode::Copy).await
    }

    async fn list_files(&self, directory: &PathRef) -> Result<Vec<PathRef>> {
        require_local(&[directory])?;
        self.media.list(directory, Select::Files).await
    }

    async fn list_directories(&self, directory: &PathRef) -> Result<Vec<PathRef>> {
        require_local(&[directory])?;
        self.media.list(directory, Select::Directories).await
    }

    async fn delete(&self, path: &PathRef) -> Result<OperationReport> {
        require_local(&[path])?;
        self.media.delete(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_rejects_remote_paths() {
        let handler = LocalFileHandler::new();
        let err = handler.exists(&PathRef::remote("/tmp")).await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let dir = TempDir::new().unwrap();
        let err = handler
            .copy_path(&PathRef::local(dir.path()), &PathRef::remote("/tmp"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[tokio::test]
    async fn test_exists() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("f"), b"x").unwrap();
        let handler = LocalFileHandler::new();
        assert!(handler
            .exists(&PathRef::local(dir.path().join("f")))
            .await
            .unwrap());
        assert!(!handler
            .exists(&PathRef::local(dir.path().join("g")))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_copy_then_delete() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("f.txt");
        fs::write(&src, b"hello").unwrap();
        let handler = LocalFileHandler::new();

        let dst = PathRef::local(dir.path().join("g.txt"));
        let report = handler.copy_path(&PathRef::local(&src), &dst).await.unwrap();
        assert!(report.is_success());
        assert_eq!(fs::read(&src).unwrap(), fs::read(dir.path().join("g.txt")).unwrap());

        let report = handler.delete(&dst).await.unwrap();
        assert!(report.is_success());
        assert!(!handler.exists(&dst).await.unwrap());
    }
}
