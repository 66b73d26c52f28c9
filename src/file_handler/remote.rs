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

use std::sync::Arc;

use async_trait::async_trait;

use super::medium::RemoteMedium;
use super::transfer::{Media, Mode};
use super::traversal::Select;
use super::{FileHandler, PathRef};
use crate::connection::{Connection, ConnectionConfiguration, ConnectionManager};
use crate::error::Result;
use crate::status::OperationReport;

/// File handler bound to one connection.
///
/// Remote paths live on the connection's host. The transfer channel is only
/// opened when a call touches a remote path.
#[derive(Debug, Clone)]
pub struct RemoteFileHandler {
    connection: Arc<Connection>,
}

impl RemoteFileHandler {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    /// Open or reuse the named connection and bind a handler to it.
    pub async fn connect(manager: &ConnectionManager, config: ConnectionConfiguration) -> Result<Self> {
        let connection = manager.open_connection(config).await?;
        Ok(Self::new(connection))
    }

    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    async fn media(&self, paths: &[&PathRef]) -> Result<Media> {
        if paths.iter().all(|p| p.is_local()) {
            return Ok(Media::local_only());
        }
        let channel = self.connection.transfer_channel().await?;
        let session = Arc::clone(self.connection.session());
        Ok(Media::with_remote(RemoteMedium::new(channel, Some(session))))
    }
}

#[async_trait]
impl FileHandler for RemoteFileHandler {
    async fn exists(&self, path: &PathRef) -> Result<bool> {
        self.media(&[path]).await?.exists(path).await
    }

    async fn move_path(&self, source: &PathRef, destination: &PathRef) -> Result<OperationReport> {
        self.media(&[source, destination])
            .await?
            .transfer(source, destination, Mode::Move)
            .await
    }

    async fn copy_path(&self, source: &PathRef, destination: &PathRef) -> Result<OperationReport> {
        self.media(&[source, destination])
            .await?
            .transfer(source, destination, Mode::Copy)
            .await
    }

    async fn list_files(&self, directory: &PathRef) -> Result<Vec<PathRef>> {
        self.media(&[directory])
            .await?
            .list(directory, Select::Files)
            .await
    }

    async fn list_directories(&self, directory: &PathRef) -> Result<Vec<PathRef>> {
        self.media(&[directory])
            .await?
            .list(directory, Select::Directories)
            .await
    }

    async fn delete(&self, path: &PathRef) -> Result<OperationReport> {
        self.media(&[path]).await?.delete(path).await
    }
}
