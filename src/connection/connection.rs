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

use std::fmt;
use std::sync::Arc;

use tokio::sync::OnceCell;

use super::ConnectionConfiguration;
use crate::error::Result;
use crate::file_handler::medium::RemoteMedium;
use crate::file_handler::{traversal, PathRef};
use crate::ssh::{CommandOutput, Session, TransferChannel};

/// One authenticated session plus, once requested, its transfer channel.
///
/// Obtained from [`super::ConnectionManager::open_connection`]. A single
/// connection is not meant for overlapping transfers; callers serialize them.
pub struct Connection {
    id: u64,
    config: ConnectionConfiguration,
    session: Arc<dyn Session>,
    channel: OnceCell<Arc<dyn TransferChannel>>,
}

impl Connection {
    pub(crate) fn new(id: u64, config: ConnectionConfiguration, session: Arc<dyn Session>) -> Self {
        Self {
            id,
            config,
            session,
            channel: OnceCell::new(),
        }
    }

    /// Identity of the underlying session, unique within one manager.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        self.config.name()
    }

    pub fn configuration(&self) -> &ConnectionConfiguration {
        &self.config
    }

    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    pub fn is_connected(&self) -> bool {
        !self.session.is_closed()
    }

    /// The transfer channel, opened on first use.
    ///
    /// Later calls return the same channel. A failed open leaves the
    /// session usable and is retried by the next call.
    pub async fn transfer_channel(&self) -> Result<Arc<dyn TransferChannel>> {
        let channel = self
            .channel
            .get_or_try_init(|| async {
                tracing::debug!("Opening transfer channel for '{}'", self.name());
                self.session.open_transfer_channel().await
            })
            .await?;
        Ok(Arc::clone(channel))
    }

    /// Run a shell command on the remote host.
    pub async fn execute(&self, command: &str) -> Result<CommandOutput> {
        self.session.execute(command).await
    }

    /// Tear the connection down.
    ///
    /// Deletes the working directory first when the configuration asks for
    /// it; that failure is only logged. Returns the first error from closing
    /// the channel or disconnecting.
    pub async fn close(&self) -> Result<()> {
        if self.config.delete_working_directory() && self.is_connected() {
            if let Some(dir) = self.config.working_directory() {
                self.delete_working_directory(dir).await;
            }
        }

        let mut first_error = None;
        if let Some(channel) = self.channel.get() {
            if let Err(e) = channel.close().await {
                tracing::warn!("Failed to close transfer channel for '{}': {}", self.name(), e);
                first_error = Some(e);
            }
        }

        if let Err(e) = self.session.disconnect().await {
            tracing::warn!("Failed to disconnect '{}': {}", self.name(), e);
            first_error.get_or_insert(e);
        }

        tracing::info!("Closed connection '{}' (#{})", self.name(), self.id);
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn delete_working_directory(&self, dir: &str) {
        let channel = match self.transfer_channel().await {
            Ok(channel) => channel,
            Err(e) => {
                tracing::warn!("Cannot delete working directory {}: {}", dir, e);
                return;
            }
        };
        let medium = RemoteMedium::new(channel, Some(Arc::clone(&self.session)));
        match traversal::delete_tree(&medium, &PathRef::remote(dir)).await {
            Ok(report) if report.is_success() => {
                tracing::debug!("Deleted working directory {}", dir)
            }
            Ok(report) => tracing::warn!(
                "Failed to delete working directory {}: {:?}",
                dir,
                report.cause
            ),
            Err(e) => tracing::warn!("Failed to delete working directory {}: {}", dir, e),
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("name", &self.config.name())
            .field("channel_open", &self.channel.initialized())
            .finish()
    }
}
