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

//! Session, transfer channel and connector abstractions.
//!
//! The connection registry and the file handlers only talk to these traits.
//! [`crate::ssh::sftp`] implements them on top of russh and russh-sftp.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::Credentials;
use crate::connection::ConnectionConfiguration;
use crate::error::Result;

/// Classification of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Other,
}

impl EntryKind {
    pub fn is_dir(self) -> bool {
        self == Self::Directory
    }

    pub fn is_file(self) -> bool {
        self == Self::File
    }
}

/// Result of a remote stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteMetadata {
    pub kind: EntryKind,
    pub size: Option<u64>,
}

/// One entry returned by a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// Output of a command executed on the remote host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: u32,
}

impl CommandOutput {
    pub fn is_success(&self) -> bool {
        self.exit_status == 0
    }
}

/// File-transfer sub-channel bound to one session.
///
/// Paths are `/`-separated remote paths. A missing path is reported as
/// `Ok(None)` by [`TransferChannel::metadata`], never as an error.
#[async_trait]
pub trait TransferChannel: Send + Sync {
    /// Stat a path, following symlinks.
    async fn metadata(&self, path: &str) -> Result<Option<RemoteMetadata>>;

    /// Stat a path without following a final symlink.
    async fn symlink_metadata(&self, path: &str) -> Result<Option<RemoteMetadata>>;

    /// List a directory. `.` and `..` may or may not be included.
    async fn read_dir(&self, path: &str) -> Result<Vec<RemoteEntry>>;

    /// Copy a local file to a remote path, returning the number of bytes written.
    async fn upload(&self, local: &Path, remote: &str) -> Result<u64>;

    /// Copy a remote file to a local path, returning the number of bytes written.
    async fn download(&self, remote: &str, local: &Path) -> Result<u64>;

    async fn create_dir(&self, path: &str) -> Result<()>;

    async fn remove_file(&self, path: &str) -> Result<()>;

    /// Remove an empty directory.
    async fn remove_dir(&self, path: &str) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

impl std::fmt::Debug for dyn TransferChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TransferChannel")
    }
}

/// An authenticated session to one remote host.
#[async_trait]
pub trait Session: Send + Sync {
    /// Whether the underlying transport has gone away.
    fn is_closed(&self) -> bool;

    /// Negotiate a new transfer channel over this session.
    async fn open_transfer_channel(&self) -> Result<Arc<dyn TransferChannel>>;

    /// Run a shell command on the remote host.
    async fn execute(&self, command: &str) -> Result<CommandOutput>;

    async fn disconnect(&self) -> Result<()>;
}

/// Opens sessions. The registry owns one connector.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        config: &ConnectionConfiguration,
        credentials: Credentials,
    ) -> Result<Arc<dyn Session>>;
}
