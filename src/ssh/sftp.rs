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

//! russh / russh-sftp backed implementation of the session traits.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh_sftp::client::error::Error as SftpError;
use russh_sftp::client::SftpSession;
use russh_sftp::protocol::{FileType, StatusCode};

use super::session::{
    CommandOutput, Connector, EntryKind, RemoteEntry, RemoteMetadata, Session, TransferChannel,
};
use super::tokio_client::{self, AuthMethod, Client};
use crate::auth::Credentials;
use crate::connection::ConnectionConfiguration;
use crate::error::{Error, Result};

// Covers slow networks and the full SSH negotiation including authentication
const SSH_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Opens real SSH sessions.
#[derive(Debug, Clone, Default)]
pub struct SshConnector;

impl SshConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for SshConnector {
    async fn connect(
        &self,
        config: &ConnectionConfiguration,
        credentials: Credentials,
    ) -> Result<Arc<dyn Session>> {
        let Credentials {
            hostname,
            username,
            port,
            secret,
        } = credentials;

        let ssh_config = russh::client::Config {
            keepalive_interval: config.keepalive_interval(),
            ..Default::default()
        };

        tracing::debug!(
            "Connecting to {}@{}:{} for '{}'",
            username,
            hostname,
            port,
            config.name()
        );

        let connect_timeout = Duration::from_secs(SSH_CONNECT_TIMEOUT_SECS);
        let attempt = tokio::time::timeout(
            connect_timeout,
            Client::connect_with_config(
                (hostname.as_str(), port),
                &username,
                AuthMethod::from(secret),
                config.server_check().clone(),
                ssh_config,
            ),
        )
        .await;

        match attempt {
            Ok(Ok(client)) => Ok(Arc::new(SshSession { client })),
            Ok(Err(e)) if e.is_authentication_failure() => Err(Error::Authentication {
                name: config.name().to_string(),
                reason: e.to_string(),
            }),
            Ok(Err(e)) => {
                let reason = match &e {
                    tokio_client::Error::ServerCheckFailed => {
                        "host key verification failed; the server key was not recognized or has changed"
                            .to_string()
                    }
                    other => other.to_string(),
                };
                Err(Error::Connection {
                    host: hostname,
                    port,
                    reason,
                })
            }
            Err(_) => Err(Error::Connection {
                host: hostname,
                port,
                reason: format!("connection timeout after {SSH_CONNECT_TIMEOUT_SECS} seconds"),
            }),
        }
    }
}

/// One authenticated russh session.
#[derive(Debug)]
pub struct SshSession {
    client: Client,
}

#[async_trait]
impl Session for SshSession {
    fn is_closed(&self) -> bool {
        self.client.is_closed()
    }

    async fn open_transfer_channel(&self) -> Result<Arc<dyn TransferChannel>> {
        let sftp = self
            .client
            .open_sftp()
            .await
            .map_err(|e| Error::Channel(e.to_string()))?;
        Ok(Arc::new(SftpChannel { sftp }))
    }

    async fn execute(&self, command: &str) -> Result<CommandOutput> {
        let result = self
            .client
            .execute(command)
            .await
            .map_err(|e| Error::Channel(format!("command execution failed: {e}")))?;
        Ok(CommandOutput {
            stdout: result.stdout,
            stderr: result.stderr,
            exit_status: result.exit_status,
        })
    }

    async fn disconnect(&self) -> Result<()> {
        if self.client.is_closed() {
            return Ok(());
        }
        self.client.disconnect().await.map_err(|e| Error::Connection {
            host: self.client.get_connection_address().ip().to_string(),
            port: self.client.get_connection_address().port(),
            reason: e.to_string(),
        })
    }
}

/// An sftp subsystem channel.
pub struct SftpChannel {
    sftp: SftpSession,
}

fn entry_kind(file_type: FileType) -> EntryKind {
    if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_file() {
        EntryKind::File
    } else if file_type.is_symlink() {
        EntryKind::Symlink
    } else {
        EntryKind::Other
    }
}

fn is_not_found(err: &SftpError) -> bool {
    matches!(err, SftpError::Status(status) if status.status_code == StatusCode::NoSuchFile)
}

#[async_trait]
impl TransferChannel for SftpChannel {
    async fn metadata(&self, path: &str) -> Result<Option<RemoteMetadata>> {
        match self.sftp.metadata(path).await {
            Ok(attrs) => Ok(Some(RemoteMetadata {
                kind: entry_kind(attrs.file_type()),
                size: attrs.size,
            })),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(Error::transfer(path, e)),
        }
    }

    async fn symlink_metadata(&self, path: &str) -> Result<Option<RemoteMetadata>> {
        match self.sftp.symlink_metadata(path).await {
            Ok(attrs) => Ok(Some(RemoteMetadata {
                kind: entry_kind(attrs.file_type()),
                size: attrs.size,
            })),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(Error::transfer(path, e)),
        }
    }

    async fn read_dir(&self, path: &str) -> Result<Vec<RemoteEntry>> {
        let entries = self
            .sftp
            .read_dir(path)
            .await
            .map_err(|e| Error::transfer(path, e))?;
        Ok(entries
            .map(|entry| RemoteEntry {
                kind: entry_kind(entry.file_type()),
                name: entry.file_name(),
            })
            .collect())
    }

    async fn upload(&self, local: &Path, remote: &str) -> Result<u64> {
        tokio_client::upload_file(&self.sftp, local, remote)
            .await
            .map_err(|e| Error::transfer(remote, e))
    }

    async fn download(&self, remote: &str, local: &Path) -> Result<u64> {
        tokio_client::download_file(&self.sftp, remote, local)
            .await
            .map_err(|e| Error::transfer(remote, e))
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        self.sftp
            .create_dir(path)
            .await
            .map_err(|e| Error::transfer(path, e))
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        self.sftp
            .remove_file(path)
            .await
            .map_err(|e| Error::transfer(path, e))
    }

    async fn remove_dir(&self, path: &str) -> Result<()> {
        self.sftp
            .remove_dir(path)
            .await
            .map_err(|e| Error::transfer(path, e))
    }

    async fn close(&self) -> Result<()> {
        self.sftp
            .close()
            .await
            .map_err(|e| Error::Channel(format!("failed to close sftp session: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use russh_sftp::protocol::Status;

    #[test]
    fn test_entry_kind_mapping() {
        assert_eq!(entry_kind(FileType::Dir), EntryKind::Directory);
        assert_eq!(entry_kind(FileType::File), EntryKind::File);
        assert_eq!(entry_kind(FileType::Symlink), EntryKind::Symlink);
        assert_eq!(entry_kind(FileType::Other), EntryKind::Other);
    }

    #[test]
    fn test_not_found_detection() {
        let missing = SftpError::Status(Status {
            id: 1,
            status_code: StatusCode::NoSuchFile,
            error_message: "No such file".to_string(),
            language_tag: "en-US".to_string(),
        });
        assert!(is_not_found(&missing));

        let denied = SftpError::Status(Status {
            id: 2,
            status_code: StatusCode::PermissionDenied,
            error_message: "Permission denied".to_string(),
            language_tag: "en-US".to_string(),
        });
        assert!(!is_not_found(&denied));
        assert!(!is_not_found(&SftpError::Timeout));
    }
}
