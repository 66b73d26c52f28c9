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

//! In-process stand-in for an SSH host.
//!
//! Remote paths are mapped below a temporary directory, so `/srv/data` on the
//! fake host is `<root>/srv/data` on the local disk.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use bxfer::ssh::{
    CommandOutput, Connector, EntryKind, RemoteEntry, RemoteMetadata, Session, TransferChannel,
};
use bxfer::{
    AuthorizationHandler, ConnectionConfiguration, ConnectionManager, Credentials, Error, Result,
};

/// Knobs and counters shared by every session of one fake host.
#[derive(Default)]
pub struct HostState {
    pub connects: AtomicUsize,
    pub channel_opens: AtomicUsize,
    pub disconnects: AtomicUsize,
    /// Number of upcoming channel opens that fail.
    pub failing_channel_opens: AtomicUsize,
    pub refuse_connections: AtomicBool,
    pub rmdir_fails: AtomicBool,
    pub uploads_fail: AtomicBool,
    pub remove_file_fails: AtomicBool,
    pub commands_fail: AtomicBool,
    pub exec_unavailable: AtomicBool,
    pub commands: Mutex<Vec<String>>,
    sessions: Mutex<Vec<Arc<FakeSession>>>,
}

impl HostState {
    /// Mark every session opened so far as dropped by the server.
    pub fn drop_sessions(&self) {
        for session in self.sessions.lock().unwrap().iter() {
            session.closed.store(true, Ordering::SeqCst);
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

pub struct FakeHost {
    root: TempDir,
    pub state: Arc<HostState>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().unwrap(),
            state: Arc::new(HostState::default()),
        }
    }

    /// Where a remote path lives on the local disk.
    pub fn disk_path(&self, remote: &str) -> PathBuf {
        map_path(self.root.path(), remote)
    }

    pub fn write(&self, remote: &str, content: &str) {
        let path = self.disk_path(remote);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    pub fn mkdir(&self, remote: &str) {
        std::fs::create_dir_all(self.disk_path(remote)).unwrap();
    }

    pub fn read(&self, remote: &str) -> String {
        std::fs::read_to_string(self.disk_path(remote)).unwrap()
    }

    pub fn exists(&self, remote: &str) -> bool {
        self.disk_path(remote).exists()
    }

    pub fn connector(&self) -> Arc<FakeConnector> {
        Arc::new(FakeConnector {
            root: self.root.path().to_path_buf(),
            state: Arc::clone(&self.state),
        })
    }

    pub fn manager(&self) -> ConnectionManager {
        ConnectionManager::with_connector(self.connector())
    }
}

fn map_path(root: &Path, remote: &str) -> PathBuf {
    let relative = remote.trim_start_matches('/');
    if relative.is_empty() {
        root.to_path_buf()
    } else {
        root.join(relative)
    }
}

pub fn config(name: &str) -> ConnectionConfiguration {
    ConnectionConfiguration::builder(
        name,
        AuthorizationHandler::preset("files.example.com", "tester", "secret"),
    )
    .build()
    .unwrap()
}

pub struct FakeConnector {
    root: PathBuf,
    state: Arc<HostState>,
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(
        &self,
        _config: &ConnectionConfiguration,
        credentials: Credentials,
    ) -> Result<Arc<dyn Session>> {
        // Long enough for concurrent opens to overlap
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.state.connects.fetch_add(1, Ordering::SeqCst);

        if self.state.refuse_connections.load(Ordering::SeqCst) {
            return Err(Error::Connection {
                host: credentials.hostname,
                port: credentials.port,
                reason: "connection refused".to_string(),
            });
        }

        let session = Arc::new(FakeSession {
            root: self.root.clone(),
            state: Arc::clone(&self.state),
            closed: AtomicBool::new(false),
        });
        self.state
            .sessions
            .lock()
            .unwrap()
            .push(Arc::clone(&session));
        Ok(session)
    }
}

pub struct FakeSession {
    root: PathBuf,
    state: Arc<HostState>,
    closed: AtomicBool,
}

#[async_trait]
impl Session for FakeSession {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn open_transfer_channel(&self) -> Result<Arc<dyn TransferChannel>> {
        self.state.channel_opens.fetch_add(1, Ordering::SeqCst);
        let failing = self.state.failing_channel_opens.fetch_update(
            Ordering::SeqCst,
            Ordering::SeqCst,
            |n| n.checked_sub(1),
        );
        if failing.is_ok() {
            return Err(Error::Channel("subsystem request rejected".to_string()));
        }
        Ok(Arc::new(FakeChannel {
            root: self.root.clone(),
            state: Arc::clone(&self.state),
        }))
    }

    async fn execute(&self, command: &str) -> Result<CommandOutput> {
        self.state.commands.lock().unwrap().push(command.to_string());

        if self.state.exec_unavailable.load(Ordering::SeqCst) {
            return Err(Error::Channel("exec request rejected".to_string()));
        }
        if self.state.commands_fail.load(Ordering::SeqCst) {
            return Ok(CommandOutput {
                stdout: String::new(),
                stderr: "rm: cannot remove: Permission denied\n".to_string(),
                exit_status: 1,
            });
        }

        let Some(quoted) = command.strip_prefix("rm -rf -- ") else {
            return Ok(CommandOutput {
                stdout: String::new(),
                stderr: format!("unsupported command: {command}"),
                exit_status: 127,
            });
        };
        let remote = quoted
            .trim_start_matches('\'')
            .trim_end_matches('\'')
            .replace("'\\''", "'");
        let path = map_path(&self.root, &remote);
        if path.exists() {
            std::fs::remove_dir_all(path)?;
        }
        Ok(CommandOutput {
            stdout: String::new(),
            stderr: String::new(),
            exit_status: 0,
        })
    }

    async fn disconnect(&self) -> Result<()> {
        self.state.disconnects.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeChannel {
    root: PathBuf,
    state: Arc<HostState>,
}

impl FakeChannel {
    fn path(&self, remote: &str) -> PathBuf {
        map_path(&self.root, remote)
    }
}

fn failure(path: &str, e: std::io::Error) -> Error {
    Error::Transfer {
        path: path.to_string(),
        reason: e.to_string(),
    }
}

fn kind_of(file_type: std::fs::FileType) -> EntryKind {
    if file_type.is_symlink() {
        EntryKind::Symlink
    } else if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    }
}

fn stat_result(path: &str, meta: std::io::Result<std::fs::Metadata>) -> Result<Option<RemoteMetadata>> {
    match meta {
        Ok(meta) => Ok(Some(RemoteMetadata {
            kind: kind_of(meta.file_type()),
            size: Some(meta.len()),
        })),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(failure(path, e)),
    }
}

#[async_trait]
impl TransferChannel for FakeChannel {
    async fn metadata(&self, path: &str) -> Result<Option<RemoteMetadata>> {
        stat_result(path, std::fs::metadata(self.path(path)))
    }

    async fn symlink_metadata(&self, path: &str) -> Result<Option<RemoteMetadata>> {
        stat_result(path, std::fs::symlink_metadata(self.path(path)))
    }

    async fn read_dir(&self, path: &str) -> Result<Vec<RemoteEntry>> {
        // SFTP servers list the self references too
        let mut entries = vec![
            RemoteEntry {
                name: ".".to_string(),
                kind: EntryKind::Directory,
            },
            RemoteEntry {
                name: "..".to_string(),
                kind: EntryKind::Directory,
            },
        ];
        for entry in std::fs::read_dir(self.path(path)).map_err(|e| failure(path, e))? {
            let entry = entry.map_err(|e| failure(path, e))?;
            let file_type = entry.file_type().map_err(|e| failure(path, e))?;
            entries.push(RemoteEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind: kind_of(file_type),
            });
        }
        Ok(entries)
    }

    async fn upload(&self, local: &Path, remote: &str) -> Result<u64> {
        if self.state.uploads_fail.load(Ordering::SeqCst) {
            return Err(Error::Transfer {
                path: remote.to_string(),
                reason: "connection reset while writing".to_string(),
            });
        }
        std::fs::copy(local, self.path(remote)).map_err(|e| failure(remote, e))
    }

    async fn download(&self, remote: &str, local: &Path) -> Result<u64> {
        std::fs::copy(self.path(remote), local).map_err(|e| failure(remote, e))
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        std::fs::create_dir(self.path(path)).map_err(|e| failure(path, e))
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        if self.state.remove_file_fails.load(Ordering::SeqCst) {
            return Err(Error::Transfer {
                path: path.to_string(),
                reason: "Permission denied".to_string(),
            });
        }
        std::fs::remove_file(self.path(path)).map_err(|e| failure(path, e))
    }

    async fn remove_dir(&self, path: &str) -> Result<()> {
        if self.state.rmdir_fails.load(Ordering::SeqCst) {
            return Err(Error::Transfer {
                path: path.to_string(),
                reason: "Failure".to_string(),
            });
        }
        std::fs::remove_dir(self.path(path)).map_err(|e| failure(path, e))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
