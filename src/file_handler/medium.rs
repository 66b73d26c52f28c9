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

//! Local and remote filesystem primitives behind one interface.
//!
//! Every primitive takes a [`PathRef`]; a medium rejects references tagged
//! for the other medium with [`Error::Configuration`].

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use super::PathRef;
use crate::error::{Error, Result};
use crate::ssh::{EntryKind, Session, TransferChannel};
use crate::utils::fs::is_self_reference;
use crate::utils::sanitize::force_remove_command;

/// Result of probing a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub kind: EntryKind,
    pub size: Option<u64>,
}

/// One directory entry, classified without following symlinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
}

#[async_trait]
pub trait Medium: Send + Sync {
    /// Follows symlinks. `Ok(None)` when the path does not exist.
    async fn stat(&self, path: &PathRef) -> Result<Option<Stat>>;

    /// Like [`Medium::stat`] but a symlink is reported as
    /// [`EntryKind::Symlink`] instead of being followed.
    async fn lstat(&self, path: &PathRef) -> Result<Option<Stat>>;

    /// Entries of a directory sorted by name, without `.` and `..`.
    async fn read_dir(&self, path: &PathRef) -> Result<Vec<Entry>>;

    async fn create_dir(&self, path: &PathRef) -> Result<()>;

    async fn remove_file(&self, path: &PathRef) -> Result<()>;

    /// Remove an empty directory.
    async fn remove_dir(&self, path: &PathRef) -> Result<()>;

    /// Remove a directory tree in one step after [`Medium::remove_dir`] failed.
    ///
    /// Fails with [`Error::Cleanup`] when the medium has no such capability.
    async fn force_remove(&self, path: &PathRef) -> Result<()>;
}

fn sorted(mut entries: Vec<Entry>) -> Vec<Entry> {
    entries.retain(|e| !is_self_reference(&e.name));
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

fn wrong_medium(path: &PathRef) -> Error {
    let expected = if path.is_local() { "remote" } else { "local" };
    Error::Configuration(format!("'{path}' is not a {expected} path"))
}

/// The host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalMedium;

impl LocalMedium {
    fn path<'a>(&self, path: &'a PathRef) -> Result<&'a Path> {
        path.as_local().ok_or_else(|| wrong_medium(path))
    }
}

fn local_kind(file_type: std::fs::FileType) -> EntryKind {
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

fn local_stat(metadata: io::Result<std::fs::Metadata>) -> Result<Option<Stat>> {
    match metadata {
        Ok(metadata) => Ok(Some(Stat {
            kind: local_kind(metadata.file_type()),
            size: Some(metadata.len()),
        })),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Io(e)),
    }
}

#[async_trait]
impl Medium for LocalMedium {
    async fn stat(&self, path: &PathRef) -> Result<Option<Stat>> {
        local_stat(tokio::fs::metadata(self.path(path)?).await)
    }

    async fn lstat(&self, path: &PathRef) -> Result<Option<Stat>> {
        local_stat(tokio::fs::symlink_metadata(self.path(path)?).await)
    }

    async fn read_dir(&self, path: &PathRef) -> Result<Vec<Entry>> {
        let dir = self.path(path)?;
        let mut reader = tokio::fs::read_dir(dir).await?;
        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            entries.push(Entry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind: local_kind(entry.file_type().await?),
            });
        }
        Ok(sorted(entries))
    }

    async fn create_dir(&self, path: &PathRef) -> Result<()> {
        tokio::fs::create_dir(self.path(path)?)
            .await
            .map_err(|e| Error::transfer(path.to_string(), e))
    }

    async fn remove_file(&self, path: &PathRef) -> Result<()> {
        Ok(tokio::fs::remove_file(self.path(path)?).await?)
    }

    async fn remove_dir(&self, path: &PathRef) -> Result<()> {
        Ok(tokio::fs::remove_dir(self.path(path)?).await?)
    }

    async fn force_remove(&self, path: &PathRef) -> Result<()> {
        Err(Error::cleanup(
            path.to_string(),
            "directory is not empty and no forced removal exists for local paths",
        ))
    }
}

/// A remote host reached through one transfer channel, with an optional
/// command channel for forced removal.
#[derive(Clone)]
pub struct RemoteMedium {
    channel: Arc<dyn TransferChannel>,
    session: Option<Arc<dyn Session>>,
}

impl RemoteMedium {
    pub fn new(channel: Arc<dyn TransferChannel>, session: Option<Arc<dyn Session>>) -> Self {
        Self { channel, session }
    }

    pub fn channel(&self) -> &Arc<dyn TransferChannel> {
        &self.channel
    }

    fn path<'a>(&self, path: &'a PathRef) -> Result<&'a str> {
        path.as_remote().ok_or_else(|| wrong_medium(path))
    }
}

#[async_trait]
impl Medium for RemoteMedium {
    async fn stat(&self, path: &PathRef) -> Result<Option<Stat>> {
        let metadata = self.channel.metadata(self.path(path)?).await?;
        Ok(metadata.map(|m| Stat {
            kind: m.kind,
            size: m.size,
        }))
    }

    async fn lstat(&self, path: &PathRef) -> Result<Option<Stat>> {
        let metadata = self.channel.symlink_metadata(self.path(path)?).await?;
        Ok(metadata.map(|m| Stat {
            kind: m.kind,
            size: m.size,
        }))
    }

    async fn read_dir(&self, path: &PathRef) -> Result<Vec<Entry>> {
        let entries = self.channel.read_dir(self.path(path)?).await?;
        Ok(sorted(
            entries
                .into_iter()
                .map(|e| Entry {
                    name: e.name,
                    kind: e.kind,
                })
                .collect(),
        ))
    }

    async fn create_dir(&self, path: &PathRef) -> Result<()> {
        self.channel.create_dir(self.path(path)?).await
    }

    async fn remove_file(&self, path: &PathRef) -> Result<()> {
        self.channel.remove_file(self.path(path)?).await
    }

    async fn remove_dir(&self, path: &PathRef) -> Result<()> {
        self.channel.remove_dir(self.path(path)?).await
    }

    async fn force_remove(&self, path: &PathRef) -> Result<()> {
        let remote = self.path(path)?;
        let Some(session) = &self.session else {
            return Err(Error::cleanup(remote, "no command channel available"));
        };

        let command = force_remove_command(remote).map_err(|e| Error::cleanup(remote, e))?;
        tracing::debug!("Forcing removal of {remote}");
        let output = session
            .execute(&command)
            .await
            .map_err(|e| Error::cleanup(remote, e))?;
        if !output.is_success() {
            return Err(Error::cleanup(
                remote,
                format!(
                    "forced removal exited with status {}: {}",
                    output.exit_status,
                    output.stderr.trim()
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_stat_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let missing = PathRef::local(dir.path().join("nope"));
        assert_eq!(LocalMedium.stat(&missing).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_local_stat_file_and_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("f.txt"), b"hello").unwrap();

        let file = LocalMedium
            .stat(&PathRef::local(dir.path().join("f.txt")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(file.kind, EntryKind::File);
        assert_eq!(file.size, Some(5));

        let root = LocalMedium
            .stat(&PathRef::local(dir.path()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(root.kind, EntryKind::Directory);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_local_lstat_does_not_follow_links() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("real")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();
        let link = PathRef::local(dir.path().join("link"));

        let followed = LocalMedium.stat(&link).await.unwrap().unwrap();
        assert_eq!(followed.kind, EntryKind::Directory);

        let stat = LocalMedium.lstat(&link).await.unwrap().unwrap();
        assert_eq!(stat.kind, EntryKind::Symlink);
    }

    #[tokio::test]
    async fn test_local_read_dir_sorted() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b"), b"").unwrap();
        std::fs::write(dir.path().join("a"), b"").unwrap();
        std::fs::create_dir(dir.path().join("c")).unwrap();

        let entries = LocalMedium
            .read_dir(&PathRef::local(dir.path()))
            .await
            .unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(entries[2].kind, EntryKind::Directory);
    }

    #[tokio::test]
    async fn test_local_rejects_remote_path() {
        let err = LocalMedium
            .stat(&PathRef::remote("/tmp"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[tokio::test]
    async fn test_local_has_no_forced_removal() {
        let dir = TempDir::new().unwrap();
        let err = LocalMedium
            .force_remove(&PathRef::local(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cleanup { .. }));
        assert!(dir.path().exists());
    }
}
