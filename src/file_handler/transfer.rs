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

//! Move and copy across the four local/remote topologies.
//!
//! Every transfer runs the same pipeline: probe the source, resolve and probe
//! the destination, move the bytes with the topology's primitive, verify the
//! target, then remove the source for a move.

use std::io;
use std::path::Path;

use super::medium::{LocalMedium, Medium, RemoteMedium, Stat};
use super::traversal;
use super::PathRef;
use crate::error::{Error, Result};
use crate::ssh::EntryKind;
use crate::status::OperationReport;

/// Prefix of the local files used to stage remote-to-remote transfers.
const STAGING_PREFIX: &str = ".bxfer-staging-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Move,
    Copy,
}

/// The media one file handler call can reach.
pub(crate) struct Media {
    local: LocalMedium,
    remote: Option<RemoteMedium>,
}

impl Media {
    pub(crate) fn local_only() -> Self {
        Self {
            local: LocalMedium,
            remote: None,
        }
    }

    pub(crate) fn with_remote(remote: RemoteMedium) -> Self {
        Self {
            local: LocalMedium,
            remote: Some(remote),
        }
    }

    pub(crate) fn medium(&self, path: &PathRef) -> Result<&dyn Medium> {
        match path {
            PathRef::Local(_) => Ok(&self.local),
            PathRef::Remote(_) => self
                .remote
                .as_ref()
                .map(|r| r as &dyn Medium)
                .ok_or_else(|| no_remote(path)),
        }
    }

    fn remote(&self, path: &PathRef) -> Result<&RemoteMedium> {
        self.remote.as_ref().ok_or_else(|| no_remote(path))
    }

    pub(crate) async fn exists(&self, path: &PathRef) -> Result<bool> {
        Ok(self.medium(path)?.stat(path).await?.is_some())
    }

    pub(crate) async fn list(
        &self,
        directory: &PathRef,
        select: traversal::Select,
    ) -> Result<Vec<PathRef>> {
        traversal::list(self.medium(directory)?, directory, select).await
    }

    pub(crate) async fn delete(&self, path: &PathRef) -> Result<OperationReport> {
        traversal::delete_tree(self.medium(path)?, path).await
    }

    /// Move or copy `source` to `destination`.
    ///
    /// Failures of the operation itself are reported as a `Failed` report;
    /// `Err` means a medium could not be reached at all.
    pub(crate) async fn transfer(
        &self,
        source: &PathRef,
        destination: &PathRef,
        mode: Mode,
    ) -> Result<OperationReport> {
        tracing::debug!(
            "{:?} {} ({}) -> {} ({})",
            mode,
            source,
            medium_name(source),
            destination,
            medium_name(destination)
        );

        match self.run(source, destination, mode).await {
            Ok(warnings) => {
                tracing::info!("{:?} {} -> {} completed", mode, source, destination);
                Ok(warnings
                    .into_iter()
                    .fold(OperationReport::success(), OperationReport::with_warning))
            }
            Err(e @ Error::Channel(_)) => Err(e),
            Err(e @ Error::Configuration(_)) => {
                tracing::warn!("{:?} {} -> {} rejected: {}", mode, source, destination, e);
                Ok(OperationReport::info_error(e))
            }
            Err(e) => {
                tracing::error!("{:?} {} -> {} failed: {}", mode, source, destination, e);
                Ok(OperationReport::failed(e))
            }
        }
    }

    async fn run(&self, source: &PathRef, destination: &PathRef, mode: Mode) -> Result<Vec<Error>> {
        let source_medium = self.medium(source)?;
        self.medium(destination)?;

        let Some(source_stat) = source_medium.stat(source).await? else {
            return Err(Error::SourceNotFound(source.to_string()));
        };
        let target = self.resolve_target(source, destination).await?;

        if source.same_medium(&target) && is_within(source, &target) {
            return Err(Error::Configuration(format!(
                "cannot {} '{source}' into itself ('{target}')",
                mode_verb(mode)
            )));
        }

        if mode == Mode::Move {
            if let (PathRef::Local(from), PathRef::Local(to)) = (source, &target) {
                match tokio::fs::rename(from, to).await {
                    Ok(()) => {
                        self.verify(&target, &source_stat).await?;
                        return Ok(Vec::new());
                    }
                    Err(e) => tracing::debug!(
                        "Rename {} -> {} failed ({}), copying instead",
                        from.display(),
                        to.display(),
                        e
                    ),
                }
            }
        }

        let mut warnings = if source_stat.kind.is_dir() {
            self.transfer_tree(source, &target).await?
        } else {
            let warnings = self.transfer_file(source, &target).await?;
            self.verify(&target, &source_stat).await?;
            warnings
        };

        if mode == Mode::Move {
            let removed = if source_stat.kind.is_dir() {
                traversal::delete_tree(source_medium, source)
                    .await
                    .and_then(OperationReport::into_result)
            } else {
                source_medium.remove_file(source).await
            };
            if let Err(e) = removed {
                tracing::warn!("Moved {} but could not remove the source: {}", source, e);
                warnings.push(Error::cleanup(source.to_string(), e));
            }
        }

        Ok(warnings)
    }

    /// An existing directory receives the source under its own name;
    /// anything else is the full target path and needs an existing parent.
    async fn resolve_target(&self, source: &PathRef, destination: &PathRef) -> Result<PathRef> {
        let medium = self.medium(destination)?;

        let target = match medium.stat(destination).await? {
            Some(stat) if stat.kind.is_dir() => {
                let name = source.file_name().ok_or_else(|| {
                    Error::destination(destination.to_string(), "source has no file name")
                })?;
                destination.join(&name)
            }
            Some(_) => destination.clone(),
            None => {
                let parent = destination.parent().ok_or_else(|| {
                    Error::destination(destination.to_string(), "destination has no parent")
                })?;
                match medium.stat(&parent).await? {
                    Some(stat) if stat.kind.is_dir() => destination.clone(),
                    Some(_) => {
                        return Err(Error::destination(
                            destination.to_string(),
                            format!("parent '{parent}' is not a directory"),
                        ))
                    }
                    None => {
                        return Err(Error::destination(
                            destination.to_string(),
                            format!("parent directory '{parent}' does not exist"),
                        ))
                    }
                }
            }
        };

        if let Some(existing) = medium.stat(&target).await? {
            if existing.kind.is_dir() {
                return Err(Error::destination(
                    target.to_string(),
                    "a directory already exists at the target path",
                ));
            }
        }

        Ok(target)
    }

    /// Copy one file with the topology's primitive. Returns staging warnings.
    async fn transfer_file(&self, source: &PathRef, target: &PathRef) -> Result<Vec<Error>> {
        match (source, target) {
            (PathRef::Local(from), PathRef::Local(to)) => {
                tokio::fs::copy(from, to)
                    .await
                    .map_err(|e| Error::transfer(to.display().to_string(), e))?;
                Ok(Vec::new())
            }
            (PathRef::Local(from), PathRef::Remote(to)) => {
                self.remote(target)?.channel().upload(from, to).await?;
                Ok(Vec::new())
            }
            (PathRef::Remote(from), PathRef::Local(to)) => {
                self.remote(source)?.channel().download(from, to).await?;
                Ok(Vec::new())
            }
            (PathRef::Remote(from), PathRef::Remote(to)) => {
                self.staged_copy(self.remote(source)?, from, to).await
            }
        }
    }

    /// Remote to remote through a local temporary file.
    ///
    /// The staging file is deleted on every exit path; dropping the
    /// `TempPath` covers cancellation. A partially written target is left
    /// in place.
    async fn staged_copy(&self, remote: &RemoteMedium, from: &str, to: &str) -> Result<Vec<Error>> {
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile()
            .map_err(|e| Error::transfer(from, format!("cannot create staging file: {e}")))?
            .into_temp_path();
        let staging_name = staging.display().to_string();
        tracing::debug!("Staging {} through {}", from, staging_name);

        let channel = remote.channel();
        let downloaded = channel.download(from, &staging).await;
        let uploaded = if downloaded.is_ok() {
            Some(channel.upload(&staging, to).await)
        } else {
            None
        };

        let mut warnings = Vec::new();
        if let Err(e) = staging.close() {
            tracing::warn!("Failed to delete staging file {}: {}", staging_name, e);
            warnings.push(Error::cleanup(staging_name, e));
        }

        downloaded?;
        match uploaded {
            Some(Err(e)) => {
                tracing::warn!("Upload to {} failed; the target may be partially written", to);
                Err(e)
            }
            _ => Ok(warnings),
        }
    }

    /// Recreate the source directory at `target` and transfer every file.
    async fn transfer_tree(&self, source: &PathRef, target: &PathRef) -> Result<Vec<Error>> {
        let source_medium = self.medium(source)?;
        let target_medium = self.medium(target)?;

        target_medium.create_dir(target).await?;

        let mut warnings = Vec::new();
        let mut files = 0usize;
        let mut pending = vec![(source.clone(), target.clone())];
        while let Some((from_dir, to_dir)) = pending.pop() {
            for entry in source_medium.read_dir(&from_dir).await? {
                let from = from_dir.join(&entry.name);
                let to = to_dir.join(&entry.name);
                match entry.kind {
                    EntryKind::Directory => {
                        target_medium.create_dir(&to).await?;
                        pending.push((from, to));
                    }
                    EntryKind::File => {
                        let Some(stat) = source_medium.stat(&from).await? else {
                            return Err(Error::SourceNotFound(from.to_string()));
                        };
                        warnings.extend(self.transfer_file(&from, &to).await?);
                        self.verify(&to, &stat).await?;
                        files += 1;
                    }
                    EntryKind::Symlink | EntryKind::Other => {
                        tracing::debug!("Skipping {} ({:?})", from, entry.kind)
                    }
                }
            }
        }

        tracing::debug!("Transferred {} files from {} to {}", files, source, target);
        Ok(warnings)
    }

    /// The target must exist with the source's kind and, for files of known
    /// size, the same size.
    async fn verify(&self, target: &PathRef, source: &Stat) -> Result<()> {
        let found = self.medium(target)?.stat(target).await?;
        match found {
            None => Err(Error::transfer(
                target.to_string(),
                "verification failed: target does not exist",
            )),
            Some(stat) if stat.kind != source.kind => Err(Error::transfer(
                target.to_string(),
                format!(
                    "verification failed: expected {:?}, found {:?}",
                    source.kind, stat.kind
                ),
            )),
            Some(stat) => match (source.kind, source.size, stat.size) {
                (EntryKind::File, Some(expected), Some(actual)) if expected != actual => {
                    Err(Error::transfer(
                        target.to_string(),
                        format!("verification failed: expected {expected} bytes, found {actual}"),
                    ))
                }
                _ => Ok(()),
            },
        }
    }
}

fn no_remote(path: &PathRef) -> Error {
    Error::Configuration(format!(
        "'{path}' is a remote path but this handler has no connection"
    ))
}

fn medium_name(path: &PathRef) -> &'static str {
    if path.is_local() {
        "local"
    } else {
        "remote"
    }
}

fn mode_verb(mode: Mode) -> &'static str {
    match mode {
        Mode::Move => "move",
        Mode::Copy => "copy",
    }
}

/// Whether `target` equals `source` or lies below it.
fn is_within(source: &PathRef, target: &PathRef) -> bool {
    match (source, target) {
        (PathRef::Local(s), PathRef::Local(t)) => {
            let normalize = |p: &Path| -> io::Result<std::path::PathBuf> {
                match p.canonicalize() {
                    Ok(c) => Ok(c),
                    Err(_) => match (p.parent(), p.file_name()) {
                        (Some(parent), Some(name)) => Ok(parent.canonicalize()?.join(name)),
                        _ => Ok(p.to_path_buf()),
                    },
                }
            };
            match (normalize(s), normalize(t)) {
                (Ok(s), Ok(t)) => t.starts_with(s),
                _ => t.starts_with(s),
            }
        }
        (PathRef::Remote(s), PathRef::Remote(t)) => {
            let s = crate::utils::fs::remote_trim(s);
            let t = crate::utils::fs::remote_trim(t);
            t == s || t.starts_with(&format!("{}/", s.trim_end_matches('/')))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::CommandStatus;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_copy_into_directory() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("f.txt");
        fs::write(&src, b"hello").unwrap();
        fs::create_dir(dir.path().join("out")).unwrap();

        let media = Media::local_only();
        let report = media
            .transfer(
                &PathRef::local(&src),
                &PathRef::local(dir.path().join("out")),
                Mode::Copy,
            )
            .await
            .unwrap();

        assert!(report.is_success());
        assert!(src.exists());
        assert_eq!(fs::read(dir.path().join("out/f.txt")).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_local_move_renames() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("f.txt");
        fs::write(&src, b"hello").unwrap();
        let dst = dir.path().join("g.txt");

        let report = Media::local_only()
            .transfer(&PathRef::local(&src), &PathRef::local(&dst), Mode::Move)
            .await
            .unwrap();

        assert!(report.is_success());
        assert!(!src.exists());
        assert_eq!(fs::read(&dst).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_missing_parent_is_rejected_untouched() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("f.txt");
        fs::write(&src, b"hello").unwrap();
        let dst = dir.path().join("no/such/dir/f.txt");

        let report = Media::local_only()
            .transfer(&PathRef::local(&src), &PathRef::local(&dst), Mode::Move)
            .await
            .unwrap();

        assert_eq!(report.status, CommandStatus::Failed);
        assert!(matches!(
            report.cause,
            Some(Error::DestinationInvalid { .. })
        ));
        assert!(src.exists());
        assert!(!dir.path().join("no").exists());
    }

    #[tokio::test]
    async fn test_missing_source() {
        let dir = TempDir::new().unwrap();
        let report = Media::local_only()
            .transfer(
                &PathRef::local(dir.path().join("missing")),
                &PathRef::local(dir.path().join("dst")),
                Mode::Copy,
            )
            .await
            .unwrap();
        assert!(matches!(report.cause, Some(Error::SourceNotFound(_))));
    }

    #[tokio::test]
    async fn test_copy_directory_tree() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("tree");
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("a.txt"), b"a").unwrap();
        fs::write(src.join("sub/b.txt"), b"bb").unwrap();
        let dst = dir.path().join("copy");

        let report = Media::local_only()
            .transfer(&PathRef::local(&src), &PathRef::local(&dst), Mode::Copy)
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(fs::read(dst.join("a.txt")).unwrap(), b"a");
        assert_eq!(fs::read(dst.join("sub/b.txt")).unwrap(), b"bb");
        assert!(src.join("sub/b.txt").exists());
    }

    #[tokio::test]
    async fn test_copy_directory_into_itself_is_rejected() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("tree");
        fs::create_dir(&src).unwrap();

        let report = Media::local_only()
            .transfer(&PathRef::local(&src), &PathRef::local(&src), Mode::Copy)
            .await
            .unwrap();

        assert_eq!(report.status, CommandStatus::InfoError);
    }

    #[tokio::test]
    async fn test_remote_path_without_connection() {
        let err = Media::local_only()
            .exists(&PathRef::remote("/tmp"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_is_within_remote() {
        assert!(is_within(
            &PathRef::remote("/srv/a"),
            &PathRef::remote("/srv/a/b")
        ));
        assert!(is_within(&PathRef::remote("/srv/a/"), &PathRef::remote("/srv/a")));
        assert!(!is_within(
            &PathRef::remote("/srv/a"),
            &PathRef::remote("/srv/ab")
        ));
    }
}
