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

//! Directory tree listing and recursive deletion.
//!
//! Both walk the tree with an explicit stack so that deep remote trees do not
//! grow the call stack, and each step is a separate await point.

use super::medium::Medium;
use super::PathRef;
use crate::error::{Error, Result};
use crate::ssh::EntryKind;
use crate::status::OperationReport;

/// Which entries a listing yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Select {
    Files,
    Directories,
}

async fn require_directory(medium: &dyn Medium, root: &PathRef) -> Result<()> {
    match medium.stat(root).await? {
        None => Err(Error::SourceNotFound(root.to_string())),
        Some(stat) if !stat.kind.is_dir() => Err(Error::Configuration(format!(
            "'{root}' is not a directory"
        ))),
        Some(_) => Ok(()),
    }
}

/// Every file or every directory below `root`, depth first in pre-order with
/// siblings sorted by name. Symlinks are neither yielded nor followed.
pub async fn list(medium: &dyn Medium, root: &PathRef, select: Select) -> Result<Vec<PathRef>> {
    require_directory(medium, root).await?;

    let mut found = Vec::new();
    let mut stack: Vec<(PathRef, EntryKind)> = Vec::new();
    push_children(medium, root, &mut stack).await?;

    while let Some((path, kind)) = stack.pop() {
        match (kind, select) {
            (EntryKind::Directory, _) => {
                push_children(medium, &path, &mut stack).await?;
                if select == Select::Directories {
                    found.push(path);
                }
            }
            (EntryKind::File, Select::Files) => found.push(path),
            _ => {}
        }
    }

    tracing::debug!("Listed {} {:?} under {}", found.len(), select, root);
    Ok(found)
}

// Children are pushed in reverse so the smallest name is popped first.
async fn push_children(
    medium: &dyn Medium,
    dir: &PathRef,
    stack: &mut Vec<(PathRef, EntryKind)>,
) -> Result<()> {
    let entries = medium.read_dir(dir).await?;
    stack.extend(
        entries
            .into_iter()
            .rev()
            .map(|entry| (dir.join(&entry.name), entry.kind)),
    );
    Ok(())
}

/// Delete `root` and everything below it.
///
/// Non-directories are removed as they are found. Directories are removed
/// after all of their descendants. When removing a directory fails, the
/// medium's forced removal is tried once for that directory; if that also
/// fails the report carries [`Error::Cleanup`].
///
/// A symlink root is unlinked, never walked.
///
/// `Err` is returned only when the medium could not be probed at all.
pub async fn delete_tree(medium: &dyn Medium, root: &PathRef) -> Result<OperationReport> {
    // A symlinked root is removed as a link; its target is left alone
    let Some(stat) = medium.lstat(root).await? else {
        return Ok(OperationReport::failed(Error::SourceNotFound(
            root.to_string(),
        )));
    };

    if !stat.kind.is_dir() {
        return Ok(match medium.remove_file(root).await {
            Ok(()) => OperationReport::success(),
            Err(e) => OperationReport::failed(Error::cleanup(root.to_string(), e)),
        });
    }

    let mut pending = vec![root.clone()];
    let mut directories = Vec::new();

    while let Some(dir) = pending.pop() {
        match medium.read_dir(&dir).await {
            Ok(entries) => {
                for entry in entries {
                    let path = dir.join(&entry.name);
                    if entry.kind.is_dir() {
                        pending.push(path);
                    } else if let Err(e) = medium.remove_file(&path).await {
                        // Left for the forced removal of the enclosing directory
                        tracing::warn!("Failed to remove {}: {}", path, e);
                    }
                }
            }
            Err(e) => tracing::warn!("Failed to list {}: {}", dir, e),
        }
        directories.push(dir);
    }

    for dir in directories.iter().rev() {
        if let Err(e) = medium.remove_dir(dir).await {
            tracing::debug!("Removing {} failed ({}), forcing removal", dir, e);
            if let Err(cleanup) = medium.force_remove(dir).await {
                tracing::error!("Failed to delete {}: {}", dir, cleanup);
                return Ok(OperationReport::failed(cleanup));
            }
        }
    }

    tracing::info!("Deleted {} ({} directories)", root, directories.len());
    Ok(OperationReport::success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_handler::medium::LocalMedium;
    use crate::status::CommandStatus;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b/inner")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(root.join("top.txt"), b"1").unwrap();
        fs::write(root.join("a/one.txt"), b"2").unwrap();
        fs::write(root.join("b/two.txt"), b"3").unwrap();
        fs::write(root.join("b/inner/three.txt"), b"4").unwrap();
        dir
    }

    fn rel(dir: &TempDir, paths: &[PathRef]) -> Vec<String> {
        paths
            .iter()
            .map(|p| {
                p.as_local()
                    .unwrap()
                    .strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[tokio::test]
    async fn test_list_files_preorder() {
        let dir = tree();
        let files = list(&LocalMedium, &PathRef::local(dir.path()), Select::Files)
            .await
            .unwrap();
        assert_eq!(
            rel(&dir, &files),
            vec!["a/one.txt", "b/inner/three.txt", "b/two.txt", "top.txt"]
        );
    }

    #[tokio::test]
    async fn test_list_directories_preorder() {
        let dir = tree();
        let dirs = list(
            &LocalMedium,
            &PathRef::local(dir.path()),
            Select::Directories,
        )
        .await
        .unwrap();
        assert_eq!(rel(&dir, &dirs), vec!["a", "b", "b/inner"]);
    }

    #[tokio::test]
    async fn test_list_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = list(
            &LocalMedium,
            &PathRef::local(dir.path().join("missing")),
            Select::Files,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::SourceNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_tree_removes_everything() {
        let dir = tree();
        let root = dir.path().join("b");
        let report = delete_tree(&LocalMedium, &PathRef::local(&root))
            .await
            .unwrap();
        assert_eq!(report.status, CommandStatus::Success);
        assert!(!root.exists());
        assert!(dir.path().join("a/one.txt").exists());
    }

    #[tokio::test]
    async fn test_delete_single_file() {
        let dir = tree();
        let file = dir.path().join("top.txt");
        let report = delete_tree(&LocalMedium, &PathRef::local(&file))
            .await
            .unwrap();
        assert!(report.is_success());
        assert!(!file.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_delete_symlinked_root_keeps_target() {
        let dir = tree();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(dir.path().join("b"), &link).unwrap();

        let report = delete_tree(&LocalMedium, &PathRef::local(&link))
            .await
            .unwrap();

        assert_eq!(report.status, CommandStatus::Success);
        assert!(fs::symlink_metadata(&link).is_err());
        assert!(dir.path().join("b/two.txt").exists());
        assert!(dir.path().join("b/inner/three.txt").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_delete_tree_unlinks_nested_symlinks() {
        let dir = tree();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("keep.txt"), b"keep").unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("b/outside")).unwrap();

        let report = delete_tree(&LocalMedium, &PathRef::local(dir.path().join("b")))
            .await
            .unwrap();

        assert!(report.is_success());
        assert!(!dir.path().join("b").exists());
        assert!(outside.path().join("keep.txt").exists());
    }

    #[tokio::test]
    async fn test_delete_missing_root() {
        let dir = TempDir::new().unwrap();
        let report = delete_tree(&LocalMedium, &PathRef::local(dir.path().join("gone")))
            .await
            .unwrap();
        assert_eq!(report.status, CommandStatus::Failed);
        assert!(matches!(report.cause, Some(Error::SourceNotFound(_))));
    }
}
