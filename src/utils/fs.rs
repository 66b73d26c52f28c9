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

//! Path helpers for local paths and `/`-separated remote paths.

use std::path::{Path, PathBuf};

/// Remote paths always use `/`, whatever the local OS is.
pub const REMOTE_SEPARATOR: char = '/';

/// Expand tilde (~) in path to home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if path_str == "~" || path_str.starts_with("~/") {
            if let Ok(home) = std::env::var("HOME") {
                return PathBuf::from(path_str.replacen('~', &home, 1));
            }
        }
    }
    path.to_path_buf()
}

/// Joins a name onto a remote directory without doubling separators.
pub fn remote_join(dir: &str, name: &str) -> String {
    let name = name.trim_start_matches(REMOTE_SEPARATOR);
    if dir.is_empty() {
        return name.to_string();
    }
    if dir.ends_with(REMOTE_SEPARATOR) {
        format!("{dir}{name}")
    } else {
        format!("{dir}{REMOTE_SEPARATOR}{name}")
    }
}

/// Drops trailing separators, keeping a lone `/`.
pub fn remote_trim(path: &str) -> &str {
    let trimmed = path.trim_end_matches(REMOTE_SEPARATOR);
    if trimmed.is_empty() && path.starts_with(REMOTE_SEPARATOR) {
        "/"
    } else {
        trimmed
    }
}

/// Parent directory of a remote path.
///
/// Relative single-component paths resolve to `.` (the SFTP working
/// directory); the root has no parent.
pub fn remote_parent(path: &str) -> Option<String> {
    let trimmed = remote_trim(path);
    if trimmed == "/" || trimmed.is_empty() {
        return None;
    }
    match trimmed.rfind(REMOTE_SEPARATOR) {
        Some(0) => Some("/".to_string()),
        Some(idx) => Some(trimmed[..idx].to_string()),
        None => Some(".".to_string()),
    }
}

/// Final component of a remote path.
pub fn remote_file_name(path: &str) -> Option<&str> {
    let trimmed = remote_trim(path);
    if trimmed == "/" {
        return None;
    }
    let name = trimmed.rsplit(REMOTE_SEPARATOR).next()?;
    (!name.is_empty() && name != "." && name != "..").then_some(name)
}

/// Whether a directory entry name refers to the directory itself or its parent.
pub fn is_self_reference(name: &str) -> bool {
    name == "." || name == ".."
}
