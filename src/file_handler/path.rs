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
use std::path::{Path, PathBuf};

use crate::utils::fs::{remote_file_name, remote_join, remote_parent, remote_trim};

/// A path tagged with the filesystem it lives on.
///
/// The medium is always explicit. A remote path is never guessed from its
/// spelling, and local paths keep host-native separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathRef {
    Local(PathBuf),
    /// `/`-separated path on the connection's remote host.
    Remote(String),
}

impl PathRef {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::Local(path.into())
    }

    pub fn remote(path: impl Into<String>) -> Self {
        Self::Remote(path.into())
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    pub fn as_local(&self) -> Option<&Path> {
        match self {
            Self::Local(path) => Some(path),
            Self::Remote(_) => None,
        }
    }

    pub fn as_remote(&self) -> Option<&str> {
        match self {
            Self::Local(_) => None,
            Self::Remote(path) => Some(path),
        }
    }

    /// Final path component.
    pub fn file_name(&self) -> Option<String> {
        match self {
            Self::Local(path) => path.file_name().map(|n| n.to_string_lossy().into_owned()),
            Self::Remote(path) => remote_file_name(path).map(str::to_string),
        }
    }

    /// Child path on the same medium.
    pub fn join(&self, name: &str) -> Self {
        match self {
            Self::Local(path) => Self::Local(path.join(name)),
            Self::Remote(path) => Self::Remote(remote_join(remote_trim(path), name)),
        }
    }

    /// Parent directory on the same medium.
    ///
    /// A bare relative name resolves to the current directory.
    pub fn parent(&self) -> Option<Self> {
        match self {
            Self::Local(path) => match path.parent() {
                Some(p) if p.as_os_str().is_empty() => Some(Self::Local(PathBuf::from("."))),
                Some(p) => Some(Self::Local(p.to_path_buf())),
                None => None,
            },
            Self::Remote(path) => remote_parent(path).map(Self::Remote),
        }
    }

    pub(crate) fn same_medium(&self, other: &Self) -> bool {
        self.is_local() == other.is_local()
    }
}

impl fmt::Display for PathRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(path) => f.write_str(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medium_is_explicit() {
        // A remote-looking string stays local when tagged local
        let path = PathRef::local("/srv/data/report.csv");
        assert!(path.is_local());
        assert_eq!(path.as_remote(), None);

        let path = PathRef::remote("report.csv");
        assert!(path.is_remote());
        assert_eq!(path.as_local(), None);
    }

    #[test]
    fn test_join_and_parent() {
        let remote = PathRef::remote("/srv/data/");
        assert_eq!(remote.join("a.txt"), PathRef::remote("/srv/data/a.txt"));
        assert_eq!(
            PathRef::remote("/srv/data/a.txt").parent(),
            Some(PathRef::remote("/srv/data"))
        );
        assert_eq!(PathRef::remote("/").parent(), None);

        let local = PathRef::local("data");
        assert_eq!(local.parent(), Some(PathRef::local(".")));
        assert_eq!(
            local.join("a.txt"),
            PathRef::local(Path::new("data").join("a.txt"))
        );
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            PathRef::remote("/srv/data/a.txt").file_name().as_deref(),
            Some("a.txt")
        );
        assert_eq!(
            PathRef::local("/tmp/b.bin").file_name().as_deref(),
            Some("b.bin")
        );
        assert_eq!(PathRef::remote("/").file_name(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(PathRef::remote("/srv/x").to_string(), "/srv/x");
        assert_eq!(PathRef::local("/tmp/y").to_string(), "/tmp/y");
    }
}
