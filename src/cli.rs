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

use clap::{Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::file_handler::PathRef;

#[derive(Parser, Debug)]
#[command(
    name = "bxfer",
    version,
    about = "Move, copy, list and delete files across local paths and SSH/SFTP connections",
    long_about = "bxfer runs filesystem operations uniformly over the local filesystem and named SSH connections.\nPaths are written as 'local:<path>' or '<connection>:<path>', where <connection> is a profile from the configuration file.\nA path without a prefix is local.\nRemote-to-remote transfers within one connection are staged through a local temporary file.",
    after_help = "EXAMPLES:\n  Upload a file:                 bxfer cp ./report.csv staging:/srv/reports/\n  Move between remote paths:     bxfer mv staging:/tmp/a.bin staging:/data/\n  List remote files:             bxfer ls staging:/srv/reports\n  Delete a remote tree:          bxfer rm staging:/tmp/old-build\n  Show configured connections:   bxfer connections"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        long,
        env = "BXFER_CONFIG",
        default_value = crate::config::DEFAULT_CONFIG_PATH,
        help = "Configuration file path\nConfig loading priority when not given:\n  1. ./bxfer.yaml\n  2. $XDG_CONFIG_HOME/bxfer/config.yaml\n  3. ~/.config/bxfer/config.yaml"
    )]
    pub config: PathBuf,

    #[arg(
        short = 'v',
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Check whether a path exists (exit code 0 if it does, 1 otherwise)")]
    Exists { path: Location },

    #[command(
        about = "Move a file or directory",
        long_about = "Moves SOURCE to DESTINATION.\nIf DESTINATION is an existing directory the source keeps its name inside it; otherwise DESTINATION is the new path and its parent must already exist.\nThe source is removed only after the transfer has been verified."
    )]
    Mv {
        source: Location,
        destination: Location,
    },

    #[command(
        about = "Copy a file or directory",
        long_about = "Copies SOURCE to DESTINATION using the same destination rules as 'mv'.\nDestination directories are never created implicitly."
    )]
    Cp {
        source: Location,
        destination: Location,
    },

    #[command(about = "List every file below a directory, recursively")]
    Ls { directory: Location },

    #[command(about = "List every directory below a directory, recursively")]
    Lsdir { directory: Location },

    #[command(about = "Delete a file, or a directory and everything below it")]
    Rm { path: Location },

    #[command(about = "List connections defined in the configuration file")]
    Connections,
}

impl Commands {
    /// Every location the command touches.
    pub fn locations(&self) -> Vec<&Location> {
        match self {
            Self::Exists { path } | Self::Rm { path } => vec![path],
            Self::Ls { directory } | Self::Lsdir { directory } => vec![directory],
            Self::Mv {
                source,
                destination,
            }
            | Self::Cp {
                source,
                destination,
            } => vec![source, destination],
            Self::Connections => Vec::new(),
        }
    }
}

/// A command-line path: `local:<path>`, `<connection>:<path>` or a bare
/// local path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub connection: Option<String>,
    pub path: String,
}

impl Location {
    pub fn to_path_ref(&self) -> PathRef {
        match self.connection {
            Some(_) => PathRef::remote(self.path.clone()),
            None => PathRef::local(self.path.clone()),
        }
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("path cannot be empty".to_string());
        }
        let local = |path: &str| Location {
            connection: None,
            path: path.to_string(),
        };

        match s.split_once(':') {
            Some(("local", path)) => Ok(local(path)),
            // Drive letters and paths that merely contain a colon stay local
            Some((prefix, _))
                if prefix.len() < 2 || prefix.contains(['/', '\\']) || prefix.contains(' ') =>
            {
                Ok(local(s))
            }
            Some((_, "")) => Err(format!("'{s}' has no path after the connection name")),
            Some((connection, path)) => Ok(Location {
                connection: Some(connection.to_string()),
                path: path.to_string(),
            }),
            None => Ok(local(s)),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.connection {
            Some(name) => write!(f, "{name}:{}", self.path),
            None => write!(f, "local:{}", self.path),
        }
    }
}
