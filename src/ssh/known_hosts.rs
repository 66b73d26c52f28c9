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

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::tokio_client::ServerCheckMethod;
use crate::error::Error;
use crate::utils::fs::expand_tilde;

/// Get the default known_hosts file path
pub fn get_default_known_hosts_path() -> PathBuf {
    expand_tilde(Path::new("~/.ssh/known_hosts"))
}

/// How strictly server host keys are verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKeyPolicy {
    /// Unknown or changed keys fail the connection.
    Strict,
    /// Verify against known_hosts when the file exists, otherwise accept.
    #[default]
    AcceptNew,
    /// Accept every key.
    Off,
}

impl HostKeyPolicy {
    /// Build the check method for this policy, optionally against a custom
    /// known_hosts file.
    pub fn check_method(self, known_hosts: Option<&Path>) -> ServerCheckMethod {
        let custom = known_hosts.map(expand_tilde);
        let path = custom.clone().unwrap_or_else(get_default_known_hosts_path);
        let method = || match &custom {
            Some(p) => ServerCheckMethod::KnownHostsFile(p.to_string_lossy().into_owned()),
            None => ServerCheckMethod::DefaultKnownHostsFile,
        };

        match self {
            Self::Strict => {
                tracing::debug!("Using known_hosts file: {:?} (strict)", path);
                method()
            }
            Self::AcceptNew if path.exists() => {
                tracing::debug!("Using known_hosts file: {:?} (accept-new)", path);
                method()
            }
            Self::AcceptNew => {
                tracing::warn!(
                    "Known hosts file not found at {:?}, host key verification disabled",
                    path
                );
                ServerCheckMethod::NoCheck
            }
            Self::Off => {
                tracing::debug!("Host key checking disabled");
                ServerCheckMethod::NoCheck
            }
        }
    }
}

impl FromStr for HostKeyPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" | "yes" | "true" => Ok(Self::Strict),
            "accept-new" | "tofu" => Ok(Self::AcceptNew),
            "off" | "no" | "false" => Ok(Self::Off),
            other => Err(Error::Configuration(format!(
                "unknown host key policy '{other}' (expected strict, accept-new or off)"
            ))),
        }
    }
}
