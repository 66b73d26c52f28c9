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

//! Configuration type definitions.

use serde::Deserialize;
use std::collections::HashMap;

use crate::ssh::HostKeyPolicy;

/// Main configuration structure.
///
/// ```yaml
/// defaults:
///   user: deploy
///   host_key_policy: accept-new
/// connections:
///   staging:
///     host: staging.example.com
///     auth: keypath
///     ssh_key: ~/.ssh/id_ed25519
///     working_directory: /tmp/bxfer
///     delete_working_directory: true
/// ```
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub connections: HashMap<String, ConnectionProfile>,
}

/// Settings inherited by every connection profile.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Defaults {
    pub user: Option<String>,
    pub port: Option<u16>,
    /// Authorization tag: text, console, basic, keypath or agent.
    pub auth: Option<String>,
    pub ssh_key: Option<String>,
    pub known_hosts: Option<String>,
    pub host_key_policy: Option<HostKeyPolicy>,
    /// SSH keepalive interval in seconds. 0 disables keepalives.
    pub keepalive_interval: Option<u64>,
}

/// One named connection.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConnectionProfile {
    pub host: Option<String>,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub auth: Option<String>,
    /// `username hostname password [port]` file for `auth: text`.
    pub credentials_file: Option<String>,
    /// Password for `auth: basic`; `$VAR` and `${VAR}` are expanded.
    pub password: Option<String>,
    pub ssh_key: Option<String>,
    pub known_hosts: Option<String>,
    pub host_key_policy: Option<HostKeyPolicy>,
    pub keepalive_interval: Option<u64>,
    pub working_directory: Option<String>,
    #[serde(default)]
    pub delete_working_directory: bool,
}
