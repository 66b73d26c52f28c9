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

//! Turning connection profiles into connection configurations.

use std::path::Path;
use std::time::Duration;

use super::types::{Config, ConnectionProfile};
use super::utils::{expand_env_vars, get_current_username};
use crate::auth::{AuthorizationHandler, AuthorizationKind, DEFAULT_SSH_PORT};
use crate::connection::ConnectionConfiguration;
use crate::error::{Error, Result};

impl Config {
    /// Sorted names of the configured connections.
    pub fn connection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.connections.keys().cloned().collect();
        names.sort();
        names
    }

    /// Build the configuration of the connection named `name`, filling unset
    /// fields from `defaults`.
    pub fn connection_configuration(&self, name: &str) -> Result<ConnectionConfiguration> {
        let profile = self.connections.get(name).ok_or_else(|| {
            Error::Configuration(format!("connection '{name}' is not defined in the configuration"))
        })?;
        let defaults = &self.defaults;

        let authorization = self.authorization(name, profile)?;

        let policy = profile
            .host_key_policy
            .or(defaults.host_key_policy)
            .unwrap_or_default();
        let known_hosts = profile
            .known_hosts
            .as_deref()
            .or(defaults.known_hosts.as_deref())
            .map(Path::new);

        let mut builder = ConnectionConfiguration::builder(name, authorization)
            .server_check(policy.check_method(known_hosts))
            .delete_working_directory(profile.delete_working_directory);

        match profile.keepalive_interval.or(defaults.keepalive_interval) {
            Some(0) | None => {}
            Some(secs) => builder = builder.keepalive_interval(Duration::from_secs(secs)),
        }
        if let Some(dir) = &profile.working_directory {
            builder = builder.working_directory(dir.clone());
        }

        builder.build()
    }

    fn authorization(&self, name: &str, profile: &ConnectionProfile) -> Result<AuthorizationHandler> {
        let defaults = &self.defaults;
        let ssh_key = profile.ssh_key.as_deref().or(defaults.ssh_key.as_deref());

        let kind: AuthorizationKind = match profile.auth.as_deref().or(defaults.auth.as_deref()) {
            Some(tag) => tag.parse()?,
            None if profile.credentials_file.is_some() => AuthorizationKind::CredentialsFile,
            None if profile.password.is_some() => AuthorizationKind::Preset,
            None if ssh_key.is_some() => AuthorizationKind::KeyPath,
            None => AuthorizationKind::Agent,
        };

        let source = match kind {
            AuthorizationKind::CredentialsFile => profile.credentials_file.as_deref().ok_or_else(|| {
                Error::Configuration(format!("connection '{name}' uses text auth without credentials_file"))
            })?,
            AuthorizationKind::KeyPath => ssh_key.ok_or_else(|| {
                Error::Configuration(format!("connection '{name}' uses keypath auth without ssh_key"))
            })?,
            _ => "",
        };
        let handler = AuthorizationHandler::from_kind(kind, source)?;

        if kind == AuthorizationKind::CredentialsFile {
            return Ok(handler);
        }

        let host = profile
            .host
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| Error::Configuration(format!("connection '{name}' has no host")))?;
        let user = profile
            .user
            .clone()
            .or_else(|| defaults.user.clone())
            .or_else(get_current_username)
            .ok_or_else(|| Error::Configuration(format!("connection '{name}' has no user")))?;
        let port = profile.port.or(defaults.port).unwrap_or(DEFAULT_SSH_PORT);

        let mut handler = handler.with_hostname(host).with_username(user).with_port(port);
        if let Some(password) = &profile.password {
            handler = handler.with_password(expand_env_vars(password));
        }
        Ok(handler)
    }
}
