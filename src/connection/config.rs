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

use std::time::Duration;

use crate::auth::AuthorizationHandler;
use crate::error::{Error, Result};
use crate::ssh::tokio_client::ServerCheckMethod;
use crate::ssh::HostKeyPolicy;

/// Everything needed to open one named connection.
///
/// Immutable once built. Hostname, username and port come from the
/// credentials the authorization handler resolves.
#[derive(Debug, Clone)]
pub struct ConnectionConfiguration {
    name: String,
    authorization: AuthorizationHandler,
    server_check: ServerCheckMethod,
    keepalive_interval: Option<Duration>,
    working_directory: Option<String>,
    delete_working_directory: bool,
}

impl ConnectionConfiguration {
    /// Host keys are checked with the `accept-new` policy unless
    /// [`ConnectionConfigurationBuilder::server_check`] says otherwise.
    pub fn builder(
        name: impl Into<String>,
        authorization: AuthorizationHandler,
    ) -> ConnectionConfigurationBuilder {
        ConnectionConfigurationBuilder {
            name: name.into(),
            authorization,
            server_check: HostKeyPolicy::default().check_method(None),
            keepalive_interval: None,
            working_directory: None,
            delete_working_directory: false,
        }
    }

    /// Registry key of the connection.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn authorization(&self) -> &AuthorizationHandler {
        &self.authorization
    }

    pub fn server_check(&self) -> &ServerCheckMethod {
        &self.server_check
    }

    pub fn keepalive_interval(&self) -> Option<Duration> {
        self.keepalive_interval
    }

    pub fn working_directory(&self) -> Option<&str> {
        self.working_directory.as_deref()
    }

    /// Whether the working directory is removed when the connection closes.
    pub fn delete_working_directory(&self) -> bool {
        self.delete_working_directory
    }
}

/// Builder for [`ConnectionConfiguration`].
#[derive(Debug, Clone)]
pub struct ConnectionConfigurationBuilder {
    name: String,
    authorization: AuthorizationHandler,
    server_check: ServerCheckMethod,
    keepalive_interval: Option<Duration>,
    working_directory: Option<String>,
    delete_working_directory: bool,
}

impl ConnectionConfigurationBuilder {
    pub fn server_check(mut self, server_check: ServerCheckMethod) -> Self {
        self.server_check = server_check;
        self
    }

    pub fn keepalive_interval(mut self, interval: Duration) -> Self {
        self.keepalive_interval = Some(interval);
        self
    }

    pub fn working_directory(mut self, directory: impl Into<String>) -> Self {
        self.working_directory = Some(directory.into());
        self
    }

    pub fn delete_working_directory(mut self, delete: bool) -> Self {
        self.delete_working_directory = delete;
        self
    }

    pub fn build(self) -> Result<ConnectionConfiguration> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::Configuration(
                "connection name cannot be empty".to_string(),
            ));
        }
        if name.contains(':') {
            return Err(Error::Configuration(format!(
                "connection name '{name}' cannot contain ':'"
            )));
        }
        if matches!(self.working_directory.as_deref(), Some(d) if d.trim().is_empty()) {
            return Err(Error::Configuration(
                "working directory cannot be empty".to_string(),
            ));
        }
        if self.delete_working_directory && self.working_directory.is_none() {
            tracing::debug!(
                "delete_working_directory set for '{}' without a working directory",
                name
            );
        }

        Ok(ConnectionConfiguration {
            name,
            authorization: self.authorization,
            server_check: self.server_check,
            keepalive_interval: self.keepalive_interval,
            working_directory: self.working_directory,
            delete_working_directory: self.delete_working_directory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> AuthorizationHandler {
        AuthorizationHandler::preset("example.com", "alice", "secret")
    }

    #[test]
    fn test_builder_defaults() {
        let config = ConnectionConfiguration::builder("prod", handler())
            .build()
            .unwrap();
        assert_eq!(config.name(), "prod");
        assert_eq!(config.keepalive_interval(), None);
        assert_eq!(config.working_directory(), None);
        assert!(!config.delete_working_directory());
    }

    #[test]
    fn test_builder_accepts_new_hosts_by_default() {
        let config = ConnectionConfiguration::builder("prod", handler())
            .build()
            .unwrap();
        let expected = if crate::ssh::known_hosts::get_default_known_hosts_path().exists() {
            ServerCheckMethod::DefaultKnownHostsFile
        } else {
            ServerCheckMethod::NoCheck
        };
        assert_eq!(config.server_check(), &expected);
        assert_eq!(
            config.server_check(),
            &HostKeyPolicy::AcceptNew.check_method(None)
        );
    }

    #[test]
    fn test_builder_overrides() {
        let config = ConnectionConfiguration::builder(" staging ", handler())
            .server_check(ServerCheckMethod::NoCheck)
            .keepalive_interval(Duration::from_secs(15))
            .working_directory("/tmp/bxfer-work")
            .delete_working_directory(true)
            .build()
            .unwrap();
        assert_eq!(config.name(), "staging");
        assert_eq!(config.server_check(), &ServerCheckMethod::NoCheck);
        assert_eq!(config.keepalive_interval(), Some(Duration::from_secs(15)));
        assert_eq!(config.working_directory(), Some("/tmp/bxfer-work"));
        assert!(config.delete_working_directory());
    }

    #[test]
    fn test_builder_rejects_bad_names() {
        let err = ConnectionConfiguration::builder("  ", handler())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err = ConnectionConfiguration::builder("a:b", handler())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_builder_rejects_empty_working_directory() {
        let err = ConnectionConfiguration::builder("prod", handler())
            .working_directory("")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
