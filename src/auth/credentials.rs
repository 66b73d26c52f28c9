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

//! Resolved credentials and the credentials-file format.

use std::fmt;
use std::path::PathBuf;

use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Default SSH port.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Secret material used to authenticate a session.
#[derive(Clone, PartialEq, Eq)]
pub enum Secret {
    Password(Zeroizing<String>),
    KeyFile {
        path: PathBuf,
        passphrase: Option<Zeroizing<String>>,
    },
    /// Identities offered by the running SSH agent.
    Agent,
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password(_) => f.write_str("Password(<redacted>)"),
            Self::KeyFile { path, passphrase } => f
                .debug_struct("KeyFile")
                .field("path", path)
                .field("passphrase", &passphrase.as_ref().map(|_| "<redacted>"))
                .finish(),
            Self::Agent => f.write_str("Agent"),
        }
    }
}

/// Everything needed to open one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub hostname: String,
    pub username: String,
    pub port: u16,
    pub secret: Secret,
}

impl Credentials {
    pub fn with_password(
        hostname: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            username: username.into(),
            port: DEFAULT_SSH_PORT,
            secret: Secret::Password(Zeroizing::new(password.into())),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.hostname.trim().is_empty() {
            return Err(Error::Configuration("hostname cannot be empty".to_string()));
        }
        if self.username.trim().is_empty() {
            return Err(Error::Configuration("username cannot be empty".to_string()));
        }
        if self.port == 0 {
            return Err(Error::Configuration("port cannot be 0".to_string()));
        }
        Ok(())
    }
}

/// Parses the contents of a credentials file.
///
/// The first line that is neither blank nor a `#` comment holds
/// `username hostname password [port]`, separated by whitespace.
pub fn parse_credentials_file(content: &str) -> Result<Credentials> {
    let line = content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'))
        .ok_or_else(|| Error::Configuration("credentials file is empty".to_string()))?;

    let fields: Vec<&str> = line.split_whitespace().collect();
    let (username, hostname, password, port) = match fields.as_slice() {
        [user, host, pass] => (*user, *host, *pass, None),
        [user, host, pass, port] => (*user, *host, *pass, Some(*port)),
        _ => {
            return Err(Error::Configuration(format!(
                "credentials file must contain 'username hostname password [port]', found {} fields",
                fields.len()
            )))
        }
    };

    let port = match port {
        Some(p) => p
            .parse::<u16>()
            .map_err(|_| Error::Configuration(format!("invalid port in credentials file: {p}")))?,
        None => DEFAULT_SSH_PORT,
    };

    let credentials = Credentials::with_password(hostname, username, password).port(port);
    credentials.validate()?;
    Ok(credentials)
}
