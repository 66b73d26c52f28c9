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

//! Error taxonomy shared by the connection registry and the file handlers.
//!
//! # Error Categories
//!
//! - [`Error::Authentication`] / [`Error::Connection`]: opening a session failed
//! - [`Error::Channel`]: the SFTP sub-channel could not be negotiated
//! - [`Error::SourceNotFound`] / [`Error::DestinationInvalid`]: a transfer was
//!   rejected before anything was written
//! - [`Error::Transfer`]: the medium failed mid-transfer or verification failed
//! - [`Error::Cleanup`]: staging or recursive-delete cleanup failed

use std::io;

use thiserror::Error;

/// Errors produced by `bxfer`.
#[derive(Debug, Error)]
pub enum Error {
    /// Credentials were rejected, or could not be resolved at all.
    #[error("authentication failed for connection '{name}': {reason}")]
    Authentication { name: String, reason: String },

    /// The host could not be reached or the SSH handshake failed.
    #[error("could not connect to {host}:{port}: {reason}")]
    Connection {
        host: String,
        port: u16,
        reason: String,
    },

    /// The transfer channel could not be opened on a live session.
    #[error("failed to open transfer channel: {0}")]
    Channel(String),

    /// The source path does not exist.
    #[error("source not found: {0}")]
    SourceNotFound(String),

    /// The destination cannot receive the transfer.
    #[error("invalid destination '{path}': {reason}")]
    DestinationInvalid { path: String, reason: String },

    /// A read or write failed while data was moving, or the result did not verify.
    #[error("transfer failed for '{path}': {reason}")]
    Transfer { path: String, reason: String },

    /// Deleting a staging file or a directory tree failed.
    #[error("cleanup failed for '{path}': {reason}")]
    Cleanup { path: String, reason: String },

    /// Invalid configuration or API misuse.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Local I/O failure outside a transfer.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn transfer(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Transfer {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn cleanup(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Cleanup {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn destination(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::DestinationInvalid {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error was raised before any data was written.
    pub fn is_rejected_before_write(&self) -> bool {
        matches!(
            self,
            Self::SourceNotFound(_) | Self::DestinationInvalid { .. }
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
