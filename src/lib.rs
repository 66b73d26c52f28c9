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

//! Connection and file-transfer management over SSH/SFTP.
//!
//! Open named connections through a [`ConnectionManager`], bind a
//! [`RemoteFileHandler`] to one and move, copy, list or delete paths across
//! the local filesystem and the remote host.
//!
//! ```no_run
//! use bxfer::{
//!     AuthorizationHandler, ConnectionConfiguration, ConnectionManager, FileHandler, PathRef,
//!     RemoteFileHandler,
//! };
//!
//! # async fn demo() -> bxfer::Result<()> {
//! let manager = ConnectionManager::new();
//! let auth = AuthorizationHandler::preset("files.example.com", "deploy", "secret");
//! let config = ConnectionConfiguration::builder("files", auth).build()?;
//! let handler = RemoteFileHandler::connect(&manager, config).await?;
//!
//! let report = handler
//!     .copy_path(&PathRef::local("report.csv"), &PathRef::remote("/srv/reports"))
//!     .await?;
//! assert!(report.is_success());
//!
//! manager.remove_all_connections().await;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod file_handler;
pub mod ssh;
pub mod status;
pub mod utils;

pub use auth::{AuthorizationHandler, AuthorizationKind, Credentials, Secret};
pub use connection::{Connection, ConnectionConfiguration, ConnectionManager};
pub use error::{Error, Result};
pub use file_handler::{FileHandler, LocalFileHandler, PathRef, RemoteFileHandler};
pub use status::{CommandStatus, OperationReport};
