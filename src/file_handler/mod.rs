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

//! Filesystem operations over local paths and remote connections.
//!
//! [`LocalFileHandler`] works on the host filesystem only.
//! [`RemoteFileHandler`] is bound to one [`crate::Connection`] and handles
//! all four local/remote combinations of source and destination.

pub mod local;
pub mod medium;
pub mod path;
pub mod remote;
mod transfer;
pub mod traversal;

use async_trait::async_trait;

use crate::error::Result;
use crate::status::OperationReport;

pub use local::LocalFileHandler;
pub use path::PathRef;
pub use remote::RemoteFileHandler;

/// Filesystem operations dispatched by the medium of each path.
///
/// `move_path`, `copy_path` and `delete` report failures of the operation in
/// the returned [`OperationReport`]. `Err` is reserved for a medium that
/// cannot be used at all, such as a transfer channel that fails to open.
#[async_trait]
pub trait FileHandler: Send + Sync {
    /// Missing paths are `Ok(false)`.
    async fn exists(&self, path: &PathRef) -> Result<bool>;

    async fn move_path(&self, source: &PathRef, destination: &PathRef) -> Result<OperationReport>;

    async fn copy_path(&self, source: &PathRef, destination: &PathRef) -> Result<OperationReport>;

    /// Every plain file below `directory`, at any depth.
    async fn list_files(&self, directory: &PathRef) -> Result<Vec<PathRef>>;

    /// Every directory below `directory`, at any depth.
    async fn list_directories(&self, directory: &PathRef) -> Result<Vec<PathRef>>;

    /// Delete a file, or a directory and everything below it.
    async fn delete(&self, path: &PathRef) -> Result<OperationReport>;
}
