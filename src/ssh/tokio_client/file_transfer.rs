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

//! SFTP subsystem negotiation and streaming single-file transfers.
//!
//! Some sshd_config files do not enable sftp by default. A line like
//! `Subsystem sftp internal-sftp` or `Subsystem sftp /usr/lib/openssh/sftp-server`
//! is needed on the remote machine.

use russh_sftp::{client::SftpSession, protocol::OpenFlags};
use std::path::Path;
use tokio::io::AsyncWriteExt;

use super::connection::Client;

impl Client {
    /// Open a session channel and negotiate the sftp subsystem on it.
    pub async fn open_sftp(&self) -> Result<SftpSession, super::Error> {
        let channel = self.get_channel().await?;
        channel
            .request_subsystem(true, "sftp")
            .await
            .map_err(|e| super::Error::SubsystemRejected(e.to_string()))?;
        let sftp = SftpSession::new(channel.into_stream()).await?;
        Ok(sftp)
    }
}

/// Stream a local file into `remote_path`, creating or truncating it.
pub async fn upload_file(
    sftp: &SftpSession,
    local_path: &Path,
    remote_path: &str,
) -> Result<u64, super::Error> {
    let mut local_file = tokio::fs::File::open(local_path).await?;
    let mut remote_file = sftp
        .open_with_flags(
            remote_path,
            OpenFlags::CREATE | OpenFlags::TRUNCATE | OpenFlags::WRITE,
        )
        .await?;

    let written = tokio::io::copy(&mut local_file, &mut remote_file).await?;
    remote_file.flush().await?;
    remote_file.shutdown().await?;

    Ok(written)
}

/// Stream `remote_path` into a local file, creating or truncating it.
pub async fn download_file(
    sftp: &SftpSession,
    remote_path: &str,
    local_path: &Path,
) -> Result<u64, super::Error> {
    let mut remote_file = sftp.open_with_flags(remote_path, OpenFlags::READ).await?;
    let mut local_file = tokio::fs::File::create(local_path).await?;

    let written = tokio::io::copy(&mut remote_file, &mut local_file).await?;
    local_file.flush().await?;
    remote_file.shutdown().await?;

    Ok(written)
}
