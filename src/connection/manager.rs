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

//! Registry of named connections.
//!
//! The registry lock is held for the whole of an open, so concurrent opens
//! of one name resolve to a single session that every caller observes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use super::{Connection, ConnectionConfiguration};
use crate::error::{Error, Result};
use crate::ssh::{Connector, SshConnector};

/// Owns every open [`Connection`], keyed by name.
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    connections: Mutex<HashMap<String, Arc<Connection>>>,
    next_id: AtomicU64,
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionManager {
    /// A manager that opens real SSH sessions.
    pub fn new() -> Self {
        Self::with_connector(Arc::new(SshConnector::new()))
    }

    pub fn with_connector(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            connections: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Return the live connection registered under `config.name()`, or open
    /// and register a new one.
    ///
    /// When a live connection exists the supplied configuration is ignored.
    /// A registered connection whose session has dropped is closed and
    /// replaced. A failed open registers nothing.
    pub async fn open_connection(&self, config: ConnectionConfiguration) -> Result<Arc<Connection>> {
        let name = config.name().to_string();
        let mut connections = self.connections.lock().await;

        if let Some(existing) = connections.get(&name) {
            if existing.is_connected() {
                tracing::debug!("Reusing connection '{}' (#{})", name, existing.id());
                return Ok(Arc::clone(existing));
            }
            tracing::warn!("Connection '{}' was lost, reconnecting", name);
            if let Some(stale) = connections.remove(&name) {
                if let Err(e) = stale.close().await {
                    tracing::debug!("Closing stale connection '{}': {}", name, e);
                }
            }
        }

        // Resolving may read files or prompt on the terminal
        let authorization = config.authorization().clone();
        let resolved = tokio::task::spawn_blocking(move || authorization.resolve())
            .await
            .map_err(|e| Error::Authentication {
                name: name.clone(),
                reason: format!("credential resolution did not complete: {e}"),
            })?;
        let credentials = resolved.map_err(|e| match e {
            e @ Error::Authentication { .. } => e,
            other => Error::Authentication {
                name: name.clone(),
                reason: other.to_string(),
            },
        })?;
        tracing::debug!(
            "Opening '{}' as {}@{}:{}",
            name,
            credentials.username,
            credentials.hostname,
            credentials.port
        );

        let session = self.connector.connect(&config, credentials).await?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let connection = Arc::new(Connection::new(id, config, session));
        connections.insert(name.clone(), Arc::clone(&connection));

        tracing::info!("Opened connection '{}' (#{})", name, id);
        Ok(connection)
    }

    pub async fn get_connection(&self, name: &str) -> Option<Arc<Connection>> {
        self.connections.lock().await.get(name).cloned()
    }

    /// Names of the registered connections, sorted.
    pub async fn connection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.connections.lock().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Close and forget the connection named `name`. Unknown names are ignored.
    pub async fn remove_connection(&self, name: &str) -> Result<()> {
        let removed = self.connections.lock().await.remove(name);
        match removed {
            Some(connection) => connection.close().await,
            None => {
                tracing::debug!("No connection named '{}' to remove", name);
                Ok(())
            }
        }
    }

    /// Close every connection. Failures are logged and never stop the sweep.
    pub async fn remove_all_connections(&self) {
        let drained: Vec<(String, Arc<Connection>)> =
            self.connections.lock().await.drain().collect();

        for (name, connection) in drained {
            if let Err(e) = connection.close().await {
                tracing::warn!("Failed to close connection '{}': {}", name, e);
            }
        }
    }
}
