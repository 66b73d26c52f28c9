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

//! Configuration loading and priority management.

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::types::Config;
use crate::utils::fs::expand_tilde;

/// Path used when no `--config` is given.
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/bxfer/config.yaml";

impl Config {
    /// Load configuration from a file.
    pub async fn load(path: &Path) -> Result<Self> {
        let expanded_path = expand_tilde(path);

        let content = fs::read_to_string(&expanded_path)
            .await
            .with_context(|| {
                format!(
                    "Failed to read configuration file at {}",
                    expanded_path.display()
                )
            })?;

        Self::parse(&content).with_context(|| {
            format!(
                "Failed to parse YAML configuration file at {}. Please check the YAML syntax is valid.",
                expanded_path.display()
            )
        })
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load configuration with priority order:
    /// 1. Explicit path, when it differs from the default
    /// 2. `bxfer.yaml` in the current directory
    /// 3. `$XDG_CONFIG_HOME/bxfer/config.yaml`
    /// 4. `~/.config/bxfer/config.yaml`
    ///
    /// An explicit path that does not exist is an error. When nothing is
    /// found an empty configuration is returned.
    pub async fn load_with_priority(cli_config_path: &Path) -> Result<Self> {
        let expanded_cli_path = expand_tilde(cli_config_path);
        let expanded_default_path = expand_tilde(Path::new(DEFAULT_CONFIG_PATH));

        if expanded_cli_path != expanded_default_path {
            tracing::debug!("Using explicitly specified config file: {:?}", expanded_cli_path);
            return Self::load(&expanded_cli_path).await;
        }

        for candidate in Self::standard_locations(&expanded_default_path) {
            if candidate.exists() {
                tracing::debug!("Found config at {:?}", candidate);
                return Self::load(&candidate).await;
            }
        }

        tracing::debug!("No config file found, using default empty configuration");
        Ok(Self::default())
    }

    fn standard_locations(default_path: &Path) -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from("bxfer.yaml")];
        if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME") {
            locations.push(PathBuf::from(xdg_config_home).join("bxfer").join("config.yaml"));
        }
        locations.push(default_path.to_path_buf());
        locations
    }
}
