// Copyright 2025 JiangLong.
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

//! Client-side configuration for virtctl
//!
//! ```toml
//! log_level = "info"
//!
//! [kubernetes]
//! kubeconfig = "/home/me/.kube/config"
//! context = "lab"
//! namespace = "vms"
//! ```

use crate::infrastructure::constants::{CONF_FILE_ENV, DEFAULT_LOG_LEVEL};
use crate::shared::error::KubeError;
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConf {
    pub log_level: String,
    pub kubernetes: KubernetesConf,
}

impl Default for ClientConf {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            kubernetes: KubernetesConf::default(),
        }
    }
}

/// How to reach the cluster. Unset fields fall back to kubeconfig resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesConf {
    pub kubeconfig: Option<String>,
    pub context: Option<String>,
    pub namespace: Option<String>,
}

impl ClientConf {
    /// Load configuration from TOML file
    pub fn from<T: AsRef<str>>(path: T) -> Result<Self, KubeError> {
        let content = read_to_string(path.as_ref()).map_err(|e| {
            KubeError::config_error(format!(
                "Failed to read config file {}: {}",
                path.as_ref(),
                e
            ))
        })?;

        let conf: Self = toml::from_str(&content)?;
        Ok(conf)
    }

    /// `--config-file` first, then `VIRTCTL_CONF_FILE`, otherwise defaults.
    pub fn load(config_file: Option<&str>) -> Result<Self, KubeError> {
        Self::load_from(config_file, std::env::var(CONF_FILE_ENV).ok())
    }

    /// Same as [`ClientConf::load`] with the environment value passed in.
    fn load_from(config_file: Option<&str>, env_file: Option<String>) -> Result<Self, KubeError> {
        if let Some(path) = config_file {
            return Self::from(path);
        }

        match env_file {
            Some(path) if !path.is_empty() => Self::from(path),
            _ => Ok(Self::default()),
        }
    }
}
