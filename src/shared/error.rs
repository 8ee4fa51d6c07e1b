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

use thiserror::Error;
pub type Result<T> = std::result::Result<T, KubeError>;

#[derive(Error, Debug)]
pub enum KubeError {
    #[error("Kubernetes API error: {0}")]
    KubeError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("cannot obtain KubeVirt client: {0}")]
    ClientError(String),

    /// Displays the API server's message unchanged.
    #[error("{message}")]
    NotFound {
        resource_type: String,
        name: String,
        namespace: String,
        message: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("unsupported resource type: {0}")]
    UnsupportedResourceType(String),

    #[error("unknown protocol: {0}")]
    UnknownProtocol(String),

    #[error("unknown service type: {0}")]
    UnknownServiceType(String),

    #[error("type: {0} not supported")]
    UnsupportedServiceType(String),

    #[error("error fetching {kind}: {source}")]
    FetchFailed {
        kind: &'static str,
        #[source]
        source: Box<KubeError>,
    },

    #[error("cannot expose VirtualMachineInstance ReplicaSet with match expressions")]
    MatchExpressionsUnsupported,

    #[error("missing label information for {resource_type}: {name}")]
    MissingLabels { resource_type: String, name: String },

    #[error("service creation failed: {0}")]
    ServiceCreationFailed(#[source] Box<KubeError>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl From<kube::Error> for KubeError {
    fn from(err: kube::Error) -> Self {
        KubeError::KubeError(err.to_string())
    }
}

impl KubeError {
    pub fn config_error(context: impl Into<String>) -> Self {
        Self::ConfigError(context.into())
    }

    pub fn not_found(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            name: name.into(),
            namespace: namespace.into(),
            message: message.into(),
        }
    }

    pub fn fetch_failed(kind: &'static str, source: KubeError) -> Self {
        Self::FetchFailed {
            kind,
            source: Box::new(source),
        }
    }

    pub fn service_creation_failed(source: KubeError) -> Self {
        Self::ServiceCreationFailed(Box::new(source))
    }

    /// True for the failures detected locally, before any API call is made.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::UnsupportedResourceType(_)
                | Self::UnknownProtocol(_)
                | Self::UnknownServiceType(_)
                | Self::UnsupportedServiceType(_)
        )
    }
}
