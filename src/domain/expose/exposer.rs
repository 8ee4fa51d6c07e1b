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

use crate::domain::expose::params::{ResourceKind, ResourceRef, ServiceParams};
use crate::domain::expose::selector::{self, Selector};
use crate::infrastructure::kubernetes::client::{VirtKubeClient, VirtKubeClientImpl};
use crate::infrastructure::kubernetes::resources::ServiceBuilder;
use crate::shared::error::KubeError;
use k8s_openapi::api::core::v1::Service;
use std::fmt;

/// Creates a Service selecting the VMIs behind a VMI, VM or VMI replica set.
pub struct Exposer {
    client: Box<dyn VirtKubeClient>,
}

/// Result of a successful `expose`.
#[derive(Debug, Clone)]
pub struct ExposeOutcome {
    pub service_name: String,
    pub resource_type: String,
    pub resource_name: String,
    pub service: Service,
}

impl fmt::Display for ExposeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Service {} successfully exposed for {} {}",
            self.service_name, self.resource_type, self.resource_name
        )
    }
}

impl Exposer {
    pub fn new(client: Box<dyn VirtKubeClient>) -> Self {
        Self { client }
    }

    pub async fn new_with_config(
        namespace: Option<String>,
        kubeconfig_path: Option<String>,
        context: Option<String>,
    ) -> Result<Self, KubeError> {
        let client = VirtKubeClientImpl::new_with_config(namespace, kubeconfig_path, context)
            .await?;
        Ok(Self::new(Box::new(client)))
    }

    pub fn namespace(&self) -> &str {
        self.client.namespace()
    }

    /// Fetches the target, derives the selector and creates the Service.
    ///
    /// Stops at the first failure; nothing is written unless the selector is
    /// usable.
    pub async fn expose(
        &self,
        target: &ResourceRef,
        params: &ServiceParams,
    ) -> Result<ExposeOutcome, KubeError> {
        params.validate()?;

        tracing::debug!(
            kind = %target.kind,
            name = %target.name,
            namespace = %self.namespace(),
            "resolving service selector"
        );

        let selector = self.resolve_selector(target).await?;
        if selector.is_empty() {
            return Err(KubeError::MissingLabels {
                resource_type: target.type_name.clone(),
                name: target.name.clone(),
            });
        }

        tracing::debug!(?selector, "selector resolved");

        let service = ServiceBuilder::new(self.namespace().to_string(), selector, params).build();

        let created = self
            .client
            .create_service(&service)
            .await
            .map_err(KubeError::service_creation_failed)?;

        tracing::debug!(
            service = %params.service_name,
            cluster_ip = ?created.spec.as_ref().and_then(|s| s.cluster_ip.as_deref()),
            "service created"
        );

        Ok(ExposeOutcome {
            service_name: params.service_name.clone(),
            resource_type: target.type_name.clone(),
            resource_name: target.name.clone(),
            service: created,
        })
    }

    async fn resolve_selector(&self, target: &ResourceRef) -> Result<Selector, KubeError> {
        let kind = target.kind.as_str();
        let name = target.name.as_str();

        match target.kind {
            ResourceKind::VirtualMachineInstance => {
                let vmi = self
                    .client
                    .get_virtual_machine_instance(name)
                    .await
                    .map_err(|e| KubeError::fetch_failed(kind, e))?;
                Ok(selector::from_instance(&vmi))
            }
            ResourceKind::VirtualMachine => {
                let vm = self
                    .client
                    .get_virtual_machine(name)
                    .await
                    .map_err(|e| KubeError::fetch_failed(kind, e))?;
                Ok(selector::from_virtual_machine(&vm))
            }
            ResourceKind::VirtualMachineInstanceReplicaSet => {
                let rs = self
                    .client
                    .get_replica_set(name)
                    .await
                    .map_err(|e| KubeError::fetch_failed(kind, e))?;
                selector::from_replica_set(&rs)
            }
        }
    }
}
