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

use crate::infrastructure::constants::{
    KIND_VIRTUAL_MACHINE, KIND_VIRTUAL_MACHINE_INSTANCE,
    KIND_VIRTUAL_MACHINE_INSTANCE_REPLICA_SET,
};
use crate::infrastructure::kubernetes::resources::{
    VirtualMachine, VirtualMachineInstance, VirtualMachineInstanceReplicaSet,
};
use crate::shared::error::KubeError;
use k8s_openapi::api::core::v1::Service;
use kube::{Api, Client};
use serde::de::DeserializeOwned;
use std::fmt::Debug;

/// Namespaced access to the API server for the objects `expose` touches.
///
/// All reads are plain GETs without a resourceVersion, so the API server
/// answers them from etcd with a quorum read rather than from its watch cache.
#[async_trait::async_trait]
pub trait VirtKubeClient: Send + Sync {
    fn namespace(&self) -> &str;

    async fn get_virtual_machine_instance(
        &self,
        name: &str,
    ) -> Result<VirtualMachineInstance, KubeError>;

    async fn get_virtual_machine(&self, name: &str) -> Result<VirtualMachine, KubeError>;

    async fn get_replica_set(
        &self,
        name: &str,
    ) -> Result<VirtualMachineInstanceReplicaSet, KubeError>;

    async fn create_service(&self, service: &Service) -> Result<Service, KubeError>;
}

pub struct VirtKubeClientImpl {
    client: Client,
    namespace: String,
}

impl VirtKubeClientImpl {
    /// Builds a client from kubeconfig, or from the in-cluster environment when
    /// neither a kubeconfig path nor a context is given.
    ///
    /// Without an explicit namespace the one of the active context is used.
    pub async fn new_with_config(
        namespace: Option<String>,
        kubeconfig_path: Option<String>,
        context: Option<String>,
    ) -> Result<Self, KubeError> {
        let config = resolve_config(kubeconfig_path, context).await?;
        let namespace = namespace.unwrap_or_else(|| config.default_namespace.clone());

        let client =
            Client::try_from(config).map_err(|e| KubeError::ClientError(e.to_string()))?;

        Ok(Self { client, namespace })
    }

    async fn get_namespaced<K>(&self, kind: &str, name: &str) -> Result<K, KubeError>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope, DynamicType = ()>
            + Clone
            + DeserializeOwned
            + Debug,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), &self.namespace);
        api.get(name)
            .await
            .map_err(|e| get_error(e, kind, name, &self.namespace))
    }
}

/// Maps a failed GET, keeping the API server's message as is.
fn get_error(err: kube::Error, kind: &str, name: &str, namespace: &str) -> KubeError {
    match err {
        kube::Error::Api(ae) if ae.code == 404 => {
            KubeError::not_found(kind, name, namespace, ae.message)
        }
        kube::Error::Api(ae) => KubeError::KubeError(ae.message),
        other => KubeError::KubeError(other.to_string()),
    }
}

async fn resolve_config(
    kubeconfig_path: Option<String>,
    context: Option<String>,
) -> Result<kube::Config, KubeError> {
    use kube::config::{KubeConfigOptions, Kubeconfig};

    if kubeconfig_path.is_none() && context.is_none() {
        return kube::Config::infer().await.map_err(|e| {
            KubeError::ConfigError(format!("Failed to infer Kubernetes config: {}", e))
        });
    }

    let kubeconfig = if let Some(path) = kubeconfig_path {
        Kubeconfig::read_from(path)
            .map_err(|e| KubeError::ConfigError(format!("Failed to load kubeconfig: {}", e)))?
    } else {
        Kubeconfig::read()
            .map_err(|e| KubeError::ConfigError(format!("Failed to load kubeconfig: {}", e)))?
    };

    let config_options = KubeConfigOptions {
        context,
        cluster: None,
        user: None,
    };

    kube::Config::from_custom_kubeconfig(kubeconfig, &config_options)
        .await
        .map_err(|e| KubeError::ConfigError(format!("Failed to create Kubernetes config: {}", e)))
}

#[async_trait::async_trait]
impl VirtKubeClient for VirtKubeClientImpl {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get_virtual_machine_instance(
        &self,
        name: &str,
    ) -> Result<VirtualMachineInstance, KubeError> {
        self.get_namespaced(KIND_VIRTUAL_MACHINE_INSTANCE, name)
            .await
    }

    async fn get_virtual_machine(&self, name: &str) -> Result<VirtualMachine, KubeError> {
        self.get_namespaced(KIND_VIRTUAL_MACHINE, name).await
    }

    async fn get_replica_set(
        &self,
        name: &str,
    ) -> Result<VirtualMachineInstanceReplicaSet, KubeError> {
        self.get_namespaced(KIND_VIRTUAL_MACHINE_INSTANCE_REPLICA_SET, name)
            .await
    }

    async fn create_service(&self, service: &Service) -> Result<Service, KubeError> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), &self.namespace);
        let pp = kube::api::PostParams::default();

        let created = api.create(&pp, service).await?;
        Ok(created)
    }
}
