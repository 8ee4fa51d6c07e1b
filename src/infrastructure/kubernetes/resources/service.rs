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

use crate::domain::expose::params::ServiceParams;
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::api::core::v1::ServicePort;
use k8s_openapi::api::core::v1::ServiceSpec;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Builds the Service that fronts an exposed VM.
pub struct ServiceBuilder<'a> {
    namespace: String,
    selector: BTreeMap<String, String>,
    params: &'a ServiceParams,
}

impl<'a> ServiceBuilder<'a> {
    pub fn new(
        namespace: String,
        selector: BTreeMap<String, String>,
        params: &'a ServiceParams,
    ) -> Self {
        Self {
            namespace,
            selector,
            params,
        }
    }

    /// The selector is used as given; callers reject an empty one first.
    pub fn build(&self) -> Service {
        let metadata = ObjectMeta {
            name: Some(self.params.service_name.clone()),
            namespace: Some(self.namespace.clone()),
            ..Default::default()
        };

        Service {
            metadata,
            spec: Some(ServiceSpec {
                type_: Some(self.params.service_type.as_str().to_string()),
                ports: Some(vec![self.create_service_port()]),
                selector: Some(self.selector.clone()),
                cluster_ip: self.params.cluster_ip.clone(),
                load_balancer_ip: self.params.load_balancer_ip.clone(),
                external_ips: self.params.external_ip.as_ref().map(|ip| vec![ip.clone()]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn create_service_port(&self) -> ServicePort {
        ServicePort {
            name: self.params.port_name.clone(),
            port: self.params.port,
            target_port: self.params.target_port.clone(),
            node_port: self.params.node_port,
            protocol: Some(self.params.protocol.as_str().to_string()),
            ..Default::default()
        }
    }
}
