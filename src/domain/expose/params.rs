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
    KIND_VIRTUAL_MACHINE_INSTANCE_REPLICA_SET, MAX_SERVICE_NAME_LEN,
};
use crate::shared::error::KubeError;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use regex::Regex;
use std::fmt;

/// Kind of resource whose labels seed the service selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    VirtualMachineInstance,
    VirtualMachine,
    VirtualMachineInstanceReplicaSet,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::VirtualMachineInstance => KIND_VIRTUAL_MACHINE_INSTANCE,
            ResourceKind::VirtualMachine => KIND_VIRTUAL_MACHINE,
            ResourceKind::VirtualMachineInstanceReplicaSet => {
                KIND_VIRTUAL_MACHINE_INSTANCE_REPLICA_SET
            }
        }
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = KubeError;

    /// Case insensitive, singular and plural forms of both the full and short names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vmi" | "vmis" | "virtualmachineinstance" | "virtualmachineinstances" => {
                Ok(ResourceKind::VirtualMachineInstance)
            }
            "vm" | "vms" | "virtualmachine" | "virtualmachines" => Ok(ResourceKind::VirtualMachine),
            "vmirs"
            | "vmirss"
            | "virtualmachineinstancereplicaset"
            | "virtualmachineinstancereplicasets" => {
                Ok(ResourceKind::VirtualMachineInstanceReplicaSet)
            }
            other => Err(KubeError::UnsupportedResourceType(other.to_string())),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resource being exposed, as named on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    /// Lower-cased type as the user spelled it, used in messages.
    pub type_name: String,
    pub name: String,
}

impl ResourceRef {
    pub fn parse(resource_type: &str, name: &str) -> Result<Self, KubeError> {
        let type_name = resource_type.to_lowercase();
        let kind = type_name.parse::<ResourceKind>()?;

        if name.is_empty() {
            return Err(KubeError::ValidationError(format!(
                "{} name must not be empty",
                kind
            )));
        }

        Ok(Self {
            kind,
            type_name,
            name: name.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

impl std::str::FromStr for Protocol {
    type Err = KubeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TCP" => Ok(Protocol::Tcp),
            "UDP" => Ok(Protocol::Udp),
            _ => Err(KubeError::UnknownProtocol(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    ClusterIP,
    NodePort,
    LoadBalancer,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::ClusterIP => "ClusterIP",
            ServiceType::NodePort => "NodePort",
            ServiceType::LoadBalancer => "LoadBalancer",
        }
    }
}

impl std::str::FromStr for ServiceType {
    type Err = KubeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ClusterIP" => Ok(ServiceType::ClusterIP),
            "NodePort" => Ok(ServiceType::NodePort),
            "LoadBalancer" => Ok(ServiceType::LoadBalancer),
            // A VM cannot be the backend of a DNS alias.
            "ExternalName" => Err(KubeError::UnsupportedServiceType(s.to_string())),
            _ => Err(KubeError::UnknownServiceType(s.to_string())),
        }
    }
}

/// Everything the new Service is built from besides its selector.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceParams {
    pub service_name: String,
    pub port: i32,
    pub protocol: Protocol,
    pub target_port: Option<IntOrString>,
    pub node_port: Option<i32>,
    pub service_type: ServiceType,
    pub cluster_ip: Option<String>,
    pub external_ip: Option<String>,
    pub load_balancer_ip: Option<String>,
    pub port_name: Option<String>,
}

impl ServiceParams {
    pub fn validate(&self) -> Result<(), KubeError> {
        if !is_valid_service_name(&self.service_name) {
            return Err(KubeError::ValidationError(format!(
                "Invalid service name '{}': must be a DNS-1035 label of at most {} characters",
                self.service_name, MAX_SERVICE_NAME_LEN
            )));
        }

        Ok(())
    }
}

/// Same rules as Kubernetes `intstr.Parse`: a string that reads as an i32 is a
/// port number, anything else names a port. Empty means unset.
pub fn parse_target_port(s: &str) -> Option<IntOrString> {
    if s.is_empty() {
        return None;
    }

    match s.parse::<i32>() {
        Ok(port) => Some(IntOrString::Int(port)),
        Err(_) => Some(IntOrString::String(s.to_string())),
    }
}

/// Treats an empty flag value as not given.
pub fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

pub(crate) fn is_valid_service_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_SERVICE_NAME_LEN {
        return false;
    }

    match Regex::new(r"^[a-z]([-a-z0-9]*[a-z0-9])?$") {
        Ok(re) => re.is_match(name),
        Err(_) => false,
    }
}
