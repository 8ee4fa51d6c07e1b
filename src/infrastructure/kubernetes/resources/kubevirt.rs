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

//! KubeVirt `kubevirt.io/v1` resources, typed only as far as exposing them needs.
//!
//! Fields this tool does not read are kept verbatim in a flattened map so the
//! objects deserialize from any KubeVirt release.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(CustomResource, Debug, Clone, Default, Deserialize, Serialize)]
#[kube(
    group = "kubevirt.io",
    version = "v1",
    kind = "VirtualMachineInstance",
    plural = "virtualmachineinstances",
    shortname = "vmi",
    namespaced,
    schema = "disabled"
)]
pub struct VirtualMachineInstanceSpec {
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

#[derive(CustomResource, Debug, Clone, Default, Deserialize, Serialize)]
#[kube(
    group = "kubevirt.io",
    version = "v1",
    kind = "VirtualMachine",
    plural = "virtualmachines",
    shortname = "vm",
    namespaced,
    schema = "disabled"
)]
pub struct VirtualMachineSpec {
    #[serde(default)]
    pub template: VirtualMachineInstanceTemplateSpec,

    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

#[derive(CustomResource, Debug, Clone, Default, Deserialize, Serialize)]
#[kube(
    group = "kubevirt.io",
    version = "v1",
    kind = "VirtualMachineInstanceReplicaSet",
    plural = "virtualmachineinstancereplicasets",
    shortname = "vmirs",
    namespaced,
    schema = "disabled"
)]
pub struct VirtualMachineInstanceReplicaSetSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    #[serde(default)]
    pub selector: LabelSelector,

    #[serde(default)]
    pub template: VirtualMachineInstanceTemplateSpec,

    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

/// Template stamped out into VMIs by a VirtualMachine or a replica set.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VirtualMachineInstanceTemplateSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ObjectMeta>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<Value>,
}
