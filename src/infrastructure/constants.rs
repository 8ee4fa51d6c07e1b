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

/// Resource kinds
pub const KIND_VIRTUAL_MACHINE_INSTANCE: &str = "VirtualMachineInstance";
pub const KIND_VIRTUAL_MACHINE: &str = "VirtualMachine";
pub const KIND_VIRTUAL_MACHINE_INSTANCE_REPLICA_SET: &str = "VirtualMachineInstanceReplicaSet";

/// Label set by virt-handler on the node a VMI lands on. Never part of a service selector.
pub const LABEL_NODE_NAME: &str = "kubevirt.io/nodeName";

/// Service defaults
pub const DEFAULT_PROTOCOL: &str = "TCP";
pub const DEFAULT_SERVICE_TYPE: &str = "ClusterIP";

/// Service name limit (DNS-1035 label)
pub const MAX_SERVICE_NAME_LEN: usize = 63;

/// Client configuration
pub const CONF_FILE_ENV: &str = "VIRTCTL_CONF_FILE";
pub const DEFAULT_LOG_LEVEL: &str = "warn";
