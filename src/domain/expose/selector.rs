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

//! Service selectors derived from fetched KubeVirt objects.
//!
//! Every function returns an owned copy; the fetched object is never modified.

use crate::infrastructure::constants::LABEL_NODE_NAME;
use crate::infrastructure::kubernetes::resources::{
    VirtualMachine, VirtualMachineInstance, VirtualMachineInstanceReplicaSet,
};
use crate::shared::error::KubeError;
use std::collections::BTreeMap;

pub type Selector = BTreeMap<String, String>;

/// Labels of the VMI itself, minus the node it currently runs on.
pub fn from_instance(vmi: &VirtualMachineInstance) -> Selector {
    let mut selector = vmi.metadata.labels.clone().unwrap_or_default();
    selector.remove(LABEL_NODE_NAME);
    selector
}

/// Labels of the VM's instance template. Labels on the VM object are not
/// propagated to its VMIs and so cannot select them.
pub fn from_virtual_machine(vm: &VirtualMachine) -> Selector {
    vm.spec
        .template
        .metadata
        .as_ref()
        .and_then(|meta| meta.labels.clone())
        .unwrap_or_default()
}

/// `matchLabels` of the replica set. Services only know equality selectors.
pub fn from_replica_set(rs: &VirtualMachineInstanceReplicaSet) -> Result<Selector, KubeError> {
    let selector = &rs.spec.selector;

    if selector
        .match_expressions
        .as_ref()
        .is_some_and(|exprs| !exprs.is_empty())
    {
        return Err(KubeError::MatchExpressionsUnsupported);
    }

    Ok(selector.match_labels.clone().unwrap_or_default())
}
