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

use k8s_openapi::api::core::v1::Service;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{
    LabelSelector, LabelSelectorRequirement, ObjectMeta,
};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use virtctl::*;

mod test_utils {
    use super::*;

    /// Calls seen by the in-memory client.
    #[derive(Default)]
    pub struct Recorded {
        pub fetches: Vec<String>,
        pub created: Vec<Service>,
    }

    #[derive(Default)]
    pub struct MockKubeClient {
        pub namespace: String,
        pub instances: HashMap<String, VirtualMachineInstance>,
        pub machines: HashMap<String, VirtualMachine>,
        pub replica_sets: HashMap<String, VirtualMachineInstanceReplicaSet>,
        pub forbidden: bool,
        pub create_error: Option<String>,
        pub recorded: Arc<Mutex<Recorded>>,
    }

    impl MockKubeClient {
        pub fn new() -> Self {
            Self {
                namespace: "default".to_string(),
                ..Default::default()
            }
        }

        fn lookup<T: Clone>(
            &self,
            kind: &str,
            name: &str,
            objects: &HashMap<String, T>,
        ) -> Result<T> {
            self.recorded
                .lock()
                .unwrap()
                .fetches
                .push(format!("{}/{}", kind, name));

            if self.forbidden {
                return Err(KubeError::KubeError(format!(
                    "{} \"{}\" is forbidden",
                    kind, name
                )));
            }

            objects
                .get(name)
                .cloned()
                .ok_or_else(|| {
                    KubeError::not_found(
                        kind,
                        name,
                        &self.namespace,
                        format!("{} \"{}\" not found", kind, name),
                    )
                })
        }
    }

    #[async_trait::async_trait]
    impl VirtKubeClient for MockKubeClient {
        fn namespace(&self) -> &str {
            &self.namespace
        }

        async fn get_virtual_machine_instance(&self, name: &str) -> Result<VirtualMachineInstance> {
            self.lookup("VirtualMachineInstance", name, &self.instances)
        }

        async fn get_virtual_machine(&self, name: &str) -> Result<VirtualMachine> {
            self.lookup("VirtualMachine", name, &self.machines)
        }

        async fn get_replica_set(&self, name: &str) -> Result<VirtualMachineInstanceReplicaSet> {
            self.lookup("VirtualMachineInstanceReplicaSet", name, &self.replica_sets)
        }

        async fn create_service(&self, service: &Service) -> Result<Service> {
            if let Some(ref message) = self.create_error {
                return Err(KubeError::KubeError(message.clone()));
            }

            self.recorded.lock().unwrap().created.push(service.clone());

            let mut created = service.clone();
            if let Some(spec) = created.spec.as_mut() {
                if spec.cluster_ip.is_none() {
                    spec.cluster_ip = Some("10.96.0.42".to_string());
                }
            }
            Ok(created)
        }
    }

    pub fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    pub fn instance(name: &str, pairs: &[(&str, &str)]) -> VirtualMachineInstance {
        let mut vmi = VirtualMachineInstance::new(name, VirtualMachineInstanceSpec::default());
        if !pairs.is_empty() {
            vmi.metadata.labels = Some(labels(pairs));
        }
        vmi
    }

    pub fn machine(
        name: &str,
        own: &[(&str, &str)],
        template: &[(&str, &str)],
    ) -> VirtualMachine {
        let mut vm = VirtualMachine::new(
            name,
            VirtualMachineSpec {
                template: VirtualMachineInstanceTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(labels(template)),
                        ..Default::default()
                    }),
                    spec: None,
                },
                ..Default::default()
            },
        );
        vm.metadata.labels = Some(labels(own));
        vm
    }

    pub fn replica_set(
        name: &str,
        match_labels: &[(&str, &str)],
        match_expressions: Vec<LabelSelectorRequirement>,
    ) -> VirtualMachineInstanceReplicaSet {
        VirtualMachineInstanceReplicaSet::new(
            name,
            VirtualMachineInstanceReplicaSetSpec {
                replicas: Some(2),
                selector: LabelSelector {
                    match_labels: Some(labels(match_labels)),
                    match_expressions: if match_expressions.is_empty() {
                        None
                    } else {
                        Some(match_expressions)
                    },
                },
                ..Default::default()
            },
        )
    }

    pub fn params(service_name: &str) -> ServiceParams {
        ServiceParams {
            service_name: service_name.to_string(),
            port: 80,
            protocol: Protocol::Tcp,
            target_port: None,
            node_port: None,
            service_type: ServiceType::ClusterIP,
            cluster_ip: None,
            external_ip: None,
            load_balancer_ip: None,
            port_name: None,
        }
    }

    pub fn exposer(client: MockKubeClient) -> (Exposer, Arc<Mutex<Recorded>>) {
        let recorded = client.recorded.clone();
        (Exposer::new(Box::new(client)), recorded)
    }
}

use test_utils::*;

// ============================================================================
// End-to-end
// ============================================================================

#[tokio::test]
async fn test_expose_vmi_ssh_node_port() {
    let mut client = MockKubeClient::new();
    client.instances.insert(
        "myvm".to_string(),
        instance("myvm", &[("app", "myvm"), ("kubevirt.io/nodeName", "node1")]),
    );
    let (exposer, recorded) = exposer(client);

    let target = ResourceRef::parse("vmi", "myvm").unwrap();
    let params = ServiceParams {
        service_name: "myvm-ssh".to_string(),
        port: 5555,
        protocol: Protocol::Tcp,
        target_port: Some(IntOrString::Int(22)),
        node_port: Some(30001),
        service_type: ServiceType::NodePort,
        cluster_ip: None,
        external_ip: None,
        load_balancer_ip: None,
        port_name: None,
    };

    let outcome = exposer.expose(&target, &params).await.unwrap();

    let message = outcome.to_string();
    assert_eq!(message, "Service myvm-ssh successfully exposed for vmi myvm");
    assert!(message.contains("myvm-ssh") && message.contains("vmi") && message.contains("myvm"));

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.fetches, vec!["VirtualMachineInstance/myvm".to_string()]);
    assert_eq!(recorded.created.len(), 1);

    let service = &recorded.created[0];
    assert_eq!(service.metadata.name.as_deref(), Some("myvm-ssh"));
    assert_eq!(service.metadata.namespace.as_deref(), Some("default"));

    let spec = service.spec.as_ref().unwrap();
    assert_eq!(spec.selector, Some(labels(&[("app", "myvm")])));
    assert_eq!(spec.type_.as_deref(), Some("NodePort"));
    assert_eq!(spec.external_ips, None);

    let ports = spec.ports.as_ref().unwrap();
    assert_eq!(ports.len(), 1);
    assert_eq!(ports[0].protocol.as_deref(), Some("TCP"));
    assert_eq!(ports[0].port, 5555);
    assert_eq!(ports[0].target_port, Some(IntOrString::Int(22)));
    assert_eq!(ports[0].node_port, Some(30001));

    // The created object comes back from the API server.
    assert_eq!(
        outcome
            .service
            .spec
            .as_ref()
            .and_then(|s| s.cluster_ip.as_deref()),
        Some("10.96.0.42")
    );
}

#[tokio::test]
async fn test_expose_uses_client_namespace() {
    let mut client = MockKubeClient::new();
    client.namespace = "vms".to_string();
    client
        .instances
        .insert("db".to_string(), instance("db", &[("app", "db")]));
    let (exposer, recorded) = exposer(client);

    assert_eq!(exposer.namespace(), "vms");

    let target = ResourceRef::parse("vmi", "db").unwrap();
    exposer.expose(&target, &params("db")).await.unwrap();

    let recorded = recorded.lock().unwrap();
    assert_eq!(
        recorded.created[0].metadata.namespace.as_deref(),
        Some("vms")
    );
}

// ============================================================================
// Resource kinds
// ============================================================================

#[tokio::test]
async fn test_alias_dispatch() {
    let cases = [
        ("VMI", "VirtualMachineInstance/target"),
        ("virtualmachineinstances", "VirtualMachineInstance/target"),
        ("Vm", "VirtualMachine/target"),
        ("VIRTUALMACHINES", "VirtualMachine/target"),
        ("vmirs", "VirtualMachineInstanceReplicaSet/target"),
        (
            "VirtualMachineInstanceReplicaSets",
            "VirtualMachineInstanceReplicaSet/target",
        ),
    ];

    for (alias, expected_fetch) in cases {
        let mut client = MockKubeClient::new();
        client.instances.insert(
            "target".to_string(),
            instance("target", &[("app", "target")]),
        );
        client.machines.insert(
            "target".to_string(),
            machine("target", &[], &[("app", "target")]),
        );
        client.replica_sets.insert(
            "target".to_string(),
            replica_set("target", &[("app", "target")], Vec::new()),
        );
        let (exposer, recorded) = exposer(client);

        let target = ResourceRef::parse(alias, "target").unwrap();
        exposer.expose(&target, &params("target")).await.unwrap();

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.fetches, vec![expected_fetch.to_string()], "{}", alias);
        assert_eq!(recorded.created.len(), 1, "{}", alias);
    }
}

#[test]
fn test_unknown_kind_rejected() {
    let err = ResourceRef::parse("Deployment", "web").unwrap_err();
    assert!(matches!(err, KubeError::UnsupportedResourceType(ref t) if t == "deployment"));
}

#[tokio::test]
async fn test_vm_uses_template_labels() {
    let mut client = MockKubeClient::new();
    client.machines.insert(
        "myvm".to_string(),
        machine(
            "myvm",
            &[("owner", "ops")],
            &[("kubevirt.io/domain", "myvm")],
        ),
    );
    let (exposer, recorded) = exposer(client);

    let target = ResourceRef::parse("vm", "myvm").unwrap();
    exposer.expose(&target, &params("myvm-http")).await.unwrap();

    let recorded = recorded.lock().unwrap();
    let spec = recorded.created[0].spec.as_ref().unwrap();
    assert_eq!(spec.selector, Some(labels(&[("kubevirt.io/domain", "myvm")])));
}

#[tokio::test]
async fn test_replica_set_match_labels() {
    let mut client = MockKubeClient::new();
    client.replica_sets.insert(
        "fleet".to_string(),
        replica_set("fleet", &[("app", "fleet"), ("tier", "web")], Vec::new()),
    );
    let (exposer, recorded) = exposer(client);

    let target = ResourceRef::parse("vmirs", "fleet").unwrap();
    exposer.expose(&target, &params("fleet")).await.unwrap();

    let recorded = recorded.lock().unwrap();
    let spec = recorded.created[0].spec.as_ref().unwrap();
    assert_eq!(
        spec.selector,
        Some(labels(&[("app", "fleet"), ("tier", "web")]))
    );
}

#[tokio::test]
async fn test_replica_set_match_expressions_rejected() {
    let mut client = MockKubeClient::new();
    client.replica_sets.insert(
        "fleet".to_string(),
        replica_set(
            "fleet",
            &[("app", "fleet")],
            vec![LabelSelectorRequirement {
                key: "tier".to_string(),
                operator: "NotIn".to_string(),
                values: Some(vec!["batch".to_string()]),
            }],
        ),
    );
    let (exposer, recorded) = exposer(client);

    let target = ResourceRef::parse("vmirs", "fleet").unwrap();
    let err = exposer.expose(&target, &params("fleet")).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "cannot expose VirtualMachineInstance ReplicaSet with match expressions"
    );
    assert!(recorded.lock().unwrap().created.is_empty());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_empty_labels_rejected() {
    let mut client = MockKubeClient::new();
    client
        .instances
        .insert("bare".to_string(), instance("bare", &[]));
    client.instances.insert(
        "placed".to_string(),
        instance("placed", &[("kubevirt.io/nodeName", "node1")]),
    );
    let (exposer, recorded) = exposer(client);

    let target = ResourceRef::parse("vmi", "bare").unwrap();
    let err = exposer.expose(&target, &params("bare")).await.unwrap_err();
    assert_eq!(err.to_string(), "missing label information for vmi: bare");

    // Only the node placement label: nothing left to select on.
    let target = ResourceRef::parse("VMIS", "placed").unwrap();
    let err = exposer.expose(&target, &params("placed")).await.unwrap_err();
    assert_eq!(err.to_string(), "missing label information for vmis: placed");

    assert!(recorded.lock().unwrap().created.is_empty());
}

#[tokio::test]
async fn test_vm_without_template_labels_rejected() {
    let mut client = MockKubeClient::new();
    client.machines.insert(
        "myvm".to_string(),
        machine("myvm", &[("app", "myvm")], &[]),
    );
    let (exposer, recorded) = exposer(client);

    let target = ResourceRef::parse("vm", "myvm").unwrap();
    let err = exposer.expose(&target, &params("myvm")).await.unwrap_err();

    assert!(matches!(err, KubeError::MissingLabels { .. }));
    assert!(recorded.lock().unwrap().created.is_empty());
}

#[tokio::test]
async fn test_fetch_not_found_is_wrapped() {
    let (exposer, recorded) = exposer(MockKubeClient::new());

    let target = ResourceRef::parse("vm", "ghost").unwrap();
    let err = exposer.expose(&target, &params("ghost")).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "error fetching VirtualMachine: VirtualMachine \"ghost\" not found"
    );
    match err {
        KubeError::FetchFailed { kind, source } => {
            assert_eq!(kind, "VirtualMachine");
            match *source {
                KubeError::NotFound {
                    ref resource_type,
                    ref name,
                    ref namespace,
                    ..
                } => {
                    assert_eq!(resource_type, "VirtualMachine");
                    assert_eq!(name, "ghost");
                    assert_eq!(namespace, "default");
                }
                ref other => panic!("unexpected source: {:?}", other),
            }
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(recorded.lock().unwrap().created.is_empty());
}

#[tokio::test]
async fn test_fetch_forbidden_is_wrapped() {
    let mut client = MockKubeClient::new();
    client.forbidden = true;
    let (exposer, _) = exposer(client);

    let target = ResourceRef::parse("vmirs", "fleet").unwrap();
    let err = exposer.expose(&target, &params("fleet")).await.unwrap_err();

    let message = err.to_string();
    assert!(message.starts_with("error fetching VirtualMachineInstanceReplicaSet: "));
    assert!(message.contains("forbidden"));
}

#[tokio::test]
async fn test_create_failure_is_wrapped() {
    let mut client = MockKubeClient::new();
    client
        .instances
        .insert("myvm".to_string(), instance("myvm", &[("app", "myvm")]));
    client.create_error = Some("services \"myvm-ssh\" already exists".to_string());
    let (exposer, _) = exposer(client);

    let target = ResourceRef::parse("vmi", "myvm").unwrap();
    let err = exposer
        .expose(&target, &params("myvm-ssh"))
        .await
        .unwrap_err();

    assert!(matches!(err, KubeError::ServiceCreationFailed(_)));
    assert_eq!(
        err.to_string(),
        "service creation failed: Kubernetes API error: services \"myvm-ssh\" already exists"
    );
}

#[tokio::test]
async fn test_invalid_service_name_makes_no_calls() {
    let mut client = MockKubeClient::new();
    client
        .instances
        .insert("myvm".to_string(), instance("myvm", &[("app", "myvm")]));
    let (exposer, recorded) = exposer(client);

    let target = ResourceRef::parse("vmi", "myvm").unwrap();
    let err = exposer
        .expose(&target, &params("MyVM_SSH"))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    let recorded = recorded.lock().unwrap();
    assert!(recorded.fetches.is_empty());
    assert!(recorded.created.is_empty());
}

// ============================================================================
// Service shape
// ============================================================================

#[tokio::test]
async fn test_external_ip_only_when_given() {
    for external_ip in [None, Some("192.168.1.10".to_string())] {
        let mut client = MockKubeClient::new();
        client
            .instances
            .insert("myvm".to_string(), instance("myvm", &[("app", "myvm")]));
        let (exposer, recorded) = exposer(client);

        let mut params = params("myvm-lb");
        params.service_type = ServiceType::LoadBalancer;
        params.load_balancer_ip = Some("10.0.0.50".to_string());
        params.external_ip = external_ip.clone();
        params.port_name = Some("http".to_string());
        params.target_port = Some(IntOrString::String("http".to_string()));

        let target = ResourceRef::parse("vmi", "myvm").unwrap();
        exposer.expose(&target, &params).await.unwrap();

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.created.len(), 1);
        let spec = recorded.created[0].spec.as_ref().unwrap();

        assert_eq!(spec.external_ips, external_ip.map(|ip| vec![ip]));
        assert_eq!(spec.type_.as_deref(), Some("LoadBalancer"));
        assert_eq!(spec.load_balancer_ip.as_deref(), Some("10.0.0.50"));

        let ports = spec.ports.as_ref().unwrap();
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].name.as_deref(), Some("http"));
        assert_eq!(
            ports[0].target_port,
            Some(IntOrString::String("http".to_string()))
        );
    }
}

#[tokio::test]
async fn test_headless_cluster_ip() {
    let mut client = MockKubeClient::new();
    client
        .instances
        .insert("myvm".to_string(), instance("myvm", &[("app", "myvm")]));
    let (exposer, recorded) = exposer(client);

    let mut params = params("myvm-headless");
    params.cluster_ip = Some("None".to_string());
    params.protocol = Protocol::Udp;

    let target = ResourceRef::parse("vmi", "myvm").unwrap();
    exposer.expose(&target, &params).await.unwrap();

    let recorded = recorded.lock().unwrap();
    let spec = recorded.created[0].spec.as_ref().unwrap();
    assert_eq!(spec.cluster_ip.as_deref(), Some("None"));
    assert_eq!(spec.ports.as_ref().unwrap()[0].protocol.as_deref(), Some("UDP"));
}
