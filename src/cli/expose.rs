//! The `expose` command

use crate::domain::config::ClientConf;
use crate::domain::expose::params::non_empty;
use crate::domain::expose::{
    parse_target_port, Exposer, Protocol, ResourceRef, ServiceParams, ServiceType,
};
use crate::infrastructure::constants::{DEFAULT_PROTOCOL, DEFAULT_SERVICE_TYPE};
use crate::shared::error::KubeError;
use clap::Parser;

const EXPOSE_LONG_ABOUT: &str = "\
Looks up a virtual machine instance, virtual machine or virtual machine instance replica set \
by name and uses its selector as the selector for a new service on the specified port.

A virtual machine instance replica set is exposed only if its selector is convertible to a \
selector that a service supports, i.e. when the selector contains only matchLabels.

Possible types are (case insensitive, both singular and plural forms):

virtualmachineinstance (vmi), virtualmachine (vm), virtualmachineinstancereplicaset (vmirs)";

const EXPOSE_EXAMPLES: &str = "\
Examples:
  # Expose SSH of a virtual machine instance called 'myvm' on port 5555 and open port 30001 on every node:
  virtctl expose vmi myvm --port=5555 --node-port=30001 --target-port=22 --name=myvm-ssh --type=NodePort";

#[derive(Parser, Debug, Clone)]
#[command(long_about = EXPOSE_LONG_ABOUT, after_help = EXPOSE_EXAMPLES)]
pub struct ExposeCommand {
    /// Resource type: vmi, vm or vmirs
    #[arg(value_name = "TYPE")]
    pub resource_type: String,

    /// Name of the resource to expose
    #[arg(value_name = "NAME")]
    pub resource_name: String,

    /// Name of the service created for the exposure of the VM
    #[arg(long = "name", required = true)]
    pub service_name: String,

    /// The port that the service should serve on
    #[arg(long, required = true, allow_negative_numbers = true)]
    pub port: i32,

    /// The network protocol for the service to be created (TCP or UDP)
    #[arg(long, default_value = DEFAULT_PROTOCOL)]
    pub protocol: String,

    /// Name or number for the port on the VM that the service should direct traffic to
    #[arg(long, default_value = "")]
    pub target_port: String,

    /// Port used to expose the service on each node in a cluster
    #[arg(long)]
    pub node_port: Option<i32>,

    /// Type for this service: ClusterIP, NodePort, or LoadBalancer
    #[arg(long = "type", default_value = DEFAULT_SERVICE_TYPE)]
    pub service_type: String,

    /// ClusterIP to be assigned to the service. Leave empty to auto-allocate, or set to 'None'
    /// to create a headless service
    #[arg(long)]
    pub cluster_ip: Option<String>,

    /// Additional external IP address (not managed by the cluster) to accept for the service
    #[arg(long)]
    pub external_ip: Option<String>,

    /// IP to assign to the Load Balancer. If empty, an ephemeral IP will be created and used
    #[arg(long)]
    pub load_balancer_ip: Option<String>,

    /// Name of the port
    #[arg(long)]
    pub port_name: Option<String>,

    /// Kubernetes namespace
    /// If not specified, uses the namespace of the current context
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// Path to kubeconfig file
    /// If not specified, uses default kubeconfig resolution (KUBECONFIG env or ~/.kube/config)
    #[arg(long)]
    pub kubeconfig: Option<String>,

    /// Kubernetes context to use
    /// If not specified, uses current context from kubeconfig
    #[arg(long)]
    pub context: Option<String>,
}

impl ExposeCommand {
    /// Converts the raw flags into validated service parameters.
    pub fn service_params(&self) -> Result<ServiceParams, KubeError> {
        let protocol = self.protocol.parse::<Protocol>()?;
        let service_type = self.service_type.parse::<ServiceType>()?;

        let params = ServiceParams {
            service_name: self.service_name.clone(),
            port: self.port,
            protocol,
            target_port: parse_target_port(&self.target_port),
            node_port: self.node_port.filter(|port| *port != 0),
            service_type,
            cluster_ip: self.cluster_ip.as_deref().and_then(non_empty),
            external_ip: self.external_ip.as_deref().and_then(non_empty),
            load_balancer_ip: self.load_balancer_ip.as_deref().and_then(non_empty),
            port_name: self.port_name.as_deref().and_then(non_empty),
        };
        params.validate()?;

        Ok(params)
    }

    /// Namespace, kubeconfig path and context to connect with.
    ///
    /// Priority: command line > config file > kubeconfig. `None` leaves the
    /// choice to kubeconfig resolution.
    pub fn connection(
        &self,
        conf: &ClientConf,
    ) -> (Option<String>, Option<String>, Option<String>) {
        let kube_conf = &conf.kubernetes;
        let namespace = self
            .namespace
            .clone()
            .or_else(|| kube_conf.namespace.clone());
        let kubeconfig = self
            .kubeconfig
            .clone()
            .or_else(|| kube_conf.kubeconfig.clone());
        let context = self.context.clone().or_else(|| kube_conf.context.clone());

        (namespace, kubeconfig, context)
    }

    pub async fn execute(&self, conf: &ClientConf) -> anyhow::Result<()> {
        // Everything that can be checked locally is checked before a client exists.
        let target = ResourceRef::parse(&self.resource_type, &self.resource_name)?;
        let params = self.service_params()?;

        let (namespace, kubeconfig, context) = self.connection(conf);
        let exposer = Exposer::new_with_config(namespace, kubeconfig, context).await?;
        let outcome = exposer.expose(&target, &params).await?;

        println!("{}", outcome);
        Ok(())
    }
}
