// CLI command definitions

use super::expose::ExposeCommand;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "virtctl",
    version,
    about = "Command line client for KubeVirt virtual machines",
    long_about = "A standalone CLI tool for working with KubeVirt virtual machines on Kubernetes"
)]
pub struct CliArgs {
    /// Path to virtctl client configuration file (TOML)
    /// If not provided, reads from VIRTCTL_CONF_FILE environment variable
    #[arg(long, global = true, value_name = "PATH")]
    pub config_file: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Expose a virtual machine as a new service.
    Expose(ExposeCommand),
}
