pub mod discover;
pub mod replay;
pub mod size;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use sweepr_common::config::{Config, FailureAccounting};
use sweepr_common::discovery::request::{DiscoveryMethod, SnmpVersion};
use sweepr_common::network::range::IpRange;
use sweepr_common::retry::RetryPolicy;

#[derive(Parser)]
#[command(name = "sweepr")]
#[command(about = "Submit discovery jobs to network agents and follow their progress.")]
#[command(version)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Milliseconds between two status queries
    #[arg(long, global = true, default_value_t = 2_000)]
    pub poll_interval_ms: u64,

    /// Upper bound in milliseconds for a single agent request
    #[arg(long, global = true, default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Pause in milliseconds between a finished job and its summary
    #[arg(long, global = true, default_value_t = 1_000)]
    pub settle_ms: u64,

    /// Attempts per status query before the job is given up
    #[arg(long, global = true, default_value_t = 1)]
    pub retries: u32,

    /// Count every target as failed when the whole job fails
    #[arg(long, global = true)]
    pub whole_range_failures: bool,

    /// Less output, repeat for even less
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub quiet: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the number of targets in a range
    #[command(alias = "s")]
    Size { range: IpRange },
    /// Run a discovery job against an HTTP agent
    #[command(alias = "d")]
    Discover(DiscoverArgs),
    /// Replay recorded status payloads as a discovery job
    #[command(alias = "r")]
    Replay {
        /// JSON file holding an array of status payloads
        file: PathBuf,
        range: IpRange,
    },
}

#[derive(Args)]
pub struct DiscoverArgs {
    /// Range to discover, e.g. 192.168.1.10-192.168.1.14 or 10.0.0.0/24
    pub range: String,

    /// Network the discovered devices belong to
    #[arg(long)]
    pub network: String,

    /// Agent that runs the scan, repeatable
    #[arg(long = "agent", required = true)]
    pub agents: Vec<String>,

    /// Base URL of the agent API
    #[arg(long)]
    pub agent_url: String,

    #[arg(long, default_value = "auto")]
    pub method: DiscoveryMethod,

    #[arg(long, default_value = "")]
    pub username: String,

    #[arg(long, default_value = "")]
    pub password: String,

    #[arg(long, default_value = "v2c")]
    pub snmp_version: SnmpVersion,

    #[arg(long, default_value = "public")]
    pub snmp_community: String,

    #[arg(long, default_value_t = 161)]
    pub snmp_port: u16,

    /// SNMP v3 user, required with --snmp-version v3
    #[arg(long)]
    pub snmp_user: Option<String>,

    /// Bearer token for the agent API
    #[arg(long)]
    pub token: Option<String>,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        let poll_interval = Duration::from_millis(self.poll_interval_ms);
        Config {
            poll_interval,
            request_timeout: Duration::from_millis(self.timeout_ms),
            settle_delay: Duration::from_millis(self.settle_ms),
            retry: RetryPolicy::fixed(poll_interval, self.retries),
            failure_accounting: match self.whole_range_failures {
                true => FailureAccounting::WholeRange,
                false => FailureAccounting::SingleFailure,
            },
            quiet: self.quiet,
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
