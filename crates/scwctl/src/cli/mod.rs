//! CLI structure and command definitions
//!
//! Two layers, like most cloud CLIs:
//! 1. Raw API access (`api` command)
//! 2. Resource commands per product (`block`, `container`, `instance`), plus
//!    `sweep` for cleaning up test accounts

use clap::{Args, Parser, Subcommand};
use scwctl_core::{Region, Zone};

pub mod block;
pub mod container;
pub mod instance;

pub use block::*;
pub use container::*;
pub use instance::*;

/// Scaleway CLI for block storage, serverless containers and instances
#[derive(Parser, Debug)]
#[command(name = "scwctl")]
#[command(
    version,
    about = "Scaleway CLI for block storage, serverless containers and instances"
)]
#[command(long_about = "
Scaleway CLI for block storage, serverless containers and instances

EXAMPLES:
    # Set up a profile
    scwctl profile set prod --secret-key SECRET --default-zone fr-par-1

    # List volumes in the default zone
    scwctl block volume list

    # Filter output with JMESPath
    scwctl instance server list -q '[?state==`running`].name'

    # Wait for a container to be ready
    scwctl container container wait 11111111-1111-1111-1111-111111111111

    # Remove every test resource from an account
    scwctl sweep all --yes

    # Direct API access
    scwctl api get /instance/v1/zones/fr-par-1/servers

For more help on a specific command, run:
    scwctl <command> --help
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, global = true, env = "SCWCTL_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "SCWCTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// JMESPath query to filter output
    #[arg(long, short = 'q', global = true)]
    pub query: Option<String>,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Tables for lists, JSON for everything else
    Auto,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Human-readable table format
    Table,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Raw API access - direct REST endpoint calls
    #[command(name = "api")]
    #[command(after_help = "EXAMPLES:
    # GET request
    scwctl api get /block/v1alpha1/zones/fr-par-1/volumes

    # POST request with JSON data
    scwctl api post /containers/v1beta1/regions/fr-par/namespaces --data '{\"name\":\"apps\"}'

    # POST request from file
    scwctl api post /instance/v1/zones/fr-par-1/security_groups --data @sg.json
")]
    Api {
        /// HTTP method
        #[arg(value_parser = parse_http_method)]
        method: HttpMethod,

        /// API endpoint path (e.g., /instance/v1/zones/fr-par-1/servers)
        path: String,

        /// Request body (JSON string or @file)
        #[arg(long)]
        data: Option<String>,
    },

    /// Profile management
    #[command(subcommand, visible_alias = "prof", visible_alias = "pr")]
    #[command(after_help = "EXAMPLES:
    # Create a profile
    scwctl profile set prod --secret-key SECRET --default-project-id PROJECT --default-zone fr-par-1

    # List all profiles
    scwctl profile list

    # Show profile details
    scwctl profile show prod

    # Make a profile the default
    scwctl profile use prod
")]
    Profile(ProfileCommands),

    /// Block storage volumes and snapshots
    #[command(subcommand)]
    Block(BlockCommands),

    /// Serverless containers, namespaces and triggers
    #[command(subcommand)]
    Container(ContainerCommands),

    /// Instance servers, security groups and rules
    #[command(subcommand, visible_alias = "inst")]
    Instance(InstanceCommands),

    /// Delete every resource of a product in an account
    #[command(after_help = "EXAMPLES:
    # Sweep block storage in one zone
    scwctl sweep block --zone fr-par-1 --yes

    # Sweep serverless containers in every region
    scwctl sweep container --yes

    # Sweep everything everywhere
    scwctl sweep all --yes
")]
    Sweep(SweepArgs),

    /// Version information
    #[command(visible_alias = "ver", visible_alias = "v")]
    Version,

    /// Generate shell completions
    #[command(visible_alias = "comp")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion generation
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bourne Again Shell
    Bash,
    /// Z Shell
    Zsh,
    /// Friendly Interactive Shell
    Fish,
    /// PowerShell
    #[value(name = "powershell", alias = "power-shell")]
    PowerShell,
    /// Elvish
    Elvish,
}

/// HTTP methods for raw API access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// Parse HTTP method case-insensitively
fn parse_http_method(s: &str) -> Result<HttpMethod, String> {
    match s.to_lowercase().as_str() {
        "get" => Ok(HttpMethod::Get),
        "post" => Ok(HttpMethod::Post),
        "put" => Ok(HttpMethod::Put),
        "patch" => Ok(HttpMethod::Patch),
        "delete" => Ok(HttpMethod::Delete),
        _ => Err(format!(
            "invalid HTTP method: {} (valid: get, post, put, patch, delete)",
            s
        )),
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Patch => write!(f, "PATCH"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

/// Profile management commands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all configured profiles
    #[command(visible_alias = "ls", visible_alias = "l")]
    List,

    /// Show the path to the configuration file
    Path,

    /// Show details of a specific profile
    #[command(visible_alias = "sh", visible_alias = "get")]
    Show {
        /// Profile name to show (defaults to the active profile)
        name: Option<String>,
    },

    /// Set or create a profile
    #[command(visible_alias = "add", visible_alias = "create")]
    #[command(after_help = "EXAMPLES:
    # Minimal profile
    scwctl profile set dev --secret-key 11111111-1111-1111-1111-111111111111

    # Profile with account defaults
    scwctl profile set prod \\
        --access-key SCWXXXXXXXXXXXXXXXXX \\
        --secret-key 11111111-1111-1111-1111-111111111111 \\
        --default-project-id 22222222-2222-2222-2222-222222222222 \\
        --default-zone nl-ams-1

    # Keep the secret key in the OS keyring
    scwctl profile set prod --secret-key SECRET --use-keyring
")]
    Set {
        /// Profile name
        name: String,

        /// Access key (informational, requests authenticate with the secret key)
        #[arg(long)]
        access_key: Option<String>,

        /// Secret key
        #[arg(long)]
        secret_key: Option<String>,

        /// API URL
        #[arg(long)]
        api_url: Option<String>,

        /// Default organization ID
        #[arg(long)]
        default_organization_id: Option<String>,

        /// Default project ID, used when creating resources
        #[arg(long)]
        default_project_id: Option<String>,

        /// Default region (e.g. fr-par)
        #[arg(long)]
        default_region: Option<Region>,

        /// Default zone (e.g. fr-par-1); also sets the default region
        #[arg(long)]
        default_zone: Option<Zone>,

        /// Page size for list requests
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        default_page_size: Option<u32>,

        /// Seconds between two polls while waiting
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        poll_interval: Option<u64>,

        /// Maximum seconds to wait for a resource
        #[arg(long)]
        poll_timeout: Option<u64>,

        /// Store the secret key in the OS keyring instead of the config file
        #[cfg(feature = "secure-storage")]
        #[arg(long)]
        use_keyring: bool,
    },

    /// Remove a profile
    #[command(visible_alias = "rm", visible_alias = "del", visible_alias = "delete")]
    Remove {
        /// Profile name to remove
        name: String,
    },

    /// Make a profile the active one
    #[command(visible_alias = "default")]
    Use {
        /// Profile name
        name: String,
    },
}

/// Arguments for `sweep`
#[derive(Args, Debug)]
pub struct SweepArgs {
    #[command(subcommand)]
    pub target: SweepTarget,

    /// Confirm that every matching resource should be deleted
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

/// What to sweep
#[derive(Subcommand, Debug, Clone)]
pub enum SweepTarget {
    /// Block volumes and snapshots
    Block {
        /// Only sweep this zone
        #[arg(long, short = 'z')]
        zone: Option<Zone>,
    },
    /// Serverless triggers, containers and namespaces
    Container {
        /// Only sweep this region
        #[arg(long, short = 'r')]
        region: Option<Region>,
    },
    /// Instance servers and security groups
    Instance {
        /// Only sweep this zone
        #[arg(long, short = 'z')]
        zone: Option<Zone>,
    },
    /// Every product in every locality
    All,
}

/// Options shared by the `wait` subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct WaitArgs {
    /// Maximum seconds to wait (defaults to the profile's polling settings)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Seconds between two polls
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,
}

/// Paging options shared by the `list` subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct PageArgs {
    /// Fetch only this page instead of every page
    #[arg(long)]
    pub page: Option<u32>,

    /// Items per page
    #[arg(long)]
    pub page_size: Option<u32>,
}
