//! Serverless containers command definitions

use clap::Subcommand;
use scwctl_core::Region;

use super::{PageArgs, WaitArgs};

#[derive(Subcommand, Debug)]
pub enum ContainerCommands {
    /// Container namespaces
    #[command(subcommand, visible_alias = "ns")]
    Namespace(NamespaceCommands),

    /// Containers
    #[command(subcommand)]
    Container(ContainerResourceCommands),

    /// Container triggers
    #[command(subcommand)]
    Trigger(TriggerCommands),
}

#[derive(Subcommand, Debug)]
pub enum NamespaceCommands {
    /// List namespaces
    #[command(visible_alias = "ls")]
    List {
        /// Region to list (defaults to the profile's region)
        #[arg(long, short = 'r')]
        region: Option<Region>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        project_id: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one namespace
    Get {
        /// Namespace ID
        id: String,

        #[arg(long, short = 'r')]
        region: Option<Region>,
    },

    /// Delete a namespace and everything in it
    #[command(visible_alias = "rm")]
    Delete {
        /// Namespace ID
        id: String,

        #[arg(long, short = 'r')]
        region: Option<Region>,
    },

    /// Wait until a namespace is ready
    Wait {
        /// Namespace ID
        id: String,

        #[arg(long, short = 'r')]
        region: Option<Region>,

        #[command(flatten)]
        wait: WaitArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum ContainerResourceCommands {
    /// List containers
    #[command(visible_alias = "ls")]
    List {
        #[arg(long, short = 'r')]
        region: Option<Region>,

        /// Only containers in this namespace
        #[arg(long)]
        namespace_id: Option<String>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        project_id: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one container
    Get {
        /// Container ID
        id: String,

        #[arg(long, short = 'r')]
        region: Option<Region>,
    },

    /// Deploy the current image of a container
    Deploy {
        /// Container ID
        id: String,

        #[arg(long, short = 'r')]
        region: Option<Region>,

        /// Wait for the deployment to finish
        #[arg(long)]
        wait: bool,
    },

    /// Delete a container
    #[command(visible_alias = "rm")]
    Delete {
        /// Container ID
        id: String,

        #[arg(long, short = 'r')]
        region: Option<Region>,
    },

    /// Wait until a container is ready or created
    Wait {
        /// Container ID
        id: String,

        #[arg(long, short = 'r')]
        region: Option<Region>,

        #[command(flatten)]
        wait: WaitArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum TriggerCommands {
    /// List triggers
    #[command(visible_alias = "ls")]
    #[command(after_help = "Only one of --container-id, --namespace-id and --project-id is sent, in that order of preference.")]
    List {
        #[arg(long, short = 'r')]
        region: Option<Region>,

        #[arg(long)]
        container_id: Option<String>,

        #[arg(long)]
        namespace_id: Option<String>,

        #[arg(long)]
        project_id: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one trigger
    Get {
        /// Trigger ID
        id: String,

        #[arg(long, short = 'r')]
        region: Option<Region>,
    },

    /// Delete a trigger
    #[command(visible_alias = "rm")]
    Delete {
        /// Trigger ID
        id: String,

        #[arg(long, short = 'r')]
        region: Option<Region>,
    },
}
