//! Block storage command definitions

use clap::Subcommand;
use scwctl_core::Zone;
use scwctl_core::api::block::{SnapshotStatus, VolumeStatus};

use super::{PageArgs, WaitArgs};

#[derive(Subcommand, Debug)]
pub enum BlockCommands {
    /// Block volumes
    #[command(subcommand, visible_alias = "vol")]
    Volume(VolumeCommands),

    /// Block snapshots
    #[command(subcommand, visible_alias = "snap")]
    Snapshot(SnapshotCommands),
}

#[derive(Subcommand, Debug)]
pub enum VolumeCommands {
    /// List volumes
    #[command(visible_alias = "ls")]
    List {
        /// Zone to list (defaults to the profile's zone)
        #[arg(long, short = 'z')]
        zone: Option<Zone>,

        /// Only volumes whose name contains this string
        #[arg(long)]
        name: Option<String>,

        /// Only volumes in this project
        #[arg(long)]
        project_id: Option<String>,

        /// Only volumes carrying all of these tags
        #[arg(long = "tag")]
        tags: Vec<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one volume
    Get {
        /// Volume ID
        id: String,

        #[arg(long, short = 'z')]
        zone: Option<Zone>,
    },

    /// Delete a volume
    #[command(visible_alias = "rm")]
    Delete {
        /// Volume ID
        id: String,

        #[arg(long, short = 'z')]
        zone: Option<Zone>,
    },

    /// Wait until a volume settles
    #[command(after_help = "Without --status the volume is waited on until it is available or in use.")]
    Wait {
        /// Volume ID
        id: String,

        #[arg(long, short = 'z')]
        zone: Option<Zone>,

        /// Status to wait for
        #[arg(long)]
        status: Option<VolumeStatus>,

        #[command(flatten)]
        wait: WaitArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum SnapshotCommands {
    /// List snapshots
    #[command(visible_alias = "ls")]
    List {
        #[arg(long, short = 'z')]
        zone: Option<Zone>,

        /// Only snapshots whose name contains this string
        #[arg(long)]
        name: Option<String>,

        /// Only snapshots of this volume
        #[arg(long)]
        volume_id: Option<String>,

        /// Only snapshots in this project
        #[arg(long)]
        project_id: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one snapshot
    Get {
        /// Snapshot ID
        id: String,

        #[arg(long, short = 'z')]
        zone: Option<Zone>,
    },

    /// Delete a snapshot
    #[command(visible_alias = "rm")]
    Delete {
        /// Snapshot ID
        id: String,

        #[arg(long, short = 'z')]
        zone: Option<Zone>,
    },

    /// Wait until a snapshot settles
    Wait {
        /// Snapshot ID
        id: String,

        #[arg(long, short = 'z')]
        zone: Option<Zone>,

        /// Status to wait for
        #[arg(long)]
        status: Option<SnapshotStatus>,

        #[command(flatten)]
        wait: WaitArgs,
    },
}
