//! Instance command definitions

use clap::{Args, Subcommand};
use ipnet::IpNet;
use scwctl_core::Zone;
use scwctl_core::api::instance::{
    SecurityGroupPolicy, SecurityGroupRuleAction, SecurityGroupRuleDirection,
    SecurityGroupRuleProtocol, ServerAction, ServerState,
};

use super::{PageArgs, WaitArgs};

#[derive(Subcommand, Debug)]
pub enum InstanceCommands {
    /// Security groups
    #[command(subcommand, name = "security-group", visible_alias = "sg")]
    SecurityGroup(SecurityGroupCommands),

    /// Security group rules
    #[command(subcommand)]
    Rule(RuleCommands),

    /// Servers
    #[command(subcommand, visible_alias = "srv")]
    Server(ServerCommands),
}

#[derive(Subcommand, Debug)]
pub enum SecurityGroupCommands {
    /// List security groups
    #[command(visible_alias = "ls")]
    List {
        /// Zone to list (defaults to the profile's zone)
        #[arg(long, short = 'z')]
        zone: Option<Zone>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        project: Option<String>,

        /// Only groups carrying all of these tags
        #[arg(long = "tag")]
        tags: Vec<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one security group
    Get {
        /// Security group ID
        id: String,

        #[arg(long, short = 'z')]
        zone: Option<Zone>,
    },

    /// Create a security group
    Create {
        /// Name of the group
        name: String,

        #[arg(long, short = 'z')]
        zone: Option<Zone>,

        #[arg(long, default_value = "")]
        description: String,

        /// Project to create the group in (defaults to the profile's project)
        #[arg(long)]
        project: Option<String>,

        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Create a stateless group
        #[arg(long)]
        stateless: bool,

        #[arg(long, default_value = "drop")]
        inbound_default_policy: SecurityGroupPolicy,

        #[arg(long, default_value = "accept")]
        outbound_default_policy: SecurityGroupPolicy,
    },

    /// Update the given fields of a security group
    Update {
        /// Security group ID
        id: String,

        #[arg(long, short = 'z')]
        zone: Option<Zone>,

        #[command(flatten)]
        fields: SecurityGroupFields,
    },

    /// Delete a security group
    #[command(visible_alias = "rm")]
    Delete {
        /// Security group ID
        id: String,

        #[arg(long, short = 'z')]
        zone: Option<Zone>,
    },

    /// Wait until a security group is synced
    Wait {
        /// Security group ID
        id: String,

        #[arg(long, short = 'z')]
        zone: Option<Zone>,

        #[command(flatten)]
        wait: WaitArgs,
    },
}

/// Fields of a security group that `update` can change
#[derive(Args, Debug, Clone, Default)]
pub struct SecurityGroupFields {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub stateful: Option<bool>,

    #[arg(long)]
    pub inbound_default_policy: Option<SecurityGroupPolicy>,

    #[arg(long)]
    pub outbound_default_policy: Option<SecurityGroupPolicy>,

    #[arg(long)]
    pub enable_default_security: Option<bool>,

    #[arg(long)]
    pub project_default: Option<bool>,

    /// Replace the tags (repeat for several)
    #[arg(long = "tag")]
    pub tags: Option<Vec<String>>,
}

#[derive(Subcommand, Debug)]
pub enum RuleCommands {
    /// List the rules of a security group
    #[command(visible_alias = "ls")]
    List {
        /// Security group ID
        security_group_id: String,

        #[arg(long, short = 'z')]
        zone: Option<Zone>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Add a rule to a security group
    #[command(after_help = "EXAMPLES:
    # Allow SSH from anywhere
    scwctl instance rule create SG_ID --protocol TCP --ip-range 0.0.0.0/0 --dest-port-from 22

    # Drop outbound UDP to a range of ports
    scwctl instance rule create SG_ID --direction outbound --action drop --protocol UDP \\
        --ip-range 10.0.0.0/8 --dest-port-from 1000 --dest-port-to 2000
")]
    Create {
        /// Security group ID
        security_group_id: String,

        #[arg(long, short = 'z')]
        zone: Option<Zone>,

        #[arg(long, default_value = "TCP")]
        protocol: SecurityGroupRuleProtocol,

        #[arg(long, default_value = "inbound")]
        direction: SecurityGroupRuleDirection,

        #[arg(long, default_value = "accept")]
        action: SecurityGroupRuleAction,

        /// CIDR the rule applies to
        #[arg(long)]
        ip_range: IpNet,

        #[arg(long)]
        dest_port_from: Option<u32>,

        #[arg(long)]
        dest_port_to: Option<u32>,

        #[arg(long, default_value_t = 0)]
        position: u32,
    },

    /// Update the given fields of a rule
    #[command(after_help = "A port of 0 removes that bound. Equal bounds become a single port. Switching to ICMP drops both ports.")]
    Update {
        /// Security group ID
        security_group_id: String,

        /// Rule ID
        rule_id: String,

        #[arg(long, short = 'z')]
        zone: Option<Zone>,

        #[arg(long)]
        protocol: Option<SecurityGroupRuleProtocol>,

        #[arg(long)]
        direction: Option<SecurityGroupRuleDirection>,

        #[arg(long)]
        action: Option<SecurityGroupRuleAction>,

        #[arg(long)]
        ip_range: Option<IpNet>,

        #[arg(long)]
        dest_port_from: Option<u32>,

        #[arg(long)]
        dest_port_to: Option<u32>,

        #[arg(long)]
        position: Option<u32>,
    },

    /// Delete a rule
    #[command(visible_alias = "rm")]
    Delete {
        /// Security group ID
        security_group_id: String,

        /// Rule ID
        rule_id: String,

        #[arg(long, short = 'z')]
        zone: Option<Zone>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ServerCommands {
    /// List servers
    #[command(visible_alias = "ls")]
    List {
        #[arg(long, short = 'z')]
        zone: Option<Zone>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        project: Option<String>,

        #[arg(long)]
        state: Option<ServerState>,

        #[arg(long = "tag")]
        tags: Vec<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one server
    Get {
        /// Server ID
        id: String,

        #[arg(long, short = 'z')]
        zone: Option<Zone>,
    },

    /// Run an action (poweron, poweroff, reboot, terminate, ...) on a server
    Action {
        /// Server ID
        id: String,

        /// Action to run
        action: ServerAction,

        #[arg(long, short = 'z')]
        zone: Option<Zone>,

        /// Wait for the server to settle afterwards
        #[arg(long)]
        wait: bool,
    },

    /// Delete a stopped server
    #[command(visible_alias = "rm")]
    Delete {
        /// Server ID
        id: String,

        #[arg(long, short = 'z')]
        zone: Option<Zone>,
    },

    /// Wait until a server leaves the starting / stopping states
    Wait {
        /// Server ID
        id: String,

        #[arg(long, short = 'z')]
        zone: Option<Zone>,

        #[command(flatten)]
        wait: WaitArgs,
    },
}
