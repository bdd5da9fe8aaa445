//! Instance request and response types

use chrono::{DateTime, Utc};
use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use crate::locality::Zone;
use crate::pagination::impl_paginated;
use crate::wait::WaitOptions;

api_enum! {
    pub enum SecurityGroupState {
        Available => "available",
        Syncing => "syncing",
        SyncingError => "syncing_error",
    }
}

api_enum! {
    pub enum SecurityGroupPolicy {
        Accept => "accept",
        Drop => "drop",
    }
}

api_enum! {
    pub enum SecurityGroupRuleProtocol {
        Tcp => "TCP",
        Udp => "UDP",
        Icmp => "ICMP",
        Any => "ANY",
    }
}

api_enum! {
    pub enum SecurityGroupRuleDirection {
        Inbound => "inbound",
        Outbound => "outbound",
    }
}

api_enum! {
    pub enum SecurityGroupRuleAction {
        Accept => "accept",
        Drop => "drop",
    }
}

api_enum! {
    pub enum ServerState {
        Running => "running",
        Stopped => "stopped",
        StoppedInPlace => "stopped in place",
        Starting => "starting",
        Stopping => "stopping",
        Locked => "locked",
    }
}

api_enum! {
    pub enum ServerAction {
        Poweron => "poweron",
        Backup => "backup",
        StopInPlace => "stop_in_place",
        Poweroff => "poweroff",
        Terminate => "terminate",
        Reboot => "reboot",
        EnableRoutedIp => "enable_routed_ip",
    }
}

api_enum! {
    pub enum TaskStatus {
        Pending => "pending",
        Started => "started",
        Success => "success",
        Failure => "failure",
        Retry => "retry",
    }
}

/// A server or security group as referenced from another resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub enable_default_security: bool,
    #[serde(default)]
    pub inbound_default_policy: SecurityGroupPolicy,
    #[serde(default)]
    pub outbound_default_policy: SecurityGroupPolicy,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub organization_default: Option<bool>,
    #[serde(default)]
    pub project_default: bool,
    #[serde(default)]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modification_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub servers: Vec<ResourceSummary>,
    #[serde(default)]
    pub stateful: bool,
    #[serde(default)]
    pub state: SecurityGroupState,
    pub zone: Zone,
}

impl SecurityGroup {
    /// Whether this is a project or organization default group, which the
    /// API refuses to delete
    pub fn is_default(&self) -> bool {
        self.project_default || self.organization_default == Some(true)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityGroupRule {
    pub id: String,
    pub protocol: SecurityGroupRuleProtocol,
    pub direction: SecurityGroupRuleDirection,
    pub action: SecurityGroupRuleAction,
    pub ip_range: IpNet,
    #[serde(default)]
    pub dest_port_from: Option<u32>,
    #[serde(default)]
    pub dest_port_to: Option<u32>,
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub editable: bool,
    pub zone: Zone,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerIp {
    pub id: String,
    pub address: String,
    #[serde(default)]
    pub family: String,
    #[serde(default, rename = "dynamic")]
    pub is_dynamic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub allowed_actions: Vec<ServerAction>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub commercial_type: String,
    #[serde(default)]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modification_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub public_ips: Vec<ServerIp>,
    #[serde(default)]
    pub private_ip: Option<String>,
    #[serde(default)]
    pub state: ServerState,
    #[serde(default)]
    pub state_detail: String,
    #[serde(default)]
    pub security_group: Option<ResourceSummary>,
    #[serde(default)]
    pub protected: bool,
    pub zone: Zone,
}

/// Asynchronous job started by a server action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub terminated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub href_from: String,
    #[serde(default)]
    pub href_result: String,
    #[serde(default)]
    pub zone: Option<Zone>,
}

// Single-resource envelopes

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SecurityGroupEnvelope {
    pub security_group: SecurityGroup,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RuleEnvelope {
    pub rule: SecurityGroupRule,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ServerEnvelope {
    pub server: Server,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TaskEnvelope {
    pub task: Task,
}

// List responses; `total_count` comes from the `X-Total-Count` header

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListSecurityGroupsResponse {
    #[serde(default)]
    pub security_groups: Vec<SecurityGroup>,
    #[serde(default)]
    pub total_count: u64,
}

impl_paginated!(ListSecurityGroupsResponse, security_groups);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListSecurityGroupRulesResponse {
    #[serde(default)]
    pub rules: Vec<SecurityGroupRule>,
    #[serde(default)]
    pub total_count: u64,
}

impl_paginated!(ListSecurityGroupRulesResponse, rules);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListServersResponse {
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub total_count: u64,
}

impl_paginated!(ListServersResponse, servers);

#[derive(Debug, Clone, Default)]
pub struct ListSecurityGroupsRequest {
    pub zone: Option<Zone>,
    pub name: Option<String>,
    pub organization: Option<String>,
    pub project: Option<String>,
    pub tags: Vec<String>,
    pub project_default: Option<bool>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ListServersRequest {
    pub zone: Option<Zone>,
    pub name: Option<String>,
    pub organization: Option<String>,
    pub project: Option<String>,
    pub state: Option<ServerState>,
    pub commercial_type: Option<String>,
    pub tags: Vec<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateSecurityGroupRequest {
    #[serde(skip)]
    pub zone: Option<Zone>,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Falls back to the client's default project
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_default: Option<bool>,
    pub stateful: bool,
    pub inbound_default_policy: SecurityGroupPolicy,
    pub outbound_default_policy: SecurityGroupPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_default_security: Option<bool>,
}

impl Default for CreateSecurityGroupRequest {
    fn default() -> Self {
        Self {
            zone: None,
            name: String::new(),
            description: String::new(),
            project: None,
            tags: Vec::new(),
            project_default: None,
            stateful: true,
            inbound_default_policy: SecurityGroupPolicy::Drop,
            outbound_default_policy: SecurityGroupPolicy::Accept,
            enable_default_security: None,
        }
    }
}

/// Partial update of a security group; unset fields keep their value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSecurityGroupRequest {
    pub zone: Option<Zone>,
    pub security_group_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub enable_default_security: Option<bool>,
    pub inbound_default_policy: Option<SecurityGroupPolicy>,
    pub outbound_default_policy: Option<SecurityGroupPolicy>,
    pub tags: Option<Vec<String>>,
    pub organization_default: Option<bool>,
    pub project_default: Option<bool>,
    pub stateful: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateSecurityGroupRuleRequest {
    #[serde(skip)]
    pub zone: Option<Zone>,
    #[serde(skip)]
    pub security_group_id: String,
    pub protocol: SecurityGroupRuleProtocol,
    pub direction: SecurityGroupRuleDirection,
    pub action: SecurityGroupRuleAction,
    pub ip_range: IpNet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_port_from: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_port_to: Option<u32>,
    pub position: u32,
    pub editable: bool,
}

/// Partial update of a security group rule
///
/// A port set to `Some(0)` removes that bound from the rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSecurityGroupRuleRequest {
    pub zone: Option<Zone>,
    pub security_group_id: String,
    pub security_group_rule_id: String,
    pub protocol: Option<SecurityGroupRuleProtocol>,
    pub direction: Option<SecurityGroupRuleDirection>,
    pub action: Option<SecurityGroupRuleAction>,
    pub ip_range: Option<IpNet>,
    pub dest_port_from: Option<u32>,
    pub dest_port_to: Option<u32>,
    pub position: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct WaitForSecurityGroupRequest {
    pub zone: Option<Zone>,
    pub security_group_id: String,
    pub options: Option<WaitOptions>,
}

#[derive(Debug, Clone, Default)]
pub struct WaitForServerRequest {
    pub zone: Option<Zone>,
    pub server_id: String,
    pub options: Option<WaitOptions>,
}
