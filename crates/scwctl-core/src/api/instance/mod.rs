//! Instance API (`/instance/v1`)
//!
//! Servers and security groups. Unlike the newer APIs, instance list
//! endpoints page with `page`/`per_page`, report their totals in the
//! `X-Total-Count` header and wrap single resources in an envelope
//! (`{"server": {...}}`).
//!
//! Security groups and their rules have no PATCH endpoint: updates are a
//! read-merge-write against the full-replacement PUT.

mod types;
pub mod sweepers;

pub use types::*;

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::client::{Query, ScwClient};
use crate::error::{Result, ResultExt, ScwError};
use crate::locality::Zone;
use crate::pagination::{Paginated, fetch_all_pages};
use crate::progress::ProgressCallback;
use crate::wait::{Observation, PollState, poll_until};

const BASE_PATH: &str = "/instance/v1/zones";

/// Client for the instance API
#[derive(Debug, Clone)]
pub struct InstanceApi {
    client: ScwClient,
}

/// A list response whose total is carried by a header
trait HeaderCounted: DeserializeOwned + Paginated {
    fn set_total_count(&mut self, total: u64);
}

macro_rules! impl_header_counted {
    ($($ty:ty),+) => {
        $(impl HeaderCounted for $ty {
            fn set_total_count(&mut self, total: u64) {
                self.total_count = total;
            }
        })+
    };
}

impl_header_counted!(
    ListSecurityGroupsResponse,
    ListSecurityGroupRulesResponse,
    ListServersResponse
);

impl InstanceApi {
    pub fn new(client: ScwClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ScwClient {
        &self.client
    }

    fn path(&self, zone: Option<&Zone>, suffix: &str) -> Result<String> {
        let zone = self.client.zone_or_default(zone)?;
        Ok(format!("{BASE_PATH}/{zone}/{suffix}"))
    }

    fn per_page(&self, requested: Option<u32>) -> Option<u32> {
        requested.or(self.client.default_page_size())
    }

    async fn get_list<R: HeaderCounted>(&self, path: &str, query: &Query) -> Result<R> {
        let response = self.client.get_raw(path, query).await?;
        let mut list: R = response.json()?;
        // Without the header, assume the page is everything there is
        let total = response
            .total_count_header()
            .unwrap_or(list.len() as u64);
        list.set_total_count(total);
        Ok(list)
    }

    // Security groups

    pub async fn list_security_groups(
        &self,
        req: &ListSecurityGroupsRequest,
    ) -> Result<ListSecurityGroupsResponse> {
        let path = self.path(req.zone.as_ref(), "security_groups")?;
        let tags = (!req.tags.is_empty()).then(|| req.tags.join(","));
        let query = Query::new()
            .push_opt("name", req.name.as_deref())
            .push_opt("organization", req.organization.as_deref())
            .push_opt("project", req.project.as_deref())
            .push_opt("tags", tags)
            .push_opt("project_default", req.project_default)
            .push_opt("per_page", self.per_page(req.per_page))
            .push_opt("page", req.page);
        self.get_list(&path, &query).await
    }

    pub async fn list_all_security_groups(
        &self,
        req: &ListSecurityGroupsRequest,
    ) -> Result<ListSecurityGroupsResponse> {
        fetch_all_pages(|page| {
            let req = ListSecurityGroupsRequest {
                page: Some(page),
                ..req.clone()
            };
            async move { self.list_security_groups(&req).await }
        })
        .await
    }

    pub async fn get_security_group(
        &self,
        zone: Option<&Zone>,
        security_group_id: &str,
    ) -> Result<SecurityGroup> {
        let path = self.path(zone, &format!("security_groups/{security_group_id}"))?;
        let envelope: SecurityGroupEnvelope = self.client.get(&path, &Query::new()).await?;
        Ok(envelope.security_group)
    }

    pub async fn create_security_group(
        &self,
        req: &CreateSecurityGroupRequest,
    ) -> Result<SecurityGroup> {
        let path = self.path(req.zone.as_ref(), "security_groups")?;
        let mut body = req.clone();
        body.project = self.client.project_or_default(req.project.as_deref());
        let envelope: SecurityGroupEnvelope = self.client.post(&path, &body).await?;
        info!(id = %envelope.security_group.id, "created security group");
        Ok(envelope.security_group)
    }

    /// Update the fields set in `req`, keeping everything else as is
    pub async fn update_security_group(
        &self,
        req: &UpdateSecurityGroupRequest,
    ) -> Result<SecurityGroup> {
        let zone = self.client.zone_or_default(req.zone.as_ref())?;
        let current = self
            .get_security_group(Some(&zone), &req.security_group_id)
            .await
            .context("failed to read the security group to update")?;

        let merged = merge_security_group(current, req);
        let path = self.path(
            Some(&zone),
            &format!("security_groups/{}", req.security_group_id),
        )?;
        let envelope: SecurityGroupEnvelope = self.client.put(&path, &merged).await?;
        debug!(id = %req.security_group_id, "updated security group");
        Ok(envelope.security_group)
    }

    pub async fn delete_security_group(
        &self,
        zone: Option<&Zone>,
        security_group_id: &str,
    ) -> Result<()> {
        let path = self.path(zone, &format!("security_groups/{security_group_id}"))?;
        self.client.delete(&path).await?;
        debug!(id = security_group_id, "deleted security group");
        Ok(())
    }

    // Rules

    pub async fn list_security_group_rules(
        &self,
        zone: Option<&Zone>,
        security_group_id: &str,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<ListSecurityGroupRulesResponse> {
        let path = self.path(zone, &format!("security_groups/{security_group_id}/rules"))?;
        let query = Query::new()
            .push_opt("per_page", self.per_page(per_page))
            .push_opt("page", page);
        self.get_list(&path, &query).await
    }

    pub async fn list_all_security_group_rules(
        &self,
        zone: Option<&Zone>,
        security_group_id: &str,
    ) -> Result<ListSecurityGroupRulesResponse> {
        fetch_all_pages(|page| {
            self.list_security_group_rules(zone, security_group_id, Some(page), None)
        })
        .await
    }

    pub async fn get_security_group_rule(
        &self,
        zone: Option<&Zone>,
        security_group_id: &str,
        rule_id: &str,
    ) -> Result<SecurityGroupRule> {
        let path = self.path(
            zone,
            &format!("security_groups/{security_group_id}/rules/{rule_id}"),
        )?;
        let envelope: RuleEnvelope = self.client.get(&path, &Query::new()).await?;
        Ok(envelope.rule)
    }

    pub async fn create_security_group_rule(
        &self,
        req: &CreateSecurityGroupRuleRequest,
    ) -> Result<SecurityGroupRule> {
        let path = self.path(
            req.zone.as_ref(),
            &format!("security_groups/{}/rules", req.security_group_id),
        )?;
        let envelope: RuleEnvelope = self.client.post(&path, req).await?;
        info!(id = %envelope.rule.id, security_group = %req.security_group_id, "created rule");
        Ok(envelope.rule)
    }

    /// Update the fields set in `req`, keeping everything else as is
    ///
    /// Port handling follows what the API expects of a full rule: a port of
    /// `0` clears that bound, equal bounds collapse to a single port and an
    /// ICMP rule carries no ports at all.
    pub async fn update_security_group_rule(
        &self,
        req: &UpdateSecurityGroupRuleRequest,
    ) -> Result<SecurityGroupRule> {
        let zone = self.client.zone_or_default(req.zone.as_ref())?;
        let current = self
            .get_security_group_rule(
                Some(&zone),
                &req.security_group_id,
                &req.security_group_rule_id,
            )
            .await
            .context("failed to read the rule to update")?;

        let merged = merge_security_group_rule(current, req);
        let path = self.path(
            Some(&zone),
            &format!(
                "security_groups/{}/rules/{}",
                req.security_group_id, req.security_group_rule_id
            ),
        )?;
        let envelope: RuleEnvelope = self.client.put(&path, &merged).await?;
        debug!(id = %req.security_group_rule_id, "updated rule");
        Ok(envelope.rule)
    }

    pub async fn delete_security_group_rule(
        &self,
        zone: Option<&Zone>,
        security_group_id: &str,
        rule_id: &str,
    ) -> Result<()> {
        let path = self.path(
            zone,
            &format!("security_groups/{security_group_id}/rules/{rule_id}"),
        )?;
        self.client.delete(&path).await
    }

    // Servers

    pub async fn list_servers(&self, req: &ListServersRequest) -> Result<ListServersResponse> {
        let path = self.path(req.zone.as_ref(), "servers")?;
        let tags = (!req.tags.is_empty()).then(|| req.tags.join(","));
        let query = Query::new()
            .push_opt("name", req.name.as_deref())
            .push_opt("organization", req.organization.as_deref())
            .push_opt("project", req.project.as_deref())
            .push_opt("state", req.state.as_ref())
            .push_opt("commercial_type", req.commercial_type.as_deref())
            .push_opt("tags", tags)
            .push_opt("per_page", self.per_page(req.per_page))
            .push_opt("page", req.page);
        self.get_list(&path, &query).await
    }

    pub async fn list_all_servers(&self, req: &ListServersRequest) -> Result<ListServersResponse> {
        fetch_all_pages(|page| {
            let req = ListServersRequest {
                page: Some(page),
                ..req.clone()
            };
            async move { self.list_servers(&req).await }
        })
        .await
    }

    pub async fn get_server(&self, zone: Option<&Zone>, server_id: &str) -> Result<Server> {
        let path = self.path(zone, &format!("servers/{server_id}"))?;
        let envelope: ServerEnvelope = self.client.get(&path, &Query::new()).await?;
        Ok(envelope.server)
    }

    /// Delete a stopped server, leaving its volumes behind
    pub async fn delete_server(&self, zone: Option<&Zone>, server_id: &str) -> Result<()> {
        let path = self.path(zone, &format!("servers/{server_id}"))?;
        self.client.delete(&path).await?;
        debug!(id = server_id, "deleted server");
        Ok(())
    }

    /// Start an action on a server and return the task tracking it
    pub async fn server_action(
        &self,
        zone: Option<&Zone>,
        server_id: &str,
        action: ServerAction,
    ) -> Result<Task> {
        if action.is_unknown() {
            return Err(ScwError::InvalidArgument(
                "a server action is required".to_string(),
            ));
        }
        let path = self.path(zone, &format!("servers/{server_id}/action"))?;
        let body = serde_json::json!({ "action": action });
        let envelope: TaskEnvelope = self.client.post(&path, &body).await?;
        info!(id = server_id, %action, task = %envelope.task.id, "server action started");
        Ok(envelope.task)
    }

    // Waiters

    /// Poll a security group until it is `available` or `syncing_error`
    ///
    /// Any state other than those two and `syncing` fails with
    /// [`ScwError::UnknownState`].
    pub async fn wait_for_security_group(
        &self,
        req: &WaitForSecurityGroupRequest,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<SecurityGroup> {
        let zone = self.client.zone_or_default(req.zone.as_ref())?;
        let options = req.options.unwrap_or_else(|| self.client.wait_options());
        poll_until(
            "security group",
            &req.security_group_id,
            &options,
            on_progress,
            || self.get_security_group(Some(&zone), &req.security_group_id),
            |sg: &SecurityGroup| {
                Observation::new(security_group_poll_state(&sg.state), sg.state.as_str())
            },
        )
        .await
    }

    /// Poll a server until it leaves the `starting` / `stopping` states
    pub async fn wait_for_server(
        &self,
        req: &WaitForServerRequest,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Server> {
        let zone = self.client.zone_or_default(req.zone.as_ref())?;
        let options = req.options.unwrap_or_else(|| self.client.wait_options());
        poll_until(
            "server",
            &req.server_id,
            &options,
            on_progress,
            || self.get_server(Some(&zone), &req.server_id),
            |server: &Server| {
                Observation::new(server_poll_state(&server.state), server.state.as_str())
            },
        )
        .await
    }
}

fn security_group_poll_state(state: &SecurityGroupState) -> PollState {
    match state {
        SecurityGroupState::Available | SecurityGroupState::SyncingError => PollState::Terminal,
        SecurityGroupState::Syncing => PollState::Pending,
        SecurityGroupState::Unknown(_) => PollState::Unknown,
    }
}

fn server_poll_state(state: &ServerState) -> PollState {
    match state {
        ServerState::Running
        | ServerState::Stopped
        | ServerState::StoppedInPlace
        | ServerState::Locked => PollState::Terminal,
        ServerState::Starting | ServerState::Stopping | ServerState::Unknown(_) => {
            PollState::Pending
        }
    }
}

fn merge_security_group(mut sg: SecurityGroup, req: &UpdateSecurityGroupRequest) -> SecurityGroup {
    if let Some(ref name) = req.name {
        sg.name = name.clone();
    }
    if let Some(ref description) = req.description {
        sg.description = description.clone();
    }
    if let Some(enable) = req.enable_default_security {
        sg.enable_default_security = enable;
    }
    if let Some(ref policy) = req.inbound_default_policy {
        sg.inbound_default_policy = policy.clone();
    }
    if let Some(ref policy) = req.outbound_default_policy {
        sg.outbound_default_policy = policy.clone();
    }
    if let Some(ref tags) = req.tags {
        sg.tags = tags.clone();
    }
    if let Some(default) = req.organization_default {
        sg.organization_default = Some(default);
    }
    if let Some(default) = req.project_default {
        sg.project_default = default;
    }
    if let Some(stateful) = req.stateful {
        sg.stateful = stateful;
    }
    sg
}

fn merge_security_group_rule(
    mut rule: SecurityGroupRule,
    req: &UpdateSecurityGroupRuleRequest,
) -> SecurityGroupRule {
    if let Some(ref protocol) = req.protocol {
        rule.protocol = protocol.clone();
    }
    if let Some(ref direction) = req.direction {
        rule.direction = direction.clone();
    }
    if let Some(ref action) = req.action {
        rule.action = action.clone();
    }
    if let Some(ip_range) = req.ip_range {
        rule.ip_range = ip_range;
    }
    if let Some(position) = req.position {
        rule.position = position;
    }
    if let Some(port) = req.dest_port_from {
        rule.dest_port_from = (port > 0).then_some(port);
    }
    if let Some(port) = req.dest_port_to {
        rule.dest_port_to = (port > 0).then_some(port);
    }
    if rule.dest_port_from.is_some() && rule.dest_port_from == rule.dest_port_to {
        rule.dest_port_to = None;
    }
    if req.protocol == Some(SecurityGroupRuleProtocol::Icmp) {
        rule.dest_port_from = None;
        rule.dest_port_to = None;
    }
    rule
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rule() -> SecurityGroupRule {
        SecurityGroupRule {
            id: "r1".to_string(),
            protocol: SecurityGroupRuleProtocol::Tcp,
            direction: SecurityGroupRuleDirection::Inbound,
            action: SecurityGroupRuleAction::Accept,
            ip_range: "8.8.8.8/32".parse().unwrap(),
            dest_port_from: Some(1),
            dest_port_to: Some(1024),
            position: 1,
            editable: true,
            zone: "fr-par-1".parse().unwrap(),
        }
    }

    #[test]
    fn test_merge_rule_overlays_set_fields() {
        let req = UpdateSecurityGroupRuleRequest {
            action: Some(SecurityGroupRuleAction::Drop),
            ip_range: Some("1.1.1.1/32".parse().unwrap()),
            dest_port_from: Some(1),
            dest_port_to: Some(2048),
            protocol: Some(SecurityGroupRuleProtocol::Udp),
            direction: Some(SecurityGroupRuleDirection::Outbound),
            ..Default::default()
        };
        let merged = merge_security_group_rule(rule(), &req);
        assert_eq!(merged.action, SecurityGroupRuleAction::Drop);
        assert_eq!(merged.ip_range.to_string(), "1.1.1.1/32");
        assert_eq!(merged.dest_port_from, Some(1));
        assert_eq!(merged.dest_port_to, Some(2048));
        assert_eq!(merged.protocol, SecurityGroupRuleProtocol::Udp);
        assert_eq!(merged.direction, SecurityGroupRuleDirection::Outbound);
        assert_eq!(merged.position, 1);
    }

    #[test]
    fn test_merge_rule_collapses_equal_ports() {
        let req = UpdateSecurityGroupRuleRequest {
            dest_port_from: Some(22),
            dest_port_to: Some(22),
            ..Default::default()
        };
        let merged = merge_security_group_rule(rule(), &req);
        assert_eq!(merged.dest_port_from, Some(22));
        assert_eq!(merged.dest_port_to, None);
    }

    #[test]
    fn test_merge_rule_icmp_drops_ports() {
        let req = UpdateSecurityGroupRuleRequest {
            protocol: Some(SecurityGroupRuleProtocol::Icmp),
            ..Default::default()
        };
        let merged = merge_security_group_rule(rule(), &req);
        assert_eq!(merged.dest_port_from, None);
        assert_eq!(merged.dest_port_to, None);
        assert_eq!(merged.action, SecurityGroupRuleAction::Accept);
        assert_eq!(merged.ip_range.to_string(), "8.8.8.8/32");
        assert_eq!(merged.direction, SecurityGroupRuleDirection::Inbound);
    }

    #[test]
    fn test_merge_rule_zero_clears_ports() {
        let req = UpdateSecurityGroupRuleRequest {
            dest_port_from: Some(0),
            dest_port_to: Some(0),
            ..Default::default()
        };
        let merged = merge_security_group_rule(rule(), &req);
        assert_eq!(merged.dest_port_from, None);
        assert_eq!(merged.dest_port_to, None);
        assert_eq!(merged.protocol, SecurityGroupRuleProtocol::Tcp);
    }

    #[test]
    fn test_merge_rule_empty_request_is_identity() {
        let merged = merge_security_group_rule(rule(), &UpdateSecurityGroupRuleRequest::default());
        assert_eq!(merged, rule());
    }

    #[test]
    fn test_merge_group_keeps_unrecognised_policy() {
        let sg: SecurityGroup = serde_json::from_value(serde_json::json!({
            "id": "sg-1",
            "name": "web",
            "inbound_default_policy": "reject",
            "outbound_default_policy": "accept",
            "state": "available",
            "zone": "fr-par-1",
        }))
        .unwrap();
        let req = UpdateSecurityGroupRequest {
            name: Some("web-2".to_string()),
            ..Default::default()
        };
        let merged = merge_security_group(sg, &req);
        let body = serde_json::to_value(&merged).unwrap();
        assert_eq!(body["inbound_default_policy"], "reject");
        assert_eq!(body["name"], "web-2");
    }

    #[test]
    fn test_poll_states() {
        assert_eq!(
            security_group_poll_state(&SecurityGroupState::SyncingError),
            PollState::Terminal
        );
        assert_eq!(
            security_group_poll_state(&SecurityGroupState::Unknown("migrating".to_string())),
            PollState::Unknown
        );
        assert_eq!(server_poll_state(&ServerState::StoppedInPlace), PollState::Terminal);
        assert_eq!(server_poll_state(&ServerState::Stopping), PollState::Pending);
    }
}
