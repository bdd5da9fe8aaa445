//! Integration tests for the instance API against the mock server
//!
//! The security group rule cases mirror what the API does on a real account:
//! the client reads the rule, merges the requested changes and PUTs the full
//! rule back.

use scwctl_core::api::instance::{
    InstanceApi, ListServersRequest, SecurityGroupPolicy, SecurityGroupRuleAction,
    SecurityGroupRuleDirection, SecurityGroupRuleProtocol, SecurityGroupState, ServerAction,
    UpdateSecurityGroupRequest, UpdateSecurityGroupRuleRequest, WaitForSecurityGroupRequest,
};
use scwctl_core::testing::{
    MockScwServer, RuleFixture, SecurityGroupFixture, ServerFixture, TaskFixture,
};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

const SG: &str = "sg-1";
const RULE: &str = "rule-1";
const RULE_PATH: &str = "/instance/v1/zones/fr-par-1/security_groups/sg-1/rules/rule-1";

/// The rule every update case starts from: TCP 1-1024 inbound from 8.8.8.8
fn bootstrap_rule() -> Value {
    RuleFixture::new(RULE)
        .protocol("TCP")
        .ip_range("8.8.8.8/32")
        .dest_port_from(1)
        .dest_port_to(1024)
        .build()
}

/// Expect a PUT of exactly `expected` and echo it back
async fn expect_rule_put(server: &MockScwServer, expected: Value) {
    Mock::given(method("PUT"))
        .and(path(RULE_PATH))
        .and(body_json(expected.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "rule": expected })))
        .expect(1)
        .mount(server.inner())
        .await;
}

fn full_rule(
    protocol: &str,
    direction: &str,
    action: &str,
    ip_range: &str,
    from: Option<u32>,
    to: Option<u32>,
) -> Value {
    json!({
        "id": RULE,
        "protocol": protocol,
        "direction": direction,
        "action": action,
        "ip_range": ip_range,
        "dest_port_from": from,
        "dest_port_to": to,
        "position": 1,
        "editable": true,
        "zone": "fr-par-1",
    })
}

#[tokio::test]
async fn test_update_rule_simple() {
    let server = MockScwServer::start().await;
    server.mock_rule_get("fr-par-1", SG, bootstrap_rule()).await;
    expect_rule_put(
        &server,
        full_rule("UDP", "outbound", "drop", "1.1.1.1/32", Some(1), Some(2048)),
    )
    .await;

    let api = InstanceApi::new(server.client());
    let rule = api
        .update_security_group_rule(&UpdateSecurityGroupRuleRequest {
            security_group_id: SG.to_string(),
            security_group_rule_id: RULE.to_string(),
            action: Some(SecurityGroupRuleAction::Drop),
            ip_range: Some("1.1.1.1/32".parse().unwrap()),
            dest_port_from: Some(1),
            dest_port_to: Some(2048),
            protocol: Some(SecurityGroupRuleProtocol::Udp),
            direction: Some(SecurityGroupRuleDirection::Outbound),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(rule.action, SecurityGroupRuleAction::Drop);
    assert_eq!(rule.ip_range.to_string(), "1.1.1.1/32");
    assert_eq!(rule.dest_port_from, Some(1));
    assert_eq!(rule.dest_port_to, Some(2048));
    assert_eq!(rule.protocol, SecurityGroupRuleProtocol::Udp);
    assert_eq!(rule.direction, SecurityGroupRuleDirection::Outbound);
}

#[tokio::test]
async fn test_update_rule_port_range_to_single_port() {
    let server = MockScwServer::start().await;
    server.mock_rule_get("fr-par-1", SG, bootstrap_rule()).await;
    expect_rule_put(
        &server,
        full_rule("UDP", "outbound", "drop", "1.1.1.1/32", Some(22), None),
    )
    .await;

    let api = InstanceApi::new(server.client());
    let rule = api
        .update_security_group_rule(&UpdateSecurityGroupRuleRequest {
            security_group_id: SG.to_string(),
            security_group_rule_id: RULE.to_string(),
            action: Some(SecurityGroupRuleAction::Drop),
            ip_range: Some("1.1.1.1/32".parse().unwrap()),
            dest_port_from: Some(22),
            dest_port_to: Some(22),
            protocol: Some(SecurityGroupRuleProtocol::Udp),
            direction: Some(SecurityGroupRuleDirection::Outbound),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(rule.dest_port_from, Some(22));
    assert_eq!(rule.dest_port_to, None);
}

#[tokio::test]
async fn test_update_rule_switching_to_icmp() {
    let server = MockScwServer::start().await;
    server.mock_rule_get("fr-par-1", SG, bootstrap_rule()).await;
    expect_rule_put(
        &server,
        full_rule("ICMP", "inbound", "accept", "8.8.8.8/32", None, None),
    )
    .await;

    let api = InstanceApi::new(server.client());
    let rule = api
        .update_security_group_rule(&UpdateSecurityGroupRuleRequest {
            security_group_id: SG.to_string(),
            security_group_rule_id: RULE.to_string(),
            protocol: Some(SecurityGroupRuleProtocol::Icmp),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(rule.action, SecurityGroupRuleAction::Accept);
    assert_eq!(rule.ip_range.to_string(), "8.8.8.8/32");
    assert_eq!(rule.dest_port_from, None);
    assert_eq!(rule.dest_port_to, None);
    assert_eq!(rule.protocol, SecurityGroupRuleProtocol::Icmp);
    assert_eq!(rule.direction, SecurityGroupRuleDirection::Inbound);
}

#[tokio::test]
async fn test_update_rule_remove_ports() {
    let server = MockScwServer::start().await;
    server.mock_rule_get("fr-par-1", SG, bootstrap_rule()).await;
    expect_rule_put(
        &server,
        full_rule("TCP", "inbound", "accept", "8.8.8.8/32", None, None),
    )
    .await;

    let api = InstanceApi::new(server.client());
    let rule = api
        .update_security_group_rule(&UpdateSecurityGroupRuleRequest {
            security_group_id: SG.to_string(),
            security_group_rule_id: RULE.to_string(),
            dest_port_from: Some(0),
            dest_port_to: Some(0),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(rule.dest_port_from, None);
    assert_eq!(rule.dest_port_to, None);
    assert_eq!(rule.protocol, SecurityGroupRuleProtocol::Tcp);
}

#[tokio::test]
async fn test_update_rule_read_failure_is_reported() {
    let server = MockScwServer::start().await;
    server.mock_error("GET", RULE_PATH, 404, "resource is not found").await;

    let api = InstanceApi::new(server.client());
    let err = api
        .update_security_group_rule(&UpdateSecurityGroupRuleRequest {
            security_group_id: SG.to_string(),
            security_group_rule_id: RULE.to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().starts_with("failed to read the rule to update"));
}

#[tokio::test]
async fn test_update_security_group_merges_fields() {
    let server = MockScwServer::start().await;
    server
        .mock_security_group_get(
            "fr-par-1",
            SG,
            SecurityGroupFixture::new(SG, "name")
                .description("description")
                .inbound_default_policy("accept")
                .outbound_default_policy("drop")
                .build(),
        )
        .await;

    let updated = SecurityGroupFixture::new(SG, "new_name")
        .description("new_description")
        .stateful(false)
        .inbound_default_policy("drop")
        .outbound_default_policy("accept")
        .build();
    Mock::given(method("PUT"))
        .and(path("/instance/v1/zones/fr-par-1/security_groups/sg-1"))
        .and(body_partial_json(json!({
            "name": "new_name",
            "description": "new_description",
            "stateful": false,
            "inbound_default_policy": "drop",
            "outbound_default_policy": "accept",
            "project_default": false,
            "enable_default_security": true,
            "tags": ["foo", "bar"],
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "security_group": updated })),
        )
        .expect(1)
        .mount(server.inner())
        .await;

    let api = InstanceApi::new(server.client());
    let sg = api
        .update_security_group(&UpdateSecurityGroupRequest {
            security_group_id: SG.to_string(),
            name: Some("new_name".to_string()),
            description: Some("new_description".to_string()),
            stateful: Some(false),
            inbound_default_policy: Some(SecurityGroupPolicy::Drop),
            outbound_default_policy: Some(SecurityGroupPolicy::Accept),
            project_default: Some(false),
            tags: Some(vec!["foo".to_string(), "bar".to_string()]),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(sg.name, "new_name");
    assert!(!sg.stateful);
    assert_eq!(sg.inbound_default_policy, SecurityGroupPolicy::Drop);
}

#[tokio::test]
async fn test_wait_for_security_group_syncing_then_available() {
    let server = MockScwServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instance/v1/zones/fr-par-1/security_groups/sg-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "security_group": SecurityGroupFixture::new(SG, "name").state("syncing").build()
        })))
        .up_to_n_times(3)
        .with_priority(1)
        .mount(server.inner())
        .await;
    server
        .mock_security_group_get("fr-par-1", SG, SecurityGroupFixture::new(SG, "name").build())
        .await;

    let api = InstanceApi::new(server.client());
    let sg = api
        .wait_for_security_group(
            &WaitForSecurityGroupRequest {
                security_group_id: SG.to_string(),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(sg.state, SecurityGroupState::Available);
}

#[tokio::test]
async fn test_wait_for_security_group_unknown_state() {
    let server = MockScwServer::start().await;
    server
        .mock_security_group_get(
            "fr-par-1",
            SG,
            SecurityGroupFixture::new(SG, "name").state("melting").build(),
        )
        .await;

    let api = InstanceApi::new(server.client());
    let err = api
        .wait_for_security_group(
            &WaitForSecurityGroupRequest {
                security_group_id: SG.to_string(),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "unknown state for security group sg-1: unknown");
}

#[tokio::test]
async fn test_list_servers_reads_total_from_header() {
    let server = MockScwServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instance/v1/zones/fr-par-1/servers"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Total-Count", "2")
                .set_body_json(json!({ "servers": [ServerFixture::new("srv-1", "a").build()] })),
        )
        .mount(server.inner())
        .await;
    Mock::given(method("GET"))
        .and(path("/instance/v1/zones/fr-par-1/servers"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Total-Count", "2")
                .set_body_json(json!({ "servers": [ServerFixture::new("srv-2", "b").build()] })),
        )
        .mount(server.inner())
        .await;

    let api = InstanceApi::new(server.client());
    let all = api
        .list_all_servers(&ListServersRequest::default())
        .await
        .unwrap();
    assert_eq!(all.total_count, 2);
    assert_eq!(all.servers.len(), 2);
}

#[tokio::test]
async fn test_server_action_posts_action() {
    let server = MockScwServer::start().await;
    Mock::given(method("POST"))
        .and(path("/instance/v1/zones/fr-par-1/servers/srv-1/action"))
        .and(body_json(json!({ "action": "poweroff" })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "task": TaskFixture::new("task-1", "server_poweroff").build()
        })))
        .expect(1)
        .mount(server.inner())
        .await;

    let api = InstanceApi::new(server.client());
    let task = api
        .server_action(None, "srv-1", ServerAction::Poweroff)
        .await
        .unwrap();
    assert_eq!(task.id, "task-1");

    let err = api
        .server_action(None, "srv-1", ServerAction::default())
        .await
        .unwrap_err();
    assert!(err.is_bad_request());
}
