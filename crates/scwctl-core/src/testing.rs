//! Mock API server and fixtures for tests
//!
//! Enabled with the `testing` feature. [`MockScwServer`] wraps a
//! [`wiremock::MockServer`] and knows the URL layout of the block, container
//! and instance APIs; the fixtures build JSON bodies shaped like real API
//! responses.
//!
//! ```ignore
//! let server = MockScwServer::start().await;
//! server
//!     .mock_volumes_list("fr-par-1", vec![VolumeFixture::new("v1", "data").build()])
//!     .await;
//! let api = BlockApi::new(server.client());
//! ```

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::client::{ScwClient, ScwClientBuilder, TOTAL_COUNT_HEADER};
use crate::error::Result;
use crate::locality::{Region, Zone};
use crate::wait::WaitOptions;

/// Secret key accepted by the mock server
pub const TEST_SECRET_KEY: &str = "11111111-1111-1111-1111-111111111111";

/// Project used by fixtures and test clients
pub const TEST_PROJECT_ID: &str = "22222222-2222-2222-2222-222222222222";

/// A wiremock server speaking the Scaleway API URL layout
pub struct MockScwServer {
    server: MockServer,
}

impl MockScwServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// The underlying wiremock server, for custom mocks
    pub fn inner(&self) -> &MockServer {
        &self.server
    }

    /// A client pointed at this server, defaulting to `fr-par-1` / `fr-par`
    /// and polling every 10ms
    pub fn client(&self) -> ScwClient {
        self.client_builder()
            .and_then(|builder| builder.build())
            .unwrap_or_else(|e| panic!("mock client: {e}"))
    }

    /// Builder behind [`MockScwServer::client`], for tests that need to
    /// change a default
    pub fn client_builder(&self) -> Result<ScwClientBuilder> {
        Ok(ScwClient::builder()
            .api_url(self.uri())
            .secret_key(TEST_SECRET_KEY)
            .default_project_id(TEST_PROJECT_ID)
            .default_zone(Zone::FR_PAR_1.parse()?)
            .default_region(Region::FR_PAR.parse()?)
            .wait_options(WaitOptions::new(Duration::from_millis(10), 20)))
    }

    async fn mount_json(&self, verb: &str, url: String, status: u16, body: Value) {
        Mock::given(method(verb))
            .and(path(url))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    async fn mount_instance_list(&self, url: String, key: &str, items: Vec<Value>) {
        let total = items.len().to_string();
        Mock::given(method("GET"))
            .and(path(url))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(TOTAL_COUNT_HEADER, total.as_str())
                    .set_body_json(json!({ key: items })),
            )
            .mount(&self.server)
            .await;
    }

    /// Respond to any request matching `verb` and `url` with an API error
    pub async fn mock_error(&self, verb: &str, url: &str, status: u16, message: &str) {
        self.mount_json(
            verb,
            url.to_string(),
            status,
            json!({ "message": message, "type": error_type(status) }),
        )
        .await;
    }

    /// Empty list responses for every list endpoint in every locality
    ///
    /// Mounted at low priority so more specific mocks win.
    pub async fn mock_empty_everywhere(&self) {
        let lists = [
            (r"^/block/v1alpha1/zones/[^/]+/volumes$", "volumes"),
            (r"^/block/v1alpha1/zones/[^/]+/snapshots$", "snapshots"),
            (r"^/containers/v1beta1/regions/[^/]+/triggers$", "triggers"),
            (r"^/containers/v1beta1/regions/[^/]+/containers$", "containers"),
            (r"^/containers/v1beta1/regions/[^/]+/namespaces$", "namespaces"),
        ];
        for (pattern, key) in lists {
            Mock::given(method("GET"))
                .and(path_regex(pattern))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!({ key: [], "total_count": 0 })),
                )
                .with_priority(10)
                .mount(&self.server)
                .await;
        }
        for (pattern, key) in [
            (r"^/instance/v1/zones/[^/]+/servers$", "servers"),
            (r"^/instance/v1/zones/[^/]+/security_groups$", "security_groups"),
        ] {
            Mock::given(method("GET"))
                .and(path_regex(pattern))
                .respond_with(
                    ResponseTemplate::new(200)
                        .insert_header(TOTAL_COUNT_HEADER, "0")
                        .set_body_json(json!({ key: [] })),
                )
                .with_priority(10)
                .mount(&self.server)
                .await;
        }
    }

    // Block

    pub async fn mock_volumes_list(&self, zone: &str, volumes: Vec<Value>) {
        let total = volumes.len();
        self.mount_json(
            "GET",
            format!("/block/v1alpha1/zones/{zone}/volumes"),
            200,
            json!({ "volumes": volumes, "total_count": total }),
        )
        .await;
    }

    pub async fn mock_volume_get(&self, zone: &str, id: &str, volume: Value) {
        self.mount_json(
            "GET",
            format!("/block/v1alpha1/zones/{zone}/volumes/{id}"),
            200,
            volume,
        )
        .await;
    }

    pub async fn mock_volume_delete(&self, zone: &str, id: &str) {
        Mock::given(method("DELETE"))
            .and(path(format!("/block/v1alpha1/zones/{zone}/volumes/{id}")))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_snapshots_list(&self, zone: &str, snapshots: Vec<Value>) {
        let total = snapshots.len();
        self.mount_json(
            "GET",
            format!("/block/v1alpha1/zones/{zone}/snapshots"),
            200,
            json!({ "snapshots": snapshots, "total_count": total }),
        )
        .await;
    }

    pub async fn mock_snapshot_get(&self, zone: &str, id: &str, snapshot: Value) {
        self.mount_json(
            "GET",
            format!("/block/v1alpha1/zones/{zone}/snapshots/{id}"),
            200,
            snapshot,
        )
        .await;
    }

    pub async fn mock_snapshot_delete(&self, zone: &str, id: &str) {
        Mock::given(method("DELETE"))
            .and(path(format!("/block/v1alpha1/zones/{zone}/snapshots/{id}")))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.server)
            .await;
    }

    // Containers

    pub async fn mock_namespaces_list(&self, region: &str, namespaces: Vec<Value>) {
        let total = namespaces.len();
        self.mount_json(
            "GET",
            format!("/containers/v1beta1/regions/{region}/namespaces"),
            200,
            json!({ "namespaces": namespaces, "total_count": total }),
        )
        .await;
    }

    pub async fn mock_namespace_get(&self, region: &str, id: &str, namespace: Value) {
        self.mount_json(
            "GET",
            format!("/containers/v1beta1/regions/{region}/namespaces/{id}"),
            200,
            namespace,
        )
        .await;
    }

    pub async fn mock_namespace_delete(&self, region: &str, id: &str, namespace: Value) {
        self.mount_json(
            "DELETE",
            format!("/containers/v1beta1/regions/{region}/namespaces/{id}"),
            200,
            namespace,
        )
        .await;
    }

    pub async fn mock_containers_list(&self, region: &str, containers: Vec<Value>) {
        let total = containers.len();
        self.mount_json(
            "GET",
            format!("/containers/v1beta1/regions/{region}/containers"),
            200,
            json!({ "containers": containers, "total_count": total }),
        )
        .await;
    }

    pub async fn mock_container_get(&self, region: &str, id: &str, container: Value) {
        self.mount_json(
            "GET",
            format!("/containers/v1beta1/regions/{region}/containers/{id}"),
            200,
            container,
        )
        .await;
    }

    pub async fn mock_container_delete(&self, region: &str, id: &str, container: Value) {
        self.mount_json(
            "DELETE",
            format!("/containers/v1beta1/regions/{region}/containers/{id}"),
            200,
            container,
        )
        .await;
    }

    pub async fn mock_triggers_list(&self, region: &str, triggers: Vec<Value>) {
        let total = triggers.len();
        self.mount_json(
            "GET",
            format!("/containers/v1beta1/regions/{region}/triggers"),
            200,
            json!({ "triggers": triggers, "total_count": total }),
        )
        .await;
    }

    pub async fn mock_trigger_delete(&self, region: &str, id: &str, trigger: Value) {
        self.mount_json(
            "DELETE",
            format!("/containers/v1beta1/regions/{region}/triggers/{id}"),
            200,
            trigger,
        )
        .await;
    }

    // Instance

    pub async fn mock_security_groups_list(&self, zone: &str, groups: Vec<Value>) {
        self.mount_instance_list(
            format!("/instance/v1/zones/{zone}/security_groups"),
            "security_groups",
            groups,
        )
        .await;
    }

    pub async fn mock_security_group_get(&self, zone: &str, id: &str, group: Value) {
        self.mount_json(
            "GET",
            format!("/instance/v1/zones/{zone}/security_groups/{id}"),
            200,
            json!({ "security_group": group }),
        )
        .await;
    }

    pub async fn mock_security_group_delete(&self, zone: &str, id: &str) {
        Mock::given(method("DELETE"))
            .and(path(format!("/instance/v1/zones/{zone}/security_groups/{id}")))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_rule_get(&self, zone: &str, group_id: &str, rule: Value) {
        let id = rule["id"].as_str().unwrap_or_default().to_string();
        self.mount_json(
            "GET",
            format!("/instance/v1/zones/{zone}/security_groups/{group_id}/rules/{id}"),
            200,
            json!({ "rule": rule }),
        )
        .await;
    }

    pub async fn mock_servers_list(&self, zone: &str, servers: Vec<Value>) {
        self.mount_instance_list(format!("/instance/v1/zones/{zone}/servers"), "servers", servers)
            .await;
    }

    pub async fn mock_server_get(&self, zone: &str, id: &str, server: Value) {
        self.mount_json(
            "GET",
            format!("/instance/v1/zones/{zone}/servers/{id}"),
            200,
            json!({ "server": server }),
        )
        .await;
    }

    pub async fn mock_server_delete(&self, zone: &str, id: &str) {
        Mock::given(method("DELETE"))
            .and(path(format!("/instance/v1/zones/{zone}/servers/{id}")))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_server_action(&self, zone: &str, id: &str, task: Value) {
        self.mount_json(
            "POST",
            format!("/instance/v1/zones/{zone}/servers/{id}/action"),
            202,
            json!({ "task": task }),
        )
        .await;
    }
}

fn error_type(status: u16) -> &'static str {
    match status {
        400 => "invalid_arguments",
        401 => "denied_authentication",
        403 => "permissions_denied",
        404 => "not_found",
        409 => "conflict",
        412 => "precondition_failed",
        429 => "quotas_exceeded",
        _ => "unknown_error",
    }
}

// Fixtures

macro_rules! fixture_setters {
    ($($name:ident: $ty:ty),+ $(,)?) => {
        $(
            pub fn $name(mut self, value: $ty) -> Self {
                self.0[stringify!($name)] = json!(value);
                self
            }
        )+
    };
}

/// Block volume JSON
#[derive(Debug, Clone)]
pub struct VolumeFixture(Value);

impl VolumeFixture {
    pub fn new(id: &str, name: &str) -> Self {
        Self(json!({
            "id": id,
            "name": name,
            "type": "sbs_5k",
            "size": 10_000_000_000u64,
            "project_id": TEST_PROJECT_ID,
            "created_at": "2024-01-15T10:30:00Z",
            "references": [],
            "status": "available",
            "tags": [],
            "zone": Zone::FR_PAR_1,
        }))
    }

    fixture_setters!(status: &str, zone: &str, size: u64, tags: Vec<&str>);

    pub fn build(self) -> Value {
        self.0
    }
}

/// Block snapshot JSON
#[derive(Debug, Clone)]
pub struct SnapshotFixture(Value);

impl SnapshotFixture {
    pub fn new(id: &str, name: &str) -> Self {
        Self(json!({
            "id": id,
            "name": name,
            "size": 10_000_000_000u64,
            "project_id": TEST_PROJECT_ID,
            "created_at": "2024-01-15T10:30:00Z",
            "references": [],
            "status": "available",
            "tags": [],
            "zone": Zone::FR_PAR_1,
            "class": "sbs",
        }))
    }

    fixture_setters!(status: &str, zone: &str);

    pub fn build(self) -> Value {
        self.0
    }
}

/// Container namespace JSON
#[derive(Debug, Clone)]
pub struct NamespaceFixture(Value);

impl NamespaceFixture {
    pub fn new(id: &str, name: &str) -> Self {
        Self(json!({
            "id": id,
            "name": name,
            "environment_variables": {},
            "project_id": TEST_PROJECT_ID,
            "status": "ready",
            "registry_namespace_id": "",
            "registry_endpoint": format!("rg.fr-par.scw.cloud/{name}"),
            "region": Region::FR_PAR,
            "tags": [],
        }))
    }

    fixture_setters!(status: &str, region: &str);

    pub fn build(self) -> Value {
        self.0
    }
}

/// Serverless container JSON
#[derive(Debug, Clone)]
pub struct ContainerFixture(Value);

impl ContainerFixture {
    pub fn new(id: &str, name: &str, namespace_id: &str) -> Self {
        Self(json!({
            "id": id,
            "name": name,
            "namespace_id": namespace_id,
            "status": "ready",
            "environment_variables": {},
            "min_scale": 0,
            "max_scale": 5,
            "memory_limit": 256,
            "cpu_limit": 140,
            "timeout": "300s",
            "privacy": "public",
            "registry_image": "rg.fr-par.scw.cloud/ns/app:latest",
            "max_concurrency": 50,
            "domain_name": format!("{name}.functions.fnc.fr-par.scw.cloud"),
            "protocol": "http1",
            "port": 8080,
            "http_option": "enabled",
            "region": Region::FR_PAR,
        }))
    }

    fixture_setters!(status: &str, region: &str, max_scale: u32);

    pub fn build(self) -> Value {
        self.0
    }
}

/// Container trigger JSON
#[derive(Debug, Clone)]
pub struct TriggerFixture(Value);

impl TriggerFixture {
    pub fn new(id: &str, name: &str, container_id: &str) -> Self {
        Self(json!({
            "id": id,
            "name": name,
            "container_id": container_id,
            "input_type": "sqs",
            "status": "ready",
            "scw_sqs_config": {"queue": "jobs", "mnq_project_id": TEST_PROJECT_ID, "mnq_region": "fr-par"},
        }))
    }

    fixture_setters!(status: &str);

    pub fn build(self) -> Value {
        self.0
    }
}

/// Instance security group JSON
#[derive(Debug, Clone)]
pub struct SecurityGroupFixture(Value);

impl SecurityGroupFixture {
    pub fn new(id: &str, name: &str) -> Self {
        Self(json!({
            "id": id,
            "name": name,
            "description": "",
            "enable_default_security": true,
            "inbound_default_policy": "accept",
            "outbound_default_policy": "accept",
            "organization": TEST_PROJECT_ID,
            "project": TEST_PROJECT_ID,
            "tags": [],
            "organization_default": false,
            "project_default": false,
            "servers": [],
            "stateful": true,
            "state": "available",
            "zone": Zone::FR_PAR_1,
        }))
    }

    fixture_setters!(
        state: &str,
        description: &str,
        stateful: bool,
        project_default: bool,
        organization_default: bool,
        inbound_default_policy: &str,
        outbound_default_policy: &str,
        zone: &str,
    );

    pub fn build(self) -> Value {
        self.0
    }
}

/// Instance security group rule JSON
#[derive(Debug, Clone)]
pub struct RuleFixture(Value);

impl RuleFixture {
    pub fn new(id: &str) -> Self {
        Self(json!({
            "id": id,
            "protocol": "TCP",
            "direction": "inbound",
            "action": "accept",
            "ip_range": "0.0.0.0/0",
            "dest_port_from": null,
            "dest_port_to": null,
            "position": 1,
            "editable": true,
            "zone": Zone::FR_PAR_1,
        }))
    }

    fixture_setters!(
        protocol: &str,
        direction: &str,
        action: &str,
        ip_range: &str,
        dest_port_from: u32,
        dest_port_to: u32,
        position: u32,
    );

    pub fn build(self) -> Value {
        self.0
    }
}

/// Instance server JSON
#[derive(Debug, Clone)]
pub struct ServerFixture(Value);

impl ServerFixture {
    pub fn new(id: &str, name: &str) -> Self {
        Self(json!({
            "id": id,
            "name": name,
            "organization": TEST_PROJECT_ID,
            "project": TEST_PROJECT_ID,
            "allowed_actions": ["poweroff", "terminate", "reboot"],
            "tags": [],
            "commercial_type": "DEV1-S",
            "hostname": name,
            "public_ips": [],
            "state": "running",
            "state_detail": "booted",
            "protected": false,
            "zone": Zone::FR_PAR_1,
        }))
    }

    fixture_setters!(state: &str, zone: &str, commercial_type: &str);

    pub fn build(self) -> Value {
        self.0
    }
}

/// Instance task JSON, as returned by server actions
#[derive(Debug, Clone)]
pub struct TaskFixture(Value);

impl TaskFixture {
    pub fn new(id: &str, description: &str) -> Self {
        Self(json!({
            "id": id,
            "description": description,
            "progress": 0,
            "status": "pending",
            "href_from": "",
            "href_result": "",
            "zone": Zone::FR_PAR_1,
        }))
    }

    fixture_setters!(status: &str, progress: u32);

    pub fn build(self) -> Value {
        self.0
    }
}
