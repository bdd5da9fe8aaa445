//! Serverless containers request and response types

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::locality::Region;
use crate::pagination::impl_paginated;
use crate::wait::WaitOptions;

api_enum! {
    pub enum NamespaceStatus {
        Ready => "ready",
        Deleting => "deleting",
        Error => "error",
        Locked => "locked",
        Creating => "creating",
        Pending => "pending",
    }
}

api_enum! {
    pub enum ContainerStatus {
        Ready => "ready",
        Deleting => "deleting",
        Error => "error",
        Locked => "locked",
        Creating => "creating",
        Pending => "pending",
        Created => "created",
    }
}

api_enum! {
    pub enum TriggerStatus {
        Ready => "ready",
        Deleting => "deleting",
        Error => "error",
        Creating => "creating",
        Pending => "pending",
    }
}

api_enum! {
    pub enum ContainerPrivacy {
        Public => "public",
        Private => "private",
    }
}

api_enum! {
    pub enum ContainerProtocol {
        Http1 => "http1",
        H2c => "h2c",
    }
}

api_enum! {
    pub enum ContainerHttpOption {
        Enabled => "enabled",
        Redirected => "redirected",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub environment_variables: HashMap<String, String>,
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub status: NamespaceStatus,
    #[serde(default)]
    pub registry_namespace_id: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub registry_endpoint: String,
    #[serde(default)]
    pub description: Option<String>,
    pub region: Region,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub id: String,
    pub name: String,
    pub namespace_id: String,
    #[serde(default)]
    pub status: ContainerStatus,
    #[serde(default)]
    pub environment_variables: HashMap<String, String>,
    #[serde(default)]
    pub min_scale: u32,
    #[serde(default)]
    pub max_scale: u32,
    /// Memory limit in MB
    #[serde(default)]
    pub memory_limit: u32,
    /// CPU limit in mvCPU
    #[serde(default)]
    pub cpu_limit: u32,
    /// Seconds, as the API's duration string (e.g. `"300s"`)
    #[serde(default)]
    pub timeout: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub privacy: ContainerPrivacy,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub registry_image: String,
    #[serde(default)]
    pub max_concurrency: u32,
    #[serde(default)]
    pub domain_name: String,
    #[serde(default)]
    pub protocol: ContainerProtocol,
    #[serde(default)]
    pub port: u32,
    #[serde(default)]
    pub http_option: ContainerHttpOption,
    pub region: Region,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Where a trigger takes its events from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TriggerSource {
    #[serde(rename = "scw_sqs_config")]
    Sqs {
        queue: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        mnq_project_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        mnq_region: Option<Region>,
    },
    #[serde(rename = "scw_nats_config")]
    Nats {
        subject: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        mnq_nats_account_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        mnq_project_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        mnq_region: Option<Region>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub container_id: String,
    #[serde(default)]
    pub input_type: Option<String>,
    #[serde(default)]
    pub status: TriggerStatus,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub scw_sqs_config: Option<serde_json::Value>,
    #[serde(default)]
    pub scw_nats_config: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListNamespacesResponse {
    #[serde(default)]
    pub namespaces: Vec<Namespace>,
    #[serde(default)]
    pub total_count: u64,
}

impl_paginated!(ListNamespacesResponse, namespaces);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListContainersResponse {
    #[serde(default)]
    pub containers: Vec<Container>,
    #[serde(default)]
    pub total_count: u64,
}

impl_paginated!(ListContainersResponse, containers);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListTriggersResponse {
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    #[serde(default)]
    pub total_count: u64,
}

impl_paginated!(ListTriggersResponse, triggers);

#[derive(Debug, Clone, Default)]
pub struct ListNamespacesRequest {
    pub region: Option<Region>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub order_by: Option<String>,
    pub name: Option<String>,
    pub organization_id: Option<String>,
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListContainersRequest {
    pub region: Option<Region>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub order_by: Option<String>,
    pub namespace_id: Option<String>,
    pub name: Option<String>,
    pub organization_id: Option<String>,
    pub project_id: Option<String>,
}

/// Filters for [`super::ContainerApi::list_triggers`]
///
/// At most one of `container_id`, `namespace_id` and `project_id` is sent;
/// the API rejects combinations.
#[derive(Debug, Clone, Default)]
pub struct ListTriggersRequest {
    pub region: Option<Region>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub order_by: Option<String>,
    pub container_id: Option<String>,
    pub namespace_id: Option<String>,
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateNamespaceRequest {
    #[serde(skip)]
    pub region: Option<Region>,
    pub name: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub environment_variables: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateNamespaceRequest {
    #[serde(skip)]
    pub region: Option<Region>,
    #[serde(skip)]
    pub namespace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_variables: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateContainerRequest {
    #[serde(skip)]
    pub region: Option<Region>,
    pub namespace_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub environment_variables: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_scale: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_scale: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy: Option<ContainerPrivacy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<ContainerProtocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_option: Option<ContainerHttpOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateContainerRequest {
    #[serde(skip)]
    pub region: Option<Region>,
    #[serde(skip)]
    pub container_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_variables: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_scale: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_scale: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    /// Redeploy the container once updated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redeploy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy: Option<ContainerPrivacy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<ContainerProtocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_option: Option<ContainerHttpOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateTriggerRequest {
    #[serde(skip)]
    pub region: Option<Region>,
    pub name: String,
    pub container_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub source: TriggerSource,
}

/// Parameters shared by the container waiters
#[derive(Debug, Clone, Default)]
pub struct WaitForContainerResourceRequest {
    pub region: Option<Region>,
    pub id: String,
    /// Defaults to the client's polling settings
    pub options: Option<WaitOptions>,
}
