//! Block storage request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::locality::Zone;
use crate::pagination::impl_paginated;
use crate::wait::WaitOptions;

api_enum! {
    pub enum VolumeStatus {
        Creating => "creating",
        Available => "available",
        InUse => "in_use",
        Deleting => "deleting",
        Deleted => "deleted",
        Resizing => "resizing",
        Error => "error",
        Snapshotting => "snapshotting",
        Locked => "locked",
        Updating => "updating",
    }
}

api_enum! {
    pub enum SnapshotStatus {
        Creating => "creating",
        Available => "available",
        Error => "error",
        Deleting => "deleting",
        Deleted => "deleted",
        InUse => "in_use",
        Locked => "locked",
        Exporting => "exporting",
    }
}

api_enum! {
    pub enum ReferenceStatus {
        Attaching => "attaching",
        Attached => "attached",
        Detaching => "detaching",
        Detached => "detached",
        Snapshotting => "snapshotting",
        Error => "error",
    }
}

api_enum! {
    pub enum StorageClass {
        Unspecified => "unspecified",
        Bssd => "bssd",
        Sbs => "sbs",
    }
}

/// A link between a volume or snapshot and the product resource using it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
    #[serde(default)]
    pub product_resource_type: String,
    #[serde(default)]
    pub product_resource_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: ReferenceStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeSpecifications {
    #[serde(default)]
    pub perf_iops: Option<u32>,
    #[serde(default)]
    pub class: StorageClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub id: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(default)]
    pub parent_snapshot_id: Option<String>,
    #[serde(default)]
    pub status: VolumeStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    pub zone: Zone,
    #[serde(default)]
    pub specs: Option<VolumeSpecifications>,
    #[serde(default)]
    pub last_detached_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotParentVolume {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: VolumeStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent_volume: Option<SnapshotParentVolume>,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(default)]
    pub status: SnapshotStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    pub zone: Zone,
    #[serde(default)]
    pub class: StorageClass,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeType {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub pricing: Option<serde_json::Value>,
    #[serde(default)]
    pub snapshot_pricing: Option<serde_json::Value>,
    #[serde(default)]
    pub specs: Option<VolumeSpecifications>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListVolumeTypesResponse {
    #[serde(default)]
    pub volume_types: Vec<VolumeType>,
    #[serde(default)]
    pub total_count: u64,
}

impl_paginated!(ListVolumeTypesResponse, volume_types);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListVolumesResponse {
    #[serde(default)]
    pub volumes: Vec<Volume>,
    #[serde(default)]
    pub total_count: u64,
}

impl_paginated!(ListVolumesResponse, volumes);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListSnapshotsResponse {
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
    #[serde(default)]
    pub total_count: u64,
}

impl_paginated!(ListSnapshotsResponse, snapshots);

/// Filters for [`super::BlockApi::list_volumes`]
#[derive(Debug, Clone, Default)]
pub struct ListVolumesRequest {
    pub zone: Option<Zone>,
    pub order_by: Option<String>,
    pub project_id: Option<String>,
    pub organization_id: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub name: Option<String>,
    pub product_resource_id: Option<String>,
    pub tags: Vec<String>,
}

/// Filters for [`super::BlockApi::list_snapshots`]
#[derive(Debug, Clone, Default)]
pub struct ListSnapshotsRequest {
    pub zone: Option<Zone>,
    pub order_by: Option<String>,
    pub project_id: Option<String>,
    pub organization_id: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub volume_id: Option<String>,
    pub name: Option<String>,
    pub tags: Vec<String>,
}

/// Where a new volume's content comes from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum VolumeSource {
    /// Blank volume of `size` bytes
    #[serde(rename = "from_empty")]
    Empty { size: u64 },
    /// Restored from a snapshot, optionally grown to `size` bytes
    #[serde(rename = "from_snapshot")]
    Snapshot {
        snapshot_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<u64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateVolumeRequest {
    #[serde(skip)]
    pub zone: Option<Zone>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perf_iops: Option<u32>,
    /// Falls back to the client's default project
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(flatten)]
    pub source: VolumeSource,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateVolumeRequest {
    #[serde(skip)]
    pub zone: Option<Zone>,
    #[serde(skip)]
    pub volume_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New size in bytes; volumes can only grow
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perf_iops: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateSnapshotRequest {
    #[serde(skip)]
    pub zone: Option<Zone>,
    pub volume_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateSnapshotRequest {
    #[serde(skip)]
    pub zone: Option<Zone>,
    #[serde(skip)]
    pub snapshot_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Parameters for [`super::BlockApi::wait_for_volume`]
#[derive(Debug, Clone, Default)]
pub struct WaitForVolumeRequest {
    pub zone: Option<Zone>,
    pub volume_id: String,
    /// Extra status to stop on; defaults to `available` / `in_use`
    pub terminal_status: Option<VolumeStatus>,
    /// Defaults to the client's polling settings
    pub options: Option<WaitOptions>,
}

/// Parameters for [`super::BlockApi::wait_for_snapshot`]
#[derive(Debug, Clone, Default)]
pub struct WaitForSnapshotRequest {
    pub zone: Option<Zone>,
    pub snapshot_id: String,
    pub terminal_status: Option<SnapshotStatus>,
    pub options: Option<WaitOptions>,
}
