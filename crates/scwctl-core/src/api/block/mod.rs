//! Block storage API (`/block/v1alpha1`)
//!
//! Volumes and snapshots are zoned resources. Every method takes an optional
//! zone and falls back to the client's default zone.

mod types;
pub mod sweepers;

pub use types::*;

use tracing::{debug, info};

use crate::client::{Query, ScwClient};
use crate::error::Result;
use crate::locality::Zone;
use crate::pagination::fetch_all_pages;
use crate::progress::ProgressCallback;
use crate::wait::{Observation, PollState, poll_until};

const BASE_PATH: &str = "/block/v1alpha1/zones";

/// Client for the block storage API
#[derive(Debug, Clone)]
pub struct BlockApi {
    client: ScwClient,
}

impl BlockApi {
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

    fn page_size(&self, requested: Option<u32>) -> Option<u32> {
        requested.or(self.client.default_page_size())
    }

    // Volume types

    /// List the volume types offered in a zone
    pub async fn list_volume_types(
        &self,
        zone: Option<&Zone>,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<ListVolumeTypesResponse> {
        let path = self.path(zone, "volume-types")?;
        let query = Query::new()
            .push_opt("page", page)
            .push_opt("page_size", self.page_size(page_size));
        self.client.get(&path, &query).await
    }

    // Volumes

    /// List one page of volumes
    pub async fn list_volumes(&self, req: &ListVolumesRequest) -> Result<ListVolumesResponse> {
        let path = self.path(req.zone.as_ref(), "volumes")?;
        let query = Query::new()
            .push_opt("order_by", req.order_by.as_deref())
            .push_opt("project_id", req.project_id.as_deref())
            .push_opt("organization_id", req.organization_id.as_deref())
            .push_opt("page", req.page)
            .push_opt("page_size", self.page_size(req.page_size))
            .push_opt("name", req.name.as_deref())
            .push_opt("product_resource_id", req.product_resource_id.as_deref())
            .push_all("tags", &req.tags);
        self.client.get(&path, &query).await
    }

    /// List every volume matching `req`, ignoring `req.page`
    pub async fn list_all_volumes(&self, req: &ListVolumesRequest) -> Result<ListVolumesResponse> {
        fetch_all_pages(|page| {
            let req = ListVolumesRequest {
                page: Some(page),
                ..req.clone()
            };
            async move { self.list_volumes(&req).await }
        })
        .await
    }

    pub async fn get_volume(&self, zone: Option<&Zone>, volume_id: &str) -> Result<Volume> {
        let path = self.path(zone, &format!("volumes/{volume_id}"))?;
        self.client.get(&path, &Query::new()).await
    }

    pub async fn create_volume(&self, req: &CreateVolumeRequest) -> Result<Volume> {
        let path = self.path(req.zone.as_ref(), "volumes")?;
        let mut body = req.clone();
        body.project_id = self.client.project_or_default(req.project_id.as_deref());
        let volume: Volume = self.client.post(&path, &body).await?;
        info!(id = %volume.id, zone = %volume.zone, "created block volume");
        Ok(volume)
    }

    pub async fn update_volume(&self, req: &UpdateVolumeRequest) -> Result<Volume> {
        let path = self.path(req.zone.as_ref(), &format!("volumes/{}", req.volume_id))?;
        self.client.patch(&path, req).await
    }

    pub async fn delete_volume(&self, zone: Option<&Zone>, volume_id: &str) -> Result<()> {
        let path = self.path(zone, &format!("volumes/{volume_id}"))?;
        self.client.delete(&path).await?;
        debug!(id = volume_id, "deleted block volume");
        Ok(())
    }

    // Snapshots

    /// List one page of snapshots
    pub async fn list_snapshots(&self, req: &ListSnapshotsRequest) -> Result<ListSnapshotsResponse> {
        let path = self.path(req.zone.as_ref(), "snapshots")?;
        let query = Query::new()
            .push_opt("order_by", req.order_by.as_deref())
            .push_opt("project_id", req.project_id.as_deref())
            .push_opt("organization_id", req.organization_id.as_deref())
            .push_opt("page", req.page)
            .push_opt("page_size", self.page_size(req.page_size))
            .push_opt("volume_id", req.volume_id.as_deref())
            .push_opt("name", req.name.as_deref())
            .push_all("tags", &req.tags);
        self.client.get(&path, &query).await
    }

    pub async fn list_all_snapshots(
        &self,
        req: &ListSnapshotsRequest,
    ) -> Result<ListSnapshotsResponse> {
        fetch_all_pages(|page| {
            let req = ListSnapshotsRequest {
                page: Some(page),
                ..req.clone()
            };
            async move { self.list_snapshots(&req).await }
        })
        .await
    }

    pub async fn get_snapshot(&self, zone: Option<&Zone>, snapshot_id: &str) -> Result<Snapshot> {
        let path = self.path(zone, &format!("snapshots/{snapshot_id}"))?;
        self.client.get(&path, &Query::new()).await
    }

    pub async fn create_snapshot(&self, req: &CreateSnapshotRequest) -> Result<Snapshot> {
        let path = self.path(req.zone.as_ref(), "snapshots")?;
        let mut body = req.clone();
        body.project_id = self.client.project_or_default(req.project_id.as_deref());
        let snapshot: Snapshot = self.client.post(&path, &body).await?;
        info!(id = %snapshot.id, volume = %req.volume_id, "created block snapshot");
        Ok(snapshot)
    }

    pub async fn update_snapshot(&self, req: &UpdateSnapshotRequest) -> Result<Snapshot> {
        let path = self.path(req.zone.as_ref(), &format!("snapshots/{}", req.snapshot_id))?;
        self.client.patch(&path, req).await
    }

    pub async fn delete_snapshot(&self, zone: Option<&Zone>, snapshot_id: &str) -> Result<()> {
        let path = self.path(zone, &format!("snapshots/{snapshot_id}"))?;
        self.client.delete(&path).await?;
        debug!(id = snapshot_id, "deleted block snapshot");
        Ok(())
    }

    // Waiters

    /// Poll a volume until it reaches a terminal status
    ///
    /// `error`, `locked` and `deleted` always stop the wait. On top of those
    /// the wait stops on `req.terminal_status` when given, or on `available`
    /// and `in_use` otherwise. Any other status, unrecognised ones included,
    /// keeps polling.
    pub async fn wait_for_volume(
        &self,
        req: &WaitForVolumeRequest,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Volume> {
        let zone = self.client.zone_or_default(req.zone.as_ref())?;
        let options = req.options.unwrap_or_else(|| self.client.wait_options());
        let extra = req.terminal_status.as_ref();

        poll_until(
            "block volume",
            &req.volume_id,
            &options,
            on_progress,
            || self.get_volume(Some(&zone), &req.volume_id),
            |volume: &Volume| {
                Observation::new(volume_poll_state(&volume.status, extra), volume.status.as_str())
            },
        )
        .await
    }

    /// Poll a snapshot until it reaches a terminal status
    ///
    /// Same rules as [`BlockApi::wait_for_volume`].
    pub async fn wait_for_snapshot(
        &self,
        req: &WaitForSnapshotRequest,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Snapshot> {
        let zone = self.client.zone_or_default(req.zone.as_ref())?;
        let options = req.options.unwrap_or_else(|| self.client.wait_options());
        let extra = req.terminal_status.as_ref();

        poll_until(
            "block snapshot",
            &req.snapshot_id,
            &options,
            on_progress,
            || self.get_snapshot(Some(&zone), &req.snapshot_id),
            |snapshot: &Snapshot| {
                Observation::new(
                    snapshot_poll_state(&snapshot.status, extra),
                    snapshot.status.as_str(),
                )
            },
        )
        .await
    }
}

fn volume_poll_state(status: &VolumeStatus, terminal: Option<&VolumeStatus>) -> PollState {
    use VolumeStatus::*;
    let done = match terminal {
        Some(t) => matches!(status, Error | Locked | Deleted) || status == t,
        None => matches!(status, Error | Locked | Deleted | Available | InUse),
    };
    if done {
        PollState::Terminal
    } else {
        PollState::Pending
    }
}

fn snapshot_poll_state(status: &SnapshotStatus, terminal: Option<&SnapshotStatus>) -> PollState {
    use SnapshotStatus::*;
    let done = match terminal {
        Some(t) => matches!(status, Error | Locked | Deleted) || status == t,
        None => matches!(status, Error | Locked | Deleted | Available | InUse),
    };
    if done {
        PollState::Terminal
    } else {
        PollState::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_default_terminal_states() {
        for s in [
            VolumeStatus::Available,
            VolumeStatus::InUse,
            VolumeStatus::Error,
            VolumeStatus::Locked,
            VolumeStatus::Deleted,
        ] {
            assert_eq!(volume_poll_state(&s, None), PollState::Terminal, "{s}");
        }
        for s in [
            VolumeStatus::Creating,
            VolumeStatus::Resizing,
            VolumeStatus::Snapshotting,
            VolumeStatus::Unknown("migrating".to_string()),
        ] {
            assert_eq!(volume_poll_state(&s, None), PollState::Pending, "{s}");
        }
    }

    #[test]
    fn test_volume_custom_terminal_state_replaces_success_set() {
        let t = Some(&VolumeStatus::Available);
        assert_eq!(volume_poll_state(&VolumeStatus::Available, t), PollState::Terminal);
        assert_eq!(volume_poll_state(&VolumeStatus::InUse, t), PollState::Pending);
        assert_eq!(volume_poll_state(&VolumeStatus::Error, t), PollState::Terminal);
    }

    #[test]
    fn test_snapshot_terminal_states() {
        assert_eq!(
            snapshot_poll_state(&SnapshotStatus::Exporting, None),
            PollState::Pending
        );
        assert_eq!(
            snapshot_poll_state(&SnapshotStatus::InUse, None),
            PollState::Terminal
        );
        assert_eq!(
            snapshot_poll_state(&SnapshotStatus::Exporting, Some(&SnapshotStatus::Exporting)),
            PollState::Terminal
        );
    }
}
