//! Block storage sweepers

use tracing::warn;

use super::{
    BlockApi, ListSnapshotsRequest, ListVolumesRequest, VolumeStatus, WaitForVolumeRequest,
};
use crate::client::ScwClient;
use crate::error::{ErrorList, Result, ResultExt};
use crate::locality::{Locality, Zone, fan_out};
use crate::sweep::act_on_all;

/// Delete every volume in `zone`
///
/// Each volume is first waited on until it is `available` so in-flight
/// operations can settle. The delete is attempted even when that wait
/// fails, and both failures are reported.
pub async fn sweep_volumes(client: &ScwClient, zone: &Zone) -> Result<()> {
    let api = BlockApi::new(client.clone());
    warn!("sweeper: destroying the block volumes in {zone}");

    let volumes = api
        .list_all_volumes(&ListVolumesRequest {
            zone: Some(zone.clone()),
            ..Default::default()
        })
        .await
        .context("error listing block volumes")?
        .volumes;

    let mut errs = ErrorList::new();
    for volume in volumes {
        errs.record(
            api.wait_for_volume(
                &WaitForVolumeRequest {
                    zone: Some(zone.clone()),
                    volume_id: volume.id.clone(),
                    terminal_status: Some(VolumeStatus::Available),
                    options: None,
                },
                None,
            )
            .await
            .with_context(|| format!("error waiting for block volume {}", volume.id)),
        );

        errs.record(
            api.delete_volume(Some(zone), &volume.id)
                .await
                .with_context(|| format!("error deleting block volume {}", volume.id)),
        );
    }
    errs.into_result()
}

/// Delete every snapshot in `zone`
pub async fn sweep_snapshots(client: &ScwClient, zone: &Zone) -> Result<()> {
    let api = BlockApi::new(client.clone());
    warn!("sweeper: destroying the block snapshots in {zone}");

    let snapshots = api
        .list_all_snapshots(&ListSnapshotsRequest {
            zone: Some(zone.clone()),
            ..Default::default()
        })
        .await
        .context("error listing block snapshots")?
        .snapshots;

    act_on_all(
        snapshots,
        |snapshot| format!("error deleting snapshot {}", snapshot.id),
        |snapshot| {
            let api = api.clone();
            async move { api.delete_snapshot(Some(zone), &snapshot.id).await }
        },
    )
    .await
}

/// Sweep volumes, then snapshots, in one zone
pub async fn sweep_zone(client: &ScwClient, zone: &Zone) -> Result<()> {
    let mut errs = ErrorList::new();
    errs.record(sweep_volumes(client, zone).await);
    errs.record(sweep_snapshots(client, zone).await);
    errs.into_result()
}

/// Run both block sweepers in every known zone
pub async fn sweep_all_localities(client: &ScwClient) -> Result<()> {
    fan_out(Zone::all(), |zone| async move { sweep_zone(client, &zone).await }).await
}
