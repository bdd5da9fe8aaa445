//! Block storage command implementations

use scwctl_core::api::block::{
    BlockApi, ListSnapshotsRequest, ListVolumesRequest, WaitForSnapshotRequest,
    WaitForVolumeRequest,
};
use tracing::debug;

use super::{CommandContext, wait_options, with_spinner};
use crate::cli::{BlockCommands, SnapshotCommands, VolumeCommands};
use crate::error::Result as CliResult;

const VOLUME_COLUMNS: &[&str] = &["id", "name", "type", "size", "status", "zone"];
const SNAPSHOT_COLUMNS: &[&str] = &["id", "name", "size", "status", "class", "zone"];

pub async fn handle_block_command(cmd: &BlockCommands, ctx: &CommandContext<'_>) -> CliResult<()> {
    let api = BlockApi::new(ctx.client()?);
    match cmd {
        BlockCommands::Volume(cmd) => handle_volume_command(&api, cmd, ctx).await,
        BlockCommands::Snapshot(cmd) => handle_snapshot_command(&api, cmd, ctx).await,
    }
}

async fn handle_volume_command(
    api: &BlockApi,
    cmd: &VolumeCommands,
    ctx: &CommandContext<'_>,
) -> CliResult<()> {
    match cmd {
        VolumeCommands::List {
            zone,
            name,
            project_id,
            tags,
            page,
        } => {
            let req = ListVolumesRequest {
                zone: zone.clone(),
                name: name.clone(),
                project_id: project_id.clone(),
                tags: tags.clone(),
                page: page.page,
                page_size: page.page_size,
                ..Default::default()
            };
            let list = if page.page.is_some() {
                api.list_volumes(&req).await?
            } else {
                api.list_all_volumes(&req).await?
            };
            debug!(total = list.total_count, "listed volumes");
            ctx.print_list(&list.volumes, VOLUME_COLUMNS)
        }
        VolumeCommands::Get { id, zone } => ctx.print(api.get_volume(zone.as_ref(), id).await?),
        VolumeCommands::Delete { id, zone } => {
            api.delete_volume(zone.as_ref(), id).await?;
            eprintln!("Volume {} deleted", id);
            Ok(())
        }
        VolumeCommands::Wait {
            id,
            zone,
            status,
            wait,
        } => {
            let req = WaitForVolumeRequest {
                zone: zone.clone(),
                volume_id: id.clone(),
                terminal_status: status.clone(),
                options: wait_options(wait, api.client()),
            };
            let volume =
                with_spinner(|cb| async move { api.wait_for_volume(&req, Some(&cb)).await })
                    .await?;
            ctx.print(volume)
        }
    }
}

async fn handle_snapshot_command(
    api: &BlockApi,
    cmd: &SnapshotCommands,
    ctx: &CommandContext<'_>,
) -> CliResult<()> {
    match cmd {
        SnapshotCommands::List {
            zone,
            name,
            volume_id,
            project_id,
            page,
        } => {
            let req = ListSnapshotsRequest {
                zone: zone.clone(),
                name: name.clone(),
                volume_id: volume_id.clone(),
                project_id: project_id.clone(),
                page: page.page,
                page_size: page.page_size,
                ..Default::default()
            };
            let list = if page.page.is_some() {
                api.list_snapshots(&req).await?
            } else {
                api.list_all_snapshots(&req).await?
            };
            ctx.print_list(&list.snapshots, SNAPSHOT_COLUMNS)
        }
        SnapshotCommands::Get { id, zone } => {
            ctx.print(api.get_snapshot(zone.as_ref(), id).await?)
        }
        SnapshotCommands::Delete { id, zone } => {
            api.delete_snapshot(zone.as_ref(), id).await?;
            eprintln!("Snapshot {} deleted", id);
            Ok(())
        }
        SnapshotCommands::Wait {
            id,
            zone,
            status,
            wait,
        } => {
            let req = WaitForSnapshotRequest {
                zone: zone.clone(),
                snapshot_id: id.clone(),
                terminal_status: status.clone(),
                options: wait_options(wait, api.client()),
            };
            let snapshot =
                with_spinner(|cb| async move { api.wait_for_snapshot(&req, Some(&cb)).await })
                    .await?;
            ctx.print(snapshot)
        }
    }
}
