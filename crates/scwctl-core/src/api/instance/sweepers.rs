//! Instance sweepers

use tracing::{debug, warn};

use super::{
    InstanceApi, ListSecurityGroupsRequest, ListServersRequest, Server, ServerAction, ServerState,
    WaitForServerRequest,
};
use crate::client::ScwClient;
use crate::error::{ErrorList, Result, ResultExt};
use crate::locality::{Locality, Zone, fan_out};
use crate::sweep::act_on_all;

/// Remove every server in `zone`
///
/// Servers in a transitional state are waited on first. Stopped servers are
/// deleted; anything else is terminated, which also removes its volumes.
pub async fn sweep_servers(client: &ScwClient, zone: &Zone) -> Result<()> {
    let api = InstanceApi::new(client.clone());
    warn!("sweeper: destroying instance servers in {zone}");

    let servers = api
        .list_all_servers(&ListServersRequest {
            zone: Some(zone.clone()),
            ..Default::default()
        })
        .await
        .context("error listing servers")?
        .servers;

    act_on_all(
        servers,
        |server| format!("error deleting server {}", server.id),
        |server| {
            let api = api.clone();
            async move { remove_server(&api, zone, server).await }
        },
    )
    .await
}

async fn remove_server(api: &InstanceApi, zone: &Zone, server: Server) -> Result<()> {
    let server = match server.state {
        ServerState::Starting | ServerState::Stopping => {
            api.wait_for_server(
                &WaitForServerRequest {
                    zone: Some(zone.clone()),
                    server_id: server.id.clone(),
                    options: None,
                },
                None,
            )
            .await?
        }
        _ => server,
    };

    match server.state {
        ServerState::Stopped | ServerState::StoppedInPlace => {
            api.delete_server(Some(zone), &server.id).await
        }
        _ => {
            debug!(id = %server.id, state = %server.state, "terminating server");
            api.server_action(Some(zone), &server.id, ServerAction::Terminate)
                .await
                .map(drop)
        }
    }
}

/// Delete every non-default security group in `zone`
pub async fn sweep_security_groups(client: &ScwClient, zone: &Zone) -> Result<()> {
    let api = InstanceApi::new(client.clone());
    warn!("sweeper: destroying instance security groups in {zone}");

    let groups = api
        .list_all_security_groups(&ListSecurityGroupsRequest {
            zone: Some(zone.clone()),
            ..Default::default()
        })
        .await
        .context("error listing security groups")?
        .security_groups;

    let groups = groups.into_iter().filter(|sg| {
        if sg.is_default() {
            debug!(id = %sg.id, "skipping default security group");
        }
        !sg.is_default()
    });

    act_on_all(
        groups,
        |sg| format!("error deleting security group {}", sg.id),
        |sg| {
            let api = api.clone();
            async move { api.delete_security_group(Some(zone), &sg.id).await }
        },
    )
    .await
}

/// Sweep servers, then security groups, in one zone
pub async fn sweep_zone(client: &ScwClient, zone: &Zone) -> Result<()> {
    let mut errs = ErrorList::new();
    errs.record(sweep_servers(client, zone).await);
    errs.record(sweep_security_groups(client, zone).await);
    errs.into_result()
}

/// Run [`sweep_zone`] in every known zone
pub async fn sweep_all_localities(client: &ScwClient) -> Result<()> {
    fan_out(Zone::all(), |zone| async move { sweep_zone(client, &zone).await }).await
}
