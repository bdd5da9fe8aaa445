//! Serverless containers sweepers

use tracing::warn;

use super::{ContainerApi, ListContainersRequest, ListNamespacesRequest, ListTriggersRequest};
use crate::client::ScwClient;
use crate::error::{ErrorList, Result, ResultExt};
use crate::locality::{Locality, Region, fan_out};
use crate::sweep::act_on_all;

pub async fn sweep_triggers(client: &ScwClient, region: &Region) -> Result<()> {
    let api = ContainerApi::new(client.clone());
    warn!("sweeper: destroying container triggers in {region}");

    let triggers = api
        .list_all_triggers(&ListTriggersRequest {
            region: Some(region.clone()),
            ..Default::default()
        })
        .await
        .context("error listing triggers")?
        .triggers;

    act_on_all(
        triggers,
        |t| format!("error deleting trigger {}", t.id),
        |t| {
            let api = api.clone();
            async move { api.delete_trigger(Some(region), &t.id).await.map(drop) }
        },
    )
    .await
}

pub async fn sweep_containers(client: &ScwClient, region: &Region) -> Result<()> {
    let api = ContainerApi::new(client.clone());
    warn!("sweeper: destroying containers in {region}");

    let containers = api
        .list_all_containers(&ListContainersRequest {
            region: Some(region.clone()),
            ..Default::default()
        })
        .await
        .context("error listing containers")?
        .containers;

    act_on_all(
        containers,
        |c| format!("error deleting container {}", c.id),
        |c| {
            let api = api.clone();
            async move { api.delete_container(Some(region), &c.id).await.map(drop) }
        },
    )
    .await
}

pub async fn sweep_namespaces(client: &ScwClient, region: &Region) -> Result<()> {
    let api = ContainerApi::new(client.clone());
    warn!("sweeper: destroying container namespaces in {region}");

    let namespaces = api
        .list_all_namespaces(&ListNamespacesRequest {
            region: Some(region.clone()),
            ..Default::default()
        })
        .await
        .context("error listing namespaces")?
        .namespaces;

    act_on_all(
        namespaces,
        |ns| format!("error deleting namespace {}", ns.id),
        |ns| {
            let api = api.clone();
            async move { api.delete_namespace(Some(region), &ns.id).await.map(drop) }
        },
    )
    .await
}

/// Sweep triggers, then containers, then namespaces in one region
pub async fn sweep_region(client: &ScwClient, region: &Region) -> Result<()> {
    let mut errs = ErrorList::new();
    errs.record(sweep_triggers(client, region).await);
    errs.record(sweep_containers(client, region).await);
    errs.record(sweep_namespaces(client, region).await);
    errs.into_result()
}

/// Run [`sweep_region`] in every known region
pub async fn sweep_all_localities(client: &ScwClient) -> Result<()> {
    fan_out(Region::all(), |region| async move { sweep_region(client, &region).await }).await
}
