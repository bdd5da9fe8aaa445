//! Serverless containers command implementations

use scwctl_core::api::container::{
    ContainerApi, ListContainersRequest, ListNamespacesRequest, ListTriggersRequest,
    WaitForContainerResourceRequest,
};

use super::{CommandContext, wait_options, with_spinner};
use crate::cli::{ContainerCommands, ContainerResourceCommands, NamespaceCommands, TriggerCommands};
use crate::error::Result as CliResult;

const NAMESPACE_COLUMNS: &[&str] = &["id", "name", "status", "project_id", "region"];
const CONTAINER_COLUMNS: &[&str] = &["id", "name", "namespace_id", "status", "domain_name", "region"];
const TRIGGER_COLUMNS: &[&str] = &["id", "name", "container_id", "input_type", "status"];

pub async fn handle_container_command(
    cmd: &ContainerCommands,
    ctx: &CommandContext<'_>,
) -> CliResult<()> {
    let api = ContainerApi::new(ctx.client()?);
    match cmd {
        ContainerCommands::Namespace(cmd) => handle_namespace_command(&api, cmd, ctx).await,
        ContainerCommands::Container(cmd) => handle_resource_command(&api, cmd, ctx).await,
        ContainerCommands::Trigger(cmd) => handle_trigger_command(&api, cmd, ctx).await,
    }
}

async fn handle_namespace_command(
    api: &ContainerApi,
    cmd: &NamespaceCommands,
    ctx: &CommandContext<'_>,
) -> CliResult<()> {
    match cmd {
        NamespaceCommands::List {
            region,
            name,
            project_id,
            page,
        } => {
            let req = ListNamespacesRequest {
                region: region.clone(),
                name: name.clone(),
                project_id: project_id.clone(),
                page: page.page,
                page_size: page.page_size,
                ..Default::default()
            };
            let list = if page.page.is_some() {
                api.list_namespaces(&req).await?
            } else {
                api.list_all_namespaces(&req).await?
            };
            ctx.print_list(&list.namespaces, NAMESPACE_COLUMNS)
        }
        NamespaceCommands::Get { id, region } => {
            ctx.print(api.get_namespace(region.as_ref(), id).await?)
        }
        NamespaceCommands::Delete { id, region } => {
            ctx.print(api.delete_namespace(region.as_ref(), id).await?)
        }
        NamespaceCommands::Wait { id, region, wait } => {
            let req = WaitForContainerResourceRequest {
                region: region.clone(),
                id: id.clone(),
                options: wait_options(wait, api.client()),
            };
            let namespace =
                with_spinner(|cb| async move { api.wait_for_namespace(&req, Some(&cb)).await })
                    .await?;
            ctx.print(namespace)
        }
    }
}

async fn handle_resource_command(
    api: &ContainerApi,
    cmd: &ContainerResourceCommands,
    ctx: &CommandContext<'_>,
) -> CliResult<()> {
    match cmd {
        ContainerResourceCommands::List {
            region,
            namespace_id,
            name,
            project_id,
            page,
        } => {
            let req = ListContainersRequest {
                region: region.clone(),
                namespace_id: namespace_id.clone(),
                name: name.clone(),
                project_id: project_id.clone(),
                page: page.page,
                page_size: page.page_size,
                ..Default::default()
            };
            let list = if page.page.is_some() {
                api.list_containers(&req).await?
            } else {
                api.list_all_containers(&req).await?
            };
            ctx.print_list(&list.containers, CONTAINER_COLUMNS)
        }
        ContainerResourceCommands::Get { id, region } => {
            ctx.print(api.get_container(region.as_ref(), id).await?)
        }
        ContainerResourceCommands::Deploy { id, region, wait } => {
            let container = api.deploy_container(region.as_ref(), id).await?;
            if !*wait {
                return ctx.print(container);
            }
            let req = WaitForContainerResourceRequest {
                region: region.clone(),
                id: id.clone(),
                options: None,
            };
            let container =
                with_spinner(|cb| async move { api.wait_for_container(&req, Some(&cb)).await })
                    .await?;
            ctx.print(container)
        }
        ContainerResourceCommands::Delete { id, region } => {
            ctx.print(api.delete_container(region.as_ref(), id).await?)
        }
        ContainerResourceCommands::Wait { id, region, wait } => {
            let req = WaitForContainerResourceRequest {
                region: region.clone(),
                id: id.clone(),
                options: wait_options(wait, api.client()),
            };
            let container =
                with_spinner(|cb| async move { api.wait_for_container(&req, Some(&cb)).await })
                    .await?;
            ctx.print(container)
        }
    }
}

async fn handle_trigger_command(
    api: &ContainerApi,
    cmd: &TriggerCommands,
    ctx: &CommandContext<'_>,
) -> CliResult<()> {
    match cmd {
        TriggerCommands::List {
            region,
            container_id,
            namespace_id,
            project_id,
            page,
        } => {
            let req = ListTriggersRequest {
                region: region.clone(),
                container_id: container_id.clone(),
                namespace_id: namespace_id.clone(),
                project_id: project_id.clone(),
                page: page.page,
                page_size: page.page_size,
                ..Default::default()
            };
            let list = if page.page.is_some() {
                api.list_triggers(&req).await?
            } else {
                api.list_all_triggers(&req).await?
            };
            ctx.print_list(&list.triggers, TRIGGER_COLUMNS)
        }
        TriggerCommands::Get { id, region } => {
            ctx.print(api.get_trigger(region.as_ref(), id).await?)
        }
        TriggerCommands::Delete { id, region } => {
            ctx.print(api.delete_trigger(region.as_ref(), id).await?)
        }
    }
}
