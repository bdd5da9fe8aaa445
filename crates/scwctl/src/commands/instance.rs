//! Instance command implementations

use scwctl_core::api::instance::{
    CreateSecurityGroupRequest, CreateSecurityGroupRuleRequest, InstanceApi,
    ListSecurityGroupsRequest, ListServersRequest, UpdateSecurityGroupRequest,
    UpdateSecurityGroupRuleRequest, WaitForSecurityGroupRequest, WaitForServerRequest,
};

use super::{CommandContext, wait_options, with_spinner};
use crate::cli::{InstanceCommands, RuleCommands, SecurityGroupCommands, ServerCommands};
use crate::error::Result as CliResult;

const SECURITY_GROUP_COLUMNS: &[&str] = &[
    "id",
    "name",
    "state",
    "stateful",
    "inbound_default_policy",
    "outbound_default_policy",
    "project_default",
];
const RULE_COLUMNS: &[&str] = &[
    "id",
    "position",
    "direction",
    "action",
    "protocol",
    "ip_range",
    "dest_port_from",
    "dest_port_to",
];
const SERVER_COLUMNS: &[&str] = &["id", "name", "state", "commercial_type", "private_ip", "zone"];

pub async fn handle_instance_command(
    cmd: &InstanceCommands,
    ctx: &CommandContext<'_>,
) -> CliResult<()> {
    let api = InstanceApi::new(ctx.client()?);
    match cmd {
        InstanceCommands::SecurityGroup(cmd) => handle_security_group_command(&api, cmd, ctx).await,
        InstanceCommands::Rule(cmd) => handle_rule_command(&api, cmd, ctx).await,
        InstanceCommands::Server(cmd) => handle_server_command(&api, cmd, ctx).await,
    }
}

async fn handle_security_group_command(
    api: &InstanceApi,
    cmd: &SecurityGroupCommands,
    ctx: &CommandContext<'_>,
) -> CliResult<()> {
    match cmd {
        SecurityGroupCommands::List {
            zone,
            name,
            project,
            tags,
            page,
        } => {
            let req = ListSecurityGroupsRequest {
                zone: zone.clone(),
                name: name.clone(),
                project: project.clone(),
                tags: tags.clone(),
                page: page.page,
                per_page: page.page_size,
                ..Default::default()
            };
            let list = if page.page.is_some() {
                api.list_security_groups(&req).await?
            } else {
                api.list_all_security_groups(&req).await?
            };
            ctx.print_list(&list.security_groups, SECURITY_GROUP_COLUMNS)
        }
        SecurityGroupCommands::Get { id, zone } => {
            ctx.print(api.get_security_group(zone.as_ref(), id).await?)
        }
        SecurityGroupCommands::Create {
            name,
            zone,
            description,
            project,
            tags,
            stateless,
            inbound_default_policy,
            outbound_default_policy,
        } => {
            let req = CreateSecurityGroupRequest {
                zone: zone.clone(),
                name: name.clone(),
                description: description.clone(),
                project: project.clone(),
                tags: tags.clone(),
                stateful: !*stateless,
                inbound_default_policy: inbound_default_policy.clone(),
                outbound_default_policy: outbound_default_policy.clone(),
                ..Default::default()
            };
            ctx.print(api.create_security_group(&req).await?)
        }
        SecurityGroupCommands::Update { id, zone, fields } => {
            let req = UpdateSecurityGroupRequest {
                zone: zone.clone(),
                security_group_id: id.clone(),
                name: fields.name.clone(),
                description: fields.description.clone(),
                enable_default_security: fields.enable_default_security,
                inbound_default_policy: fields.inbound_default_policy.clone(),
                outbound_default_policy: fields.outbound_default_policy.clone(),
                tags: fields.tags.clone(),
                project_default: fields.project_default,
                stateful: fields.stateful,
                organization_default: None,
            };
            ctx.print(api.update_security_group(&req).await?)
        }
        SecurityGroupCommands::Delete { id, zone } => {
            api.delete_security_group(zone.as_ref(), id).await?;
            eprintln!("Security group {} deleted", id);
            Ok(())
        }
        SecurityGroupCommands::Wait { id, zone, wait } => {
            let req = WaitForSecurityGroupRequest {
                zone: zone.clone(),
                security_group_id: id.clone(),
                options: wait_options(wait, api.client()),
            };
            let group = with_spinner(|cb| async move {
                api.wait_for_security_group(&req, Some(&cb)).await
            })
            .await?;
            ctx.print(group)
        }
    }
}

async fn handle_rule_command(
    api: &InstanceApi,
    cmd: &RuleCommands,
    ctx: &CommandContext<'_>,
) -> CliResult<()> {
    match cmd {
        RuleCommands::List {
            security_group_id,
            zone,
            page,
        } => {
            let list = if page.page.is_some() {
                api.list_security_group_rules(
                    zone.as_ref(),
                    security_group_id,
                    page.page,
                    page.page_size,
                )
                .await?
            } else {
                api.list_all_security_group_rules(zone.as_ref(), security_group_id)
                    .await?
            };
            ctx.print_list(&list.rules, RULE_COLUMNS)
        }
        RuleCommands::Create {
            security_group_id,
            zone,
            protocol,
            direction,
            action,
            ip_range,
            dest_port_from,
            dest_port_to,
            position,
        } => {
            let req = CreateSecurityGroupRuleRequest {
                zone: zone.clone(),
                security_group_id: security_group_id.clone(),
                protocol: protocol.clone(),
                direction: direction.clone(),
                action: action.clone(),
                ip_range: *ip_range,
                dest_port_from: *dest_port_from,
                dest_port_to: *dest_port_to,
                position: *position,
                editable: true,
            };
            ctx.print(api.create_security_group_rule(&req).await?)
        }
        RuleCommands::Update {
            security_group_id,
            rule_id,
            zone,
            protocol,
            direction,
            action,
            ip_range,
            dest_port_from,
            dest_port_to,
            position,
        } => {
            let req = UpdateSecurityGroupRuleRequest {
                zone: zone.clone(),
                security_group_id: security_group_id.clone(),
                security_group_rule_id: rule_id.clone(),
                protocol: protocol.clone(),
                direction: direction.clone(),
                action: action.clone(),
                ip_range: *ip_range,
                dest_port_from: *dest_port_from,
                dest_port_to: *dest_port_to,
                position: *position,
            };
            ctx.print(api.update_security_group_rule(&req).await?)
        }
        RuleCommands::Delete {
            security_group_id,
            rule_id,
            zone,
        } => {
            api.delete_security_group_rule(zone.as_ref(), security_group_id, rule_id)
                .await?;
            eprintln!("Rule {} deleted", rule_id);
            Ok(())
        }
    }
}

async fn handle_server_command(
    api: &InstanceApi,
    cmd: &ServerCommands,
    ctx: &CommandContext<'_>,
) -> CliResult<()> {
    match cmd {
        ServerCommands::List {
            zone,
            name,
            project,
            state,
            tags,
            page,
        } => {
            let req = ListServersRequest {
                zone: zone.clone(),
                name: name.clone(),
                project: project.clone(),
                state: state.clone(),
                tags: tags.clone(),
                page: page.page,
                per_page: page.page_size,
                ..Default::default()
            };
            let list = if page.page.is_some() {
                api.list_servers(&req).await?
            } else {
                api.list_all_servers(&req).await?
            };
            ctx.print_list(&list.servers, SERVER_COLUMNS)
        }
        ServerCommands::Get { id, zone } => ctx.print(api.get_server(zone.as_ref(), id).await?),
        ServerCommands::Action {
            id,
            action,
            zone,
            wait,
        } => {
            let task = api.server_action(zone.as_ref(), id, action.clone()).await?;
            if !*wait {
                return ctx.print(task);
            }
            let req = WaitForServerRequest {
                zone: zone.clone(),
                server_id: id.clone(),
                options: None,
            };
            let server =
                with_spinner(|cb| async move { api.wait_for_server(&req, Some(&cb)).await })
                    .await?;
            ctx.print(server)
        }
        ServerCommands::Delete { id, zone } => {
            api.delete_server(zone.as_ref(), id).await?;
            eprintln!("Server {} deleted", id);
            Ok(())
        }
        ServerCommands::Wait { id, zone, wait } => {
            let req = WaitForServerRequest {
                zone: zone.clone(),
                server_id: id.clone(),
                options: wait_options(wait, api.client()),
            };
            let server =
                with_spinner(|cb| async move { api.wait_for_server(&req, Some(&cb)).await })
                    .await?;
            ctx.print(server)
        }
    }
}
