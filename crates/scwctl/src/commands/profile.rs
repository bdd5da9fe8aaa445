//! Profile management command implementations

use colored::Colorize;
use comfy_table::Table;
use scwctl_core::{CredentialStore, Profile, Region, Zone};
use serde_json::json;
use tracing::{debug, info};

use super::CommandContext;
use crate::cli::{OutputFormat, ProfileCommands};
use crate::connection::ConnectionManager;
use crate::error::{Result as CliResult, ScwCtlError};

/// Handle profile management commands
pub fn handle_profile_command(cmd: &ProfileCommands, ctx: &CommandContext<'_>) -> CliResult<()> {
    use ProfileCommands::*;

    let conn_mgr = ctx.conn_mgr;
    match cmd {
        List => handle_list(ctx),
        Path => handle_path(ctx),
        Show { name } => handle_show(ctx, name.as_deref()),
        Set {
            name,
            access_key,
            secret_key,
            api_url,
            default_organization_id,
            default_project_id,
            default_region,
            default_zone,
            default_page_size,
            poll_interval,
            poll_timeout,
            #[cfg(feature = "secure-storage")]
            use_keyring,
        } => {
            #[cfg(feature = "secure-storage")]
            let use_keyring = *use_keyring;
            #[cfg(not(feature = "secure-storage"))]
            let use_keyring = false;

            let update = ProfileUpdate {
                access_key: access_key.clone(),
                secret_key: secret_key.clone(),
                api_url: api_url.clone(),
                default_organization_id: default_organization_id.clone(),
                default_project_id: default_project_id.clone(),
                default_region: default_region.clone(),
                default_zone: default_zone.clone(),
                default_page_size: *default_page_size,
                poll_interval: *poll_interval,
                poll_timeout: *poll_timeout,
            };
            handle_set(conn_mgr, name, update, use_keyring)
        }
        Remove { name } => handle_remove(conn_mgr, name),
        Use { name } => handle_use(conn_mgr, name),
    }
}

fn handle_list(ctx: &CommandContext<'_>) -> CliResult<()> {
    let config = &ctx.conn_mgr.config;
    let profiles = config.list_profiles();
    debug!("Found {} profiles", profiles.len());
    let active = config.resolve_profile_name(None).ok();

    match ctx.output {
        OutputFormat::Json | OutputFormat::Yaml => {
            let list: Vec<_> = profiles
                .iter()
                .map(|(name, profile)| {
                    json!({
                        "name": name,
                        "active": active.as_deref() == Some(name.as_str()),
                        "default_project_id": profile.default_project_id,
                        "default_zone": profile.default_zone,
                        "api_url": profile.api_url,
                    })
                })
                .collect();
            ctx.print(json!({
                "config_path": ctx.conn_mgr.display_path(),
                "profiles": list,
            }))
        }
        _ => {
            if profiles.is_empty() {
                println!("No profiles configured.");
                println!("Use 'scwctl profile set' to create a profile.");
                return Ok(());
            }
            let mut table = Table::new();
            table.set_header(vec!["", "NAME", "PROJECT", "ZONE", "REGION", "SECRET"]);
            for (name, profile) in profiles {
                let marker = if active.as_deref() == Some(name.as_str()) {
                    "*".green().to_string()
                } else {
                    String::new()
                };
                table.add_row(vec![
                    marker,
                    name.clone(),
                    dash(&profile.default_project_id),
                    dash(&profile.default_zone),
                    dash(&profile.default_region),
                    secret_storage(profile).to_string(),
                ]);
            }
            println!("{table}");
            Ok(())
        }
    }
}

fn handle_path(ctx: &CommandContext<'_>) -> CliResult<()> {
    let path = ctx
        .conn_mgr
        .display_path()
        .ok_or_else(|| ScwCtlError::Configuration("cannot determine config directory".into()))?;
    match ctx.output {
        OutputFormat::Json | OutputFormat::Yaml => ctx.print(json!({ "config_path": path })),
        _ => {
            println!("{path}");
            Ok(())
        }
    }
}

fn handle_show(ctx: &CommandContext<'_>, name: Option<&str>) -> CliResult<()> {
    let config = &ctx.conn_mgr.config;
    let name = config.resolve_profile_name(name)?;
    let profile = config
        .profiles
        .get(&name)
        .ok_or_else(|| ScwCtlError::ProfileNotFound { name: name.clone() })?;

    let data = json!({
        "name": name,
        "active": config.resolve_profile_name(None).ok().as_deref() == Some(name.as_str()),
        "access_key": profile.access_key,
        "secret_key": profile.secret_key.as_ref().map(|_| secret_storage(profile)),
        "api_url": profile.api_url,
        "default_organization_id": profile.default_organization_id,
        "default_project_id": profile.default_project_id,
        "default_region": profile.default_region,
        "default_zone": profile.default_zone,
        "default_page_size": profile.default_page_size,
        "polling": profile.polling,
    });

    match ctx.output {
        OutputFormat::Auto => {
            println!("Profile: {}", name.bold());
            if let Some(obj) = data.as_object() {
                for (key, value) in obj.iter().filter(|(k, _)| *k != "name") {
                    let text = match value {
                        serde_json::Value::Null => continue,
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    println!("  {key}: {text}");
                }
            }
            Ok(())
        }
        _ => ctx.print(data),
    }
}

/// Fields `profile set` may change; `None` keeps the stored value
#[derive(Debug, Default)]
struct ProfileUpdate {
    access_key: Option<String>,
    secret_key: Option<String>,
    api_url: Option<String>,
    default_organization_id: Option<String>,
    default_project_id: Option<String>,
    default_region: Option<Region>,
    default_zone: Option<Zone>,
    default_page_size: Option<u32>,
    poll_interval: Option<u64>,
    poll_timeout: Option<u64>,
}

impl ProfileUpdate {
    fn apply(self, mut profile: Profile) -> Profile {
        fn set<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        set(&mut profile.access_key, self.access_key);
        set(&mut profile.secret_key, self.secret_key);
        set(&mut profile.api_url, self.api_url);
        set(&mut profile.default_organization_id, self.default_organization_id);
        set(&mut profile.default_project_id, self.default_project_id);
        set(&mut profile.default_region, self.default_region.map(|r| r.to_string()));
        set(&mut profile.default_zone, self.default_zone.map(|z| z.to_string()));
        set(&mut profile.default_page_size, self.default_page_size);

        if self.poll_interval.is_some() || self.poll_timeout.is_some() {
            let mut polling = profile.polling.unwrap_or_default();
            if let Some(interval) = self.poll_interval {
                polling.interval_secs = interval;
            }
            if let Some(timeout) = self.poll_timeout {
                polling.timeout_secs = timeout;
            }
            profile.polling = Some(polling);
        }
        profile
    }
}

fn handle_set(
    conn_mgr: &ConnectionManager,
    name: &str,
    mut update: ProfileUpdate,
    use_keyring: bool,
) -> CliResult<()> {
    debug!("Setting profile: {}", name);

    if use_keyring && let Some(secret) = update.secret_key.take() {
        let reference =
            CredentialStore::new().store_credential(&format!("{name}-secret-key"), &secret)?;
        update.secret_key = Some(reference);
    }

    let mut config = conn_mgr.config.clone();
    let existing = config.profiles.get(name).cloned().unwrap_or_default();
    let created = !config.profiles.contains_key(name);
    config.set_profile(name.to_string(), update.apply(existing));
    if config.profiles.len() == 1 && config.active_profile.is_none() {
        config.active_profile = Some(name.to_string());
    }
    conn_mgr.save_config(&config)?;

    info!(profile = name, created, "profile saved");
    if created {
        eprintln!("Profile '{}' created", name);
    } else {
        eprintln!("Profile '{}' updated", name);
    }
    Ok(())
}

fn handle_remove(conn_mgr: &ConnectionManager, name: &str) -> CliResult<()> {
    debug!("Removing profile: {}", name);
    let mut config = conn_mgr.config.clone();
    let removed = config
        .remove_profile(name)
        .ok_or_else(|| ScwCtlError::ProfileNotFound { name: name.into() })?;

    if let Some(reference) = removed.secret_key.as_deref()
        && let Some(entry) = reference.strip_prefix(scwctl_core::config::credential::KEYRING_PREFIX)
    {
        CredentialStore::new().delete_credential(entry)?;
    }

    conn_mgr.save_config(&config)?;
    eprintln!("Profile '{}' removed", name);
    Ok(())
}

fn handle_use(conn_mgr: &ConnectionManager, name: &str) -> CliResult<()> {
    let mut config = conn_mgr.config.clone();
    config.set_active_profile(name)?;
    conn_mgr.save_config(&config)?;
    eprintln!("Active profile is now '{}'", name);
    Ok(())
}

fn dash(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

fn secret_storage(profile: &Profile) -> &'static str {
    match profile.secret_key.as_deref() {
        Some(s) if CredentialStore::is_keyring_reference(s) => "keyring",
        Some(_) => "***",
        None => "-",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scwctl_core::config::PollingConfig;

    #[test]
    fn test_update_keeps_unset_fields() {
        let existing = Profile {
            secret_key: Some("old".to_string()),
            default_project_id: Some("p1".to_string()),
            ..Default::default()
        };
        let updated = ProfileUpdate {
            default_zone: Some("nl-ams-2".parse().unwrap()),
            poll_timeout: Some(60),
            ..Default::default()
        }
        .apply(existing);

        assert_eq!(updated.secret_key.as_deref(), Some("old"));
        assert_eq!(updated.default_project_id.as_deref(), Some("p1"));
        assert_eq!(updated.default_zone.as_deref(), Some("nl-ams-2"));
        assert_eq!(
            updated.polling,
            Some(PollingConfig {
                interval_secs: 5,
                timeout_secs: 60
            })
        );
    }

    #[test]
    fn test_secret_storage_never_shows_the_secret() {
        let mut profile = Profile {
            secret_key: Some("plain-secret".to_string()),
            ..Default::default()
        };
        assert_eq!(secret_storage(&profile), "***");
        profile.secret_key = Some("keyring:prod-secret-key".to_string());
        assert_eq!(secret_storage(&profile), "keyring");
        profile.secret_key = None;
        assert_eq!(secret_storage(&profile), "-");
    }
}
