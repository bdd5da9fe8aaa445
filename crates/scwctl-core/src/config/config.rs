//! Configuration management
//!
//! Handles configuration loading from files and environment variables.
//! Configuration is stored in TOML format with support for multiple named profiles:
//!
//! ```toml
//! active_profile = "prod"
//!
//! [profiles.prod]
//! access_key = "SCWXXXXXXXXXXXXXXXXX"
//! secret_key = "keyring:prod-secret"
//! default_project_id = "${SCW_PROJECT:-11111111-1111-1111-1111-111111111111}"
//! default_zone = "fr-par-1"
//!
//! [profiles.prod.polling]
//! interval_secs = 2
//! timeout_secs = 600
//! ```

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::PollingConfig;
use super::credential::CredentialStore;
use super::error::{ConfigError, Result};
use crate::client::DEFAULT_API_URL;
use crate::locality::{Region, Zone};
use crate::wait::WaitOptions;

pub const ENV_ACCESS_KEY: &str = "SCW_ACCESS_KEY";
pub const ENV_SECRET_KEY: &str = "SCW_SECRET_KEY";
pub const ENV_API_URL: &str = "SCW_API_URL";
pub const ENV_DEFAULT_ORGANIZATION_ID: &str = "SCW_DEFAULT_ORGANIZATION_ID";
pub const ENV_DEFAULT_PROJECT_ID: &str = "SCW_DEFAULT_PROJECT_ID";
pub const ENV_DEFAULT_REGION: &str = "SCW_DEFAULT_REGION";
pub const ENV_DEFAULT_ZONE: &str = "SCW_DEFAULT_ZONE";

/// Profile name used when credentials come only from the environment
pub const ENV_PROFILE_NAME: &str = "env";

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Profile used when none is given explicitly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Individual profile configuration, as written in the file
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    /// Secret key or `keyring:<name>` reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_organization_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polling: Option<PollingConfig>,
}

/// A profile with environment overrides applied and secrets resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProfile {
    pub name: String,
    pub access_key: Option<String>,
    pub secret_key: String,
    pub api_url: String,
    pub default_organization_id: Option<String>,
    pub default_project_id: Option<String>,
    pub default_region: Option<Region>,
    pub default_zone: Option<Zone>,
    pub default_page_size: Option<u32>,
    pub wait: WaitOptions,
}

impl Profile {
    /// Check if this profile has a secret key configured
    pub fn has_secret_key(&self) -> bool {
        self.secret_key.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Apply environment overrides, resolve keyring references and validate
    pub fn resolve(&self, name: &str, store: &CredentialStore) -> Result<ResolvedProfile> {
        let credential_err = |field: &str, e: ConfigError| {
            ConfigError::CredentialError(format!("Failed to resolve {}: {}", field, e))
        };

        let access_key = store
            .get_optional(self.access_key.as_deref(), Some(ENV_ACCESS_KEY))
            .map_err(|e| credential_err("access key", e))?;
        let secret_key = store
            .get_optional(self.secret_key.as_deref(), Some(ENV_SECRET_KEY))
            .map_err(|e| credential_err("secret key", e))?
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingCredential {
                profile: name.to_string(),
                field: "secret_key".to_string(),
            })?;
        let api_url = store
            .get_optional(self.api_url.as_deref(), Some(ENV_API_URL))?
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let default_organization_id = store.get_optional(
            self.default_organization_id.as_deref(),
            Some(ENV_DEFAULT_ORGANIZATION_ID),
        )?;
        let default_project_id = store.get_optional(
            self.default_project_id.as_deref(),
            Some(ENV_DEFAULT_PROJECT_ID),
        )?;

        let default_zone = store
            .get_optional(self.default_zone.as_deref(), Some(ENV_DEFAULT_ZONE))?
            .map(|z| {
                z.parse::<Zone>().map_err(|e| ConfigError::InvalidValue {
                    field: "default_zone".to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()?;
        let default_region = store
            .get_optional(self.default_region.as_deref(), Some(ENV_DEFAULT_REGION))?
            .map(|r| {
                r.parse::<Region>().map_err(|e| ConfigError::InvalidValue {
                    field: "default_region".to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()?
            // A default zone implies its region
            .or_else(|| default_zone.as_ref().map(Zone::region));

        if self.default_page_size == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "default_page_size".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.polling.is_some_and(|p| p.interval_secs == 0) {
            return Err(ConfigError::InvalidValue {
                field: "polling.interval_secs".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(ResolvedProfile {
            name: name.to_string(),
            access_key,
            secret_key,
            api_url,
            default_organization_id,
            default_project_id,
            default_region,
            default_zone,
            default_page_size: self.default_page_size,
            wait: self.polling.unwrap_or_default().to_wait_options(),
        })
    }
}

impl Config {
    /// Pick the profile name to use
    ///
    /// Resolution order: explicit name, `active_profile`, then the first
    /// profile sorted by name.
    pub fn resolve_profile_name(&self, explicit_profile: Option<&str>) -> Result<String> {
        let check = |name: &str| {
            if self.profiles.contains_key(name) {
                Ok(name.to_string())
            } else {
                Err(ConfigError::ProfileNotFound {
                    name: name.to_string(),
                })
            }
        };

        if let Some(name) = explicit_profile {
            return check(name);
        }
        if let Some(ref name) = self.active_profile {
            return check(name);
        }
        if let Some((name, _)) = self.list_profiles().first() {
            return Ok(name.to_string());
        }

        Err(ConfigError::NoProfiles {
            suggestion: format!(
                "Use 'scwctl profile set' to create a profile, or export {} and {}.",
                ENV_ACCESS_KEY, ENV_SECRET_KEY
            ),
        })
    }

    /// Resolve the profile to build a client from
    ///
    /// With no profiles on file, credentials may come from the environment
    /// alone when `SCW_SECRET_KEY` is set.
    pub fn resolve(
        &self,
        explicit_profile: Option<&str>,
        store: &CredentialStore,
    ) -> Result<ResolvedProfile> {
        if explicit_profile.is_none()
            && self.profiles.is_empty()
            && store.uses_env()
            && std::env::var(ENV_SECRET_KEY).is_ok_and(|v| !v.is_empty())
        {
            debug!("No profiles configured, trying environment credentials");
            return Profile::default().resolve(ENV_PROFILE_NAME, store);
        }

        let name = self.resolve_profile_name(explicit_profile)?;
        debug!("Using profile: {}", name);
        let profile = self
            .profiles
            .get(&name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.clone() })?;
        profile.resolve(&name, store)
    }

    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        // Expand environment variables in the config content
        let expanded_content = Self::expand_env_vars(&content);

        let config: Config = toml::from_str(&expanded_content)?;

        Ok(config)
    }

    /// Save configuration to the standard location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(config_path, content).map_err(|e| ConfigError::SaveError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    /// Set or update a profile
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Remove a profile by name
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        if self.active_profile.as_deref() == Some(name) {
            self.active_profile = None;
        }
        self.profiles.remove(name)
    }

    /// Make `name` the active profile
    pub fn set_active_profile(&mut self, name: &str) -> Result<()> {
        if !self.profiles.contains_key(name) {
            return Err(ConfigError::ProfileNotFound {
                name: name.to_string(),
            });
        }
        self.active_profile = Some(name.to_string());
        Ok(())
    }

    /// List all profiles sorted by name
    pub fn list_profiles(&self) -> Vec<(&String, &Profile)> {
        let mut profiles: Vec<_> = self.profiles.iter().collect();
        profiles.sort_by_key(|(name, _)| *name);
        profiles
    }

    /// Get the path to the configuration file
    ///
    /// On macOS, `~/.config/scwctl/config.toml` wins when it (or its
    /// directory) exists; otherwise the platform default is used:
    ///
    /// On Linux: ~/.config/scwctl/config.toml
    /// On macOS: ~/Library/Application Support/com.scwctl.scwctl/config.toml
    /// On Windows: %APPDATA%\scwctl\scwctl\config.toml
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let linux_style_path = base_dirs
                    .home_dir()
                    .join(".config")
                    .join("scwctl")
                    .join("config.toml");

                if linux_style_path.exists()
                    || linux_style_path.parent().is_some_and(|p| p.exists())
                {
                    return Ok(linux_style_path);
                }
            }
        }

        let proj_dirs =
            ProjectDirs::from("com", "scwctl", "scwctl").ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand `${VAR}` and `${VAR:-default}` references
    ///
    /// Unset variables are left as-is so profiles that are not used don't
    /// fail to load.
    fn expand_env_vars(content: &str) -> String {
        let expanded =
            shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok());
        expanded.to_string()
    }
}
