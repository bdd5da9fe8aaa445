//! Building authenticated clients from the loaded configuration

use std::path::PathBuf;

use scwctl_core::{Config, CredentialStore, ResolvedProfile, ScwClient};
use tracing::{debug, info};

use crate::error::{Result as CliResult, ScwCtlError};

/// Owns the configuration and where it came from
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl ConnectionManager {
    /// Create a new connection manager with a custom config path
    pub fn with_config_path(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Save an updated configuration where this one was loaded from
    pub fn save_config(&self, config: &Config) -> CliResult<()> {
        match self.config_path {
            Some(ref path) => config.save_to_path(path)?,
            None => config.save()?,
        }
        Ok(())
    }

    /// Path of the file in use, for display
    pub fn display_path(&self) -> Option<String> {
        self.config_path
            .clone()
            .or_else(|| Config::config_path().ok())
            .map(|p| p.display().to_string())
    }

    /// Credential store to resolve profiles with
    ///
    /// When --config-file is explicitly specified, `SCW_*` environment
    /// variables are ignored so the file alone decides.
    pub fn credential_store(&self) -> CredentialStore {
        let store = CredentialStore::new();
        if self.config_path.is_some() {
            info!("--config-file specified explicitly, ignoring environment variables");
            store.without_env()
        } else {
            store
        }
    }

    /// Resolve the profile a command should run with
    pub fn resolve_profile(&self, profile_name: Option<&str>) -> CliResult<ResolvedProfile> {
        let profile = self
            .config
            .resolve(profile_name, &self.credential_store())?;
        info!("Using profile: {}", profile.name);
        Ok(profile)
    }

    /// Create an API client for the selected profile
    pub fn create_client(&self, profile_name: Option<&str>) -> CliResult<ScwClient> {
        debug!("Creating Scaleway client");
        let profile = self.resolve_profile(profile_name)?;
        ScwClient::from_profile(&profile).map_err(ScwCtlError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scwctl_core::Profile;

    fn manager_with(profile: Profile) -> ConnectionManager {
        let mut config = Config::default();
        config.set_profile("dev".to_string(), profile);
        ConnectionManager::with_config_path(config, Some(PathBuf::from("/nonexistent.toml")))
    }

    #[test]
    fn test_create_client_uses_profile_defaults() {
        let mgr = manager_with(Profile {
            secret_key: Some("secret".to_string()),
            api_url: Some("http://localhost:1234".to_string()),
            default_zone: Some("nl-ams-1".to_string()),
            ..Default::default()
        });
        let client = mgr.create_client(None).unwrap();
        assert_eq!(client.api_url(), "http://localhost:1234");
        assert_eq!(client.default_zone().unwrap().to_string(), "nl-ams-1");
        assert_eq!(client.default_region().unwrap().to_string(), "nl-ams");
    }

    #[test]
    fn test_unknown_profile_is_reported() {
        let mgr = manager_with(Profile {
            secret_key: Some("secret".to_string()),
            ..Default::default()
        });
        let err = mgr.create_client(Some("prod")).unwrap_err();
        assert!(matches!(err, ScwCtlError::ProfileNotFound { ref name } if name == "prod"));
    }

    #[test]
    fn test_missing_secret_is_reported() {
        let mgr = manager_with(Profile::default());
        let err = mgr.create_client(None).unwrap_err();
        assert!(matches!(err, ScwCtlError::MissingCredentials { ref name } if name == "dev"));
    }
}
