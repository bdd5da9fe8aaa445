//! Credential resolution with optional keyring support
//!
//! A configured value is resolved in this order:
//! 1. the matching `SCW_*` environment variable, when set and non-empty
//! 2. the OS keyring, when the value is a `keyring:<name>` reference
//! 3. the value itself

use super::error::{ConfigError, Result};
use std::env;

/// Prefix that indicates a value should be retrieved from the keyring
pub const KEYRING_PREFIX: &str = "keyring:";

/// Service name for keyring entries
#[cfg(feature = "secure-storage")]
const SERVICE_NAME: &str = "scwctl";

/// Storage backend for credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStorage {
    /// Store in OS keyring
    #[cfg(feature = "secure-storage")]
    Keyring,
    /// Store as plaintext in the config file
    Plaintext,
}

/// Credential store abstraction
#[derive(Debug, Clone)]
pub struct CredentialStore {
    storage: CredentialStorage,
    use_env: bool,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore {
    /// Create a store using the keyring when it is compiled in
    pub fn new() -> Self {
        #[cfg(feature = "secure-storage")]
        let storage = CredentialStorage::Keyring;
        #[cfg(not(feature = "secure-storage"))]
        let storage = CredentialStorage::Plaintext;

        Self {
            storage,
            use_env: true,
        }
    }

    /// Ignore environment overrides (explicit `--config-file` runs)
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    pub fn uses_env(&self) -> bool {
        self.use_env
    }

    /// Store a secret and return the value to write in the config file
    pub fn store_credential(&self, name: &str, value: &str) -> Result<String> {
        match self.storage {
            #[cfg(feature = "secure-storage")]
            CredentialStorage::Keyring => {
                let entry = keyring::Entry::new(SERVICE_NAME, name)
                    .map_err(|e| ConfigError::KeyringError(e.to_string()))?;
                entry.set_password(value).map_err(|e| {
                    ConfigError::KeyringError(format!(
                        "Failed to store credential '{}' in keyring: {}",
                        name, e
                    ))
                })?;
                Ok(format!("{}{}", KEYRING_PREFIX, name))
            }
            CredentialStorage::Plaintext => {
                let _ = name;
                Ok(value.to_string())
            }
        }
    }

    /// Resolve a configured value
    pub fn get_credential(&self, value: &str, env_var: Option<&str>) -> Result<String> {
        if let Some(env_value) = self.env_override(env_var) {
            return Ok(env_value);
        }
        self.resolve_reference(value)
    }

    /// Resolve an optional configured value; the environment can supply one
    /// that the profile lacks
    pub fn get_optional(&self, value: Option<&str>, env_var: Option<&str>) -> Result<Option<String>> {
        if let Some(env_value) = self.env_override(env_var) {
            return Ok(Some(env_value));
        }
        value.map(|v| self.resolve_reference(v)).transpose()
    }

    fn env_override(&self, env_var: Option<&str>) -> Option<String> {
        if !self.use_env {
            return None;
        }
        env_var
            .and_then(|var| env::var(var).ok())
            .filter(|v| !v.is_empty())
    }

    fn resolve_reference(&self, value: &str) -> Result<String> {
        let Some(name) = value.strip_prefix(KEYRING_PREFIX) else {
            return Ok(value.to_string());
        };

        #[cfg(feature = "secure-storage")]
        {
            let entry = keyring::Entry::new(SERVICE_NAME, name)
                .map_err(|e| ConfigError::KeyringError(e.to_string()))?;
            entry.get_password().map_err(|e| {
                ConfigError::KeyringError(format!(
                    "Failed to retrieve credential '{}' from keyring: {}",
                    name, e
                ))
            })
        }
        #[cfg(not(feature = "secure-storage"))]
        {
            Err(ConfigError::CredentialError(format!(
                "'{}' references the keyring but the secure-storage feature is not enabled",
                name
            )))
        }
    }

    /// Delete a keyring entry; plaintext values need no cleanup
    pub fn delete_credential(&self, name: &str) -> Result<()> {
        match self.storage {
            #[cfg(feature = "secure-storage")]
            CredentialStorage::Keyring => {
                let entry = keyring::Entry::new(SERVICE_NAME, name)
                    .map_err(|e| ConfigError::KeyringError(e.to_string()))?;
                match entry.delete_credential() {
                    Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                    Err(e) => Err(ConfigError::KeyringError(format!(
                        "Failed to delete credential from keyring: {}",
                        e
                    ))),
                }
            }
            CredentialStorage::Plaintext => {
                let _ = name;
                Ok(())
            }
        }
    }

    /// Check if a value is a keyring reference
    pub fn is_keyring_reference(value: &str) -> bool {
        value.starts_with(KEYRING_PREFIX)
    }

    /// Get the current storage backend
    pub fn storage_backend(&self) -> &'static str {
        match self.storage {
            #[cfg(feature = "secure-storage")]
            CredentialStorage::Keyring => "keyring",
            CredentialStorage::Plaintext => "plaintext",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_plaintext_value() {
        let store = CredentialStore::new();
        let result = store.get_credential("SCWXXXXXXXXXXXXXXXXX", None).unwrap();
        assert_eq!(result, "SCWXXXXXXXXXXXXXXXXX");
    }

    #[test]
    #[serial]
    fn test_env_var_override() {
        unsafe {
            env::set_var("SCWCTL_TEST_CREDENTIAL", "env-value");
        }

        let store = CredentialStore::new();
        let result = store
            .get_credential("config-value", Some("SCWCTL_TEST_CREDENTIAL"))
            .unwrap();
        assert_eq!(result, "env-value");

        let result = store
            .without_env()
            .get_credential("config-value", Some("SCWCTL_TEST_CREDENTIAL"))
            .unwrap();
        assert_eq!(result, "config-value");

        unsafe {
            env::remove_var("SCWCTL_TEST_CREDENTIAL");
        }
    }

    #[test]
    #[serial]
    fn test_optional_value_from_env() {
        unsafe {
            env::set_var("SCWCTL_TEST_OPTIONAL", "fr-par-2");
        }

        let store = CredentialStore::new();
        assert_eq!(
            store
                .get_optional(None, Some("SCWCTL_TEST_OPTIONAL"))
                .unwrap()
                .as_deref(),
            Some("fr-par-2")
        );

        unsafe {
            env::remove_var("SCWCTL_TEST_OPTIONAL");
        }
        assert_eq!(store.get_optional(None, Some("SCWCTL_TEST_OPTIONAL")).unwrap(), None);
    }

    #[test]
    fn test_keyring_reference_detection() {
        assert!(CredentialStore::is_keyring_reference("keyring:prod-secret"));
        assert!(!CredentialStore::is_keyring_reference("prod-secret"));
        assert!(!CredentialStore::is_keyring_reference(""));
    }

    #[cfg(not(feature = "secure-storage"))]
    #[test]
    fn test_keyring_reference_without_feature() {
        let err = CredentialStore::new()
            .get_credential("keyring:prod-secret", None)
            .unwrap_err();
        assert!(err.to_string().contains("secure-storage"));
    }

    #[cfg(feature = "secure-storage")]
    #[test]
    #[ignore = "Requires keyring service to be available"]
    fn test_keyring_storage() {
        let store = CredentialStore::new();

        let reference = store.store_credential("scwctl-test", "test-value").unwrap();
        assert!(reference.starts_with(KEYRING_PREFIX));

        let retrieved = store.get_credential(&reference, None).unwrap();
        assert_eq!(retrieved, "test-value");

        let _ = store.delete_credential("scwctl-test");
    }
}
