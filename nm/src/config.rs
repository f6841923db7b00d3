//! nextmeal configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main nextmeal configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Backend connection settings
    pub backend: BackendConfig,

    /// Which identity providers are offered and their parameters
    pub identity: IdentityConfig,

    /// External identity provider redirect settings
    pub federated: FederatedConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if self.backend.base_url.trim().is_empty() {
            return Err(eyre::eyre!("backend.base-url must not be empty"));
        }
        if self.backend.timeout_ms == 0 {
            return Err(eyre::eyre!("backend.timeout-ms must be greater than zero"));
        }
        if self.identity.providers.is_empty() {
            return Err(eyre::eyre!("identity.providers must list at least one provider"));
        }
        if self.identity.providers.contains(&ProviderKind::Federated) && self.federated.authorize_url.trim().is_empty() {
            return Err(eyre::eyre!(
                "identity.providers includes 'federated' but federated.authorize-url is not set"
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .nextmeal.yml
        let local_config = PathBuf::from(".nextmeal.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/nextmeal/nextmeal.yml
        if let Some(user_config) = user_config_path() {
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialized
    ///
    /// Errors are swallowed; the full load reports them once logging is up.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates: Vec<PathBuf> = match config_path {
            Some(path) => vec![path.clone()],
            None => std::iter::once(PathBuf::from(".nextmeal.yml"))
                .chain(user_config_path())
                .collect(),
        };
        candidates
            .iter()
            .filter(|p| p.exists())
            .find_map(|p| Self::load_from_file(p).ok())
            .and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("nextmeal").join("nextmeal.yml"))
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Upper bound on every network call in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Page size when scanning the meal catalog
    #[serde(rename = "catalog-limit")]
    pub catalog_limit: u32,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_ms: 15_000,
            catalog_limit: 100,
        }
    }
}

/// Identity provider variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Self-hosted, password-less registration against `/users/`
    Local,
    /// External OAuth redirect flow
    Federated,
    /// Fixed, pre-provisioned guest account
    Guest,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProviderKind::Local => "local",
            ProviderKind::Federated => "federated",
            ProviderKind::Guest => "guest",
        };
        f.write_str(name)
    }
}

/// Identity settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Enabled providers
    pub providers: Vec<ProviderKind>,

    /// Backend id of the pre-provisioned guest account
    #[serde(rename = "guest-id")]
    pub guest_id: i64,

    /// Credential sent with registrations (the backend requires one)
    #[serde(rename = "placeholder-password")]
    pub placeholder_password: String,

    /// Display name when none is known
    #[serde(rename = "default-name")]
    pub default_name: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            providers: vec![ProviderKind::Local, ProviderKind::Guest],
            guest_id: 1,
            placeholder_password: "password123".to_string(),
            default_name: "Friend".to_string(),
        }
    }
}

impl IdentityConfig {
    pub fn allows(&self, kind: ProviderKind) -> bool {
        self.providers.contains(&kind)
    }
}

/// External identity provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FederatedConfig {
    /// Provider authorize endpoint the user is redirected to
    #[serde(rename = "authorize-url")]
    pub authorize_url: String,

    /// Where the provider sends the user back to
    #[serde(rename = "return-url")]
    pub return_url: String,
}

impl Default for FederatedConfig {
    fn default() -> Self {
        Self {
            authorize_url: String::new(),
            return_url: "http://localhost:3000/auth/callback".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.backend.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.backend.timeout(), Duration::from_secs(15));
        assert_eq!(config.identity.guest_id, 1);
        assert!(config.identity.allows(ProviderKind::Local));
        assert!(config.identity.allows(ProviderKind::Guest));
        assert!(!config.identity.allows(ProviderKind::Federated));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: DEBUG
backend:
  base-url: https://meals.example.com
  timeout-ms: 5000
  catalog-limit: 50
identity:
  providers: [federated, guest]
  guest-id: 3
federated:
  authorize-url: https://auth.example.com/authorize
  return-url: https://app.example.com/callback
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("DEBUG"));
        assert_eq!(config.backend.base_url, "https://meals.example.com");
        assert_eq!(config.backend.catalog_limit, 50);
        assert_eq!(
            config.identity.providers,
            vec![ProviderKind::Federated, ProviderKind::Guest]
        );
        assert_eq!(config.identity.guest_id, 3);
        assert_eq!(config.federated.return_url, "https://app.example.com/callback");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
backend:
  timeout-ms: 2500
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.backend.timeout_ms, 2500);
        assert_eq!(config.backend.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.identity.default_name, "Friend");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.backend.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.identity.providers.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.identity.providers.push(ProviderKind::Federated);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("authorize-url"));
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backend:\n  base-url: http://localhost:9999\nlog-level: WARN").unwrap();
        let path = file.path().to_path_buf();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.backend.base_url, "http://localhost:9999");
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("WARN"));
    }

    #[test]
    fn test_load_explicit_path_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yml");
        assert!(Config::load(Some(&path)).is_err());
    }
}
