//! Configuration loading and management
//!
//! Connection parameters for the backend come from the environment
//! (`CRM_*` variables) or from a YAML file:
//!
//! ```yaml
//! backend:
//!   api_key: "AIza..."
//!   auth_domain: "my-crm.firebaseapp.com"
//!   project_id: "my-crm"
//!   storage_bucket: "my-crm.appspot.com"
//!   messaging_sender_id: "1234567890"
//!   app_id: "1:1234567890:web:abc"
//! settings:
//!   locale: es
//! ```
//!
//! A configuration that fails [`CrmConfig::validate`] is fatal to startup.

use crate::billing::Locale;
use crate::core::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_DRIVE_FOLDER_BASE_URL: &str = "https://drive.google.com/drive/folders/";
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// The six backend connection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    /// Namespaces every document path
    pub app_id: String,
}

impl BackendConfig {
    /// Environment variable for each field
    pub const ENV_VARS: [(&'static str, &'static str); 6] = [
        ("api_key", "CRM_API_KEY"),
        ("auth_domain", "CRM_AUTH_DOMAIN"),
        ("project_id", "CRM_PROJECT_ID"),
        ("storage_bucket", "CRM_STORAGE_BUCKET"),
        ("messaging_sender_id", "CRM_MESSAGING_SENDER_ID"),
        ("app_id", "CRM_APP_ID"),
    ];

    /// Load from `CRM_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |field: &str, var: &str| -> Result<String> {
            lookup(var).ok_or_else(|| {
                ConfigError::MissingField {
                    field: format!("{} ({})", field, var),
                }
                .into()
            })
        };

        let [api_key, auth_domain, project_id, storage_bucket, messaging_sender_id, app_id] =
            Self::ENV_VARS;
        let config = Self {
            api_key: get(api_key.0, api_key.1)?,
            auth_domain: get(auth_domain.0, auth_domain.1)?,
            project_id: get(project_id.0, project_id.1)?,
            storage_bucket: get(storage_bucket.0, storage_bucket.1)?,
            messaging_sender_id: get(messaging_sender_id.0, messaging_sender_id.1)?,
            app_id: get(app_id.0, app_id.1)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("api_key", &self.api_key),
            ("auth_domain", &self.auth_domain),
            ("project_id", &self.project_id),
            ("storage_bucket", &self.storage_bucket),
            ("messaging_sender_id", &self.messaging_sender_id),
            ("app_id", &self.app_id),
        ];
        if let Some((field, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigError::MissingField {
                field: field.to_string(),
            }
            .into());
        }

        if !self.auth_domain.contains('.') {
            return Err(ConfigError::InvalidValue {
                field: "auth_domain".to_string(),
                value: self.auth_domain.clone(),
                message: "expected a host name".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Application settings, all optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Language of generated payment month names and sidebar labels
    pub locale: Locale,
    pub drive_folder_base_url: String,
    /// Change-feed buffer of the in-memory backend
    pub event_capacity: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            drive_folder_base_url: DEFAULT_DRIVE_FOLDER_BASE_URL.to_string(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl AppSettings {
    /// Defaults overridden by `CRM_LOCALE`, `CRM_DRIVE_FOLDER_BASE_URL`
    /// and `CRM_EVENT_CAPACITY` when set
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        if let Some(locale) = lookup("CRM_LOCALE") {
            settings.locale = locale.parse::<Locale>().map_err(|message| ConfigError::InvalidValue {
                field: "locale".to_string(),
                value: locale.clone(),
                message,
            })?;
        }
        if let Some(url) = lookup("CRM_DRIVE_FOLDER_BASE_URL") {
            settings.drive_folder_base_url = url;
        }
        if let Some(capacity) = lookup("CRM_EVENT_CAPACITY") {
            settings.event_capacity =
                capacity.parse::<usize>().map_err(|_| ConfigError::InvalidValue {
                    field: "event_capacity".to_string(),
                    value: capacity.clone(),
                    message: "expected a positive integer".to_string(),
                })?;
        }
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.drive_folder_base_url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidValue {
                field: "drive_folder_base_url".to_string(),
                value: self.drive_folder_base_url.clone(),
                message: "expected an http(s) URL".to_string(),
            }
            .into());
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "event_capacity".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub settings: AppSettings,
}

impl CrmConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        Self::parse(&content, Some(path.display().to_string()))
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Self::parse(yaml, None)
    }

    /// Backend and settings from `CRM_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            backend: BackendConfig::from_lookup(&lookup)?,
            settings: AppSettings::from_lookup(&lookup)?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.backend.validate()?;
        self.settings.validate()
    }

    fn parse(yaml: &str, file: Option<String>) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn full_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("CRM_API_KEY", "key"),
            ("CRM_AUTH_DOMAIN", "crm.example.com"),
            ("CRM_PROJECT_ID", "crm"),
            ("CRM_STORAGE_BUCKET", "crm.appspot.com"),
            ("CRM_MESSAGING_SENDER_ID", "123"),
            ("CRM_APP_ID", "1:123:web:abc"),
        ]
    }

    #[test]
    fn test_from_lookup() {
        let config = CrmConfig::from_lookup(env(&full_env())).unwrap();
        assert_eq!(config.backend.app_id, "1:123:web:abc");
        assert_eq!(config.settings, AppSettings::default());
    }

    #[test]
    fn test_missing_variable_named_in_error() {
        let mut vars = full_env();
        vars.retain(|(k, _)| *k != "CRM_PROJECT_ID");

        let err = BackendConfig::from_lookup(env(&vars)).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert!(err.to_string().contains("CRM_PROJECT_ID"));
    }

    #[test]
    fn test_auth_domain_must_be_host() {
        let mut vars = full_env();
        vars[1] = ("CRM_AUTH_DOMAIN", "localhost");
        assert!(BackendConfig::from_lookup(env(&vars)).is_err());
    }

    #[test]
    fn test_settings_overrides() {
        let mut vars = full_env();
        vars.push(("CRM_LOCALE", "es"));
        vars.push(("CRM_EVENT_CAPACITY", "16"));

        let config = CrmConfig::from_lookup(env(&vars)).unwrap();
        assert_eq!(config.settings.locale, Locale::Es);
        assert_eq!(config.settings.event_capacity, 16);

        vars.push(("CRM_LOCALE", "fr"));
        // Later pushes win in the map
        assert!(CrmConfig::from_lookup(env(&vars)).is_err());
    }

    #[test]
    fn test_yaml_defaults_settings() {
        let yaml = r#"
backend:
  api_key: key
  auth_domain: crm.example.com
  project_id: crm
  storage_bucket: crm.appspot.com
  messaging_sender_id: "123"
  app_id: "1:123:web:abc"
"#;
        let config = CrmConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.settings.locale, Locale::En);
        assert_eq!(
            config.settings.drive_folder_base_url,
            DEFAULT_DRIVE_FOLDER_BASE_URL
        );
    }

    #[test]
    fn test_yaml_empty_field_rejected() {
        let yaml = r#"
backend:
  api_key: ""
  auth_domain: crm.example.com
  project_id: crm
  storage_bucket: crm.appspot.com
  messaging_sender_id: "123"
  app_id: app
"#;
        let err = CrmConfig::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn test_yaml_serialization() {
        let config = CrmConfig::from_lookup(env(&full_env())).unwrap();
        let yaml = serde_yaml::to_string(&config).unwrap();

        let parsed = CrmConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
