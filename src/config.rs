/*!
 * Configuration types for model-method
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ProxyError, Result};

/// Binding between one remote endpoint and one host property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Fixed location of the remote resource
    pub endpoint: String,

    /// Host property the computed value is written to.
    /// Without it the proxy only fetches (no projection).
    #[serde(default)]
    pub host_property: Option<String>,

    /// Emit `change:<property>` even when nothing new was written
    #[serde(default)]
    pub force_change_notification: bool,

    /// Fetch even when the property already holds a value
    #[serde(default)]
    pub force_retrieval: bool,
}

impl ProxyConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            host_property: None,
            force_change_notification: false,
            force_retrieval: false,
        }
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.host_property = Some(property.into());
        self
    }

    pub fn force_change_notification(mut self, enabled: bool) -> Self {
        self.force_change_notification = enabled;
        self
    }

    pub fn force_retrieval(mut self, enabled: bool) -> Self {
        self.force_retrieval = enabled;
        self
    }

    /// Reject configurations that can never do anything useful
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(ProxyError::Config("endpoint must not be empty".to_string()));
        }

        if let Some(property) = &self.host_property {
            if property.trim().is_empty() {
                return Err(ProxyError::Config(
                    "host_property must not be empty when set".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Settings for the HTTP transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Request timeout in seconds (0 = no timeout)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl TransportConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stdout)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Shorthand for log_level = debug
    #[serde(default)]
    pub verbose: bool,
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Everything an embedding application configures, loadable from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub proxy: ProxyConfig,

    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub logging: LogConfig,
}

impl Settings {
    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(contents)?;
        settings.proxy.validate()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ProxyError::Config(format!("Failed to serialize settings: {}", e)))
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("model-method/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_from_minimal_toml() {
        let settings = Settings::from_toml_str(
            r#"
            [proxy]
            endpoint = "http://localhost:8000/api/v1/report/"
            "#,
        )
        .unwrap();

        assert_eq!(settings.proxy.host_property, None);
        assert!(!settings.proxy.force_change_notification);
        assert!(!settings.proxy.force_retrieval);
        assert_eq!(settings.transport.timeout_secs, 30);
        assert_eq!(settings.logging.log_level, LogLevel::Info);
    }

    #[test]
    fn test_full_toml() {
        let settings = Settings::from_toml_str(
            r#"
            [proxy]
            endpoint = "http://localhost:8000/api/v1/report/?pk=3&method=total"
            host_property = "total"
            force_change_notification = true
            force_retrieval = true

            [transport]
            timeout_secs = 0
            user_agent = "tests"

            [logging]
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(settings.proxy.host_property.as_deref(), Some("total"));
        assert!(settings.proxy.force_change_notification);
        assert!(settings.proxy.force_retrieval);
        assert_eq!(settings.transport.timeout(), None);
        assert_eq!(settings.logging.log_level.to_tracing_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_empty_endpoint_rejected() {
        let err = Settings::from_toml_str("[proxy]\nendpoint = \"  \"\n").unwrap_err();
        assert!(matches!(err, ProxyError::Config(_)));
    }

    #[test]
    fn test_empty_property_rejected() {
        let config = ProxyConfig::new("http://localhost/").with_property("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_endpoint_is_toml_error() {
        let err = Settings::from_toml_str("[proxy]\n").unwrap_err();
        assert!(matches!(err, ProxyError::Toml(_)));
    }

    #[test]
    fn test_file_roundtrip() {
        let settings = Settings {
            proxy: ProxyConfig::new("http://localhost/api/")
                .with_property("owner")
                .force_retrieval(true),
            transport: TransportConfig::default(),
            logging: LogConfig::default(),
        };

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(settings.to_toml_string().unwrap().as_bytes())
            .unwrap();

        let loaded = Settings::from_file(file.path()).unwrap();
        assert_eq!(loaded, settings);
    }
}
