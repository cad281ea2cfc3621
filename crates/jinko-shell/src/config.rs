//! Shell configuration
//!
//! Layered lowest to highest: built-in defaults, an optional TOML file, the
//! `JINKO_*` environment, then command-line flags.

use jinko_core::{AuditContext, ControllerConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding the API base address
pub const ENV_API_URL: &str = "JINKO_API_URL";

/// Environment variable naming the signed-in agent
pub const ENV_AGENT: &str = "JINKO_AGENT";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config {path}: {source}")]
    Read {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid configuration
    #[error("invalid config {path}: {source}")]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },
}

/// Shell configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// API base address
    pub api_base_url: String,
    /// Agent signed in at startup; absent means signed out
    pub agent_name: Option<String>,
    /// Context sent with every audit
    pub audit: AuditContext,
    /// MIME types accepted for identity uploads
    pub accepted_content_types: Vec<String>,
    /// Per-request timeout; none by default
    pub request_timeout_secs: Option<u64>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        let controller = ControllerConfig::default();
        Self {
            api_base_url: jinko_client::DEFAULT_BASE_URL.to_string(),
            agent_name: None,
            audit: controller.audit_context,
            accepted_content_types: controller.accepted_content_types,
            request_timeout_secs: None,
        }
    }
}

impl ShellConfig {
    /// Load from a TOML file; missing fields take their defaults
    ///
    /// # Errors
    /// `Read` if the file cannot be read, `Parse` if it is not valid TOML
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment overrides read through `lookup`
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(agent) = lookup(ENV_AGENT).filter(|v| !v.trim().is_empty()) {
            self.agent_name = Some(agent);
        }
        self
    }

    /// With API base address
    #[inline]
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// With signed-in agent
    #[inline]
    #[must_use]
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent_name = Some(agent.into());
        self
    }

    /// Request timeout, if configured
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Controller configuration derived from this config
    #[must_use]
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig::new()
            .with_audit_context(self.audit.clone())
            .with_accepted_content_types(self.accepted_content_types.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_match_local_service() {
        let config = ShellConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8000/api");
        assert_eq!(config.agent_name, None);
        assert_eq!(config.audit.state, "AZ");
        assert_eq!(config.accepted_content_types, vec!["image/png", "image/jpeg"]);
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
api_base_url = "https://brain.example.com/api"
request_timeout_secs = 30

[audit]
state = "CA"
is_owner = true
"#
        )
        .unwrap();

        let config = ShellConfig::load(file.path()).unwrap();
        assert_eq!(config.api_base_url, "https://brain.example.com/api");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.audit.state, "CA");
        assert!(config.audit.is_owner);
        assert_eq!(config.audit.brokerage, "Jinko Realty");
        assert_eq!(config.accepted_content_types, vec!["image/png", "image/jpeg"]);
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ShellConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_base_url = [").unwrap();
        let err = ShellConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn environment_overrides_file() {
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_API_URL, "http://10.0.0.5:8000/api"), (ENV_AGENT, "Dana")]);
        let config = ShellConfig::default()
            .with_api_url("http://from-file/api")
            .with_env(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.api_base_url, "http://10.0.0.5:8000/api");
        assert_eq!(config.agent_name.as_deref(), Some("Dana"));
    }

    #[test]
    fn blank_environment_is_ignored() {
        let config = ShellConfig::default().with_env(|_| Some("  ".to_string()));
        assert_eq!(config, ShellConfig::default());
    }

    #[test]
    fn controller_config_carries_audit_context() {
        let mut config = ShellConfig::default();
        config.audit.rules = "Strict".to_string();
        assert_eq!(config.controller_config().audit_context.rules, "Strict");
    }
}
