//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables (`NCDISCOVER_*`)
//! - CLI arguments (applied last by the binary)

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DiscoveryError, Result};
use crate::family::Family;
use crate::protocol::DEFAULT_PORT;
use crate::transport::{
    SessionParams, TransportKind, DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_SESSION_TIMEOUT_SECS,
};

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Discovery configuration
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            DiscoveryError::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        toml::from_str(&content)
            .map_err(|e| DiscoveryError::Config(format!("Failed to parse config: {e}")))
    }

    /// Default config file location (`~/.config/ncdiscover/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ncdiscover").join("config.toml"))
    }

    /// Load configuration from environment variables over the defaults
    pub fn from_env() -> Self {
        Self::default().apply(ConfigOverrides::from_env())
    }

    /// Overlay every value set in `overrides`
    pub fn apply(mut self, overrides: ConfigOverrides) -> Self {
        let session = &mut self.session;
        if let Some(host) = overrides.host {
            session.host = Some(host);
        }
        if let Some(port) = overrides.port {
            session.port = port;
        }
        if let Some(username) = overrides.username {
            session.username = Some(username);
        }
        if let Some(password) = overrides.password {
            session.password = Some(password);
        }
        if let Some(transport) = overrides.transport {
            session.transport = transport;
        }
        if let Some(secs) = overrides.command_timeout_secs {
            session.command_timeout_secs = secs;
        }
        if let Some(secs) = overrides.session_timeout_secs {
            session.session_timeout_secs = secs;
        }
        if let Some(family) = overrides.family {
            self.discovery.family = family;
        }
        self
    }

    /// Build session parameters, requiring device and credentials
    pub fn to_session_params(&self) -> Result<SessionParams> {
        let session = &self.session;
        let host = session
            .host
            .as_deref()
            .ok_or_else(|| DiscoveryError::Config("no device given".to_string()))?;
        let username = session
            .username
            .as_deref()
            .ok_or_else(|| DiscoveryError::Config("no username given".to_string()))?;
        let password = session
            .password
            .as_deref()
            .ok_or_else(|| DiscoveryError::Config("no password given".to_string()))?;

        Ok(SessionParams::new(host, username, password)
            .with_port(session.port)
            .with_command_timeout(Duration::from_secs(session.command_timeout_secs))
            .with_session_timeout(Duration::from_secs(session.session_timeout_secs)))
    }
}

/// Explicitly given settings, layered over a [`Config`] with [`Config::apply`].
///
/// A value equal to the default still overrides a lower layer.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub transport: Option<TransportKind>,
    pub command_timeout_secs: Option<u64>,
    pub session_timeout_secs: Option<u64>,
    pub family: Option<Family>,
}

impl ConfigOverrides {
    /// Settings from `NCDISCOVER_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Settings from any `NCDISCOVER_*` key lookup; unparsable values are ignored
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            host: lookup("NCDISCOVER_DEVICE"),
            port: lookup("NCDISCOVER_PORT").and_then(|v| v.parse().ok()),
            username: lookup("NCDISCOVER_USERNAME"),
            password: lookup("NCDISCOVER_PASSWORD"),
            transport: lookup("NCDISCOVER_TRANSPORT").and_then(|v| v.parse().ok()),
            command_timeout_secs: lookup("NCDISCOVER_COMMAND_TIMEOUT").and_then(|v| v.parse().ok()),
            session_timeout_secs: lookup("NCDISCOVER_SESSION_TIMEOUT").and_then(|v| v.parse().ok()),
            family: lookup("NCDISCOVER_TYPE").and_then(|v| v.parse().ok()),
        }
    }
}

impl std::fmt::Debug for ConfigOverrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigOverrides")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("transport", &self.transport)
            .field("command_timeout_secs", &self.command_timeout_secs)
            .field("session_timeout_secs", &self.session_timeout_secs)
            .field("family", &self.family)
            .finish()
    }
}

/// Session configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Device host name or address
    pub host: Option<String>,

    /// Device port
    pub port: u16,

    /// Login user
    pub username: Option<String>,

    /// Login password
    pub password: Option<String>,

    /// Transport carrying the session
    pub transport: TransportKind,

    /// Per-command timeout in seconds
    pub command_timeout_secs: u64,

    /// Session inactivity timeout in seconds
    pub session_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_PORT,
            username: None,
            password: None,
            transport: TransportKind::default(),
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            session_timeout_secs: DEFAULT_SESSION_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("transport", &self.transport)
            .field("command_timeout_secs", &self.command_timeout_secs)
            .field("session_timeout_secs", &self.session_timeout_secs)
            .finish()
    }
}

/// Discovery configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Device family
    #[serde(rename = "type")]
    pub family: Family,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.session.port, 830);
        assert_eq!(config.session.transport, TransportKind::Ssh);
        assert_eq!(config.session.command_timeout_secs, 300);
        assert_eq!(config.session.session_timeout_secs, 3600);
        assert_eq!(config.discovery.family, Family::Sros);
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [session]
            host = "pe1.lab"
            port = 2830
            username = "admin"
            transport = "tcp"

            [discovery]
            type = "sros"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.session.host.as_deref(), Some("pe1.lab"));
        assert_eq!(config.session.port, 2830);
        assert_eq!(config.session.transport, TransportKind::Tcp);
        assert_eq!(config.session.password, None);
        assert_eq!(config.session.command_timeout_secs, 300);
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[session]\nhost = \"10.0.0.1\"\ncommand_timeout_secs = 30").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.session.host.as_deref(), Some("10.0.0.1"));
        assert_eq!(config.session.command_timeout_secs, 30);
    }

    #[test]
    fn test_config_file_errors() {
        let missing = Config::from_file("/nonexistent/ncdiscover.toml");
        assert!(matches!(missing, Err(DiscoveryError::Config(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[session\nhost = ").unwrap();
        assert!(matches!(Config::from_file(file.path()), Err(DiscoveryError::Config(_))));
    }

    #[test]
    fn test_overrides_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("NCDISCOVER_DEVICE", "pe2"),
            ("NCDISCOVER_USERNAME", "ops"),
            ("NCDISCOVER_PORT", "not-a-port"),
            ("NCDISCOVER_TRANSPORT", "tcp"),
            ("NCDISCOVER_TYPE", "nokia"),
        ]
        .into_iter()
        .collect();

        let overrides = ConfigOverrides::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(overrides.port, None);
        assert_eq!(overrides.password, None);

        let config = Config::default().apply(overrides);
        assert_eq!(config.session.host.as_deref(), Some("pe2"));
        assert_eq!(config.session.username.as_deref(), Some("ops"));
        assert_eq!(config.session.port, 830);
        assert_eq!(config.session.transport, TransportKind::Tcp);
        assert_eq!(config.discovery.family, Family::Sros);
    }

    #[test]
    fn test_layer_precedence() {
        let file: Config = toml::from_str(
            "[session]\nhost = \"file-host\"\nusername = \"file-user\"\nport = 2022\n",
        )
        .unwrap();
        let env = ConfigOverrides::from_lookup(|key| {
            (key == "NCDISCOVER_DEVICE").then(|| "env-host".to_string())
        });

        let merged = file.apply(env);
        assert_eq!(merged.session.host.as_deref(), Some("env-host"));
        assert_eq!(merged.session.username.as_deref(), Some("file-user"));
        assert_eq!(merged.session.port, 2022);
    }

    #[test]
    fn test_default_valued_override_still_wins() {
        let file: Config = toml::from_str(
            "[session]\nport = 2022\ntransport = \"tcp\"\ncommand_timeout_secs = 30\n",
        )
        .unwrap();

        // environment sets values equal to the defaults
        let env = ConfigOverrides::from_lookup(|key| match key {
            "NCDISCOVER_TRANSPORT" => Some("ssh".to_string()),
            "NCDISCOVER_COMMAND_TIMEOUT" => Some("300".to_string()),
            _ => None,
        });
        let config = file.apply(env);
        assert_eq!(config.session.transport, TransportKind::Ssh);
        assert_eq!(config.session.command_timeout_secs, 300);
        assert_eq!(config.session.port, 2022);

        let cli = ConfigOverrides {
            port: Some(830),
            ..ConfigOverrides::default()
        };
        let config = config.apply(cli);
        assert_eq!(config.session.port, 830);
        assert_eq!(config.session.command_timeout_secs, 300);
    }

    #[test]
    fn test_to_session_params() {
        let mut config = Config::default();
        assert!(matches!(config.to_session_params(), Err(DiscoveryError::Config(_))));

        config.session.host = Some("pe1".to_string());
        config.session.username = Some("admin".to_string());
        config.session.password = Some("secret".to_string());
        config.session.command_timeout_secs = 10;

        let params = config.to_session_params().unwrap();
        assert_eq!(params.address(), "pe1:830");
        assert_eq!(params.command_timeout, Duration::from_secs(10));
        assert_eq!(params.session_timeout, Duration::from_secs(3600));
    }

    #[test]
    fn test_debug_redacts_password() {
        let mut config = SessionConfig::default();
        config.password = Some("hunter2".to_string());
        assert!(!format!("{config:?}").contains("hunter2"));

        let overrides = ConfigOverrides {
            password: Some("hunter2".to_string()),
            ..ConfigOverrides::default()
        };
        assert!(!format!("{overrides:?}").contains("hunter2"));
    }
}
