//! Configuration file support.
//!
//! The API key is resolved once from the file (or from the command line)
//! and handed to the client; nothing reads configuration at lookup time.

use crate::backends::virustotal::{VirusTotalConfig, DEFAULT_ENDPOINT};
use crate::core::ConfigError;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// VirusTotal lookup settings.
    #[serde(default)]
    pub virustotal: VirusTotalSettings,
}

/// VirusTotal lookup settings.
#[derive(Clone, Deserialize, Serialize)]
pub struct VirusTotalSettings {
    /// API key (supports ${ENV_VAR} syntax). Empty or absent disables lookups.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Service base URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Connect and read timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// User agent override.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for VirusTotalSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            timeout_seconds: default_timeout_seconds(),
            user_agent: None,
        }
    }
}

impl fmt::Debug for VirusTotalSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirusTotalSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("endpoint", &self.endpoint)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl VirusTotalSettings {
    /// Returns `true` if a non-blank API key is set.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.trim().is_empty())
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_seconds() -> u64 {
    20
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let expanded = expand_vars(content, |name| std::env::var(name).ok());
        let config: Config = serde_yaml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let vt = &self.virustotal;

        let url = reqwest::Url::parse(&vt.endpoint).map_err(|e| {
            ConfigError::Invalid(format!("endpoint '{}' is not a valid URL: {}", vt.endpoint, e))
        })?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(ConfigError::Invalid(format!(
                "endpoint '{}' must use http or https",
                vt.endpoint
            )));
        }

        if vt.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Builds the client configuration, resolving the credential.
    pub fn client_config(&self) -> VirusTotalConfig {
        let vt = &self.virustotal;
        let mut config = VirusTotalConfig::new()
            .with_endpoint(vt.endpoint.clone())
            .with_timeout(Duration::from_secs(vt.timeout_seconds));
        if let Some(api_key) = &vt.api_key {
            config = config.with_api_key(api_key.clone());
        }
        if let Some(user_agent) = &vt.user_agent {
            config = config.with_user_agent(user_agent.clone());
        }
        config
    }

    /// Generate example configuration YAML.
    pub fn example() -> String {
        r#"# vtlookup configuration

virustotal:
  # Lookups are disabled while this is empty; the report URI is still shown.
  api_key: "${VT_APIKEY}"
  endpoint: "https://www.virustotal.com/"
  timeout_seconds: 20          # connect and read timeout
  # user_agent: "my-app/1.0"   # defaults to vtlookup/<version>
"#
        .to_string()
    }
}

/// Expand variables in the format ${VAR_NAME} using `lookup`.
///
/// Unset variables expand to the empty string.
fn expand_vars<F>(content: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    static ENV_VAR: OnceLock<Regex> = OnceLock::new();
    let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

    re.replace_all(content, |caps: &Captures| lookup(&caps[1]).unwrap_or_default())
        .into_owned()
}
