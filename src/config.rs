use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::logging::LogConfig;

pub const DEFAULT_CONFIG_FILE: &str = "incmon.toml";
pub const ENV_PREFIX: &str = "INCMON_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the incident service, e.g. `http://localhost:8000/api/v1`.
    pub api_url: String,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
    pub verbose: bool,
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000/api/v1".to_string(),
            poll_interval_ms: 1000,
            request_timeout_secs: 10,
            verbose: false,
            json_logs: false,
        }
    }
}

impl AppConfig {
    /// Layer defaults, the TOML file, `INCMON_*` variables and command line
    /// overrides, in that order. A missing config file is not an error.
    pub fn load<T: Serialize>(path: Option<&Path>, overrides: Option<&T>) -> Result<Self> {
        let path = path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));

        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX));

        if let Some(overrides) = overrides {
            figment = figment.merge(Serialized::defaults(overrides));
        }

        let config: AppConfig = figment
            .extract()
            .with_context(|| format!("Failed to load configuration ({})", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            bail!("api_url must not be empty");
        }
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            json: self.json_logs,
            verbose: self.verbose,
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[derive(Serialize)]
    struct Overrides {
        #[serde(skip_serializing_if = "Option::is_none")]
        poll_interval_ms: Option<u64>,
    }

    fn missing_file() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = missing_file();
        let config =
            AppConfig::load(Some(&dir.path().join("absent.toml")), None::<&Overrides>).unwrap();

        assert_eq!(config.api_url, "http://localhost:8000/api/v1");
        assert_eq!(config.poll_interval(), Duration::from_millis(1000));
    }

    #[test]
    fn test_file_then_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api_url = \"http://ops.internal/api/v1\"\npoll_interval_ms = 250\nverbose = true"
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path()), None::<&Overrides>).unwrap();
        assert_eq!(config.api_url, "http://ops.internal/api/v1");
        assert_eq!(config.poll_interval_ms, 250);
        assert!(config.log_config().verbose);

        let overrides = Overrides {
            poll_interval_ms: Some(50),
        };
        let config = AppConfig::load(Some(file.path()), Some(&overrides)).unwrap();
        assert_eq!(config.poll_interval_ms, 50);
        assert_eq!(config.api_url, "http://ops.internal/api/v1");
    }

    #[test]
    fn test_unset_override_keeps_lower_layer() {
        let dir = missing_file();
        let overrides = Overrides {
            poll_interval_ms: None,
        };
        let config =
            AppConfig::load(Some(&dir.path().join("absent.toml")), Some(&overrides)).unwrap();
        assert_eq!(config.poll_interval_ms, 1000);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let dir = missing_file();
        let overrides = Overrides {
            poll_interval_ms: Some(0),
        };
        let err = AppConfig::load(Some(&dir.path().join("absent.toml")), Some(&overrides))
            .unwrap_err();
        assert!(err.to_string().contains("poll_interval_ms"));
    }

    #[test]
    fn test_toml_output_parses_back() {
        let config = AppConfig::default();
        let text = config.to_toml().unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
