//! Loading and validating the TOML config file.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Environment variable that points at an alternative config file.
pub const CONFIG_ENV: &str = "KIMAI_TRAY_CONFIG";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const MIN_REFRESH_SECS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no config file at {0}")]
    Missing(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Connection settings for the Kimai timesheet API.
///
/// ```toml
/// url = "https://kimai.example.com/api/timesheets"
/// user = "jane"
/// token = "secret"
/// # optional
/// timeout_secs = 10
/// refresh_interval_secs = 60
/// icon = "/path/to/icon.png"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub url: String,
    pub user: String,
    pub token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub refresh_interval_secs: Option<u64>,
    #[serde(default)]
    pub icon: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Config {
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or from [`config_file_path`] when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => config_file_path(),
        };
        let content = std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::Missing(path.clone())
            } else {
                ConfigError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;
        let config = Self::parse(&content, &path)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(self.url.trim())
            .map_err(|e| ConfigError::Invalid(format!("url {:?}: {}", self.url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "url {:?} must use http or https",
                self.url
            )));
        }
        if self.user.trim().is_empty() {
            return Err(ConfigError::Invalid("user must not be empty".to_string()));
        }
        if self.token.trim().is_empty() {
            return Err(ConfigError::Invalid("token must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if let Some(secs) = self.refresh_interval_secs {
            if secs < MIN_REFRESH_SECS {
                return Err(ConfigError::Invalid(format!(
                    "refresh_interval_secs must be at least {}",
                    MIN_REFRESH_SECS
                )));
            }
        }
        Ok(())
    }

    /// Base endpoint without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval_secs.map(Duration::from_secs)
    }
}

/// Return the path to the config file, honouring [`CONFIG_ENV`].
pub fn config_file_path() -> PathBuf {
    if let Some(path) = env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("kimai-tray")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn parse(content: &str) -> Result<Config, ConfigError> {
        Config::parse(content, Path::new("config.toml"))
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let config = parse(
            r#"
            url = "https://kimai.example.com/api/timesheets/"
            user = "jane"
            token = "secret"
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url(), "https://kimai.example.com/api/timesheets");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.refresh_interval(), None);
        assert_eq!(config.icon, None);
    }

    #[test]
    fn optional_keys_are_read() {
        let config = parse(
            r#"
            url = "http://localhost:8001/api/timesheets"
            user = "jane"
            token = "secret"
            timeout_secs = 3
            refresh_interval_secs = 120
            icon = "/opt/kimai/icon.png"
            "#,
        )
        .unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert_eq!(config.refresh_interval(), Some(Duration::from_secs(120)));
        assert_eq!(config.icon, Some(PathBuf::from("/opt/kimai/icon.png")));
    }

    #[test]
    fn missing_token_is_a_parse_error() {
        let err = parse(
            r#"
            url = "https://kimai.example.com/api/timesheets"
            user = "jane"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
    }

    #[test]
    fn empty_credentials_are_rejected() {
        let err = parse(
            r#"
            url = "https://kimai.example.com/api/timesheets"
            user = "jane"
            token = "  "
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn non_http_url_is_rejected() {
        let err = parse(
            r#"
            url = "ftp://kimai.example.com"
            user = "jane"
            token = "secret"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn too_eager_refresh_is_rejected() {
        let err = parse(
            r#"
            url = "https://kimai.example.com/api/timesheets"
            user = "jane"
            token = "secret"
            refresh_interval_secs = 1
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "url = \"https://kimai.example.com/api/timesheets\"\nuser = \"jane\"\ntoken = \"secret\""
        )
        .unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.user, "jane");
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(p) if p == path));
    }
}
