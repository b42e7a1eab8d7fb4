use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable that overrides `weather.api_key`
pub const API_KEY_ENV: &str = "CLIMA_OWM_API_KEY";

const DEFAULT_FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";
const DEFAULT_LANG: &str = "es";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const MAX_REASONABLE_TIMEOUT_SECS: u64 = 120;

/// One problem found in a config field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Outcome of [`Config::validate`]. Errors block startup, warnings are logged.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigIssue>,
    pub warnings: Vec<ConfigIssue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(ConfigIssue {
            field,
            message: message.into(),
        });
    }

    fn warn(&mut self, field: &'static str, message: impl Into<String>) {
        self.warnings.push(ConfigIssue {
            field,
            message: message.into(),
        });
    }

    /// All errors joined for a single log or error line
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(ConfigIssue::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding `config.toml`
    pub config_dir: PathBuf,

    /// Forecast service settings
    #[serde(default)]
    pub weather: WeatherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key. `CLIMA_OWM_API_KEY` takes precedence when set.
    #[serde(default)]
    pub api_key: String,

    /// Forecast endpoint, without query string
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Language for weather descriptions
    #[serde(default = "default_lang")]
    pub lang: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// IANA timezone used to group entries into days (e.g. "Europe/Madrid").
    /// Unset means the system timezone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_FORECAST_URL.to_string()
}

fn default_lang() -> String {
    DEFAULT_LANG.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            lang: default_lang(),
            timeout_secs: default_timeout_secs(),
            timezone: None,
        }
    }
}

impl WeatherConfig {
    /// API key from the environment if set, otherwise from the file.
    pub fn effective_api_key(&self) -> String {
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => key.trim().to_string(),
            _ => self.api_key.trim().to_string(),
        }
    }

    fn check(&self, result: &mut ValidationResult) {
        check_endpoint(&self.base_url, result);

        match self.timeout_secs {
            0 => result.error("weather.timeout_secs", "Timeout must be greater than 0"),
            secs if secs > MAX_REASONABLE_TIMEOUT_SECS => result.warn(
                "weather.timeout_secs",
                format!("Timeout is unusually long (>{}s)", MAX_REASONABLE_TIMEOUT_SECS),
            ),
            _ => {}
        }

        if self.lang.trim().is_empty() {
            result.error("weather.lang", "Language must not be empty");
        }

        let zone = self.timezone.as_deref().map(str::trim).unwrap_or_default();
        if !zone.is_empty() && zone.parse::<chrono_tz::Tz>().is_err() {
            result.error("weather.timezone", format!("Unknown timezone: {}", zone));
        }

        if self.effective_api_key().is_empty() {
            result.warn(
                "weather.api_key",
                format!("No API key configured, set weather.api_key or {}", API_KEY_ENV),
            );
        }
    }
}

/// The forecast endpoint must be an absolute http(s) URL; its query is rebuilt per request.
fn check_endpoint(raw: &str, result: &mut ValidationResult) {
    const FIELD: &str = "weather.base_url";

    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(e) => return result.error(FIELD, format!("Invalid URL: {}", e)),
    };

    if !matches!(url.scheme(), "http" | "https") {
        result.error(FIELD, format!("URL must use http or https scheme, got: {}", url.scheme()));
    }
    if url.host().is_none() {
        result.error(FIELD, "URL must have a host");
    }
    if url.query().is_some() {
        result.warn(FIELD, "Query string will be replaced per request");
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clima");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
        }
    }
}

impl Config {
    /// Load `config.toml` from the user config directory, writing defaults on first run
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from an explicit path, writing defaults if the file is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut config = Self::default();
                if let Some(dir) = path.parent() {
                    config.config_dir = dir.to_path_buf();
                }
                config.save_to(path)?;
                tracing::info!("Created default config at {}", path.display());
                Ok(config)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    /// [`Config::load`], then reject it on validation errors. Warnings are logged.
    pub fn load_validated() -> Result<Self> {
        Self::load()?.into_validated()
    }

    fn into_validated(self) -> Result<Self> {
        let validation = self.validate();
        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }
        Ok(self)
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        self.weather.check(&mut result);
        result
    }

    /// Write as TOML, creating the parent directory
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents).context("Failed to write config file")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(dir.join("clima").join("config.toml"))
    }
}
