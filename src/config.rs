//! Configuration management for the scout agents
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings.

use crate::ScoutError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    /// LLM backend configuration
    pub llm: LlmConfig,
    /// Outbound HTTP settings for tools
    pub http: HttpConfig,
    /// Upstream service endpoints
    pub endpoints: EndpointsConfig,
    /// Financial data API settings
    pub finance: FinanceConfig,
    /// Agent step budgets
    pub agents: AgentsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// OpenAI-compatible chat completions backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL, `/chat/completions` is appended
    pub api_base: String,
    /// Model identifier
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    pub max_retries: u32,
}

/// Outbound HTTP settings shared by all tools
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout_seconds: u32,
    /// Browser-like user agent sent with every request
    pub user_agent: String,
    /// Character budget for extracted webpage text
    pub max_page_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub search_url: String,
    pub geocoding_url: String,
    pub archive_url: String,
    pub alphavantage_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FinanceConfig {
    /// Name of the environment variable holding the Alpha Vantage key
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    pub planner_max_steps: u32,
    pub seeker_max_steps: u32,
    pub manager_max_steps: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_llm_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
}

fn default_llm_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_llm_api_base(),
            model: default_llm_model(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_seconds: 120,
            max_retries: 3,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            user_agent: default_user_agent(),
            max_page_chars: crate::extract::MAX_TEXT_CHARS,
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            search_url: "https://html.duckduckgo.com/html/".to_string(),
            geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            archive_url: "https://archive-api.open-meteo.com/v1/archive".to_string(),
            alphavantage_url: "https://www.alphavantage.co/query".to_string(),
        }
    }
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            api_key_env: "ALPHAVANTAGE_API_KEY".to_string(),
        }
    }
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            planner_max_steps: 8,
            seeker_max_steps: 3,
            manager_max_steps: 20,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl ScoutConfig {
    /// Load configuration from the default file location and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.clone().unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("scout.toml"))
        });

        if config_path.is_some() && !config_file.exists() {
            return Err(ScoutError::config(format!(
                "config file not found: {}",
                config_file.display()
            ))
            .into());
        }

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // SCOUT_LLM__MODEL=... overrides llm.model
        builder = builder.add_source(
            Environment::with_prefix("SCOUT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: ScoutConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scout").join("config.toml"))
    }

    /// Apply default values to fields left empty or zero by overrides
    pub fn apply_defaults(&mut self) {
        let llm = LlmConfig::default();
        if self.llm.api_base.is_empty() {
            self.llm.api_base = llm.api_base;
        }
        if self.llm.model.is_empty() {
            self.llm.model = llm.model;
        }
        if self.llm.api_key_env.is_empty() {
            self.llm.api_key_env = llm.api_key_env;
        }
        if self.llm.timeout_seconds == 0 {
            self.llm.timeout_seconds = llm.timeout_seconds;
        }
        if self.http.timeout_seconds == 0 {
            self.http.timeout_seconds = HttpConfig::default().timeout_seconds;
        }
        if self.http.user_agent.is_empty() {
            self.http.user_agent = default_user_agent();
        }
        if self.http.max_page_chars == 0 {
            self.http.max_page_chars = crate::extract::MAX_TEXT_CHARS;
        }
        if self.finance.api_key_env.is_empty() {
            self.finance.api_key_env = FinanceConfig::default().api_key_env;
        }
        let agents = AgentsConfig::default();
        if self.agents.planner_max_steps == 0 {
            self.agents.planner_max_steps = agents.planner_max_steps;
        }
        if self.agents.seeker_max_steps == 0 {
            self.agents.seeker_max_steps = agents.seeker_max_steps;
        }
        if self.agents.manager_max_steps == 0 {
            self.agents.manager_max_steps = agents.manager_max_steps;
        }
        if self.logging.level.is_empty() {
            self.logging.level = LoggingConfig::default().level;
        }
        if self.logging.format.is_empty() {
            self.logging.format = LoggingConfig::default().format;
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Read the LLM API key from the configured environment variable
    pub fn llm_api_key(&self) -> Result<String> {
        read_key(&self.llm.api_key_env)
    }

    /// Read the financial data API key from the configured environment variable
    pub fn finance_api_key(&self) -> Result<String> {
        read_key(&self.finance.api_key_env)
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.http.timeout_seconds > 300 {
            return Err(ScoutError::config("HTTP timeout cannot exceed 300 seconds").into());
        }

        if self.llm.timeout_seconds > 600 {
            return Err(ScoutError::config("LLM timeout cannot exceed 600 seconds").into());
        }

        if self.llm.max_retries > 10 {
            return Err(ScoutError::config("LLM max retries cannot exceed 10").into());
        }

        let steps = [
            self.agents.planner_max_steps,
            self.agents.seeker_max_steps,
            self.agents.manager_max_steps,
        ];
        if steps.iter().any(|&s| s > 50) {
            return Err(ScoutError::config("Agent step budget cannot exceed 50").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ScoutError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ScoutError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("llm.api_base", &self.llm.api_base),
            ("endpoints.search_url", &self.endpoints.search_url),
            ("endpoints.geocoding_url", &self.endpoints.geocoding_url),
            ("endpoints.archive_url", &self.endpoints.archive_url),
            ("endpoints.alphavantage_url", &self.endpoints.alphavantage_url),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ScoutError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

fn read_key(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(ScoutError::config(format!("{var} is not set")).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ScoutConfig::default();
        assert_eq!(config.http.timeout_seconds, 10);
        assert_eq!(config.http.max_page_chars, 5000);
        assert_eq!(config.agents.planner_max_steps, 8);
        assert_eq!(config.agents.seeker_max_steps, 3);
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.llm.api_key_env, "GEMINI_API_KEY");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = ScoutConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = ScoutConfig::default();
        config.http.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_rejects_non_http_endpoint() {
        let mut config = ScoutConfig::default();
        config.endpoints.archive_url = "ftp://archive".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("endpoints.archive_url"));
    }

    #[test]
    fn test_apply_defaults_fills_zeroes() {
        let mut config = ScoutConfig::default();
        config.agents.seeker_max_steps = 0;
        config.http.user_agent.clear();
        config.apply_defaults();
        assert_eq!(config.agents.seeker_max_steps, 3);
        assert!(config.http.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!("scout-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[agents]\nplanner_max_steps = 5\n\n[logging]\nlevel = \"debug\"").unwrap();

        let config = ScoutConfig::load_from_path(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.agents.planner_max_steps, 5);
        assert_eq!(config.agents.seeker_max_steps, 3);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.http.timeout_seconds, 10);
    }

    #[test]
    fn test_missing_explicit_config_file_is_an_error() {
        let result = ScoutConfig::load_from_path(Some(PathBuf::from("/nonexistent/scout.toml")));
        assert!(result.unwrap_err().to_string().contains("config file not found"));
    }

    #[test]
    fn test_missing_api_key_is_reported_by_name() {
        let mut config = ScoutConfig::default();
        config.llm.api_key_env = "SCOUT_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        let err = config.llm_api_key().unwrap_err();
        assert!(err.to_string().contains("SCOUT_TEST_KEY_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = ScoutConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("scout"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
