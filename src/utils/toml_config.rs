//! TOML-based configuration for Repurpose
//!
//! All process-wide settings (generation endpoint, credential source, retry and
//! refinement budgets, logging) live in a single [`RepurposeConfig`] loaded from
//! `repurpose.toml`. The credential itself is never stored in the file; the
//! config names the environment variable that holds it.

use crate::llm::gemini::GeminiConfig;
use crate::llm::retry::BackoffPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Root configuration structure loaded from repurpose.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepurposeConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub refine: RefineConfig,
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

// ============= Provider Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Per-call network timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-flash-latest".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_max_output_tokens() -> u32 {
    2048
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

// ============= Retry Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per call, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry; doubles on each further retry
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    2000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
        }
    }
}

// ============= Refinement Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefineConfig {
    /// Critique-and-revise rounds per stage
    #[serde(default = "default_refine_passes")]
    pub passes: usize,
}

fn default_refine_passes() -> usize {
    1
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            passes: default_refine_passes(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Configuration warnings that don't prevent operation but may indicate issues
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub kind: ConfigWarningKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarningKind {
    MissingCredential,
    RefinementDisabled,
    MultipleRefinePasses,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl RepurposeConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: RepurposeConfig = toml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(path.as_ref()) {
            Err(ConfigError::FileNotFound(missing)) => {
                debug!("No config at {}, using defaults", missing.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "provider.base_url must not be empty".to_string(),
            ));
        }
        if self.provider.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "provider.model must not be empty".to_string(),
            ));
        }
        if self.provider.api_key_env.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "provider.api_key_env must not be empty".to_string(),
            ));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "provider.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate and collect non-fatal warnings
    pub fn validate_with_warnings(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        self.validate()?;

        let mut warnings = Vec::new();

        if self.api_key().is_none() {
            warnings.push(ConfigWarning {
                kind: ConfigWarningKind::MissingCredential,
                message: format!(
                    "Environment variable '{}' is not set; generation calls will fail",
                    self.provider.api_key_env
                ),
            });
        }

        match self.refine.passes {
            0 => warnings.push(ConfigWarning {
                kind: ConfigWarningKind::RefinementDisabled,
                message: "refine.passes is 0; stage output is not critiqued".to_string(),
            }),
            1 => {}
            n => warnings.push(ConfigWarning {
                kind: ConfigWarningKind::MultipleRefinePasses,
                message: format!(
                    "refine.passes is {}; each pass adds one generation call per stage",
                    n
                ),
            }),
        }

        Ok(warnings)
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok().filter(|v| !v.trim().is_empty())
    }

    /// Get the API key from the environment
    pub fn api_key(&self) -> Option<String> {
        self.resolve_env(&self.provider.api_key_env)
    }

    /// Get the API key, failing if it is not set
    pub fn require_api_key(&self) -> Result<String, ConfigError> {
        self.api_key()
            .ok_or_else(|| ConfigError::MissingEnvVar(self.provider.api_key_env.clone()))
    }

    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.initial_backoff_ms),
        )
    }

    /// Build the generation client configuration. The credential is resolved
    /// once here; a missing key surfaces when a call is made.
    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            base_url: self.provider.base_url.clone(),
            model: self.provider.model.clone(),
            api_key: self.api_key(),
            timeout: Duration::from_secs(self.provider.timeout_secs),
            max_output_tokens: self.provider.max_output_tokens,
            backoff: self.backoff_policy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn create_test_config() -> String {
        r#"
[logging]
log_level = "debug"

[provider]
base_url = "http://localhost:9999/v1beta"
model = "gemini-test"
api_key_env = "REPURPOSE_TEST_KEY_UNSET"
timeout_secs = 30

[retry]
max_attempts = 5
initial_backoff_ms = 100

[refine]
passes = 2
"#
        .to_string()
    }

    #[test]
    fn test_parse_config() {
        let config: RepurposeConfig = toml::from_str(&create_test_config()).unwrap();

        assert_eq!(config.logging.log_level, "debug");
        assert_eq!(config.provider.model, "gemini-test");
        assert_eq!(config.provider.timeout_secs, 30);
        assert_eq!(config.provider.max_output_tokens, 2048);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.refine.passes, 2);
    }

    #[test]
    fn test_defaults() {
        let config: RepurposeConfig = toml::from_str("").unwrap();

        assert_eq!(config.logging.log_level, "info");
        assert!(!config.logging.json);
        assert_eq!(
            config.provider.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert_eq!(config.provider.model, "gemini-flash-latest");
        assert_eq!(config.provider.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.provider.timeout_secs, 600);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.initial_backoff_ms, 2000);
        assert_eq!(config.refine.passes, 1);
    }

    #[test]
    fn test_validation_zero_attempts() {
        let mut config = RepurposeConfig::default();
        config.retry.max_attempts = 0;

        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validation_empty_model() {
        let mut config = RepurposeConfig::default();
        config.provider.model = "  ".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_warnings() {
        let config: RepurposeConfig = toml::from_str(&create_test_config()).unwrap();
        let warnings = config.validate_with_warnings().unwrap();

        assert!(warnings
            .iter()
            .any(|w| w.kind == ConfigWarningKind::MissingCredential));
        assert!(warnings
            .iter()
            .any(|w| w.kind == ConfigWarningKind::MultipleRefinePasses));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(create_test_config().as_bytes()).unwrap();

        let config = RepurposeConfig::load(file.path()).unwrap();
        assert_eq!(config.provider.base_url, "http://localhost:9999/v1beta");
    }

    #[test]
    fn test_load_missing_file() {
        let result = RepurposeConfig::load("/nonexistent/repurpose.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));

        let config = RepurposeConfig::load_or_default("/nonexistent/repurpose.toml").unwrap();
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_gemini_config_from_file_settings() {
        let config: RepurposeConfig = toml::from_str(&create_test_config()).unwrap();
        let gemini = config.gemini_config();

        assert_eq!(gemini.model, "gemini-test");
        assert!(gemini.api_key.is_none());
        assert_eq!(gemini.timeout, Duration::from_secs(30));
        assert_eq!(gemini.backoff.max_attempts(), 5);
        assert_eq!(gemini.backoff.delay_for(1), Duration::from_millis(200));
        assert!(matches!(
            config.require_api_key(),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }
}
