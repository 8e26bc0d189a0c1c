//! # Configuration Management
//!
//! Loads application configuration from layered sources:
//! - built-in defaults
//! - an optional `config.toml`
//! - environment variables with the `APP_` prefix
//! - `HOST`/`PORT` overrides used by deployment platforms
//!
//! Configuration is validated after load and can be partially updated at
//! runtime through the config endpoint, with re-validation on every update.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub models: ModelsConfig,
    pub matching: MatchingConfig,
    pub summary: SummaryConfig,
    pub limits: LimitsConfig,
}

/// HTTP server binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// ML model selection.
///
/// ## Model size trade-offs:
/// Smaller Whisper models are faster and lighter but less accurate; `base`
/// is a reasonable development default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Whisper model size: tiny, base, small, medium, large
    pub whisper_model: String,

    /// Decode language hint (ISO 639-1)
    pub language: String,

    /// Inference device preference: auto, cpu, cuda, metal
    pub device: String,
}

/// Compatibility-matching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Path to the static JSON user file
    pub users_file: String,

    /// Ceiling for client-supplied blend weights
    pub max_weight: f64,
}

/// Summarization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// How many topics to extract when none are supplied
    pub topics_top_n: usize,
}

/// Request limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum accepted audio upload size in bytes
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            models: ModelsConfig {
                whisper_model: "base".to_string(),
                language: "en".to_string(),
                device: "auto".to_string(),
            },
            matching: MatchingConfig {
                users_file: "data/synthetic_users.json".to_string(),
                max_weight: 10.0,
            },
            summary: SummaryConfig { topics_top_n: 5 },
            limits: LimitsConfig {
                max_upload_bytes: 25 * 1024 * 1024, // 25 MB of audio
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from all sources in priority order.
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder()
            // 1. Defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // 2. Optional config.toml
            .add_source(config::File::with_name("config").required(false))
            // 3. APP_-prefixed environment variables
            // Example: APP_SERVER_HOST becomes server.host
            .add_source(config::Environment::with_prefix("APP").separator("_"));

        // Deployment platforms commonly inject bare HOST/PORT
        if let Ok(host) = env::var("HOST") {
            settings = settings.set_override("server.host", host)?;
        }

        if let Ok(port) = env::var("PORT") {
            settings = settings.set_override("server.port", port)?;
        }

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate that the configuration values make sense before use.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        self.models
            .whisper_model
            .parse::<crate::transcription::ModelSize>()?;

        if self.matching.users_file.trim().is_empty() {
            return Err(anyhow::anyhow!("Users file path cannot be empty"));
        }

        if self.matching.max_weight <= 0.0 {
            return Err(anyhow::anyhow!("Max weight must be positive"));
        }

        if self.summary.topics_top_n == 0 {
            return Err(anyhow::anyhow!("Topics top-N must be greater than 0"));
        }

        if self.limits.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("Max upload size must be greater than 0"));
        }

        Ok(())
    }

    /// Apply a partial update from a JSON document, leaving unmentioned
    /// fields untouched, then re-validate.
    pub fn update_from_json(&mut self, json_str: &str) -> Result<()> {
        let partial: serde_json::Value = serde_json::from_str(json_str)?;

        if let Some(server) = partial.get("server") {
            if let Some(host) = server.get("host").and_then(|v| v.as_str()) {
                self.server.host = host.to_string();
            }
            if let Some(port) = server.get("port").and_then(|v| v.as_u64()) {
                self.server.port = port as u16;
            }
        }

        if let Some(models) = partial.get("models") {
            if let Some(whisper) = models.get("whisper_model").and_then(|v| v.as_str()) {
                self.models.whisper_model = whisper.to_string();
            }
            if let Some(language) = models.get("language").and_then(|v| v.as_str()) {
                self.models.language = language.to_string();
            }
            if let Some(device) = models.get("device").and_then(|v| v.as_str()) {
                self.models.device = device.to_string();
            }
        }

        if let Some(matching) = partial.get("matching") {
            if let Some(users_file) = matching.get("users_file").and_then(|v| v.as_str()) {
                self.matching.users_file = users_file.to_string();
            }
            if let Some(max_weight) = matching.get("max_weight").and_then(|v| v.as_f64()) {
                self.matching.max_weight = max_weight;
            }
        }

        if let Some(summary) = partial.get("summary") {
            if let Some(top_n) = summary.get("topics_top_n").and_then(|v| v.as_u64()) {
                self.summary.topics_top_n = top_n as usize;
            }
        }

        if let Some(limits) = partial.get("limits") {
            if let Some(max_upload) = limits.get("max_upload_bytes").and_then(|v| v.as_u64()) {
                self.limits.max_upload_bytes = max_upload as usize;
            }
        }

        self.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.models.whisper_model, "base");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_port_zero() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_unknown_model() {
        let mut config = AppConfig::default();
        config.models.whisper_model = "enormous".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let mut config = AppConfig::default();
        let json = r#"{"server": {"port": 9090}, "summary": {"topics_top_n": 8}}"#;
        assert!(config.update_from_json(json).is_ok());
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.summary.topics_top_n, 8);
        // Unmentioned fields are untouched
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.models.whisper_model, "base");
    }

    #[test]
    fn test_partial_update_revalidates() {
        let mut config = AppConfig::default();
        let json = r#"{"models": {"whisper_model": "enormous"}}"#;
        assert!(config.update_from_json(json).is_err());
    }
}
