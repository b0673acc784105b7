//! Process configuration from the environment

use crate::explain::ExplanationPolicy;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_LLM_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_LLM_MODEL: &str = "google/gemini-2.0-pro-exp-02-05:free";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_TASKS_PATH: &str = "tasks.json";
const DEFAULT_THEORY_DIR: &str = "theory";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing {0} in environment")]
    Missing(&'static str),
    #[error("Invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Bot configuration
#[derive(Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub telegram_api_url: String,
    pub tasks_path: PathBuf,
    pub theory_dir: PathBuf,
    pub explanation_timeout: Duration,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |var: &'static str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(var))
        };
        let optional = |var: &str, default: &str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let explanation_timeout = match lookup("EXPLANATION_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "EXPLANATION_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
            None => ExplanationPolicy::default().timeout,
        };

        Ok(Self {
            bot_token: required("BOT_TOKEN")?,
            llm_api_key: required("OPENAI_API_KEY")?,
            llm_base_url: optional("LLM_BASE_URL", DEFAULT_LLM_BASE_URL),
            llm_model: optional("LLM_MODEL", DEFAULT_LLM_MODEL),
            telegram_api_url: optional("TELEGRAM_API_URL", DEFAULT_TELEGRAM_API_URL),
            tasks_path: PathBuf::from(optional("TASKS_PATH", DEFAULT_TASKS_PATH)),
            theory_dir: PathBuf::from(optional("THEORY_DIR", DEFAULT_THEORY_DIR)),
            explanation_timeout,
        })
    }

    pub fn explanation_policy(&self) -> ExplanationPolicy {
        ExplanationPolicy {
            timeout: self.explanation_timeout,
            ..ExplanationPolicy::default()
        }
    }
}

// Secrets stay out of logs
impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"<redacted>")
            .field("llm_api_key", &"<redacted>")
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("tasks_path", &self.tasks_path)
            .field("theory_dir", &self.theory_dir)
            .field("explanation_timeout", &self.explanation_timeout)
            .finish()
    }
}
