// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::core::prompt::{PromptTemplate, DEFAULT_TOXIC_PROMPT};
use crate::infra::errors::ConfigError;
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub models: ModelsConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Analyses admitted per second across the whole process.
    pub rate_limit: u32,
    /// Analyses in flight at once.
    pub max_concurrent: usize,
    /// Deadline for a single generation or scoring call.
    pub request_timeout_seconds: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            rate_limit: 10,
            max_concurrent: 5,
            request_timeout_seconds: 120,
        }
    }
}

impl LimitsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Independent generation+scoring attempts per iteration.
    pub attempts_per_iteration: u32,
    /// Pause after a failed attempt.
    pub retry_delay_seconds: u64,
    pub default_prompt: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            attempts_per_iteration: 2,
            retry_delay_seconds: 5,
            default_prompt: DEFAULT_TOXIC_PROMPT.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_rounds: u32,
    pub backoff_base_seconds: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            backoff_base_seconds: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThinkingMarkers {
    pub start: String,
    pub end: String,
}

/// A public model name served by the hosted multi-model provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedModel {
    /// The provider's internal model identifier.
    pub id: String,
    #[serde(default)]
    pub thinking: Option<ThinkingMarkers>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_hosted_models")]
    pub hosted: BTreeMap<String, HostedModel>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            hosted: default_hosted_models(),
        }
    }
}

fn default_hosted_models() -> BTreeMap<String, HostedModel> {
    let plain = |id: &str| HostedModel {
        id: id.into(),
        thinking: None,
    };
    BTreeMap::from([
        ("llama3".into(), plain("meta-llama/Llama-3-8b-chat-hf")),
        ("wizardlm2".into(), plain("microsoft/WizardLM-2-8x22B")),
        ("mixtral".into(), plain("mistralai/Mixtral-8x7B-Instruct-v0.1")),
        (
            "deepseek-r1".into(),
            HostedModel {
                id: "deepseek-ai/DeepSeek-R1".into(),
                thinking: Some(ThinkingMarkers {
                    start: "<think>".into(),
                    end: "</think>".into(),
                }),
            },
        ),
    ])
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: OpenAIConfig,
    #[serde(default)]
    pub together: TogetherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    pub base_url: String,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            temperature: 1.0,
            top_p: 1.0,
            frequency_penalty: 1.4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TogetherConfig {
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub repetition_penalty: f32,
    #[serde(default)]
    pub stop: Vec<String>,
}

impl Default for TogetherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.together.xyz/v1".into(),
            max_tokens: 512,
            temperature: 1.0,
            top_p: 0.7,
            top_k: 50,
            repetition_penalty: 1.0,
            stop: vec!["<|eot_id|>".into()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub endpoint: String,
    pub attribute: String,
    pub languages: Vec<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://commentanalyzer.googleapis.com/v1alpha1/comments:analyze".into(),
            attribute: "TOXICITY".into(),
            languages: vec!["en".into()],
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Reject settings that would stall or break the engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.rate_limit == 0 {
            return Err(ConfigError::Invalid("limits.rate_limit must be at least 1".into()));
        }
        if self.limits.max_concurrent == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_concurrent must be at least 1".into(),
            ));
        }
        if self.limits.request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "limits.request_timeout_seconds must be at least 1".into(),
            ));
        }
        if self.search.attempts_per_iteration == 0 {
            return Err(ConfigError::Invalid(
                "search.attempts_per_iteration must be at least 1".into(),
            ));
        }
        if self.retry.max_rounds == 0 {
            return Err(ConfigError::Invalid("retry.max_rounds must be at least 1".into()));
        }
        if !self.retry.backoff_base_seconds.is_finite() || self.retry.backoff_base_seconds < 0.0 {
            return Err(ConfigError::Invalid(
                "retry.backoff_base_seconds must be a non-negative number".into(),
            ));
        }
        for (name, model) in &self.models.hosted {
            if let Some(ref t) = model.thinking {
                if t.start.is_empty() || t.end.is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "models.hosted.{name}.thinking markers must be non-empty"
                    )));
                }
            }
        }
        self.default_prompt()?;
        Ok(())
    }

    pub fn default_prompt(&self) -> Result<PromptTemplate, ConfigError> {
        PromptTemplate::parse(&self.search.default_prompt)
    }
}
