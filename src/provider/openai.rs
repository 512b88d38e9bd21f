// src/provider/openai.rs — OpenAI Chat API backend (single-vendor provider)

use std::time::Duration;

use async_trait::async_trait;

use super::{read_completion, transport_error, ChatBackend};
use crate::infra::config::OpenAIConfig;
use crate::infra::errors::GenerationError;

pub struct OpenAIProvider {
    api_key: String,
    client: reqwest::Client,
    config: OpenAIConfig,
    timeout: Duration,
}

impl OpenAIProvider {
    pub fn new(api_key: String, config: OpenAIConfig, timeout: Duration) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            config,
            timeout,
        }
    }

    /// Request body for one single-turn completion.
    ///
    /// The API only honours JSON mode when the prompt itself mentions JSON, so
    /// `response_format` is set exactly in that case.
    pub fn request_body(&self, prompt: &str, model: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": self.config.temperature,
            "top_p": self.config.top_p,
            "frequency_penalty": self.config.frequency_penalty,
        });
        if prompt.to_lowercase().contains("json") {
            body["response_format"] = serde_json::json!({"type": "json_object"});
        }
        body
    }
}

#[async_trait]
impl ChatBackend for OpenAIProvider {
    fn id(&self) -> &str {
        "openai"
    }

    async fn complete(&self, prompt: &str, model: &str) -> Result<String, GenerationError> {
        let body = self.request_body(prompt, model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("openai", e))?;

        read_completion("openai", response).await
    }
}
