// src/provider/openai_compat.rs — Hosted multi-model provider (Together, OpenAI-compatible)
//
// Public model names are mapped to the provider's identifiers before the call;
// see `generator::ModelRouter`.

use std::time::Duration;

use async_trait::async_trait;

use super::{read_completion, transport_error, ChatBackend};
use crate::infra::config::TogetherConfig;
use crate::infra::errors::GenerationError;

pub struct OpenAICompatProvider {
    id_str: String,
    api_key: String,
    client: reqwest::Client,
    config: TogetherConfig,
    timeout: Duration,
}

impl OpenAICompatProvider {
    pub fn new(
        id: impl Into<String>,
        api_key: String,
        config: TogetherConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            id_str: id.into(),
            api_key,
            client: reqwest::Client::new(),
            config,
            timeout,
        }
    }

    pub fn request_body(&self, prompt: &str, model: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "top_p": self.config.top_p,
            "top_k": self.config.top_k,
            "repetition_penalty": self.config.repetition_penalty,
        });
        if !self.config.stop.is_empty() {
            body["stop"] = serde_json::json!(self.config.stop);
        }
        body
    }
}

#[async_trait]
impl ChatBackend for OpenAICompatProvider {
    fn id(&self) -> &str {
        &self.id_str
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
            .map_err(|e| transport_error(&self.id_str, e))?;

        read_completion(&self.id_str, response).await
    }
}
