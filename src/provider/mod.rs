// src/provider/mod.rs — Generation provider layer

pub mod generator;
pub mod openai;
pub mod openai_compat;
pub mod resolver;
pub mod thinking;

use async_trait::async_trait;

use crate::infra::errors::GenerationError;

/// The generation service as seen by the search engine.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce one rewritten candidate for `prompt` using the public model name `model`.
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, GenerationError>;
}

/// A concrete chat-completions endpoint. `model` is the provider's own identifier.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    fn id(&self) -> &str;

    async fn complete(&self, prompt: &str, model: &str) -> Result<String, GenerationError>;
}

pub(crate) fn transport_error(provider: &str, e: reqwest::Error) -> GenerationError {
    GenerationError::Provider {
        provider: provider.to_string(),
        message: e.to_string(),
        retriable: e.is_timeout() || e.is_connect(),
    }
}

/// Turn a chat-completions HTTP response into the first choice's content.
pub(crate) async fn read_completion(
    provider: &str,
    response: reqwest::Response,
) -> Result<String, GenerationError> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GenerationError::RateLimited {
            provider: provider.to_string(),
        });
    }

    if !status.is_success() {
        let error_body = response.text().await.unwrap_or_default();
        return Err(GenerationError::Provider {
            provider: provider.to_string(),
            message: format!("HTTP {}: {}", status, error_body),
            retriable: status.is_server_error(),
        });
    }

    let resp: serde_json::Value = response
        .json()
        .await
        .map_err(|e| GenerationError::Provider {
            provider: provider.to_string(),
            message: format!("Failed to parse response: {}", e),
            retriable: false,
        })?;

    completion_content(provider, &resp)
}

pub(crate) fn completion_content(
    provider: &str,
    resp: &serde_json::Value,
) -> Result<String, GenerationError> {
    match resp["choices"][0]["message"]["content"].as_str() {
        Some(content) if !content.trim().is_empty() => Ok(content.to_string()),
        _ => Err(GenerationError::EmptyResponse {
            provider: provider.to_string(),
        }),
    }
}
