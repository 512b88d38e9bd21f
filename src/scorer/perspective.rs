// src/scorer/perspective.rs — Perspective API classifier client

use std::time::Duration;

use async_trait::async_trait;

use super::Classifier;
use crate::infra::config::ScoringConfig;
use crate::infra::errors::ScoringError;

pub const PERSPECTIVE_KEY_VAR: &str = "PERSPECTIVE_API_KEY";

pub struct PerspectiveClient {
    api_key: String,
    client: reqwest::Client,
    config: ScoringConfig,
    timeout: Duration,
}

impl PerspectiveClient {
    pub fn new(api_key: String, config: ScoringConfig, timeout: Duration) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            config,
            timeout,
        }
    }

    pub fn request_body(&self, text: &str) -> serde_json::Value {
        let mut attributes = serde_json::Map::new();
        attributes.insert(self.config.attribute.clone(), serde_json::json!({}));
        serde_json::json!({
            "comment": {"text": text},
            "requestedAttributes": attributes,
            "languages": self.config.languages,
        })
    }

    /// Read the attribute score, preferring the first span score.
    pub fn extract_score(&self, resp: &serde_json::Value) -> Result<f64, ScoringError> {
        let attr = &resp["attributeScores"][self.config.attribute.as_str()];
        let value = attr["spanScores"][0]["score"]["value"]
            .as_f64()
            .or_else(|| attr["summaryScore"]["value"].as_f64())
            .ok_or_else(|| {
                ScoringError::MalformedResponse(format!(
                    "no {} score in response",
                    self.config.attribute
                ))
            })?;

        if !(0.0..=1.0).contains(&value) {
            return Err(ScoringError::MalformedResponse(format!(
                "score {value} outside [0, 1]"
            )));
        }
        Ok(value)
    }
}

#[async_trait]
impl Classifier for PerspectiveClient {
    async fn score(&self, text: &str) -> Result<f64, ScoringError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .timeout(self.timeout)
            .json(&self.request_body(text))
            .send()
            .await
            .map_err(|e| ScoringError::Request {
                message: e.to_string(),
                retriable: e.is_timeout() || e.is_connect(),
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ScoringError::Http {
                status: status.as_u16(),
            });
        }

        let resp: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ScoringError::MalformedResponse(e.to_string()))?;

        self.extract_score(&resp)
    }
}
