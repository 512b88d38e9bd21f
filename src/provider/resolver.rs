// src/provider/resolver.rs — Build the generator from config and environment credentials

use std::sync::Arc;

use super::generator::{CandidateGenerator, ModelRouter, ProviderKind};
use super::openai::OpenAIProvider;
use super::openai_compat::OpenAICompatProvider;
use super::ChatBackend;
use crate::infra::config::Config;
use crate::infra::errors::ConfigError;

pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";
pub const TOGETHER_KEY_VAR: &str = "TOGETHER_API_KEY";

fn env_key(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|k| !k.trim().is_empty())
}

/// Construct a `CandidateGenerator` with every backend that has a credential.
///
/// Fails if the backend serving `model` has no credential, so a run never
/// starts against a provider it cannot reach.
pub fn build_generator(config: &Config, model: &str) -> Result<CandidateGenerator, ConfigError> {
    let router = ModelRouter::from_config(&config.models);
    let timeout = config.limits.request_timeout();

    let hosted: Option<Arc<dyn ChatBackend>> = env_key(TOGETHER_KEY_VAR).map(|key| {
        Arc::new(OpenAICompatProvider::new(
            "together",
            key,
            config.providers.together.clone(),
            timeout,
        )) as Arc<dyn ChatBackend>
    });
    let single_vendor: Option<Arc<dyn ChatBackend>> = env_key(OPENAI_KEY_VAR).map(|key| {
        Arc::new(OpenAIProvider::new(
            key,
            config.providers.openai.clone(),
            timeout,
        )) as Arc<dyn ChatBackend>
    });

    match router.resolve(model) {
        ProviderKind::Hosted { .. } if hosted.is_none() => {
            return Err(ConfigError::MissingCredential {
                var: TOGETHER_KEY_VAR,
            })
        }
        ProviderKind::SingleVendor { .. } if single_vendor.is_none() => {
            return Err(ConfigError::MissingCredential {
                var: OPENAI_KEY_VAR,
            })
        }
        kind => tracing::debug!(model, ?kind, "Resolved generation provider"),
    }

    Ok(CandidateGenerator::new(router, hosted, single_vendor))
}
