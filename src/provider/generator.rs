// src/provider/generator.rs — Candidate generation with provider dispatch

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::thinking::PostProcess;
use super::{ChatBackend, Generator};
use crate::infra::config::ModelsConfig;
use crate::infra::errors::GenerationError;

/// Which provider family serves a model, with its response post-processing.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderKind {
    /// Hosted multi-model provider; `upstream` is the provider's model identifier.
    Hosted { upstream: String, post: PostProcess },
    /// Single-vendor provider addressed by the public model name.
    SingleVendor { post: PostProcess },
}

impl ProviderKind {
    pub fn post(&self) -> &PostProcess {
        match self {
            ProviderKind::Hosted { post, .. } | ProviderKind::SingleVendor { post } => post,
        }
    }
}

/// Public model name → provider kind, built once from configuration.
#[derive(Debug, Clone, Default)]
pub struct ModelRouter {
    hosted: HashMap<String, ProviderKind>,
}

impl ModelRouter {
    pub fn from_config(models: &ModelsConfig) -> Self {
        let hosted = models
            .hosted
            .iter()
            .map(|(name, m)| {
                (
                    name.clone(),
                    ProviderKind::Hosted {
                        upstream: m.id.clone(),
                        post: PostProcess::for_markers(m.thinking.as_ref()),
                    },
                )
            })
            .collect();
        Self { hosted }
    }

    pub fn resolve(&self, model: &str) -> ProviderKind {
        self.hosted
            .get(model)
            .cloned()
            .unwrap_or(ProviderKind::SingleVendor {
                post: PostProcess::Verbatim,
            })
    }
}

/// Produces one rewritten candidate per call by dispatching to the backend
/// that serves the requested model.
pub struct CandidateGenerator {
    router: ModelRouter,
    hosted: Option<Arc<dyn ChatBackend>>,
    single_vendor: Option<Arc<dyn ChatBackend>>,
}

impl CandidateGenerator {
    pub fn new(
        router: ModelRouter,
        hosted: Option<Arc<dyn ChatBackend>>,
        single_vendor: Option<Arc<dyn ChatBackend>>,
    ) -> Self {
        Self {
            router,
            hosted,
            single_vendor,
        }
    }

    fn backend_for(&self, kind: &ProviderKind) -> Result<&Arc<dyn ChatBackend>, GenerationError> {
        let (backend, family) = match kind {
            ProviderKind::Hosted { .. } => (self.hosted.as_ref(), "hosted"),
            ProviderKind::SingleVendor { .. } => (self.single_vendor.as_ref(), "single-vendor"),
        };
        backend.ok_or_else(|| GenerationError::Provider {
            provider: family.into(),
            message: "no backend configured for this model".into(),
            retriable: false,
        })
    }
}

#[async_trait]
impl Generator for CandidateGenerator {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, GenerationError> {
        let kind = self.router.resolve(model);
        let backend = self.backend_for(&kind)?;

        let raw = match &kind {
            ProviderKind::Hosted { upstream, .. } => backend.complete(prompt, upstream).await?,
            ProviderKind::SingleVendor { .. } => backend.complete(prompt, model).await?,
        };

        let text = kind.post().apply(raw).trim().to_string();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse {
                provider: backend.id().to_string(),
            });
        }

        tracing::debug!(model, provider = backend.id(), chars = text.len(), "Generated candidate");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::config::{HostedModel, ThinkingMarkers};
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Records the model ids it was called with and returns a canned reply.
    struct RecordingBackend {
        id: &'static str,
        reply: String,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingBackend {
        fn new(id: &'static str, reply: &str) -> Arc<Self> {
            Arc::new(Self {
                id,
                reply: reply.into(),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatBackend for RecordingBackend {
        fn id(&self) -> &str {
            self.id
        }

        async fn complete(&self, _prompt: &str, model: &str) -> Result<String, GenerationError> {
            self.calls.lock().unwrap().push(model.to_string());
            Ok(self.reply.clone())
        }
    }

    fn models() -> ModelsConfig {
        ModelsConfig {
            hosted: BTreeMap::from([
                (
                    "llama3".to_string(),
                    HostedModel {
                        id: "meta-llama/Llama-3-8b-chat-hf".into(),
                        thinking: None,
                    },
                ),
                (
                    "r1".to_string(),
                    HostedModel {
                        id: "deepseek-ai/DeepSeek-R1".into(),
                        thinking: Some(ThinkingMarkers {
                            start: "<think>".into(),
                            end: "</think>".into(),
                        }),
                    },
                ),
            ]),
        }
    }

    #[test]
    fn test_router_resolves_hosted_and_single_vendor() {
        let router = ModelRouter::from_config(&models());
        assert_eq!(
            router.resolve("llama3"),
            ProviderKind::Hosted {
                upstream: "meta-llama/Llama-3-8b-chat-hf".into(),
                post: PostProcess::Verbatim,
            }
        );
        assert!(matches!(
            router.resolve("gpt-4o-mini"),
            ProviderKind::SingleVendor { .. }
        ));
        assert!(matches!(
            router.resolve("r1").post(),
            PostProcess::StripThinking { .. }
        ));
    }

    #[tokio::test]
    async fn test_hosted_model_uses_mapped_id() {
        let hosted = RecordingBackend::new("together", "  hosted reply  ");
        let single = RecordingBackend::new("openai", "single reply");
        let generator = CandidateGenerator::new(
            ModelRouter::from_config(&models()),
            Some(hosted.clone() as Arc<dyn ChatBackend>),
            Some(single.clone() as Arc<dyn ChatBackend>),
        );

        let text = generator.generate("prompt", "llama3").await.unwrap();
        assert_eq!(text, "hosted reply");
        assert_eq!(
            hosted.calls.lock().unwrap().as_slice(),
            ["meta-llama/Llama-3-8b-chat-hf"]
        );
        assert!(single.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_model_goes_to_single_vendor() {
        let single = RecordingBackend::new("openai", "single reply");
        let generator =
            CandidateGenerator::new(ModelRouter::from_config(&models()), None, Some(single.clone() as Arc<dyn ChatBackend>));

        let text = generator.generate("prompt", "gpt-3.5-turbo").await.unwrap();
        assert_eq!(text, "single reply");
        assert_eq!(single.calls.lock().unwrap().as_slice(), ["gpt-3.5-turbo"]);
    }

    #[tokio::test]
    async fn test_thinking_model_strips_reasoning() {
        let hosted = RecordingBackend::new("together", "<think>hmm</think>\n Rewritten text.");
        let generator =
            CandidateGenerator::new(ModelRouter::from_config(&models()), Some(hosted as Arc<dyn ChatBackend>), None);
        assert_eq!(
            generator.generate("prompt", "r1").await.unwrap(),
            "Rewritten text."
        );
    }

    #[tokio::test]
    async fn test_thinking_only_response_kept_whole() {
        let hosted = RecordingBackend::new("together", "<think>only reasoning</think>");
        let generator =
            CandidateGenerator::new(ModelRouter::from_config(&models()), Some(hosted as Arc<dyn ChatBackend>), None);
        assert_eq!(
            generator.generate("prompt", "r1").await.unwrap(),
            "<think>only reasoning</think>"
        );
    }

    #[tokio::test]
    async fn test_missing_backend_is_an_error() {
        let generator = CandidateGenerator::new(ModelRouter::from_config(&models()), None, None);
        let err = generator.generate("prompt", "llama3").await.unwrap_err();
        assert!(matches!(err, GenerationError::Provider { retriable: false, .. }));
    }
}
