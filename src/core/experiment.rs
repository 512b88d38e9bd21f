// src/core/experiment.rs — One search iteration: K independent generate+score attempts

use std::sync::Arc;
use std::time::Duration;

use super::prompt::{make_prompt, PromptTemplate};
use super::types::{select_best, Attempt};
use crate::infra::config::Config;
use crate::infra::errors::{AttemptError, ConfigError, ExperimentError};
use crate::provider::Generator;
use crate::scorer::ScorerAdapter;

#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Attempts per iteration.
    pub attempts: u32,
    /// Pause after a failed attempt before the next one.
    pub retry_delay: Duration,
    /// Deadline for each generation and each scoring call.
    pub call_timeout: Duration,
    pub default_prompt: PromptTemplate,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            attempts: 2,
            retry_delay: Duration::from_secs(5),
            call_timeout: Duration::from_secs(120),
            default_prompt: PromptTemplate::default(),
        }
    }
}

impl TryFrom<&Config> for ExperimentConfig {
    type Error = ConfigError;

    fn try_from(cfg: &Config) -> Result<Self, Self::Error> {
        Ok(Self {
            attempts: cfg.search.attempts_per_iteration,
            retry_delay: Duration::from_secs(cfg.search.retry_delay_seconds),
            call_timeout: cfg.limits.request_timeout(),
            default_prompt: cfg.default_prompt()?,
        })
    }
}

pub struct ExperimentRunner {
    generator: Arc<dyn Generator>,
    scorer: ScorerAdapter,
    config: ExperimentConfig,
}

impl ExperimentRunner {
    pub fn new(generator: Arc<dyn Generator>, scorer: ScorerAdapter, config: ExperimentConfig) -> Self {
        Self {
            generator,
            scorer,
            config,
        }
    }

    /// Run all attempts for one iteration and return the best one.
    ///
    /// Failed attempts are logged, followed by `retry_delay`, and left out of
    /// the selection. If none succeed the iteration fails.
    pub async fn run_experiment(
        &self,
        text: &str,
        model: &str,
        custom_prompt: Option<&PromptTemplate>,
    ) -> Result<Attempt, ExperimentError> {
        let prompt = make_prompt(text, custom_prompt, &self.config.default_prompt);

        let mut outcomes: Vec<Result<Attempt, AttemptError>> =
            Vec::with_capacity(self.config.attempts as usize);
        for attempt_no in 0..self.config.attempts {
            let outcome = self.attempt(&prompt, model).await;
            if let Err(ref e) = outcome {
                tracing::warn!(
                    attempt = attempt_no + 1,
                    model,
                    retriable = e.is_retriable(),
                    "Attempt failed: {}",
                    e
                );
                tokio::time::sleep(self.config.retry_delay).await;
            }
            outcomes.push(outcome);
        }

        let last_error = outcomes
            .iter()
            .rev()
            .find_map(|o| o.as_ref().err().map(ToString::to_string));
        let attempts: Vec<Attempt> = outcomes.into_iter().filter_map(Result::ok).collect();

        select_best(&attempts)
            .cloned()
            .ok_or_else(|| ExperimentError::NoSuccessfulAttempt {
                attempts: self.config.attempts,
                last_error: last_error.unwrap_or_else(|| "no attempts were made".into()),
            })
    }

    async fn attempt(&self, prompt: &str, model: &str) -> Result<Attempt, AttemptError> {
        let deadline = self.config.call_timeout;

        let text = tokio::time::timeout(deadline, self.generator.generate(prompt, model))
            .await
            .map_err(|_| AttemptError::Deadline {
                stage: "generation",
                after: deadline,
            })??;

        let (sentence, score) = tokio::time::timeout(deadline, self.scorer.score_best(&text))
            .await
            .map_err(|_| AttemptError::Deadline {
                stage: "scoring",
                after: deadline,
            })??;

        Ok(Attempt {
            text,
            score,
            sentence,
        })
    }
}
