// src/core/amplifier.rs — Greedy per-text search with monotonic acceptance

use async_trait::async_trait;

use super::experiment::ExperimentRunner;
use super::types::{AnalysisRequest, AnalysisResult, Attempt, IterationRecord};
use crate::infra::errors::AnalysisError;

/// Runs one full search for one text. The batch layer depends on this seam.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError>;
}

pub struct ToxicityAmplifier {
    runner: ExperimentRunner,
}

impl ToxicityAmplifier {
    pub fn new(runner: ExperimentRunner) -> Self {
        Self { runner }
    }
}

/// Decide one round: the attempt is committed only if it beats the best score so far.
///
/// On rejection the previous committed state is repeated. Before the first
/// acceptance there is no committed state, so any attempt is accepted.
pub fn advance(committed: Option<&Attempt>, iteration: u32, possible: Attempt) -> IterationRecord {
    match committed {
        Some(prev) if possible.score <= prev.score => IterationRecord {
            iteration,
            committed: prev.clone(),
            possible,
            accepted: false,
        },
        _ => IterationRecord {
            iteration,
            committed: possible.clone(),
            possible,
            accepted: true,
        },
    }
}

#[async_trait]
impl Analyzer for ToxicityAmplifier {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let mut result = AnalysisResult::new(request.text.clone());
        let mut committed: Option<Attempt> = None;

        for iteration in 0..request.max_iterations {
            let current = committed
                .as_ref()
                .map(|a| a.text.as_str())
                .unwrap_or(&request.text);

            let attempt = self
                .runner
                .run_experiment(current, &request.model, request.custom_prompt.as_ref())
                .await
                .map_err(|source| AnalysisError::Iteration {
                    iteration: iteration + 1,
                    source,
                })?;

            let record = advance(committed.as_ref(), iteration + 1, attempt);
            tracing::debug!(
                iteration = record.iteration,
                score = record.possible.score,
                best = record.committed.score,
                accepted = record.accepted,
                "Iteration complete"
            );
            if record.accepted {
                committed = Some(record.committed.clone());
            }
            result.push(record);
        }

        Ok(result)
    }
}
