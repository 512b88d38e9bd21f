// src/core/orchestrator.rs — Batch controller: gated concurrent analyses with round-based retry

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};

use super::amplifier::Analyzer;
use super::budget::ConcurrencyBudget;
use super::types::*;
use crate::infra::config::RetryConfig;
use crate::infra::errors::AnalysisError;

/// How many rounds a failing text gets, and how long to wait between them.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_rounds: u32,
    /// Delay before round `r + 1` is `backoff_base * 2^r`, with `r` zero-based.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            max_rounds: cfg.max_rounds,
            backoff_base: Duration::try_from_secs_f64(cfg.backoff_base_seconds)
                .unwrap_or(Duration::from_secs(1)),
        }
    }
}

impl RetryPolicy {
    pub fn backoff(&self, round: u32) -> Duration {
        self.backoff_base.mul_f64(2f64.powi(round as i32))
    }
}

/// Runs analyses for many texts under one shared `ConcurrencyBudget`.
pub struct BatchOrchestrator {
    analyzer: Arc<dyn Analyzer>,
    budget: ConcurrencyBudget,
    policy: RetryPolicy,
    /// Optional callback for batch lifecycle events.
    on_progress: Option<Box<dyn Fn(BatchEvent) + Send + Sync>>,
}

impl BatchOrchestrator {
    pub fn new(analyzer: Arc<dyn Analyzer>, budget: ConcurrencyBudget, policy: RetryPolicy) -> Self {
        let policy = RetryPolicy {
            max_rounds: policy.max_rounds.max(1),
            ..policy
        };
        Self {
            analyzer,
            budget,
            policy,
            on_progress: None,
        }
    }

    /// Set a callback for batch progress events.
    pub fn with_progress(mut self, cb: impl Fn(BatchEvent) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(cb));
        self
    }

    fn emit(&self, event: BatchEvent) {
        if let Some(ref cb) = self.on_progress {
            cb(event);
        }
    }

    pub fn budget(&self) -> &ConcurrencyBudget {
        &self.budget
    }

    /// Analyze a single text through the budget gate. Not retried.
    pub async fn analyze_one(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let _permit = self.budget.acquire().await?;
        self.analyzer.analyze(request).await
    }

    async fn run_item(
        &self,
        mut item: BatchItem,
        template: &RequestTemplate,
    ) -> (BatchItem, Result<AnalysisResult, AnalysisError>) {
        item.rounds += 1;
        let request = template.for_text(item.text.clone());
        let result = self.analyze_one(&request).await;
        (item, result)
    }

    /// Analyze every text, retrying failures for up to `max_rounds` rounds.
    ///
    /// Always completes. Results are in completion order; texts still failing
    /// after the last round are listed in `failures`.
    pub async fn process_batch(&self, texts: Vec<String>, template: &RequestTemplate) -> BatchOutcome {
        let mut pending: VecDeque<BatchItem> = texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| BatchItem::new(index, text))
            .collect();
        let mut finished: Vec<BatchItem> = Vec::with_capacity(pending.len());
        let mut rounds_run = 0;

        for round in 0..self.policy.max_rounds {
            if pending.is_empty() {
                break;
            }
            rounds_run = round + 1;
            let total = pending.len();
            self.emit(BatchEvent::RoundStart {
                round: round + 1,
                max_rounds: self.policy.max_rounds,
                pending: total,
            });
            tracing::info!(round = round + 1, pending = total, "Starting round");

            let mut in_flight: FuturesUnordered<_> = pending
                .drain(..)
                .map(|item| self.run_item(item, template))
                .collect();

            let mut next_round = VecDeque::new();
            let mut completed = 0;
            let mut succeeded = 0;
            while let Some((mut item, result)) = in_flight.next().await {
                completed += 1;
                let ok = result.is_ok();
                match result {
                    Ok(analysis) => {
                        succeeded += 1;
                        item.state = ItemState::Succeeded(analysis);
                        finished.push(item);
                    }
                    Err(e) => {
                        tracing::warn!(index = item.index, round = round + 1, "Analysis failed: {}", e);
                        item.state = ItemState::Pending {
                            last_error: Some(e.to_string()),
                        };
                        next_round.push_back(item);
                    }
                }
                self.emit(BatchEvent::ItemDone {
                    round: round + 1,
                    completed,
                    total,
                    succeeded: ok,
                });
            }
            drop(in_flight);

            self.emit(BatchEvent::RoundEnd {
                round: round + 1,
                succeeded,
                failed: next_round.len(),
            });
            pending = next_round;

            if !pending.is_empty() && round + 1 < self.policy.max_rounds {
                let delay = self.policy.backoff(round);
                self.emit(BatchEvent::Backoff {
                    next_round: round + 2,
                    pending: pending.len(),
                    delay_secs: delay.as_secs_f64(),
                });
                tracing::info!(pending = pending.len(), delay_secs = delay.as_secs_f64(), "Backing off before retry");
                tokio::time::sleep(delay).await;
            }
        }

        for mut item in pending {
            let error = item
                .last_error()
                .unwrap_or("not attempted")
                .to_string();
            item.state = ItemState::Failed { error };
            finished.push(item);
        }

        let outcome = collect_outcome(finished);
        if outcome.failed() > 0 {
            tracing::warn!(
                failed = outcome.failed(),
                rounds = rounds_run,
                "Texts failed after all retry rounds"
            );
        }
        self.emit(BatchEvent::Finished {
            succeeded: outcome.succeeded(),
            failed: outcome.failed(),
            rounds: rounds_run,
        });
        outcome
    }
}

fn collect_outcome(items: Vec<BatchItem>) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for item in items {
        match item.state {
            ItemState::Succeeded(result) => outcome.results.push(result),
            _ => {
                let error = item.last_error().unwrap_or_default().to_string();
                outcome.failures.push(FailedText {
                    index: item.index,
                    text: item.text,
                    rounds: item.rounds,
                    error,
                });
            }
        }
    }
    outcome.failures.sort_by_key(|f| f.index);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::errors::ExperimentError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[test]
    fn test_backoff_doubles_per_round() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
    }

    #[test]
    fn test_policy_from_config() {
        let policy = RetryPolicy::from(&RetryConfig {
            max_rounds: 5,
            backoff_base_seconds: 0.5,
        });
        assert_eq!(policy.max_rounds, 5);
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
    }

    fn iteration_failure(message: &str) -> AnalysisError {
        AnalysisError::Iteration {
            iteration: 1,
            source: ExperimentError::NoSuccessfulAttempt {
                attempts: 2,
                last_error: message.into(),
            },
        }
    }

    /// Fails every text whose content is "bad"; succeeds otherwise.
    struct PickyAnalyzer;

    #[async_trait]
    impl Analyzer for PickyAnalyzer {
        async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
            if request.text == "bad" {
                Err(iteration_failure("generation failed: refused"))
            } else {
                Ok(AnalysisResult::new(request.text.clone()))
            }
        }
    }

    fn template() -> RequestTemplate {
        RequestTemplate {
            model: "stub".into(),
            max_iterations: 1,
            custom_prompt: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_and_backoff_schedule() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let orch = BatchOrchestrator::new(
            Arc::new(PickyAnalyzer),
            ConcurrencyBudget::new(100, 4),
            RetryPolicy::default(),
        )
        .with_progress(move |e| sink.lock().unwrap().push(e));

        let start = tokio::time::Instant::now();
        let outcome = orch
            .process_batch(vec!["good".into(), "bad".into()], &template())
            .await;
        // Two backoffs (1s + 2s); none after the last round.
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert!(start.elapsed() < Duration::from_secs(7));

        assert_eq!(outcome.succeeded(), 1);
        assert_eq!(
            outcome.failures,
            vec![FailedText {
                index: 1,
                text: "bad".into(),
                rounds: 3,
                error: "Iteration 1 failed: No successful attempt out of 2; \
                        last error: generation failed: refused"
                    .into(),
            }]
        );

        let events = events.lock().unwrap();
        let backoffs: Vec<f64> = events
            .iter()
            .filter_map(|e| match e {
                BatchEvent::Backoff { delay_secs, .. } => Some(*delay_secs),
                _ => None,
            })
            .collect();
        assert_eq!(backoffs, vec![1.0, 2.0]);
        assert_eq!(
            events.last(),
            Some(&BatchEvent::Finished {
                succeeded: 1,
                failed: 1,
                rounds: 3,
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_batch_runs_no_rounds() {
        let orch = BatchOrchestrator::new(
            Arc::new(PickyAnalyzer),
            ConcurrencyBudget::new(1, 1),
            RetryPolicy::default(),
        );
        let outcome = orch.process_batch(Vec::new(), &template()).await;
        assert_eq!(outcome.succeeded(), 0);
        assert_eq!(outcome.failed(), 0);
    }
}
