// src/cli/run.rs — Default command: wire up the engine and run one input

use std::sync::Arc;
use std::time::Instant;

use super::input::InputSource;
use super::output::{RunOutput, RunResult, SingleOutcome};
use super::progress::terminal_progress;
use super::Cli;
use crate::core::amplifier::ToxicityAmplifier;
use crate::core::budget::ConcurrencyBudget;
use crate::core::experiment::{ExperimentConfig, ExperimentRunner};
use crate::core::orchestrator::{BatchOrchestrator, RetryPolicy};
use crate::core::prompt::PromptTemplate;
use crate::core::types::RequestTemplate;
use crate::infra::config::Config;
use crate::infra::errors::ConfigError;
use crate::provider::resolver;
use crate::scorer::perspective::{PerspectiveClient, PERSPECTIVE_KEY_VAR};
use crate::scorer::ScorerAdapter;

/// Assemble generator, scorer, search and batch layers from config.
///
/// Fails before any request is sent if a needed credential is missing.
pub fn build_orchestrator(config: &Config, model: &str, quiet: bool) -> anyhow::Result<BatchOrchestrator> {
    let generator = resolver::build_generator(config, model)?;

    let perspective_key = std::env::var(PERSPECTIVE_KEY_VAR)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or(ConfigError::MissingCredential {
            var: PERSPECTIVE_KEY_VAR,
        })?;
    let classifier = PerspectiveClient::new(
        perspective_key,
        config.scoring.clone(),
        config.limits.request_timeout(),
    );

    let runner = ExperimentRunner::new(
        Arc::new(generator),
        ScorerAdapter::new(Arc::new(classifier)),
        ExperimentConfig::try_from(config)?,
    );
    let budget = ConcurrencyBudget::new(config.limits.rate_limit, config.limits.max_concurrent);

    let orchestrator = BatchOrchestrator::new(
        Arc::new(ToxicityAmplifier::new(runner)),
        budget,
        RetryPolicy::from(&config.retry),
    );
    Ok(if quiet {
        orchestrator
    } else {
        orchestrator.with_progress(terminal_progress())
    })
}

/// Run the resolved input through the orchestrator.
pub async fn execute(
    orchestrator: &BatchOrchestrator,
    input: InputSource,
    template: &RequestTemplate,
) -> RunResult {
    match input {
        InputSource::Single(text) => {
            let request = template.for_text(text.clone());
            match orchestrator.analyze_one(&request).await {
                Ok(result) => RunResult::Single(SingleOutcome::Analysis(result)),
                Err(e) => {
                    tracing::error!("Analysis failed: {}", e);
                    RunResult::Single(SingleOutcome::Error {
                        error: e.to_string(),
                        text,
                    })
                }
            }
        }
        InputSource::Batch(texts) => {
            let outcome = orchestrator.process_batch(texts, template).await;
            for failure in &outcome.failures {
                tracing::debug!(
                    index = failure.index,
                    rounds = failure.rounds,
                    "Gave up on text: {}",
                    failure.error
                );
            }
            eprintln!(
                "Successfully analyzed: {} texts, failed: {} texts",
                outcome.succeeded(),
                outcome.failed()
            );
            RunResult::Batch(outcome.results)
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cli.apply_overrides(&mut config);
    config.validate()?;

    let custom_prompt = cli
        .custom_prompt
        .as_deref()
        .map(PromptTemplate::parse)
        .transpose()?;

    let template = RequestTemplate {
        model: cli.model.clone(),
        max_iterations: cli.iterations,
        custom_prompt,
    };
    let orchestrator = build_orchestrator(&config, &cli.model, cli.quiet)?;

    let input = InputSource::resolve(&cli.input);
    if let InputSource::Batch(ref texts) = input {
        tracing::info!(texts = texts.len(), "Batch input loaded");
    }

    let result = execute(&orchestrator, input, &template).await;

    let output = RunOutput {
        input_text: cli.input.clone(),
        model: cli.model.clone(),
        iterations: cli.iterations,
        custom_prompt: cli.custom_prompt.clone(),
        result,
    };
    output.write_to(&cli.output)?;

    eprintln!("Execution time: {:.2} seconds", start.elapsed().as_secs_f64());
    Ok(())
}
