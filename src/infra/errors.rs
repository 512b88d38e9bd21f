// src/infra/errors.rs — Error types for toxamp

use std::time::Duration;

use thiserror::Error;

/// Failure of the generation service to produce a candidate.
#[derive(Error, Debug, Clone)]
pub enum GenerationError {
    #[error("Provider '{provider}' error: {message}")]
    Provider {
        provider: String,
        message: String,
        retriable: bool,
    },

    #[error("Rate limited by '{provider}'")]
    RateLimited { provider: String },

    #[error("Provider '{provider}' returned no content")]
    EmptyResponse { provider: String },
}

impl GenerationError {
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            GenerationError::Provider {
                retriable: true,
                ..
            } | GenerationError::RateLimited { .. }
        )
    }
}

/// Failure of the classifier while scoring a candidate.
#[derive(Error, Debug, Clone)]
pub enum ScoringError {
    #[error("Classifier request failed: {message}")]
    Request { message: String, retriable: bool },

    #[error("Classifier returned HTTP {status}")]
    Http { status: u16 },

    #[error("Malformed classifier response: {0}")]
    MalformedResponse(String),

    #[error("Candidate has no scorable sentences")]
    NoSentences,
}

impl ScoringError {
    pub fn is_retriable(&self) -> bool {
        match self {
            ScoringError::Request { retriable, .. } => *retriable,
            ScoringError::Http { status } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// One failed generation+scoring attempt. Absorbed by the experiment runner.
#[derive(Error, Debug, Clone)]
pub enum AttemptError {
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringError),

    #[error("{stage} timed out after {}s", after.as_secs())]
    Deadline {
        stage: &'static str,
        after: Duration,
    },
}

impl AttemptError {
    /// Timeouts are transient; otherwise defer to the underlying service error.
    pub fn is_retriable(&self) -> bool {
        match self {
            AttemptError::Generation(e) => e.is_retriable(),
            AttemptError::Scoring(e) => e.is_retriable(),
            AttemptError::Deadline { .. } => true,
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ExperimentError {
    #[error("No successful attempt out of {attempts}; last error: {last_error}")]
    NoSuccessfulAttempt { attempts: u32, last_error: String },
}

/// A whole per-text search failed. The batch layer turns this into a retry.
#[derive(Error, Debug, Clone)]
pub enum AnalysisError {
    #[error("Iteration {iteration} failed: {source}")]
    Iteration {
        iteration: u32,
        #[source]
        source: ExperimentError,
    },

    #[error("Concurrency budget unavailable")]
    BudgetClosed,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid prompt template: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Invalid(String),

    #[error("Missing credential: set {var}")]
    MissingCredential { var: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
