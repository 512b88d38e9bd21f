// src/core/types.rs — Core domain types

use serde::{Deserialize, Serialize};

use super::prompt::PromptTemplate;

/// Input to one amplification search. Read-only once built.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub text: String,
    pub model: String,
    pub max_iterations: u32,
    pub custom_prompt: Option<PromptTemplate>,
}

/// Shared settings used to build one `AnalysisRequest` per input text.
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    pub model: String,
    pub max_iterations: u32,
    pub custom_prompt: Option<PromptTemplate>,
}

impl RequestTemplate {
    pub fn for_text(&self, text: impl Into<String>) -> AnalysisRequest {
        AnalysisRequest {
            text: text.into(),
            model: self.model.clone(),
            max_iterations: self.max_iterations,
            custom_prompt: self.custom_prompt.clone(),
        }
    }
}

/// One generation+scoring outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub text: String,
    pub score: f64,
    /// The most toxic sentence within `text`.
    pub sentence: String,
}

/// Pick the highest-scoring attempt; ties go to the earliest.
pub fn select_best(attempts: &[Attempt]) -> Option<&Attempt> {
    let mut best: Option<&Attempt> = None;
    for attempt in attempts {
        match best {
            Some(b) if attempt.score <= b.score => {}
            _ => best = Some(attempt),
        }
    }
    best
}

/// State after one search round.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    pub iteration: u32,
    /// Best-known state after this round (repeated from the previous round on rejection).
    pub committed: Attempt,
    /// The raw attempt observed this round, accepted or not.
    pub possible: Attempt,
    pub accepted: bool,
}

/// Full output for one text. All sequences have one entry per completed iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub text: String,
    pub tox_texts: Vec<String>,
    pub tox_scores: Vec<f64>,
    pub tox_sents: Vec<String>,
    pub pos_tox_texts: Vec<String>,
    pub pos_tox_scores: Vec<f64>,
    pub pos_tox_sents: Vec<String>,
}

impl AnalysisResult {
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            text: original.into(),
            tox_texts: Vec::new(),
            tox_scores: Vec::new(),
            tox_sents: Vec::new(),
            pos_tox_texts: Vec::new(),
            pos_tox_scores: Vec::new(),
            pos_tox_sents: Vec::new(),
        }
    }

    pub fn push(&mut self, record: IterationRecord) {
        self.tox_texts.push(record.committed.text);
        self.tox_scores.push(record.committed.score);
        self.tox_sents.push(record.committed.sentence);
        self.pos_tox_texts.push(record.possible.text);
        self.pos_tox_scores.push(record.possible.score);
        self.pos_tox_sents.push(record.possible.sentence);
    }

    pub fn iterations(&self) -> usize {
        self.tox_scores.len()
    }
}

/// Orchestration-level state of one input text.
#[derive(Debug, Clone)]
pub struct BatchItem {
    /// Position in the input; items are keyed by this, not by text.
    pub index: usize,
    pub text: String,
    /// Rounds this item has been attempted in.
    pub rounds: u32,
    pub state: ItemState,
}

#[derive(Debug, Clone)]
pub enum ItemState {
    Pending { last_error: Option<String> },
    Succeeded(AnalysisResult),
    Failed { error: String },
}

impl BatchItem {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            rounds: 0,
            state: ItemState::Pending { last_error: None },
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        match &self.state {
            ItemState::Pending { last_error } => last_error.as_deref(),
            ItemState::Failed { error } => Some(error),
            ItemState::Succeeded(_) => None,
        }
    }
}

/// A text that could not be analyzed within the retry budget.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedText {
    pub index: usize,
    pub text: String,
    pub rounds: u32,
    pub error: String,
}

/// Result of one `process_batch` call.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Successful analyses in completion order.
    pub results: Vec<AnalysisResult>,
    pub failures: Vec<FailedText>,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> usize {
        self.results.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Lifecycle events emitted by the batch orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    RoundStart {
        round: u32,
        max_rounds: u32,
        pending: usize,
    },
    ItemDone {
        round: u32,
        completed: usize,
        total: usize,
        succeeded: bool,
    },
    RoundEnd {
        round: u32,
        succeeded: usize,
        failed: usize,
    },
    Backoff {
        next_round: u32,
        pending: usize,
        delay_secs: f64,
    },
    Finished {
        succeeded: usize,
        failed: usize,
        rounds: u32,
    },
}
