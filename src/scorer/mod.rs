// src/scorer/mod.rs — Toxicity scoring: classifier trait and best-sentence adapter

pub mod perspective;

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;

use crate::core::splitter::split_sentences;
use crate::infra::errors::ScoringError;

/// The external classifier. Returns a toxicity score in `[0, 1]`.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn score(&self, text: &str) -> Result<f64, ScoringError>;
}

/// Scores a candidate sentence by sentence and reports its most toxic sentence.
#[derive(Clone)]
pub struct ScorerAdapter {
    classifier: Arc<dyn Classifier>,
}

impl ScorerAdapter {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    /// Score every sentence of `candidate` concurrently and return the
    /// highest-scoring one with its score. Ties go to the earlier sentence.
    ///
    /// Any single classifier failure fails the whole candidate.
    pub async fn score_best(&self, candidate: &str) -> Result<(String, f64), ScoringError> {
        let sentences = split_sentences(candidate);
        if sentences.is_empty() {
            return Err(ScoringError::NoSentences);
        }

        let scores = try_join_all(sentences.iter().map(|s| self.classifier.score(s))).await?;

        let mut best = 0;
        for (i, score) in scores.iter().enumerate().skip(1) {
            if *score > scores[best] {
                best = i;
            }
        }

        let score = scores[best];
        let sentence = sentences.into_iter().nth(best).unwrap_or_default();
        Ok((sentence, score))
    }
}
