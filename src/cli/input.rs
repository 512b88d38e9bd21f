// src/cli/input.rs — Resolve --input into single-text or batch mode

use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    Single(String),
    Batch(Vec<String>),
}

#[derive(Deserialize)]
struct InputRecord {
    text: String,
}

impl InputSource {
    /// Batch mode if `raw` names a readable JSON array of `{"text": ...}`
    /// objects, otherwise `raw` itself is the text.
    pub fn resolve(raw: &str) -> Self {
        match read_batch(Path::new(raw)) {
            Some(texts) => InputSource::Batch(texts),
            None => InputSource::Single(raw.to_string()),
        }
    }
}

fn read_batch(path: &Path) -> Option<Vec<String>> {
    if !path.is_file() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!("Could not read {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str::<Vec<InputRecord>>(&content) {
        Ok(records) => Some(records.into_iter().map(|r| r.text).collect()),
        Err(e) => {
            tracing::debug!("{} is not a batch input file: {}", path.display(), e);
            None
        }
    }
}
