// src/cli/output.rs — Run output document written as pretty JSON

use std::path::Path;

use serde::Serialize;

use crate::core::types::AnalysisResult;

#[derive(Debug, Serialize)]
pub struct RunOutput {
    /// The --input argument as given.
    pub input_text: String,
    pub model: String,
    pub iterations: u32,
    pub custom_prompt: Option<String>,
    pub result: RunResult,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RunResult {
    Single(SingleOutcome),
    Batch(Vec<AnalysisResult>),
}

/// Single-text mode writes the analysis, or the error in its place.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SingleOutcome {
    Analysis(AnalysisResult),
    Error { error: String, text: String },
}

impl RunOutput {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        eprintln!("Results saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn output(result: RunResult) -> RunOutput {
        RunOutput {
            input_text: "in".into(),
            model: "gpt-3.5-turbo".into(),
            iterations: 1,
            custom_prompt: None,
            result,
        }
    }

    #[test]
    fn test_error_shape() {
        let out = output(RunResult::Single(SingleOutcome::Error {
            error: "boom".into(),
            text: "in".into(),
        }));
        let value: serde_json::Value = serde_json::from_str(&out.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "input_text": "in",
                "model": "gpt-3.5-turbo",
                "iterations": 1,
                "custom_prompt": null,
                "result": {"error": "boom", "text": "in"}
            })
        );
    }

    #[test]
    fn test_batch_is_array_and_indented() {
        let out = output(RunResult::Batch(vec![AnalysisResult::new("a")]));
        let json = out.to_json().unwrap();
        assert!(json.contains("\n  \"result\": ["));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["result"][0]["text"], "a");
        assert_eq!(value["result"][0]["tox_scores"], serde_json::json!([]));
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        output(RunResult::Single(SingleOutcome::Analysis(AnalysisResult::new("x"))))
            .write_to(&path)
            .unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["result"]["text"], "x");
        assert_eq!(value["result"]["pos_tox_sents"], serde_json::json!([]));
    }
}
