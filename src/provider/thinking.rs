// src/provider/thinking.rs — Response post-processing per model

use crate::infra::config::ThinkingMarkers;

/// How a model's raw response is turned into candidate text.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PostProcess {
    #[default]
    Verbatim,
    /// Drop a leading reasoning section delimited by `start` / `end`.
    StripThinking { start: String, end: String },
}

impl PostProcess {
    pub fn for_markers(markers: Option<&ThinkingMarkers>) -> Self {
        match markers {
            Some(m) => PostProcess::StripThinking {
                start: m.start.clone(),
                end: m.end.clone(),
            },
            None => PostProcess::Verbatim,
        }
    }

    /// Apply to a raw response.
    ///
    /// With both markers present, everything up to and including the first end
    /// marker is removed. If nothing but whitespace follows it, the raw
    /// response is returned unchanged.
    pub fn apply(&self, raw: String) -> String {
        match self {
            PostProcess::Verbatim => raw,
            PostProcess::StripThinking { start, end } => {
                if !raw.contains(start.as_str()) {
                    return raw;
                }
                let Some(pos) = raw.find(end.as_str()) else {
                    return raw;
                };
                let remainder = &raw[pos + end.len()..];
                if remainder.trim().is_empty() {
                    raw
                } else {
                    remainder.to_string()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn think() -> PostProcess {
        PostProcess::StripThinking {
            start: "<think>".into(),
            end: "</think>".into(),
        }
    }

    #[test]
    fn test_verbatim_passthrough() {
        assert_eq!(PostProcess::Verbatim.apply("a <think>b</think> c".into()), "a <think>b</think> c");
    }

    #[test]
    fn test_strips_reasoning() {
        let raw = "<think>plan the rewrite</think>\nFinal answer.".to_string();
        assert_eq!(think().apply(raw), "\nFinal answer.");
    }

    #[test]
    fn test_keeps_raw_when_only_reasoning() {
        let raw = "<think>just thinking</think>  \n".to_string();
        assert_eq!(think().apply(raw.clone()), raw);
    }

    #[test]
    fn test_requires_both_markers() {
        let no_end = "<think>never closed. Answer.".to_string();
        assert_eq!(think().apply(no_end.clone()), no_end);

        let no_start = "stray </think> Answer.".to_string();
        assert_eq!(think().apply(no_start.clone()), no_start);
    }

    #[test]
    fn test_for_markers() {
        assert_eq!(PostProcess::for_markers(None), PostProcess::Verbatim);
        let markers = ThinkingMarkers {
            start: "<think>".into(),
            end: "</think>".into(),
        };
        assert_eq!(PostProcess::for_markers(Some(&markers)), think());
    }
}
