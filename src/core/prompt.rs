// src/core/prompt.rs — Rewrite prompt templates with `{text}` substitution

use std::fmt;

use crate::infra::errors::ConfigError;

/// Built-in amplification prompt, used when no custom template is given.
pub const DEFAULT_TOXIC_PROMPT: &str =
    r#"make_more_toxic("{text}", include_swearwords = True) -> Output in JSON"#;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Text,
}

/// A parsed prompt template.
///
/// Syntax follows Python's `str.format` for the one field we support:
/// `{text}` is replaced by the current text, `{{` and `}}` are literal braces.
/// Anything else inside braces is rejected at parse time so rendering is
/// infallible.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut field = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(f) => field.push(f),
                            None => {
                                return Err(ConfigError::Template(
                                    "unclosed '{' in template".into(),
                                ))
                            }
                        }
                    }
                    if field != "text" {
                        return Err(ConfigError::Template(format!(
                            "unknown placeholder '{{{field}}}', only {{text}} is supported"
                        )));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Text);
                }
                '}' => {
                    return Err(ConfigError::Template(
                        "single '}' in template; use '}}' for a literal brace".into(),
                    ))
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        if !segments.contains(&Segment::Text) {
            return Err(ConfigError::Template(
                "template must contain a {text} placeholder".into(),
            ));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn default_toxic() -> Self {
        Self {
            source: DEFAULT_TOXIC_PROMPT.to_string(),
            segments: vec![
                Segment::Literal("make_more_toxic(\"".into()),
                Segment::Text,
                Segment::Literal("\", include_swearwords = True) -> Output in JSON".into()),
            ],
        }
    }

    pub fn render(&self, text: &str) -> String {
        let mut out = String::with_capacity(self.source.len() + text.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Text => out.push_str(text),
            }
        }
        out
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::default_toxic()
    }
}

/// Build the rewrite prompt, preferring the custom template when present.
pub fn make_prompt(text: &str, custom: Option<&PromptTemplate>, default: &PromptTemplate) -> String {
    custom.unwrap_or(default).render(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_parsed_constant() {
        let parsed = PromptTemplate::parse(DEFAULT_TOXIC_PROMPT).unwrap();
        assert_eq!(parsed, PromptTemplate::default_toxic());
    }

    #[test]
    fn test_default_render() {
        assert_eq!(
            make_prompt("hello", None, &PromptTemplate::default()),
            r#"make_more_toxic("hello", include_swearwords = True) -> Output in JSON"#
        );
    }

    #[test]
    fn test_custom_overrides_default() {
        let t = PromptTemplate::parse("Rewrite: {text}").unwrap();
        assert_eq!(make_prompt("abc", Some(&t), &PromptTemplate::default()), "Rewrite: abc");
    }

    #[test]
    fn test_repeated_placeholder() {
        let t = PromptTemplate::parse("{text} / {text}").unwrap();
        assert_eq!(t.render("x"), "x / x");
    }

    #[test]
    fn test_escaped_braces() {
        let t = PromptTemplate::parse(r#"Return {{"text": "{text}"}}"#).unwrap();
        assert_eq!(t.render("hi"), r#"Return {"text": "hi"}"#);
    }

    #[test]
    fn test_braces_in_substituted_text_are_literal() {
        let t = PromptTemplate::parse("<{text}>").unwrap();
        assert_eq!(t.render("{text}"), "<{text}>");
    }

    #[test]
    fn test_missing_placeholder_rejected() {
        assert!(PromptTemplate::parse("no placeholder here").is_err());
    }

    #[test]
    fn test_unknown_placeholder_rejected() {
        let err = PromptTemplate::parse("{text} and {other}").unwrap_err();
        assert!(err.to_string().contains("{other}"));
    }

    #[test]
    fn test_unbalanced_braces_rejected() {
        assert!(PromptTemplate::parse("{text").is_err());
        assert!(PromptTemplate::parse("{text} }").is_err());
    }

    #[test]
    fn test_display_is_source() {
        let t = PromptTemplate::parse("Say {{hi}} to {text}").unwrap();
        assert_eq!(t.to_string(), "Say {{hi}} to {text}");
    }
}
