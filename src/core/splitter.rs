// src/core/splitter.rs — Sentence splitting for fine-grained scoring

/// Characters that end a sentence.
fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Split a block of text into trimmed, non-empty sentences.
///
/// Lines are split first; within a line a sentence ends at the whitespace run
/// that follows `.`, `!` or `?`. When the final sentence ends with exactly two
/// identical terminal marks (`..`, `!!`, `??`) the duplicate is dropped. Longer
/// runs such as an ellipsis are kept.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    for line in text.split('\n') {
        split_line(line, &mut sentences);
    }

    if let Some(last) = sentences.last_mut() {
        let mut tail = last.chars().rev();
        if let (Some(a), Some(b)) = (tail.next(), tail.next()) {
            if a == b && is_terminal(a) && tail.next() != Some(a) {
                last.pop();
            }
        }
    }

    sentences
}

fn split_line(line: &str, out: &mut Vec<String>) {
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut chars = line.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c.is_whitespace() && prev.is_some_and(is_terminal) {
            let mut end = i + c.len_utf8();
            while let Some(&(j, d)) = chars.peek() {
                if !d.is_whitespace() {
                    break;
                }
                end = j + d.len_utf8();
                chars.next();
            }
            push_trimmed(&line[start..i], out);
            start = end;
            prev = None;
            continue;
        }
        prev = Some(c);
    }

    push_trimmed(&line[start..], out);
}

fn push_trimmed(segment: &str, out: &mut Vec<String>) {
    let trimmed = segment.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}
