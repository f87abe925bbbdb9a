use similar::{Algorithm, DiffTag, capture_diff_slices};
use std::ops::Range;

/// A run of text within a line, marked when it is absent from the other side
/// of a replaced pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSegment {
    pub text: String,
    pub changed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenClass {
    Space,
    Word,
    Punct,
}

fn classify(c: char) -> TokenClass {
    if c.is_whitespace() {
        TokenClass::Space
    } else if c.is_alphanumeric() || c == '_' {
        TokenClass::Word
    } else {
        TokenClass::Punct
    }
}

/// Splits a line into whitespace runs, word runs, and single punctuation
/// characters. Joining the tokens gives back the input.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut prev: Option<TokenClass> = None;

    for (idx, c) in text.char_indices() {
        let class = classify(c);
        if let Some(prev) = prev
            && (prev != class || class == TokenClass::Punct)
        {
            tokens.push(&text[start..idx]);
            start = idx;
        }
        prev = Some(class);
    }

    if start < text.len() {
        tokens.push(&text[start..]);
    }

    tokens
}

/// Token-level LCS between a removed line and the added line it was paired
/// with. Tokens on the common subsequence come back unchanged.
pub fn diff_words(removed: &str, added: &str) -> (Vec<WordSegment>, Vec<WordSegment>) {
    let old_tokens = tokenize(removed);
    let new_tokens = tokenize(added);

    let mut old_segments = Vec::new();
    let mut new_segments = Vec::new();

    for op in capture_diff_slices(Algorithm::Lcs, &old_tokens, &new_tokens) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        let changed = tag != DiffTag::Equal;
        push_segment(&mut old_segments, &old_tokens[old_range], changed);
        push_segment(&mut new_segments, &new_tokens[new_range], changed);
    }

    (old_segments, new_segments)
}

fn push_segment(segments: &mut Vec<WordSegment>, tokens: &[&str], changed: bool) {
    if tokens.is_empty() {
        return;
    }
    let text = tokens.concat();

    match segments.last_mut() {
        Some(last) if last.changed == changed => last.text.push_str(&text),
        _ => segments.push(WordSegment { text, changed }),
    }
}

/// Byte ranges of the changed segments, for overlaying on styled spans.
pub fn changed_ranges(segments: &[WordSegment]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut offset = 0;

    for segment in segments {
        let end = offset + segment.text.len();
        if segment.changed {
            ranges.push(offset..end);
        }
        offset = end;
    }

    ranges
}
