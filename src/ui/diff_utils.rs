use diffdeck::word_diff::changed_ranges;
use diffdeck::{LineKind, RenderLine};
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};
use std::ops::Range;

use crate::ui::highlight_line::Highlighter;

pub const REMOVED_BG: Color = Color::Rgb(80, 0, 0);
pub const REMOVED_WORD_BG: Color = Color::Rgb(150, 20, 20);
pub const ADDED_BG: Color = Color::Rgb(0, 60, 0);
pub const ADDED_WORD_BG: Color = Color::Rgb(0, 120, 0);
pub const PADDING_BG: Color = Color::Rgb(40, 40, 40);

pub fn gutter_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn hunk_header_style() -> Style {
    Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

/// Syntax-highlighted content of a line with its add/remove background.
/// Word segments, when present, get the brighter background on changed tokens.
pub fn content_spans<'a>(line: &'a RenderLine, highlighter: &Highlighter) -> Vec<Span<'a>> {
    let spans = highlighter.spans(&line.text);

    let mut spans = match line.kind {
        LineKind::Context => spans,
        LineKind::Remove | LineKind::Add => {
            let (base_bg, word_bg) = if line.kind == LineKind::Remove {
                (REMOVED_BG, REMOVED_WORD_BG)
            } else {
                (ADDED_BG, ADDED_WORD_BG)
            };
            let ranges = line
                .segments
                .as_deref()
                .map(changed_ranges)
                .unwrap_or_default();
            apply_diff_highlight(spans, &ranges, base_bg, word_bg)
        }
    };

    if line.no_newline_at_eof {
        spans.push(Span::styled(
            " \\ no newline at end of file",
            gutter_style().add_modifier(Modifier::ITALIC),
        ));
    }

    spans
}

/// Applies diff highlighting to existing syntax highlighted spans.
///
/// * `spans` - The original syntax highlighted spans
/// * `diff_ranges` - Byte ranges that should be highlighted with the diff color
/// * `base_bg` - The background color for the whole line (e.g. dark red for removed)
/// * `highlight_bg` - The background color for the changed parts (e.g. bright red)
pub fn apply_diff_highlight<'a>(
    spans: Vec<Span<'a>>,
    diff_ranges: &[Range<usize>],
    base_bg: Color,
    highlight_bg: Color,
) -> Vec<Span<'a>> {
    if diff_ranges.is_empty() {
        return spans
            .into_iter()
            .map(|span| Span::styled(span.content, span.style.bg(base_bg)))
            .collect();
    }

    let mut new_spans = Vec::new();
    let mut current_idx = 0;

    for span in spans {
        let content = span.content;
        let len = content.len();
        let span_end = current_idx + len;
        let style = span.style;

        let mut last_processed = current_idx;

        for range in diff_ranges {
            if range.end <= current_idx {
                continue;
            }
            if range.start >= span_end {
                break;
            }

            let overlap_start = range.start.max(current_idx);
            let overlap_end = range.end.min(span_end);

            if overlap_start > last_processed {
                let sub_content =
                    &content[(last_processed - current_idx)..(overlap_start - current_idx)];
                new_spans.push(Span::styled(sub_content.to_string(), style.bg(base_bg)));
            }

            let sub_content = &content[(overlap_start - current_idx)..(overlap_end - current_idx)];
            new_spans.push(Span::styled(sub_content.to_string(), style.bg(highlight_bg)));

            last_processed = overlap_end;
        }

        if last_processed < span_end {
            let sub_content = &content[(last_processed - current_idx)..];
            new_spans.push(Span::styled(sub_content.to_string(), style.bg(base_bg)));
        }

        current_idx += len;
    }

    new_spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use diffdeck::diff_words;

    fn texts_with_bg(spans: &[Span], bg: Color) -> Vec<String> {
        spans
            .iter()
            .filter(|s| s.style.bg == Some(bg))
            .map(|s| s.content.to_string())
            .collect()
    }

    #[test]
    fn highlight_splits_spans_across_ranges() {
        let spans = vec![Span::raw("foo "), Span::raw("bar baz")];
        let out = apply_diff_highlight(spans, &[2..6], REMOVED_BG, REMOVED_WORD_BG);

        assert_eq!(texts_with_bg(&out, REMOVED_WORD_BG), vec!["o ", "ba"]);
        assert_eq!(texts_with_bg(&out, REMOVED_BG), vec!["fo", "r baz"]);
    }

    #[test]
    fn word_segments_drive_highlight() {
        let (_, added) = diff_words("let port = 3000;", "let port = 8080;");
        let ranges = changed_ranges(&added);
        let out = apply_diff_highlight(vec![Span::raw("let port = 8080;")], &ranges, ADDED_BG, ADDED_WORD_BG);

        assert_eq!(texts_with_bg(&out, ADDED_WORD_BG), vec!["8080"]);
    }

    #[test]
    fn no_ranges_paints_base_background() {
        let out = apply_diff_highlight(vec![Span::raw("whole")], &[], ADDED_BG, ADDED_WORD_BG);
        assert_eq!(texts_with_bg(&out, ADDED_BG), vec!["whole"]);
    }
}
