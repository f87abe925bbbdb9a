use diffdeck::{LineKind, RenderLine, UnifiedRow};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};

use crate::{
    app::App,
    ui::{
        diff_utils::{ADDED_BG, REMOVED_BG, content_spans, gutter_style, hunk_header_style},
        highlight_line::Highlighter,
    },
};

pub fn render_unified_diff(
    f: &mut Frame,
    area: Rect,
    title: &str,
    path: &str,
    rows: &[UnifiedRow],
    app: &App,
) {
    let visible_lines = area.height.saturating_sub(2) as usize; // Account for borders
    let highlighter = Highlighter::for_file(app, path);

    let lines: Vec<Line> = rows
        .iter()
        .skip(app.scroll_offset)
        .take(visible_lines)
        .map(|row| match row {
            UnifiedRow::HunkHeader(header) => Line::from(vec![
                Span::styled("          ", gutter_style()),
                Span::styled(header.as_str(), hunk_header_style()),
            ]),
            UnifiedRow::Line(line) => render_diff_line(line, &highlighter),
        })
        .collect();

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((0, app.horizontal_scroll_offset as u16));

    f.render_widget(paragraph, area);

    let total_lines = rows.len();
    if total_lines > visible_lines {
        let mut scrollbar_state = ScrollbarState::new(total_lines).position(app.scroll_offset);

        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));

        f.render_stateful_widget(
            scrollbar,
            area.inner(ratatui::layout::Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn render_diff_line<'a>(line: &'a RenderLine, highlighter: &Highlighter) -> Line<'a> {
    let line_num_text = match (line.old_line_no, line.new_line_no) {
        (Some(old), Some(new)) => format!("{old:4}:{new:4} "),
        (Some(old), None) => format!("{old:4}:     "),
        (None, Some(new)) => format!("    :{new:4} "),
        (None, None) => "          ".to_string(),
    };

    let (prefix, prefix_style) = match line.kind {
        LineKind::Add => ("+ ", Style::default().bg(ADDED_BG).fg(Color::White)),
        LineKind::Remove => ("- ", Style::default().bg(REMOVED_BG).fg(Color::White)),
        LineKind::Context => ("  ", Style::default().fg(Color::White)),
    };

    let mut spans = vec![
        Span::styled(line_num_text, gutter_style()),
        Span::styled(prefix, prefix_style),
    ];
    spans.extend(content_spans(line, highlighter));

    Line::from(spans)
}
