use diffdeck::{RenderLine, SplitRow};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};

use crate::{
    app::App,
    ui::{
        diff_utils::{PADDING_BG, content_spans, gutter_style, hunk_header_style},
        highlight_line::Highlighter,
    },
};

#[derive(Clone, Copy)]
enum Side {
    Old,
    New,
}

pub fn render_side_by_side_diff(
    f: &mut Frame,
    area: Rect,
    path: &str,
    old_path: &str,
    rows: &[SplitRow],
    app: &App,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let visible_lines = area.height.saturating_sub(2) as usize;
    let panel_width = chunks[0].width.saturating_sub(2) as usize; // Width minus borders
    let highlighter = Highlighter::for_file(app, path);

    let mut old_lines = Vec::new();
    let mut new_lines = Vec::new();

    for row in rows.iter().skip(app.scroll_offset).take(visible_lines) {
        match row {
            SplitRow::HunkHeader(header) => {
                let header_line = Line::from(Span::styled(header.as_str(), hunk_header_style()));
                old_lines.push(header_line.clone());
                new_lines.push(header_line);
            }
            SplitRow::Pair { left, right } => {
                old_lines.push(render_cell(left.as_ref(), Side::Old, panel_width, &highlighter));
                new_lines.push(render_cell(right.as_ref(), Side::New, panel_width, &highlighter));
            }
        }
    }

    let old_title = format!("Old: {}", if old_path.is_empty() { path } else { old_path });
    let new_title = format!("New: {path}");
    let scroll = (0, app.horizontal_scroll_offset as u16);

    let old_paragraph = Paragraph::new(Text::from(old_lines))
        .block(Block::default().borders(Borders::ALL).title(old_title))
        .scroll(scroll);
    let new_paragraph = Paragraph::new(Text::from(new_lines))
        .block(Block::default().borders(Borders::ALL).title(new_title))
        .scroll(scroll);

    f.render_widget(old_paragraph, chunks[0]);
    f.render_widget(new_paragraph, chunks[1]);

    let total_lines = rows.len();
    if total_lines > visible_lines {
        let mut scrollbar_state = ScrollbarState::new(total_lines).position(app.scroll_offset);

        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));

        for chunk in chunks.iter() {
            f.render_stateful_widget(
                scrollbar.clone(),
                chunk.inner(ratatui::layout::Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }
    }
}

fn render_cell<'a>(
    line: Option<&'a RenderLine>,
    side: Side,
    panel_width: usize,
    highlighter: &Highlighter,
) -> Line<'a> {
    let Some(line) = line else {
        // Padding slot opposite an unpaired addition or removal.
        return Line::from(Span::styled(
            " ".repeat(panel_width),
            Style::default().bg(PADDING_BG),
        ));
    };

    let number = match side {
        Side::Old => line.old_line_no,
        Side::New => line.new_line_no,
    };

    let mut spans = vec![Span::styled(
        number.map_or_else(|| "     ".to_string(), |n| format!("{n:4} ")),
        gutter_style(),
    )];
    spans.extend(content_spans(line, highlighter));

    Line::from(spans)
}
