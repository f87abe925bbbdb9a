use diffdeck::{FileBody, FileStatus, RenderFile, ViewMode};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::{
    app::App,
    ui::{
        footer::render_footer, side_by_side_diff::render_side_by_side_diff,
        unified_diff::render_unified_diff,
    },
};

pub const FILE_LIST_WIDTH: u16 = 36;

pub fn ui(f: &mut Frame, app: &App) {
    let size = f.area();

    // Main layout with optional footer
    let (content_area, footer_area) = if app.show_shortcuts {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(size);
        (main_chunks[0], Some(main_chunks[1]))
    } else {
        (size, None)
    };

    if app.model.is_no_changes() {
        render_no_changes(f, content_area);
    } else {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(FILE_LIST_WIDTH), Constraint::Min(0)])
            .split(content_area);

        render_file_list(f, chunks[0], app);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(chunks[1]);

        render_summary(f, right[0], app);
        if let Some(file) = app.selected_for_width(right[1].width) {
            render_file(f, right[1], &file, app);
        }
    }

    // Footer with keyboard shortcuts (if enabled)
    if let Some(footer_area) = footer_area {
        render_footer(f, footer_area);
    }
}

fn status_color(status: FileStatus) -> Color {
    match status {
        FileStatus::Added => Color::Green,
        FileStatus::Deleted => Color::Red,
        FileStatus::Modified => Color::Yellow,
        FileStatus::Renamed => Color::Cyan,
        FileStatus::Binary => Color::Magenta,
    }
}

fn render_file_list(f: &mut Frame, area: Rect, app: &App) {
    let files: Vec<ListItem> = app
        .model
        .files()
        .iter()
        .map(|file| {
            let marker = if file.is_collapsed() { "▸ " } else { "▾ " };
            ListItem::new(Line::from(vec![
                Span::raw(marker),
                Span::styled(
                    format!("{} ", file.status.as_char()),
                    Style::default()
                        .fg(status_color(file.status))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(file.path.as_str()),
                Span::styled(
                    format!(" +{}", file.stats.insertions),
                    Style::default().fg(Color::Green),
                ),
                Span::styled(
                    format!(" -{}", file.stats.deletions),
                    Style::default().fg(Color::Red),
                ),
            ]))
        })
        .collect();

    let files_list = List::new(files)
        .block(Block::default().borders(Borders::ALL).title("Files"))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );

    f.render_stateful_widget(files_list, area, &mut app.file_list_state.clone());
}

fn render_summary(f: &mut Frame, area: Rect, app: &App) {
    let mode = match app.session.mode {
        ViewMode::Unified => "unified",
        ViewMode::Split => "split",
    };
    let word_diff = if app.session.word_diff { "word diff on" } else { "word diff off" };

    let summary = Line::from(vec![
        Span::styled(
            app.model.stats().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  [{mode}, {word_diff}]"),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    f.render_widget(Paragraph::new(summary), area);
}

fn render_file(f: &mut Frame, area: Rect, file: &RenderFile, app: &App) {
    let title = format!(
        "{} {} ({})",
        file.status.as_char(),
        file.path,
        file.stats.short()
    );

    match &file.body {
        FileBody::Unified(rows) => render_unified_diff(f, area, &title, &file.path, rows, app),
        FileBody::Split(rows) => {
            render_side_by_side_diff(f, area, &file.path, &file.old_path, rows, app)
        }
        FileBody::Collapsed => render_placeholder(
            f,
            area,
            &title,
            format!("Collapsed: {}. Press c to expand.", file.stats),
        ),
        FileBody::Binary => render_placeholder(f, area, &title, "Binary files differ".to_string()),
        FileBody::NoHunks if file.status == FileStatus::Renamed => render_placeholder(
            f,
            area,
            &title,
            format!("Renamed from {}", file.old_path),
        ),
        FileBody::NoHunks => {
            render_placeholder(f, area, &title, "No content changes".to_string())
        }
    }
}

fn render_placeholder(f: &mut Frame, area: Rect, title: &str, message: String) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        message,
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )))
    .block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(paragraph, area);
}

fn render_no_changes(f: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new("No changes")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("diffdeck"));

    f.render_widget(paragraph, area);
}
