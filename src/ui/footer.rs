use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

const SHORTCUTS: &[(&str, &str)] = &[
    ("q", "Quit"),
    ("j/k", "Files"),
    ("d/u", "Scroll"),
    ("g/G", "Top/Bottom"),
    ("h/l", "H-Scroll"),
    ("s", "Toggle View"),
    ("w", "Word Diff"),
    ("c", "Collapse"),
    ("C", "Collapse All"),
    ("r", "Reload"),
    ("?", "Hide Help"),
];

pub fn render_footer(f: &mut Frame, area: Rect) {
    let key_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let spans: Vec<Span> = SHORTCUTS
        .iter()
        .flat_map(|(key, label)| {
            [
                Span::styled(*key, key_style),
                Span::raw(format!(":{label}  ")),
            ]
        })
        .collect();

    let footer = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).title("Shortcuts"))
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: false });

    f.render_widget(footer, area);
}
