use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style as SyntectStyle, Theme};
use syntect::parsing::{SyntaxReference, SyntaxSet};

use crate::app::App;

/// Syntax highlighting for the lines of one file.
pub struct Highlighter<'a> {
    syntax: Option<&'a SyntaxReference>,
    syntax_set: &'a SyntaxSet,
    theme: &'a Theme,
}

impl<'a> Highlighter<'a> {
    pub fn for_file(app: &'a App, path: &str) -> Self {
        Self {
            syntax: app.get_syntax_for_file(path),
            syntax_set: app.get_syntax_set(),
            theme: app.get_theme(),
        }
    }

    /// Highlights a single line. Each line starts from a fresh parse state
    /// since hunks rarely begin at a syntactic boundary.
    pub fn spans<'t>(&self, content: &'t str) -> Vec<Span<'t>> {
        let Some(syntax) = self.syntax else {
            return vec![Span::raw(content)];
        };

        let mut highlighter = HighlightLines::new(syntax, self.theme);
        match highlighter.highlight_line(content, self.syntax_set) {
            Ok(ranges) => ranges
                .into_iter()
                .map(|(style, text)| Span::styled(text, syntect_style_to_ratatui(style)))
                .collect(),
            Err(_) => vec![Span::raw(content)],
        }
    }
}

fn syntect_style_to_ratatui(syntect_style: SyntectStyle) -> Style {
    let fg_color = Color::Rgb(
        syntect_style.foreground.r,
        syntect_style.foreground.g,
        syntect_style.foreground.b,
    );

    let mut style = Style::default().fg(fg_color);

    if syntect_style.font_style.contains(FontStyle::BOLD) {
        style = style.add_modifier(Modifier::BOLD);
    }
    if syntect_style.font_style.contains(FontStyle::ITALIC) {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if syntect_style.font_style.contains(FontStyle::UNDERLINE) {
        style = style.add_modifier(Modifier::UNDERLINED);
    }

    style
}
