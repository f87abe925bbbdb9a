use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::io;
use unicode_width::UnicodeWidthStr;
use tracing::{error, info};

mod app;
mod config;
mod logging;
mod ui;

use app::App;
use config::Args;
use diffdeck::DiffDocument;
use ui::render_ui::{FILE_LIST_WIDTH, ui};

const PAGE: usize = 10;
const H_SCROLL: usize = 4;

fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    loop {
        app.set_pane_width(terminal.size()?.width.saturating_sub(FILE_LIST_WIDTH));
        terminal.draw(|f| ui(f, &app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Char('q') => return Ok(()),
            KeyCode::Char('j') | KeyCode::Down => app.next_file(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_file(),
            KeyCode::Char('d') | KeyCode::PageDown => {
                for _ in 0..PAGE {
                    app.scroll_down();
                }
            }
            KeyCode::Char('u') | KeyCode::PageUp => {
                for _ in 0..PAGE {
                    app.scroll_up();
                }
            }
            KeyCode::Char('g') => app.scroll_offset = 0,
            KeyCode::Char('G') => app.scroll_to_bottom(),
            KeyCode::Char('h') | KeyCode::Left => app.scroll_left(H_SCROLL),
            KeyCode::Char('l') | KeyCode::Right => app.scroll_right(H_SCROLL),
            KeyCode::Char('s') => app.toggle_view_mode(app.pane_width),
            KeyCode::Char('w') => app.toggle_word_diff(),
            KeyCode::Char('c') | KeyCode::Char(' ') => app.toggle_collapse_selected(),
            KeyCode::Char('C') => app.toggle_collapse_all(),
            KeyCode::Char('r') => {
                // A failed reload keeps showing the last good diff.
                if let Err(err) = app.load_diff() {
                    error!("reload failed: {err:#}");
                }
            }
            KeyCode::Char('?') => app.toggle_shortcuts(),
            _ => {}
        }
    }
}

/// `git diff --stat` style lines, with paths padded to their display width.
fn stat_lines(document: &DiffDocument) -> Vec<String> {
    let width = document
        .files
        .iter()
        .map(|f| f.display_path().width())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<String> = document
        .files
        .iter()
        .map(|file| {
            let path = file.display_path();
            let detail = if file.is_binary {
                "Bin".to_string()
            } else {
                file.stats().short()
            };
            let padding = " ".repeat(width - path.width());
            format!(" {} {path}{padding} | {detail}", file.status().as_char())
        })
        .collect();
    lines.push(format!(" {}", document.stats()));
    lines
}

fn print_stat(document: &DiffDocument) {
    for line in stat_lines(document) {
        println!("{line}");
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.log_file.as_deref())?;
    info!(?args, "starting");

    let source = args.source();

    if args.stat {
        let raw = app::read_source(&source)?;
        print_stat(&diffdeck::parse(&raw));
        return Ok(());
    }

    // Load before touching the terminal so errors print normally.
    let mut app = App::new(source, args.session(), &args.theme);
    app.load_diff()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal")?;

    let res = run_app(&mut terminal, app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("{err:#}");
        println!("{err:?}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn stat_columns_line_up_for_wide_paths() {
        let doc = diffdeck::parse(
            "diff --git a/café.md b/café.md
@@ -1 +1 @@
-a
+b
diff --git a/文件.rs b/文件.rs
@@ -1 +1,2 @@
 a
+b
diff --git a/ab.txt b/ab.txt
@@ -1 +0,0 @@
-gone
",
        );

        assert_eq!(
            stat_lines(&doc),
            vec![
                " M café.md | +1 -1".to_string(),
                " M 文件.rs | +1 -0".to_string(),
                " M ab.txt  | +0 -1".to_string(),
                " 3 files changed, 2 insertions(+), 2 deletions(-)".to_string(),
            ]
        );
    }
}
