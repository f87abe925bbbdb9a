use std::io::Read;

use anyhow::{Context, Result};
use diffdeck::projector::project_file;
use diffdeck::{DiffDocument, DiffSessionState, RenderFile, RenderModel, ViewMode};
use ratatui::widgets::ListState;
use syntect::{
    highlighting::{Theme, ThemeSet},
    parsing::{SyntaxReference, SyntaxSet},
};
use tracing::{info, warn};

use crate::config::{DEFAULT_THEME, DiffSource};

/// Narrowest diff pane that can hold two readable columns.
pub const MIN_SPLIT_WIDTH: u16 = 120;

pub struct App {
    pub source: DiffSource,
    pub document: DiffDocument,
    pub session: DiffSessionState,
    pub model: RenderModel,
    pub selected_file: usize,
    pub file_list_state: ListState,
    pub scroll_offset: usize,
    pub horizontal_scroll_offset: usize,
    /// Width of the diff pane at the last draw.
    pub pane_width: u16,
    pub show_shortcuts: bool,
    pub syntax_set: SyntaxSet,
    pub theme_set: ThemeSet,
    pub theme_name: String,
}

impl App {
    pub fn new(source: DiffSource, session: DiffSessionState, theme_name: &str) -> Self {
        let mut state = ListState::default();
        state.select(Some(0));

        let theme_set = ThemeSet::load_defaults();
        let theme_name = if theme_set.themes.contains_key(theme_name) {
            theme_name.to_string()
        } else {
            warn!(theme = theme_name, "unknown theme, using {DEFAULT_THEME}");
            DEFAULT_THEME.to_string()
        };

        Self {
            source,
            document: DiffDocument::default(),
            session,
            model: RenderModel::NoChanges,
            selected_file: 0,
            file_list_state: state,
            scroll_offset: 0,
            horizontal_scroll_offset: 0,
            pane_width: u16::MAX,
            show_shortcuts: true,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set,
            theme_name,
        }
    }

    /// Fetches the raw diff from the configured source and reparses it.
    pub fn load_diff(&mut self) -> Result<()> {
        let diff_text = read_source(&self.source)?;
        self.set_diff_text(&diff_text);
        Ok(())
    }

    pub fn set_diff_text(&mut self, diff_text: &str) {
        self.document = diffdeck::parse(diff_text);
        self.session.retain_existing(&self.document);
        info!(
            files = self.document.total_files,
            insertions = self.document.total_insertions,
            deletions = self.document.total_deletions,
            "diff loaded"
        );

        if self.selected_file >= self.document.files.len() {
            self.selected_file = 0;
        }
        self.file_list_state.select(Some(self.selected_file));
        self.scroll_offset = 0;
        self.reproject();
    }

    pub fn reproject(&mut self) {
        self.model = self.session.project(&self.document);
        self.clamp_scroll();
    }

    pub fn selected(&self) -> Option<&RenderFile> {
        self.model.files().get(self.selected_file)
    }

    /// The selected file projected for a pane of `width` columns. Split
    /// layout falls back to unified when the pane is too narrow.
    pub fn selected_for_width(&self, width: u16) -> Option<RenderFile> {
        let selected = self.selected()?;
        if self.needs_unified_fallback(selected, width) {
            return self.unified_fallback();
        }
        Some(selected.clone())
    }

    fn needs_unified_fallback(&self, selected: &RenderFile, width: u16) -> bool {
        self.session.mode == ViewMode::Split && width < MIN_SPLIT_WIDTH && !selected.is_collapsed()
    }

    fn unified_fallback(&self) -> Option<RenderFile> {
        let file = self.document.files.get(self.selected_file)?;
        Some(project_file(file, ViewMode::Unified, false, self.session.word_diff))
    }

    /// Rows of the selected file as drawn in the current pane.
    fn selected_rows(&self) -> usize {
        match self.selected() {
            Some(selected) if self.needs_unified_fallback(selected, self.pane_width) => {
                self.unified_fallback().map_or(0, |file| file.row_count())
            }
            Some(selected) => selected.row_count(),
            None => 0,
        }
    }

    /// Records the diff pane width and keeps the scroll inside what it shows.
    pub fn set_pane_width(&mut self, width: u16) {
        self.pane_width = width;
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.selected_rows().saturating_sub(1));
    }

    fn select(&mut self, index: usize) {
        self.selected_file = index;
        self.file_list_state.select(Some(index));
        self.scroll_offset = 0;
        self.horizontal_scroll_offset = 0;
    }

    pub fn next_file(&mut self) {
        let count = self.model.files().len();
        if count > 0 {
            self.select((self.selected_file + 1) % count);
        }
    }

    pub fn previous_file(&mut self) {
        let count = self.model.files().len();
        if count > 0 {
            let index = if self.selected_file == 0 {
                count - 1
            } else {
                self.selected_file - 1
            };
            self.select(index);
        }
    }

    pub fn scroll_down(&mut self) {
        if self.scroll_offset + 1 < self.selected_rows() {
            self.scroll_offset += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        if self.scroll_offset > 0 {
            self.scroll_offset -= 1;
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.selected_rows().saturating_sub(1);
    }

    pub fn scroll_right(&mut self, amount: usize) {
        self.horizontal_scroll_offset += amount;
    }

    pub fn scroll_left(&mut self, amount: usize) {
        self.horizontal_scroll_offset = self.horizontal_scroll_offset.saturating_sub(amount);
    }

    /// Switches between unified and split. Split is only entered when the
    /// pane is wide enough; leaving it always works.
    pub fn toggle_view_mode(&mut self, width: u16) {
        self.pane_width = width;
        if self.session.mode == ViewMode::Unified && width < MIN_SPLIT_WIDTH {
            return;
        }
        self.session.toggle_mode();
        self.scroll_offset = 0;
        self.reproject();
    }

    pub fn toggle_word_diff(&mut self) {
        self.session.toggle_word_diff();
        self.reproject();
    }

    pub fn toggle_collapse_selected(&mut self) {
        let Some(path) = self.selected().map(|f| f.path.clone()) else {
            return;
        };
        self.session.toggle_collapsed(&path);
        self.reproject();
    }

    pub fn toggle_collapse_all(&mut self) {
        if self.session.all_collapsed(&self.document) {
            self.session.expand_all();
        } else {
            self.session.collapse_all(&self.document);
        }
        self.reproject();
    }

    pub fn toggle_shortcuts(&mut self) {
        self.show_shortcuts = !self.show_shortcuts;
    }

    pub fn get_syntax_for_file(&self, filename: &str) -> Option<&SyntaxReference> {
        if let Some(extension) = std::path::Path::new(filename).extension()
            && let Some(ext_str) = extension.to_str()
        {
            match ext_str {
                // No TypeScript grammar ships with syntect.
                "ts" | "tsx" | "js" | "jsx" | "mjs" => {
                    return self
                        .syntax_set
                        .find_syntax_by_extension("js")
                        .or_else(|| self.syntax_set.find_syntax_by_name("JavaScript"));
                }
                "cc" | "cxx" | "hpp" => return self.syntax_set.find_syntax_by_extension("cpp"),
                _ => {
                    if let Some(syntax) = self.syntax_set.find_syntax_by_extension(ext_str) {
                        return Some(syntax);
                    }
                }
            }
        }

        self.syntax_set
            .find_syntax_for_file(filename)
            .ok()
            .flatten()
    }

    pub fn get_theme(&self) -> &Theme {
        &self.theme_set.themes[&self.theme_name]
    }

    pub fn get_syntax_set(&self) -> &SyntaxSet {
        &self.syntax_set
    }
}

pub fn read_source(source: &DiffSource) -> Result<String> {
    match source {
        DiffSource::Git { repo, request } => {
            diffdeck::git::run_diff(repo, request).context("loading diff from git")
        }
        DiffSource::File(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading diff from {}", path.display())),
        DiffSource::Stdin => {
            let mut diff_text = String::new();
            std::io::stdin()
                .read_to_string(&mut diff_text)
                .context("reading diff from stdin")?;
            Ok(diff_text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diffdeck::FileBody;

    const DIFF: &str = "diff --git a/src/main.rs b/src/main.rs
--- a/src/main.rs
+++ b/src/main.rs
@@ -1,3 +1,3 @@
 fn main() {
-    println!(\"hi\");
+    println!(\"hello\");
 }
diff --git a/README.md b/README.md
--- a/README.md
+++ b/README.md
@@ -1 +1,2 @@
 # diffdeck
+A diff viewer.
";

    fn app() -> App {
        let mut app = App::new(DiffSource::Stdin, DiffSessionState::default(), DEFAULT_THEME);
        app.set_diff_text(DIFF);
        app
    }

    #[test]
    fn file_navigation_wraps() {
        let mut app = app();
        assert_eq!(app.selected().map(|f| f.path.as_str()), Some("src/main.rs"));

        app.previous_file();
        assert_eq!(app.selected_file, 1);
        app.next_file();
        assert_eq!(app.selected_file, 0);
    }

    #[test]
    fn scrolling_stays_within_rows() {
        let mut app = app();
        // header + 4 lines
        for _ in 0..20 {
            app.scroll_down();
        }
        assert_eq!(app.scroll_offset, 4);
        app.scroll_up();
        assert_eq!(app.scroll_offset, 3);
        app.scroll_to_bottom();
        assert_eq!(app.scroll_offset, 4);
    }

    #[test]
    fn narrow_terminal_cannot_enter_split() {
        let mut app = app();
        app.toggle_view_mode(80);
        assert_eq!(app.session.mode, ViewMode::Unified);

        app.toggle_view_mode(MIN_SPLIT_WIDTH);
        assert_eq!(app.session.mode, ViewMode::Split);
        assert!(matches!(app.selected().map(|f| &f.body), Some(FileBody::Split(_))));
        assert!(matches!(
            app.selected_for_width(80).map(|f| f.body),
            Some(FileBody::Unified(_))
        ));

        app.toggle_view_mode(80);
        assert_eq!(app.session.mode, ViewMode::Unified);
    }

    #[test]
    fn narrow_split_scrolls_through_unified_rows() {
        let mut app = app();
        app.set_diff_text(
            "diff --git a/f b/f
@@ -1,3 +1,3 @@
-a
-b
-c
+x
+y
+z
",
        );
        app.toggle_view_mode(MIN_SPLIT_WIDTH);
        // header + 3 paired rows
        assert_eq!(app.selected().map(RenderFile::row_count), Some(4));

        app.set_pane_width(80);
        app.scroll_to_bottom();
        // header + 6 lines
        assert_eq!(app.scroll_offset, 6);

        app.set_pane_width(MIN_SPLIT_WIDTH);
        assert_eq!(app.scroll_offset, 3);
        for _ in 0..10 {
            app.scroll_down();
        }
        assert_eq!(app.scroll_offset, 3);
    }

    #[test]
    fn collapse_survives_reload() {
        let mut app = app();
        app.toggle_collapse_selected();
        assert!(app.selected().is_some_and(RenderFile::is_collapsed));
        assert_eq!(app.scroll_offset, 0);

        app.set_diff_text(DIFF);
        assert!(app.session.is_collapsed("src/main.rs"));

        app.toggle_collapse_all();
        assert!(app.model.files().iter().all(RenderFile::is_collapsed));
        app.toggle_collapse_all();
        assert!(app.session.collapsed().is_empty());
    }

    #[test]
    fn word_diff_toggle_reprojects() {
        let mut app = app();
        app.toggle_word_diff();

        let Some(FileBody::Unified(rows)) = app.selected().map(|f| &f.body) else {
            panic!("expected unified rows");
        };
        assert!(rows.iter().any(|row| matches!(
            row,
            diffdeck::UnifiedRow::Line(line) if line.segments.is_some()
        )));
    }

    #[test]
    fn empty_diff_is_no_changes() {
        let mut app = app();
        app.set_diff_text("");
        assert!(app.model.is_no_changes());
        assert!(app.selected().is_none());
        app.next_file();
        app.toggle_collapse_selected();
        assert_eq!(app.selected_file, 0);
    }

    #[test]
    fn unknown_theme_falls_back() {
        let app = App::new(DiffSource::Stdin, DiffSessionState::default(), "no-such-theme");
        assert_eq!(app.theme_name, DEFAULT_THEME);
    }

    #[test]
    fn syntax_lookup_by_extension() {
        let app = app();
        assert!(app.get_syntax_for_file("src/main.rs").is_some());
        assert!(app.get_syntax_for_file("web/app.tsx").is_some());
    }
}
