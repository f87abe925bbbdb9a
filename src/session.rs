use std::collections::HashSet;

use crate::diff_file::DiffDocument;
use crate::projector::{RenderModel, ViewMode, project};

/// View preferences owned by whoever displays a [`DiffDocument`]. Kept out of
/// the parsed model so one document can be projected many ways.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSessionState {
    pub mode: ViewMode,
    pub word_diff: bool,
    collapsed: HashSet<String>,
}

impl DiffSessionState {
    pub fn new(mode: ViewMode, word_diff: bool) -> Self {
        Self {
            mode,
            word_diff,
            collapsed: HashSet::new(),
        }
    }

    pub fn collapsed(&self) -> &HashSet<String> {
        &self.collapsed
    }

    pub fn is_collapsed(&self, path: &str) -> bool {
        self.collapsed.contains(path)
    }

    /// Flips the collapse flag for `path` and returns the new state.
    pub fn toggle_collapsed(&mut self, path: &str) -> bool {
        if self.collapsed.remove(path) {
            false
        } else {
            self.collapsed.insert(path.to_string());
            true
        }
    }

    pub fn collapse_all(&mut self, document: &DiffDocument) {
        self.collapsed = document
            .files
            .iter()
            .map(|f| f.display_path().to_string())
            .collect();
    }

    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }

    pub fn all_collapsed(&self, document: &DiffDocument) -> bool {
        !document.is_empty()
            && document
                .files
                .iter()
                .all(|f| self.collapsed.contains(f.display_path()))
    }

    /// Drops flags for paths that are no longer part of `document`, e.g. after a reload.
    pub fn retain_existing(&mut self, document: &DiffDocument) {
        self.collapsed
            .retain(|path| document.files.iter().any(|f| f.display_path() == path));
    }

    pub fn toggle_mode(&mut self) -> ViewMode {
        self.mode = match self.mode {
            ViewMode::Unified => ViewMode::Split,
            ViewMode::Split => ViewMode::Unified,
        };
        self.mode
    }

    pub fn toggle_word_diff(&mut self) -> bool {
        self.word_diff = !self.word_diff;
        self.word_diff
    }

    pub fn project(&self, document: &DiffDocument) -> RenderModel {
        project(document, self.mode, &self.collapsed, self.word_diff)
    }
}
