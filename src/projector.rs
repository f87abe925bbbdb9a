//! Arranges a parsed [`DiffDocument`] into rows ready for drawing.
//!
//! Projection is a pure function of the document, the view mode, the set of
//! collapsed paths and the word-diff flag. The renderer only walks rows.

use std::collections::HashSet;

use tracing::debug;

use crate::diff_file::{DiffDocument, DiffLine, FileDiff, FileStatus, Hunk, LineKind};
use crate::stats::DiffStats;
use crate::word_diff::{WordSegment, diff_words};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Unified,
    Split,
}

/// A diff line as it will be drawn. `segments` is only set for lines that
/// took part in a word-diff pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderLine {
    pub kind: LineKind,
    pub text: String,
    pub old_line_no: Option<u32>,
    pub new_line_no: Option<u32>,
    pub segments: Option<Vec<WordSegment>>,
    pub no_newline_at_eof: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnifiedRow {
    HunkHeader(String),
    Line(RenderLine),
}

/// One row of the two-column layout. A `None` side is padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitRow {
    HunkHeader(String),
    Pair {
        left: Option<RenderLine>,
        right: Option<RenderLine>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileBody {
    /// Only the header and stats row is shown.
    Collapsed,
    /// "Binary files differ"; there is nothing line-based to show.
    Binary,
    /// Renames and mode changes without content hunks.
    NoHunks,
    Unified(Vec<UnifiedRow>),
    Split(Vec<SplitRow>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFile {
    pub path: String,
    pub old_path: String,
    pub status: FileStatus,
    pub stats: DiffStats,
    pub body: FileBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderModel {
    /// The document had no files at all. Distinct from every file being collapsed.
    NoChanges,
    Files {
        stats: DiffStats,
        files: Vec<RenderFile>,
    },
}

impl RenderModel {
    pub fn files(&self) -> &[RenderFile] {
        match self {
            RenderModel::NoChanges => &[],
            RenderModel::Files { files, .. } => files,
        }
    }

    pub fn stats(&self) -> DiffStats {
        match self {
            RenderModel::NoChanges => DiffStats::default(),
            RenderModel::Files { stats, .. } => *stats,
        }
    }

    pub fn is_no_changes(&self) -> bool {
        matches!(self, RenderModel::NoChanges)
    }
}

impl RenderFile {
    pub fn is_collapsed(&self) -> bool {
        self.body == FileBody::Collapsed
    }

    /// Number of rows the body occupies, not counting the file header.
    pub fn row_count(&self) -> usize {
        match &self.body {
            FileBody::Collapsed => 0,
            FileBody::Binary | FileBody::NoHunks => 1,
            FileBody::Unified(rows) => rows.len(),
            FileBody::Split(rows) => rows.len(),
        }
    }
}

/// Projects every file of `document` for display.
pub fn project(
    document: &DiffDocument,
    mode: ViewMode,
    collapsed: &HashSet<String>,
    word_diff: bool,
) -> RenderModel {
    if document.is_empty() {
        return RenderModel::NoChanges;
    }

    let files: Vec<RenderFile> = document
        .files
        .iter()
        .map(|file| project_file(file, mode, collapsed.contains(file.display_path()), word_diff))
        .collect();

    debug!(
        files = files.len(),
        collapsed = files.iter().filter(|f| f.is_collapsed()).count(),
        ?mode,
        word_diff,
        "projected diff"
    );

    RenderModel::Files {
        stats: document.stats(),
        files,
    }
}

pub fn project_file(file: &FileDiff, mode: ViewMode, collapsed: bool, word_diff: bool) -> RenderFile {
    let body = if collapsed {
        FileBody::Collapsed
    } else if file.is_binary {
        FileBody::Binary
    } else if file.hunks.is_empty() {
        FileBody::NoHunks
    } else {
        match mode {
            ViewMode::Unified => FileBody::Unified(
                file.hunks
                    .iter()
                    .flat_map(|h| unified_rows(h, word_diff))
                    .collect(),
            ),
            ViewMode::Split => FileBody::Split(
                file.hunks
                    .iter()
                    .flat_map(|h| split_rows(h, word_diff))
                    .collect(),
            ),
        }
    };

    RenderFile {
        path: file.display_path().to_string(),
        old_path: file.old_path.clone(),
        status: file.status(),
        stats: file.stats(),
        body,
    }
}

/// Context lines, or a run of removals followed by a run of additions.
enum Block<'a> {
    Context(&'a DiffLine),
    Change {
        removed: Vec<&'a DiffLine>,
        added: Vec<&'a DiffLine>,
    },
}

fn blocks(lines: &[DiffLine]) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut removed = Vec::new();
    let mut added = Vec::new();

    for line in lines {
        match line.kind {
            LineKind::Context => {
                flush(&mut blocks, &mut removed, &mut added);
                blocks.push(Block::Context(line));
            }
            LineKind::Remove => {
                // A removal after additions opens a new replace block.
                if !added.is_empty() {
                    flush(&mut blocks, &mut removed, &mut added);
                }
                removed.push(line);
            }
            LineKind::Add => added.push(line),
        }
    }
    flush(&mut blocks, &mut removed, &mut added);

    blocks
}

fn flush<'a>(
    blocks: &mut Vec<Block<'a>>,
    removed: &mut Vec<&'a DiffLine>,
    added: &mut Vec<&'a DiffLine>,
) {
    if !removed.is_empty() || !added.is_empty() {
        blocks.push(Block::Change {
            removed: std::mem::take(removed),
            added: std::mem::take(added),
        });
    }
}

fn render_line(line: &DiffLine, segments: Option<Vec<WordSegment>>) -> RenderLine {
    RenderLine {
        kind: line.kind,
        text: line.text.clone(),
        old_line_no: line.old_line_no,
        new_line_no: line.new_line_no,
        segments,
        no_newline_at_eof: line.no_newline_at_eof,
    }
}

/// Renders both sides of a change block. Word segments only go to the
/// natural replace pair: the last removal and the addition right after it.
fn render_change(
    removed: &[&DiffLine],
    added: &[&DiffLine],
    word_diff: bool,
) -> (Vec<RenderLine>, Vec<RenderLine>) {
    let mut old_side: Vec<RenderLine> = removed.iter().map(|l| render_line(l, None)).collect();
    let mut new_side: Vec<RenderLine> = added.iter().map(|l| render_line(l, None)).collect();

    if word_diff
        && let (Some(old), Some(new)) = (old_side.last_mut(), new_side.first_mut())
    {
        let (old_segments, new_segments) = diff_words(&old.text, &new.text);
        old.segments = Some(old_segments);
        new.segments = Some(new_segments);
    }

    (old_side, new_side)
}

fn unified_rows(hunk: &Hunk, word_diff: bool) -> Vec<UnifiedRow> {
    let mut rows = vec![UnifiedRow::HunkHeader(hunk.header.clone())];

    for block in blocks(&hunk.lines) {
        match block {
            Block::Context(line) => rows.push(UnifiedRow::Line(render_line(line, None))),
            Block::Change { removed, added } => {
                let (old_side, new_side) = render_change(&removed, &added, word_diff);
                rows.extend(old_side.into_iter().map(UnifiedRow::Line));
                rows.extend(new_side.into_iter().map(UnifiedRow::Line));
            }
        }
    }

    rows
}

fn split_rows(hunk: &Hunk, word_diff: bool) -> Vec<SplitRow> {
    let mut rows = vec![SplitRow::HunkHeader(hunk.header.clone())];

    for block in blocks(&hunk.lines) {
        match block {
            Block::Context(line) => {
                let line = render_line(line, None);
                rows.push(SplitRow::Pair {
                    left: Some(line.clone()),
                    right: Some(line),
                });
            }
            Block::Change { removed, added } => {
                let (old_side, new_side) = render_change(&removed, &added, word_diff);
                let height = old_side.len().max(new_side.len());
                let mut old_iter = old_side.into_iter();
                let mut new_iter = new_side.into_iter();

                for _ in 0..height {
                    rows.push(SplitRow::Pair {
                        left: old_iter.next(),
                        right: new_iter.next(),
                    });
                }
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    const TWO_FILES: &str = "diff --git a/src/app.rs b/src/app.rs
--- a/src/app.rs
+++ b/src/app.rs
@@ -1,4 +1,5 @@
 use std::io;
-let mode = Mode::Plain;
+let mode = Mode::Split;
+let wrap = true;
 fn main() {}
-// old
diff --git a/logo.png b/logo.png
Binary files a/logo.png and b/logo.png differ
";

    fn lines(rows: &[UnifiedRow]) -> Vec<&RenderLine> {
        rows.iter()
            .filter_map(|r| match r {
                UnifiedRow::Line(l) => Some(l),
                UnifiedRow::HunkHeader(_) => None,
            })
            .collect()
    }

    #[test]
    fn empty_document_is_no_changes() {
        let model = project(&parse(""), ViewMode::Unified, &HashSet::new(), false);
        assert!(model.is_no_changes());
        assert!(model.files().is_empty());
    }

    #[test]
    fn all_collapsed_still_lists_files() {
        let doc = parse(TWO_FILES);
        let collapsed: HashSet<String> = doc.files.iter().map(|f| f.display_path().to_string()).collect();

        let model = project(&doc, ViewMode::Split, &collapsed, false);

        assert!(!model.is_no_changes());
        assert_eq!(model.files().len(), 2);
        assert!(model.files().iter().all(RenderFile::is_collapsed));
        assert_eq!(model.files()[0].stats.insertions, 2);
        assert_eq!(model.stats().deletions, 2);
    }

    #[test]
    fn unified_keeps_parse_order_and_numbers() {
        let doc = parse(TWO_FILES);
        let model = project(&doc, ViewMode::Unified, &HashSet::new(), false);
        let file = &model.files()[0];

        let FileBody::Unified(rows) = &file.body else {
            panic!("expected unified body, got {:?}", file.body);
        };
        assert_eq!(rows[0], UnifiedRow::HunkHeader("@@ -1,4 +1,5 @@".to_string()));

        let numbers: Vec<_> = lines(rows)
            .iter()
            .map(|l| (l.kind, l.old_line_no, l.new_line_no))
            .collect();
        assert_eq!(
            numbers,
            vec![
                (LineKind::Context, Some(1), Some(1)),
                (LineKind::Remove, Some(2), None),
                (LineKind::Add, None, Some(2)),
                (LineKind::Add, None, Some(3)),
                (LineKind::Context, Some(3), Some(4)),
                (LineKind::Remove, Some(4), None),
            ]
        );
        assert!(lines(rows).iter().all(|l| l.segments.is_none()));
    }

    #[test]
    fn binary_files_skip_line_projection() {
        let doc = parse(TWO_FILES);
        let model = project(&doc, ViewMode::Unified, &HashSet::new(), true);
        let binary = &model.files()[1];

        assert_eq!(binary.body, FileBody::Binary);
        assert_eq!(binary.status, FileStatus::Binary);
        assert_eq!(binary.path, "logo.png");
    }

    #[test]
    fn split_pads_shorter_side() {
        let doc = parse(
            "diff --git a/f b/f
@@ -1 +1,2 @@
-one
+uno
+dos
",
        );
        let model = project(&doc, ViewMode::Split, &HashSet::new(), false);
        let FileBody::Split(rows) = &model.files()[0].body else {
            panic!("expected split body");
        };

        assert_eq!(rows.len(), 3);
        let SplitRow::Pair { left, right } = &rows[1] else {
            panic!("expected pair row");
        };
        assert_eq!(left.as_ref().map(|l| l.text.as_str()), Some("one"));
        assert_eq!(right.as_ref().map(|l| l.text.as_str()), Some("uno"));

        let SplitRow::Pair { left, right } = &rows[2] else {
            panic!("expected pair row");
        };
        assert!(left.is_none());
        assert_eq!(right.as_ref().and_then(|l| l.new_line_no), Some(2));
    }

    #[test]
    fn split_context_fills_both_columns() {
        let doc = parse(TWO_FILES);
        let model = project(&doc, ViewMode::Split, &HashSet::new(), false);
        let FileBody::Split(rows) = &model.files()[0].body else {
            panic!("expected split body");
        };

        // header, context, 2 replace rows, context, trailing removal
        assert_eq!(rows.len(), 6);
        let SplitRow::Pair { left, right } = &rows[1] else {
            panic!("expected pair row");
        };
        assert_eq!(left, right);
        assert_eq!(left.as_ref().map(|l| l.text.as_str()), Some("use std::io;"));

        let SplitRow::Pair { left, right } = &rows[5] else {
            panic!("expected pair row");
        };
        assert_eq!(left.as_ref().and_then(|l| l.old_line_no), Some(4));
        assert!(right.is_none());
    }

    #[test]
    fn word_diff_only_annotates_paired_lines() {
        let doc = parse(TWO_FILES);
        let model = project(&doc, ViewMode::Unified, &HashSet::new(), true);
        let FileBody::Unified(rows) = &model.files()[0].body else {
            panic!("expected unified body");
        };
        let lines = lines(rows);

        let removed = lines[1].segments.as_ref().expect("paired removal");
        assert!(removed.iter().any(|s| s.changed && s.text == "Plain"));
        let added = lines[2].segments.as_ref().expect("paired addition");
        assert!(added.iter().any(|s| s.changed && s.text == "Split"));
        assert!(added.iter().any(|s| !s.changed && s.text.starts_with("let mode")));

        // Second addition and trailing removal have no partner.
        assert!(lines[3].segments.is_none());
        assert!(lines[5].segments.is_none());
    }

    #[test]
    fn word_diff_pairs_last_removal_with_following_addition() {
        let doc = parse(
            "diff --git a/f b/f
@@ -1,2 +1 @@
-alpha one
-beta two
+beta three
",
        );
        let model = project(&doc, ViewMode::Unified, &HashSet::new(), true);
        let FileBody::Unified(rows) = &model.files()[0].body else {
            panic!("expected unified body");
        };
        let lines = lines(rows);

        assert_eq!(lines[0].text, "alpha one");
        assert!(lines[0].segments.is_none());

        let removed = lines[1].segments.as_ref().expect("paired removal");
        let added = lines[2].segments.as_ref().expect("paired addition");
        assert!(removed.iter().any(|s| !s.changed && s.text.starts_with("beta")));
        assert!(removed.iter().any(|s| s.changed && s.text == "two"));
        assert!(added.iter().any(|s| s.changed && s.text == "three"));
    }

    #[test]
    fn split_layout_stays_positional_with_word_diff() {
        let doc = parse(
            "diff --git a/f b/f
@@ -1,2 +1 @@
-alpha one
-beta two
+beta three
",
        );
        let model = project(&doc, ViewMode::Split, &HashSet::new(), true);
        let FileBody::Split(rows) = &model.files()[0].body else {
            panic!("expected split body");
        };

        let SplitRow::Pair { left, right } = &rows[1] else {
            panic!("expected pair row");
        };
        assert_eq!(left.as_ref().map(|l| l.text.as_str()), Some("alpha one"));
        assert!(left.as_ref().is_some_and(|l| l.segments.is_none()));
        assert!(right.as_ref().is_some_and(|l| l.segments.is_some()));

        let SplitRow::Pair { left, right } = &rows[2] else {
            panic!("expected pair row");
        };
        assert!(left.as_ref().is_some_and(|l| l.segments.is_some()));
        assert!(right.is_none());
    }

    #[test]
    fn removal_after_addition_starts_new_block() {
        let doc = parse(
            "diff --git a/f b/f
@@ -1,2 +1,2 @@
+a
-b
+c
-d
",
        );
        let model = project(&doc, ViewMode::Split, &HashSet::new(), false);
        let FileBody::Split(rows) = &model.files()[0].body else {
            panic!("expected split body");
        };

        // [+a] alone, then [-b +c], then [-d] alone
        assert_eq!(rows.len(), 4);
        assert!(matches!(&rows[1], SplitRow::Pair { left: None, right: Some(_) }));
        assert!(matches!(&rows[2], SplitRow::Pair { left: Some(_), right: Some(_) }));
        assert!(matches!(&rows[3], SplitRow::Pair { left: Some(_), right: None }));
    }

    #[test]
    fn rename_without_hunks_has_placeholder_body() {
        let doc = parse(
            "diff --git a/a.rs b/b.rs
similarity index 100%
rename from a.rs
rename to b.rs
",
        );
        let model = project(&doc, ViewMode::Unified, &HashSet::new(), false);
        let file = &model.files()[0];

        assert_eq!(file.body, FileBody::NoHunks);
        assert_eq!(file.status, FileStatus::Renamed);
        assert_eq!(file.old_path, "a.rs");
        assert_eq!(file.row_count(), 1);
    }
}
