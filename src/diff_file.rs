use crate::stats::DiffStats;

/// The parsed form of one raw unified diff. Built once by
/// [`crate::parser::parse`] and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffDocument {
    pub files: Vec<FileDiff>,
    pub total_files: usize,
    pub total_insertions: usize,
    pub total_deletions: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDiff {
    pub old_path: String,
    pub new_path: String,
    pub is_binary: bool,
    pub is_new: bool,
    pub is_deleted: bool,
    pub is_renamed: bool,
    pub old_mode: Option<String>,
    pub new_mode: Option<String>,
    pub hunks: Vec<Hunk>,
    pub insertions: usize,
    pub deletions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// The `@@ -a,b +c,d @@` text exactly as it appeared, trailing context included.
    pub header: String,
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    pub lines: Vec<DiffLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub kind: LineKind,
    pub text: String,
    pub old_line_no: Option<u32>,
    pub new_line_no: Option<u32>,
    pub no_newline_at_eof: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    Context,
    Add,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileStatus {
    Added,
    Deleted,
    Renamed,
    Modified,
    Binary,
}

impl FileStatus {
    pub fn as_char(self) -> char {
        match self {
            FileStatus::Added => 'A',
            FileStatus::Deleted => 'D',
            FileStatus::Renamed => 'R',
            FileStatus::Modified => 'M',
            FileStatus::Binary => 'B',
        }
    }
}

impl DiffDocument {
    /// Builds a document and derives the totals from the per-file counts.
    pub fn new(files: Vec<FileDiff>) -> Self {
        let total_insertions = files.iter().map(|f| f.insertions).sum();
        let total_deletions = files.iter().map(|f| f.deletions).sum();

        Self {
            total_files: files.len(),
            total_insertions,
            total_deletions,
            files,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn stats(&self) -> DiffStats {
        DiffStats::from(self)
    }
}

impl FileDiff {
    pub fn new(old_path: &str, new_path: &str) -> Self {
        Self {
            old_path: old_path.to_string(),
            new_path: new_path.to_string(),
            ..Self::default()
        }
    }

    /// The path the file is shown under: the new path, or the old one when
    /// the file was deleted or the new side is unknown.
    pub fn display_path(&self) -> &str {
        if self.is_deleted || self.new_path.is_empty() {
            &self.old_path
        } else {
            &self.new_path
        }
    }

    pub fn status(&self) -> FileStatus {
        if self.is_binary {
            FileStatus::Binary
        } else if self.is_new {
            FileStatus::Added
        } else if self.is_deleted {
            FileStatus::Deleted
        } else if self.is_renamed {
            FileStatus::Renamed
        } else {
            FileStatus::Modified
        }
    }

    pub fn line_count(&self) -> usize {
        self.hunks.iter().map(|h| h.lines.len()).sum()
    }

    pub fn stats(&self) -> DiffStats {
        DiffStats::from(self)
    }

    /// Appends a hunk and folds its added/removed lines into the file counts.
    pub fn add_hunk(&mut self, hunk: Hunk) {
        self.insertions += hunk.count(LineKind::Add);
        self.deletions += hunk.count(LineKind::Remove);
        self.hunks.push(hunk);
    }
}

impl Hunk {
    pub fn new(header: &str, old_start: u32, old_lines: u32, new_start: u32, new_lines: u32) -> Self {
        Self {
            header: header.to_string(),
            old_start,
            old_lines,
            new_start,
            new_lines,
            lines: Vec::new(),
        }
    }

    pub fn count(&self, kind: LineKind) -> usize {
        self.lines.iter().filter(|l| l.kind == kind).count()
    }
}

impl DiffLine {
    pub fn new_added(text: &str, line_number: u32) -> Self {
        Self {
            kind: LineKind::Add,
            text: text.to_string(),
            old_line_no: None,
            new_line_no: Some(line_number),
            no_newline_at_eof: false,
        }
    }

    pub fn new_removed(text: &str, line_number: u32) -> Self {
        Self {
            kind: LineKind::Remove,
            text: text.to_string(),
            old_line_no: Some(line_number),
            new_line_no: None,
            no_newline_at_eof: false,
        }
    }

    pub fn new_context(text: &str, old_line_num: u32, new_line_num: u32) -> Self {
        Self {
            kind: LineKind::Context,
            text: text.to_string(),
            old_line_no: Some(old_line_num),
            new_line_no: Some(new_line_num),
            no_newline_at_eof: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_path_falls_back_to_old_path_for_deletions() {
        let mut file = FileDiff::new("gone.rs", "gone.rs");
        assert_eq!(file.display_path(), "gone.rs");

        file.new_path = String::new();
        assert_eq!(file.display_path(), "gone.rs");

        let mut renamed = FileDiff::new("old.rs", "new.rs");
        assert_eq!(renamed.display_path(), "new.rs");
        renamed.is_deleted = true;
        assert_eq!(renamed.display_path(), "old.rs");
    }

    #[test]
    fn status_prefers_binary_then_creation_and_deletion() {
        let mut file = FileDiff::new("a", "b");
        assert_eq!(file.status(), FileStatus::Modified);
        file.is_renamed = true;
        assert_eq!(file.status().as_char(), 'R');
        file.is_new = true;
        assert_eq!(file.status().as_char(), 'A');
        file.is_binary = true;
        assert_eq!(file.status(), FileStatus::Binary);
    }

    #[test]
    fn add_hunk_accumulates_counts() {
        let mut hunk = Hunk::new("@@ -1,2 +1,2 @@", 1, 2, 1, 2);
        hunk.lines.push(DiffLine::new_context("keep", 1, 1));
        hunk.lines.push(DiffLine::new_removed("old", 2));
        hunk.lines.push(DiffLine::new_added("new", 2));

        let mut file = FileDiff::new("f", "f");
        file.add_hunk(hunk);

        assert_eq!(file.insertions, 1);
        assert_eq!(file.deletions, 1);
        assert_eq!(file.line_count(), 3);

        let doc = DiffDocument::new(vec![file.clone(), file]);
        assert_eq!(doc.total_files, 2);
        assert_eq!(doc.total_insertions, 2);
        assert_eq!(doc.total_deletions, 2);
    }
}
