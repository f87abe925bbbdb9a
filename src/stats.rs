use std::fmt;

use crate::diff_file::{DiffDocument, FileDiff, Hunk, LineKind};

/// Files touched and lines added/removed. Read from the counts the parser
/// already accumulated, so summaries always agree with the per-file rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub files: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl DiffStats {
    pub fn is_empty(&self) -> bool {
        self.files == 0 && self.insertions == 0 && self.deletions == 0
    }

    /// Short `+X -Y` form used next to file names.
    pub fn short(&self) -> String {
        format!("+{} -{}", self.insertions, self.deletions)
    }
}

impl From<&DiffDocument> for DiffStats {
    fn from(document: &DiffDocument) -> Self {
        Self {
            files: document.total_files,
            insertions: document.total_insertions,
            deletions: document.total_deletions,
        }
    }
}

impl From<&FileDiff> for DiffStats {
    fn from(file: &FileDiff) -> Self {
        Self {
            files: 1,
            insertions: file.insertions,
            deletions: file.deletions,
        }
    }
}

impl From<&Hunk> for DiffStats {
    fn from(hunk: &Hunk) -> Self {
        Self {
            files: 0,
            insertions: hunk.count(LineKind::Add),
            deletions: hunk.count(LineKind::Remove),
        }
    }
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

/// Formats like `git diff --stat`'s last line.
impl fmt::Display for DiffStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} changed", plural(self.files, "file", "files"))?;
        if self.insertions > 0 {
            write!(
                f,
                ", {}(+)",
                plural(self.insertions, "insertion", "insertions")
            )?;
        }
        if self.deletions > 0 {
            write!(f, ", {}(-)", plural(self.deletions, "deletion", "deletions"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn document_stats_match_file_sums() {
        let doc = parse(
            "diff --git a/a b/a
@@ -1,2 +1,3 @@
 x
-y
+y2
+y3
diff --git a/b b/b
@@ -1 +0,0 @@
-gone
",
        );
        let stats = doc.stats();

        assert_eq!(stats.files, 2);
        assert_eq!(
            stats.insertions,
            doc.files.iter().map(|f| f.stats().insertions).sum::<usize>()
        );
        assert_eq!(stats.deletions, 2);
        assert_eq!(stats.to_string(), "2 files changed, 2 insertions(+), 2 deletions(-)");
        assert_eq!(doc.files[1].stats().short(), "+0 -1");
        assert_eq!(DiffStats::from(&doc.files[0].hunks[0]).insertions, 2);
    }

    #[test]
    fn summary_omits_zero_parts_and_pluralises() {
        let one = DiffStats {
            files: 1,
            insertions: 1,
            deletions: 0,
        };
        assert_eq!(one.to_string(), "1 file changed, 1 insertion(+)");
        assert_eq!(DiffStats::default().to_string(), "0 files changed");
        assert!(DiffStats::default().is_empty());
    }
}
