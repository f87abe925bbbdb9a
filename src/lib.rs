//! Unified diff engine: parses `git diff` output into files, hunks and
//! numbered lines, and projects them into unified or side-by-side rows with
//! optional word-level highlighting.

pub mod diff_file;
pub mod git;
pub mod parser;
pub mod projector;
pub mod session;
pub mod stats;
pub mod word_diff;


pub use diff_file::{DiffDocument, DiffLine, FileDiff, FileStatus, Hunk, LineKind};
pub use parser::parse;
pub use projector::{
    FileBody, RenderFile, RenderLine, RenderModel, SplitRow, UnifiedRow, ViewMode, project,
};
pub use session::DiffSessionState;
pub use stats::DiffStats;
pub use word_diff::{WordSegment, diff_words};
