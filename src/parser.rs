//! Line-oriented unified diff parser.
//!
//! The parser is a small state machine fed one line at a time:
//!
//! * `SeekingFile` - outside any file section, waiting for `diff --git`
//!   (or a bare `---`/`+++` pair, or a lone `Binary files ... differ`).
//! * `SeekingHunk` - inside a file header, collecting paths, modes and flags
//!   until the first `@@`.
//! * `InHunk` - classifying body lines until the next `@@` or file marker.
//!
//! Nothing here fails. Lines that cannot be understood are logged and
//! skipped, and a hunk whose header does not parse is dropped as a whole
//! while the rest of the document is kept.

use tracing::{debug, warn};

use crate::diff_file::{DiffDocument, DiffLine, FileDiff, Hunk};

const DEV_NULL: &str = "/dev/null";
const GIT_MARKER: &str = "diff --git ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    SeekingFile,
    SeekingHunk,
    InHunk,
}

struct OpenFile {
    diff: FileDiff,
    has_git_marker: bool,
    /// `None` while in a hunk means the header was malformed and the body is skipped.
    hunk: Option<OpenHunk>,
}

struct OpenHunk {
    hunk: Hunk,
    old_no: u32,
    new_no: u32,
}

struct Parser {
    files: Vec<FileDiff>,
    current: Option<OpenFile>,
    state: ParseState,
}

/// Parses raw `git diff` output into a [`DiffDocument`].
///
/// Empty or whitespace-only input yields a document with no files. Malformed
/// input degrades to a partial document; this function never panics or errors.
pub fn parse(raw: &str) -> DiffDocument {
    if raw.trim().is_empty() {
        return DiffDocument::default();
    }

    let mut parser = Parser::new();
    let mut lines = raw.lines().peekable();

    while let Some(line) = lines.next() {
        let next = lines.peek().copied();
        parser.feed(line, next);
    }

    parser.finish()
}

impl Parser {
    fn new() -> Self {
        Self {
            files: Vec::new(),
            current: None,
            state: ParseState::SeekingFile,
        }
    }

    fn feed(&mut self, line: &str, next: Option<&str>) {
        if let Some(rest) = line.strip_prefix(GIT_MARKER) {
            let (old_path, new_path) = parse_git_marker(rest).unwrap_or_else(|| {
                debug!(line, "unparsable diff --git marker, waiting for ---/+++ paths");
                (String::new(), String::new())
            });
            self.start_file(FileDiff::new(&old_path, &new_path), true);
            return;
        }

        if self.accepts_plain_file_start() && starts_plain_file(line, next) {
            self.start_file(FileDiff::default(), false);
            self.header_line(line);
            return;
        }

        match self.state {
            ParseState::SeekingFile => {
                if self.current.is_none() && is_binary_marker(line) {
                    self.start_file(FileDiff::default(), false);
                    self.header_line(line);
                } else {
                    debug!(line, "ignoring line outside of a file section");
                }
            }
            ParseState::SeekingHunk if line.starts_with("@@") => self.start_hunk(line),
            ParseState::SeekingHunk => self.header_line(line),
            ParseState::InHunk if line.starts_with("@@") => self.start_hunk(line),
            ParseState::InHunk => self.body_line(line),
        }
    }

    /// Marker-less diffs separate files with `---`/`+++` pairs. Inside a git
    /// section the same pair is just a removed and an added line.
    fn accepts_plain_file_start(&self) -> bool {
        match self.state {
            ParseState::SeekingFile => true,
            ParseState::SeekingHunk => false,
            ParseState::InHunk => self.current.as_ref().is_some_and(|f| !f.has_git_marker),
        }
    }

    fn start_file(&mut self, diff: FileDiff, has_git_marker: bool) {
        self.finish_file();
        self.current = Some(OpenFile {
            diff,
            has_git_marker,
            hunk: None,
        });
        self.state = ParseState::SeekingHunk;
    }

    fn finish_file(&mut self) {
        self.finish_hunk();
        if let Some(open) = self.current.take() {
            debug!(
                path = open.diff.display_path(),
                hunks = open.diff.hunks.len(),
                insertions = open.diff.insertions,
                deletions = open.diff.deletions,
                "parsed file"
            );
            self.files.push(open.diff);
        }
    }

    fn finish_hunk(&mut self) {
        if let Some(open) = self.current.as_mut()
            && let Some(hunk) = open.hunk.take()
        {
            open.diff.add_hunk(hunk.hunk);
        }
    }

    fn header_line(&mut self, line: &str) {
        let Some(open) = self.current.as_mut() else {
            return;
        };
        let file = &mut open.diff;

        if is_binary_marker(line) {
            file.is_binary = true;
            if let Some((old, new)) = parse_binary_paths(line) {
                apply_old_path(file, &old);
                apply_new_path(file, &new);
            }
            // Binary files carry no hunks; skip everything up to the next file.
            self.state = ParseState::SeekingFile;
        } else if let Some(mode) = line.strip_prefix("new file mode ") {
            file.is_new = true;
            file.new_mode = Some(mode.trim().to_string());
        } else if let Some(mode) = line.strip_prefix("deleted file mode ") {
            file.is_deleted = true;
            file.old_mode = Some(mode.trim().to_string());
        } else if let Some(mode) = line.strip_prefix("old mode ") {
            file.old_mode = Some(mode.trim().to_string());
        } else if let Some(mode) = line.strip_prefix("new mode ") {
            file.new_mode = Some(mode.trim().to_string());
        } else if let Some(path) = line.strip_prefix("rename from ") {
            file.is_renamed = true;
            file.old_path = unquote(path);
        } else if let Some(path) = line.strip_prefix("rename to ") {
            file.is_renamed = true;
            file.new_path = unquote(path);
        } else if let Some(path) = line.strip_prefix("--- ") {
            apply_old_path(file, &header_path(path, "a/"));
        } else if let Some(path) = line.strip_prefix("+++ ") {
            apply_new_path(file, &header_path(path, "b/"));
        } else if line.starts_with("index ")
            || line.starts_with("similarity index ")
            || line.starts_with("dissimilarity index ")
            || line.starts_with("copy from ")
            || line.starts_with("copy to ")
        {
            // Informational only.
        } else {
            debug!(line, "unrecognised file header line");
        }
    }

    fn start_hunk(&mut self, line: &str) {
        self.finish_hunk();
        self.state = ParseState::InHunk;

        let Some(open) = self.current.as_mut() else {
            return;
        };

        match parse_hunk_header(line) {
            Some(hunk) => {
                open.hunk = Some(OpenHunk {
                    old_no: hunk.old_start,
                    new_no: hunk.new_start,
                    hunk,
                });
            }
            None => {
                warn!(
                    path = open.diff.display_path(),
                    line, "malformed hunk header, skipping hunk"
                );
                open.hunk = None;
            }
        }
    }

    fn body_line(&mut self, line: &str) {
        let Some(file) = self.current.as_mut() else {
            return;
        };
        let Some(open) = file.hunk.as_mut() else {
            return;
        };

        let numbered = match line.chars().next() {
            Some('+') => {
                open.hunk.lines.push(DiffLine::new_added(&line[1..], open.new_no));
                advance(&mut open.new_no)
            }
            Some('-') => {
                open.hunk.lines.push(DiffLine::new_removed(&line[1..], open.old_no));
                advance(&mut open.old_no)
            }
            Some('\\') => {
                if let Some(last) = open.hunk.lines.last_mut() {
                    last.no_newline_at_eof = true;
                }
                true
            }
            first => {
                // A missing leading space (editors that strip trailing
                // whitespace) is still a context line.
                let text = if first == Some(' ') { &line[1..] } else { line };
                open.hunk
                    .lines
                    .push(DiffLine::new_context(text, open.old_no, open.new_no));
                advance(&mut open.old_no) && advance(&mut open.new_no)
            }
        };

        // Line numbers ran out: keep what was numbered and skip the rest of the hunk.
        if !numbered && let Some(open) = file.hunk.take() {
            warn!(
                path = file.diff.display_path(),
                header = open.hunk.header.as_str(),
                "line numbers overflow, truncating hunk"
            );
            file.diff.add_hunk(open.hunk);
        }
    }

    fn finish(mut self) -> DiffDocument {
        self.finish_file();
        DiffDocument::new(self.files)
    }
}

fn advance(counter: &mut u32) -> bool {
    match counter.checked_add(1) {
        Some(next) => {
            *counter = next;
            true
        }
        None => false,
    }
}

fn starts_plain_file(line: &str, next: Option<&str>) -> bool {
    line.starts_with("--- ") && next.is_some_and(|n| n.starts_with("+++ "))
}

fn is_binary_marker(line: &str) -> bool {
    (line.starts_with("Binary files ") && line.ends_with(" differ")) || line == "GIT binary patch"
}

fn apply_old_path(file: &mut FileDiff, path: &str) {
    if path == DEV_NULL {
        file.is_new = true;
    } else if !path.is_empty() {
        file.old_path = path.to_string();
    }
}

fn apply_new_path(file: &mut FileDiff, path: &str) {
    if path == DEV_NULL {
        file.is_deleted = true;
    } else if !path.is_empty() {
        file.new_path = path.to_string();
    }
}

/// Parses `@@ -<old>[,<n>] +<new>[,<n>] @@[ context]`. Omitted counts are 1.
pub fn parse_hunk_header(line: &str) -> Option<Hunk> {
    let line = line.trim_end();
    let rest = line.strip_prefix("@@")?;
    let (ranges, _section) = rest.split_once("@@")?;

    let mut parts = ranges.split_whitespace();
    let old = parts.next()?.strip_prefix('-')?;
    let new = parts.next()?.strip_prefix('+')?;
    if parts.next().is_some() {
        return None;
    }

    let (old_start, old_lines) = parse_range(old)?;
    let (new_start, new_lines) = parse_range(new)?;
    // A range that runs past the last representable line number is not a real hunk.
    old_start.checked_add(old_lines)?;
    new_start.checked_add(new_lines)?;

    Some(Hunk::new(line, old_start, old_lines, new_start, new_lines))
}

fn parse_range(range: &str) -> Option<(u32, u32)> {
    match range.split_once(',') {
        Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
        None => Some((range.parse().ok()?, 1)),
    }
}

/// Splits the remainder of a `diff --git` line into old and new paths.
fn parse_git_marker(rest: &str) -> Option<(String, String)> {
    let rest = rest.trim_end();

    if rest.starts_with('"') {
        let (old, tail) = take_quoted(rest)?;
        let tail = tail.trim_start();
        let new = if tail.starts_with('"') {
            take_quoted(tail)?.0
        } else {
            tail.to_string()
        };
        return Some((strip_side(&old, "a/"), strip_side(&new, "b/")));
    }

    // Same path on both sides: the only split where the halves agree, which
    // also copes with spaces in the name.
    if rest.len() % 2 == 1 {
        let mid = rest.len() / 2;
        if let (Some(left), Some(sep), Some(right)) =
            (rest.get(..mid), rest.get(mid..=mid), rest.get(mid + 1..))
        {
            let (old, new) = (strip_side(left, "a/"), strip_side(right, "b/"));
            if sep == " " && old == new && !old.is_empty() {
                return Some((old, new));
            }
        }
    }

    if rest.starts_with("a/")
        && let Some((old, new)) = rest.split_once(" b/")
    {
        return Some((strip_side(old, "a/"), new.to_string()));
    }

    let mut parts = rest.split_whitespace();
    let old = parts.next()?;
    let new = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((strip_side(old, "a/"), strip_side(new, "b/")))
}

/// Path from a `---`/`+++` line, without the side prefix or a trailing timestamp.
fn header_path(raw: &str, side: &str) -> String {
    let raw = raw.trim_end();
    let path = if raw.starts_with('"') {
        match take_quoted(raw) {
            Some((path, _)) => path,
            None => raw.to_string(),
        }
    } else {
        raw.split('\t').next().unwrap_or(raw).to_string()
    };

    if path == DEV_NULL {
        path
    } else {
        strip_side(&path, side)
    }
}

fn parse_binary_paths(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix("Binary files ")?.strip_suffix(" differ")?;
    let (old, new) = rest.split_once(" and ")?;
    Some((header_path(old, "a/"), header_path(new, "b/")))
}

fn strip_side(path: &str, side: &str) -> String {
    path.strip_prefix(side).unwrap_or(path).to_string()
}

fn unquote(raw: &str) -> String {
    let raw = raw.trim_end();
    if raw.starts_with('"')
        && let Some((path, _)) = take_quoted(raw)
    {
        return path;
    }
    raw.to_string()
}

/// Reads a C-style quoted string as git writes it, returning the decoded
/// value and whatever follows the closing quote. Non-ASCII bytes arrive as
/// octal escapes.
fn take_quoted(input: &str) -> Option<(String, &str)> {
    let body = input.strip_prefix('"')?;
    let mut bytes = Vec::new();
    let mut chars = body.char_indices();

    while let Some((idx, c)) = chars.next() {
        match c {
            '"' => {
                let value = String::from_utf8_lossy(&bytes).into_owned();
                return Some((value, &body[idx + 1..]));
            }
            '\\' => {
                let (_, escaped) = chars.next()?;
                match escaped {
                    'n' => bytes.push(b'\n'),
                    't' => bytes.push(b'\t'),
                    'r' => bytes.push(b'\r'),
                    '0'..='7' => {
                        let mut value = escaped.to_digit(8)?;
                        for _ in 0..2 {
                            let (_, digit) = chars.next()?;
                            value = value * 8 + digit.to_digit(8)?;
                        }
                        bytes.push(u8::try_from(value).ok()?);
                    }
                    other => {
                        let mut buf = [0u8; 4];
                        bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
                    }
                }
            }
            other => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
        }
    }

    None
}
