//! Source manager (component A).
//!
//! Owns the immutable text of every source file the front-end has loaded,
//! and turns byte offsets into human-facing `(line, column)` positions.
//! Line boundaries are computed once, at load time, so that later position
//! lookups are a binary search rather than a re-scan of the file.

use std::fmt::{self, Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Identifies one loaded source file. Stable for the lifetime of the
/// [`SourceManager`] that produced it; never reused after the manager is
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);

impl Display for FileId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A half-open byte range `[start, end)` within a single source file.
///
/// Invariant: a range never crosses file boundaries. Ranges produced by the
/// lexer cover exactly one token; ranges synthesized by the parser may span
/// any contiguous run of tokens belonging to the same file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceRange {
    pub file: FileId,
    pub start: u32,
    pub end: u32,
}

impl SourceRange {
    pub fn new(file: FileId, start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "range start must not exceed end");
        Self { file, start, end }
    }

    /// A zero-width range at `offset`, used for synthesized EOF tokens and
    /// empty-production markers.
    pub fn empty_at(file: FileId, offset: u32) -> Self {
        Self::new(file, offset, offset)
    }

    /// The smallest range covering both `self` and `other`. Both ranges must
    /// belong to the same file.
    pub fn join(&self, other: &SourceRange) -> SourceRange {
        debug_assert_eq!(self.file, other.file, "cannot join ranges across files");
        SourceRange::new(
            self.file,
            self.start.min(other.start),
            self.end.max(other.end),
        )
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl Display for SourceRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}, {})", self.file, self.start, self.end)
    }
}

/// A `(line, column)` pair, both 1-based, matching the convention editors
/// and diagnostics use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Failure modes for loading source text.
#[derive(Debug)]
pub enum SourceError {
    NotFound(PathBuf),
    Decode(PathBuf, String),
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::NotFound(path) => write!(f, "source file not found: {}", path.display()),
            SourceError::Decode(path, message) => {
                write!(f, "failed to decode {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for SourceError {}

struct SourceFile {
    /// File-system path, or a synthesized virtual URL for in-memory buffers.
    url: String,
    text: String,
    /// Byte offset of the first character of each line. Always starts with
    /// `0`; has one entry per line.
    line_starts: Vec<u32>,
}

fn compute_line_starts(text: &str) -> Vec<u32> {
    let mut starts = vec![0u32];
    for (index, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            starts.push((index + 1) as u32);
        }
    }
    starts
}

/// Owns the text of every source file involved in a compilation and answers
/// byte-offset-to-position queries against it.
#[derive(Default)]
pub struct SourceManager {
    files: Vec<SourceFile>,
}

impl SourceManager {
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Load a file from disk.
    pub fn load_from_path(&mut self, path: impl AsRef<Path>) -> Result<FileId, SourceError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                SourceError::NotFound(path.to_path_buf())
            } else {
                SourceError::Decode(path.to_path_buf(), err.to_string())
            }
        })?;
        let text = String::from_utf8(bytes)
            .map_err(|err| SourceError::Decode(path.to_path_buf(), err.to_string()))?;
        Ok(self.insert(path.display().to_string(), text))
    }

    /// Register an in-memory buffer under a synthesized, unique virtual URL
    /// such as `"<eval>"` or `"<test 3>"`.
    pub fn load_synthesized(&mut self, url: impl Into<String>, text: impl Into<String>) -> FileId {
        self.insert(url.into(), text.into())
    }

    fn insert(&mut self, url: String, text: String) -> FileId {
        let line_starts = compute_line_starts(&text);
        let id = FileId(self.files.len() as u32);
        self.files.push(SourceFile {
            url,
            text,
            line_starts,
        });
        id
    }

    fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id.0 as usize]
    }

    pub fn url(&self, id: FileId) -> &str {
        &self.file(id).url
    }

    pub fn text(&self, id: FileId) -> &str {
        &self.file(id).text
    }

    pub fn range_text(&self, range: SourceRange) -> &str {
        &self.text(range.file)[range.start as usize..range.end as usize]
    }

    /// `(line, column)` of `byte_index` within file `id`, both 1-based.
    pub fn position_of(&self, id: FileId, byte_index: u32) -> Position {
        let file = self.file(id);
        let line_index = match file.line_starts.binary_search(&byte_index) {
            Ok(exact) => exact,
            Err(insertion) => insertion - 1,
        };
        let line_start = file.line_starts[line_index];
        let column = (byte_index - line_start) as usize + 1;
        Position::new(line_index + 1, column)
    }

    /// The text of the line containing `byte_index`, without its trailing
    /// newline.
    pub fn line_text_at(&self, id: FileId, byte_index: u32) -> &str {
        let file = self.file(id);
        let line_index = match file.line_starts.binary_search(&byte_index) {
            Ok(exact) => exact,
            Err(insertion) => insertion - 1,
        };
        let start = file.line_starts[line_index] as usize;
        let end = file
            .line_starts
            .get(line_index + 1)
            .map(|&next| next as usize - 1)
            .unwrap_or(file.text.len());
        file.text[start..end].trim_end_matches('\r')
    }

    /// The EOF range for a file: a zero-width range at its final byte.
    pub fn eof_range(&self, id: FileId) -> SourceRange {
        let len = self.file(id).text.len() as u32;
        SourceRange::empty_at(id, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_of_tracks_lines_and_columns() {
        let mut sm = SourceManager::new();
        let id = sm.load_synthesized("<test>", "val x = 1\nval y = 2\n");
        assert_eq!(sm.position_of(id, 0), Position::new(1, 1));
        assert_eq!(sm.position_of(id, 10), Position::new(2, 1));
        assert_eq!(sm.position_of(id, 14), Position::new(2, 5));
    }

    #[test]
    fn line_text_at_excludes_newline() {
        let mut sm = SourceManager::new();
        let id = sm.load_synthesized("<test>", "first\nsecond\nthird");
        assert_eq!(sm.line_text_at(id, 7), "second");
        assert_eq!(sm.line_text_at(id, 14), "third");
    }

    #[test]
    fn load_from_path_reports_not_found() {
        let mut sm = SourceManager::new();
        let err = sm.load_from_path("/nonexistent/path/does-not-exist.hy");
        assert!(matches!(err, Err(SourceError::NotFound(_))));
    }

    #[test]
    fn range_join_widens_to_cover_both() {
        let mut sm = SourceManager::new();
        let id = sm.load_synthesized("<test>", "abcdef");
        let a = SourceRange::new(id, 1, 3);
        let b = SourceRange::new(id, 4, 6);
        assert_eq!(a.join(&b), SourceRange::new(id, 1, 6));
    }
}
