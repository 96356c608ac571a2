//! Source locations shared by Kotlin and resource trees

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Location of a node in a source file
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Location {
    /// File path
    pub file: PathBuf,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Start byte offset
    pub start_byte: usize,
    /// End byte offset (exclusive)
    pub end_byte: usize,
}

impl Location {
    pub fn new(file: PathBuf, line: usize, column: usize, start_byte: usize, end_byte: usize) -> Self {
        Self {
            file,
            line,
            column,
            start_byte,
            end_byte,
        }
    }

    pub fn len(&self) -> usize {
        self.end_byte.saturating_sub(self.start_byte)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `other` lies entirely inside this location
    pub fn contains(&self, other: &Location) -> bool {
        self.file == other.file
            && self.start_byte <= other.start_byte
            && other.end_byte <= self.end_byte
    }

    /// Text covered by this location, if the offsets are valid for `source`
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start_byte..self.end_byte)
    }
}

/// Maps byte offsets to 1-based line/column pairs
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    /// 1-based (line, column) for a byte offset; columns count bytes
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        (line + 1, offset - self.line_starts[line] + 1)
    }

    pub fn location(&self, file: &Path, start_byte: usize, end_byte: usize) -> Location {
        let (line, column) = self.line_col(start_byte);
        Location::new(file.to_path_buf(), line, column, start_byte, end_byte)
    }
}
