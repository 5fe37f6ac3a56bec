//! Line/column bookkeeping

use serde::{Deserialize, Serialize};

/// A 1-based line/column range inside a source file.
///
/// A point position has `end == start`. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourcePosition {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl SourcePosition {
    /// A zero-width position at `line:column`.
    pub fn point(line: usize, column: usize) -> Self {
        Self {
            start_line: line,
            start_column: column,
            end_line: line,
            end_column: column,
        }
    }

    pub fn range(start: (usize, usize), end: (usize, usize)) -> Self {
        Self {
            start_line: start.0,
            start_column: start.1,
            end_line: end.0,
            end_column: end.1,
        }
    }

    fn is_point(&self) -> bool {
        self.start_line == self.end_line && self.start_column == self.end_column
    }
}

impl std::fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_column)?;
        if !self.is_point() {
            if self.end_line == self.start_line {
                write!(f, "-{}", self.end_column)?;
            } else {
                write!(f, "-{}:{}", self.end_line, self.end_column)?;
            }
        }
        Ok(())
    }
}

/// Byte offsets of line starts.
#[derive(Debug, Clone, Default)]
pub(crate) struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub(crate) fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    /// 0-based line index containing `offset`.
    pub(crate) fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset) - 1
    }

    pub(crate) fn line_start(&self, offset: usize) -> usize {
        self.starts[self.line_of(offset)]
    }

    /// 1-based `(line, column)` of a byte offset.
    pub(crate) fn line_column(&self, text: &str, offset: usize) -> (usize, usize) {
        let line = self.line_of(offset);
        let start = self.starts[line];
        let column = text[start..offset.min(text.len())].chars().count() + 1;
        (line + 1, column)
    }

    /// Byte offset of a 1-based `(line, column)`, if it lies inside the text.
    pub(crate) fn offset(&self, text: &str, line: usize, column: usize) -> Option<usize> {
        let start = *self.starts.get(line.checked_sub(1)?)?;
        let end = self.starts.get(line).copied().unwrap_or(text.len());
        let wanted = column.checked_sub(1)?;
        let line_text = &text[start..end];
        match line_text.char_indices().nth(wanted) {
            Some((i, _)) => Some(start + i),
            None if wanted == line_text.chars().count() => Some(end),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_column_round_trip() {
        let text = "<a>\n  <b/>\n</a>";
        let index = LineIndex::new(text);
        let offset = text.find("<b").unwrap();
        assert_eq!(index.line_column(text, offset), (2, 3));
        assert_eq!(index.offset(text, 2, 3), Some(offset));
    }

    #[test]
    fn columns_count_characters() {
        let text = "<a x=\"é\" y=\"1\"/>";
        let index = LineIndex::new(text);
        let offset = text.find("y=").unwrap();
        assert_eq!(index.line_column(text, offset), (1, 10));
        assert_eq!(index.offset(text, 1, 10), Some(offset));
    }

    #[test]
    fn out_of_range_positions_are_none() {
        let text = "<a/>";
        let index = LineIndex::new(text);
        assert_eq!(index.offset(text, 0, 1), None);
        assert_eq!(index.offset(text, 2, 1), None);
        assert_eq!(index.offset(text, 1, 9), None);
    }

    #[test]
    fn display_forms() {
        assert_eq!(SourcePosition::point(3, 1).to_string(), "3:1");
        assert_eq!(SourcePosition::range((3, 5), (3, 49)).to_string(), "3:5-49");
        assert_eq!(SourcePosition::range((22, 9), (24, 51)).to_string(), "22:9-24:51");
    }
}
