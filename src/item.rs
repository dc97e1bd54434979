//! Candidate lines as handed over by the match engine.

use std::ops::Range;

/// A candidate line and the byte ranges the current query matched in it.
///
/// Ranges are half-open byte offsets into [`Match::line`], ascending and
/// non-overlapping. An empty list means the line is drawn without highlight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Match {
    line: String,
    ranges: Vec<Range<usize>>,
}

impl Match {
    /// A line without any highlight
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            ranges: Vec::new(),
        }
    }

    /// A line with matched byte ranges
    pub fn with_ranges(line: impl Into<String>, ranges: Vec<Range<usize>>) -> Self {
        Self {
            line: line.into(),
            ranges,
        }
    }

    /// The raw text of the line
    pub fn line(&self) -> &str {
        &self.line
    }

    /// The matched byte ranges, possibly empty
    pub fn indices(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Whether the line carries any highlight
    pub fn is_highlighted(&self) -> bool {
        !self.ranges.is_empty()
    }
}

impl From<&str> for Match {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Match {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
