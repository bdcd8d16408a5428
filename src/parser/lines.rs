//! Line reassembly: joins continued physical lines into logical lines.

use serde::{Deserialize, Serialize};

use super::patterns::{
    has_continuation, is_blank, is_code, is_comment, strip_continuation, strip_inline_comment,
    strip_leading_continuation,
};
use crate::core::{CatalogError, CatalogResult};

/// One logical source line assembled from one or more physical lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalLine {
    pub text: String,
    /// 1-based number of the first physical line
    pub first_line: usize,
    /// Number of physical lines joined into `text`
    pub consumed: usize,
}

/// Which logical lines the batch walk keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReassemblyOptions {
    pub include_blanks: bool,
    pub include_comments: bool,
}

impl Default for ReassemblyOptions {
    fn default() -> Self {
        Self {
            include_blanks: true,
            include_comments: true,
        }
    }
}

impl ReassemblyOptions {
    pub fn code_only() -> Self {
        Self {
            include_blanks: false,
            include_comments: false,
        }
    }
}

/// Builds the logical line starting at `start`.
///
/// A line whose right-trimmed text ends with `&` is joined to the next one
/// with a single space. Continued lines are trimmed on both sides and may
/// carry a leading `&`. Comment and blank lines between the pieces are
/// skipped but still counted in `consumed`.
///
/// # Panics
///
/// Panics if `start` is out of range for `lines`.
pub fn full_line<S: AsRef<str>>(lines: &[S], start: usize) -> CatalogResult<LogicalLine> {
    let mut text = String::new();
    let mut idx = start;

    loop {
        let raw = lines[idx].as_ref();
        let piece = if idx == start {
            raw.trim_end()
        } else {
            strip_leading_continuation(raw)
        };

        // comments never continue
        if !has_continuation(piece) || (idx == start && is_comment(piece)) {
            text.push_str(piece);
            return Ok(LogicalLine {
                text,
                first_line: start + 1,
                consumed: idx - start + 1,
            });
        }

        text.push_str(strip_continuation(piece));
        text.push(' ');

        let marked = idx;
        idx += 1;
        while idx < lines.len() && !is_code(lines[idx].as_ref()) {
            idx += 1;
        }
        if idx >= lines.len() {
            return Err(CatalogError::MalformedContinuation { line: marked + 1 });
        }
    }
}

/// Lazy walk over the logical lines of a file
pub struct LogicalLines<'a, S> {
    lines: &'a [S],
    pos: usize,
    options: ReassemblyOptions,
    failed: bool,
}

impl<'a, S: AsRef<str>> LogicalLines<'a, S> {
    pub fn new(lines: &'a [S], options: ReassemblyOptions) -> Self {
        Self {
            lines,
            pos: 0,
            options,
            failed: false,
        }
    }

    fn keep(&self, line: &LogicalLine) -> bool {
        if !self.options.include_blanks && is_blank(&line.text) {
            return false;
        }
        if !self.options.include_comments && is_comment(&line.text) {
            return false;
        }
        true
    }
}

impl<'a, S: AsRef<str>> Iterator for LogicalLines<'a, S> {
    type Item = CatalogResult<LogicalLine>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.failed && self.pos < self.lines.len() {
            match full_line(self.lines, self.pos) {
                Ok(line) => {
                    self.pos += line.consumed;
                    if self.keep(&line) {
                        return Some(Ok(line));
                    }
                }
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

/// Collects every logical line, failing on the first malformed continuation
pub fn collect_logical_lines<S: AsRef<str>>(
    lines: &[S],
    options: ReassemblyOptions,
) -> CatalogResult<Vec<LogicalLine>> {
    LogicalLines::new(lines, options).collect()
}

/// Physical lines with comments removed, remembering where each came from
#[derive(Debug, Clone, Default)]
pub struct CleanedSource {
    pub lines: Vec<String>,
    /// 1-based physical line number of each entry in `lines`
    pub origins: Vec<usize>,
}

impl CleanedSource {
    /// Drops blank and comment-only lines and cuts inline comments.
    ///
    /// Comments have to go before reassembly, otherwise a `&` followed by a
    /// comment would not be seen as a continuation.
    pub fn from_lines<S: AsRef<str>>(raw: &[S]) -> Self {
        let mut cleaned = Self::default();
        for (idx, line) in raw.iter().enumerate() {
            let line = line.as_ref();
            if is_comment(line) || is_blank(line) {
                continue;
            }
            let code = strip_inline_comment(line).trim();
            if code.is_empty() {
                continue;
            }
            cleaned.lines.push(code.to_string());
            cleaned.origins.push(idx + 1);
        }
        cleaned
    }

    /// Logical lines of the cleaned text, with line numbers mapped back to
    /// the physical file
    pub fn logical_lines(&self) -> impl Iterator<Item = CatalogResult<LogicalLine>> + '_ {
        LogicalLines::new(&self.lines, ReassemblyOptions::default()).map(move |item| {
            item.map(|mut line| {
                line.first_line = self.origin(line.first_line);
                line
            })
            .map_err(|e| match e {
                CatalogError::MalformedContinuation { line } => {
                    CatalogError::MalformedContinuation {
                        line: self.origin(line),
                    }
                }
                other => other,
            })
        })
    }

    fn origin(&self, cleaned_line: usize) -> usize {
        self.origins
            .get(cleaned_line.saturating_sub(1))
            .copied()
            .unwrap_or(cleaned_line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_continuation() {
        let lines = ["x = 1 &", "+ 2"];
        let line = full_line(&lines, 0).unwrap();
        assert_eq!(line.text, "x = 1 + 2");
        assert_eq!(line.consumed, 2);
        assert_eq!(line.first_line, 1);
    }

    #[test]
    fn test_no_continuation_keeps_leading_whitespace() {
        let lines = ["   logical :: flag   "];
        let line = full_line(&lines, 0).unwrap();
        assert_eq!(line.text, "   logical :: flag");
        assert_eq!(line.consumed, 1);
    }

    #[test]
    fn test_multi_line_continuation_with_leading_marker() {
        let lines = [
            "real(dp) :: a, &",
            "     & b, &   ",
            "   c",
            "integer :: n",
        ];
        let first = full_line(&lines, 0).unwrap();
        assert_eq!(first.text, "real(dp) :: a, b, c");
        assert_eq!(first.consumed, 3);
    }

    #[test]
    fn test_comment_between_continued_lines_is_skipped() {
        let lines = ["x = 1 &", "! note", "", "+ 2", "y = 3"];
        let line = full_line(&lines, 0).unwrap();
        assert_eq!(line.text, "x = 1 + 2");
        assert_eq!(line.consumed, 4);

        let lines = ["x = &", "   ! only a comment follows"];
        assert!(matches!(
            full_line(&lines, 0),
            Err(CatalogError::MalformedContinuation { line: 1 })
        ));
    }

    #[test]
    fn test_dangling_continuation_is_an_error() {
        let lines = ["integer :: a", "logical :: b, &"];
        match full_line(&lines, 1) {
            Err(CatalogError::MalformedContinuation { line }) => assert_eq!(line, 2),
            other => panic!("expected malformed continuation, got {:?}", other),
        }
    }

    #[test]
    fn test_batch_walk_filters() {
        let lines = ["! header", "", "a = 1 &", "  + 1", "   ", "b = 2"];
        let all = collect_logical_lines(&lines, ReassemblyOptions::default()).unwrap();
        assert_eq!(all.len(), 5);

        let code = collect_logical_lines(&lines, ReassemblyOptions::code_only()).unwrap();
        let texts: Vec<_> = code.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["a = 1 + 1", "b = 2"]);
        assert_eq!(code[1].first_line, 6);
    }

    #[test]
    fn test_comment_with_trailing_marker_stands_alone() {
        let lines = ["! see the note below &"];
        let line = full_line(&lines, 0).unwrap();
        assert_eq!(line.consumed, 1);
    }

    #[test]
    fn test_batch_walk_stops_after_error() {
        let lines = ["a = 1", "b = &"];
        let mut walk = LogicalLines::new(&lines, ReassemblyOptions::default());
        assert!(walk.next().unwrap().is_ok());
        assert!(walk.next().unwrap().is_err());
        assert!(walk.next().is_none());
    }

    #[test]
    fn test_cleaned_source_maps_origins() {
        let raw = [
            "! leading comment",
            "logical :: a, & ! trailing",
            "   ! interleaved comment",
            "   b",
            "integer :: n &",
        ];
        let cleaned = CleanedSource::from_lines(&raw);
        assert_eq!(cleaned.lines, vec!["logical :: a, &", "b", "integer :: n &"]);

        let mut walk = cleaned.logical_lines();
        let first = walk.next().unwrap().unwrap();
        assert_eq!(first.text, "logical :: a, b");
        assert_eq!(first.first_line, 2);
        match walk.next().unwrap() {
            Err(CatalogError::MalformedContinuation { line }) => assert_eq!(line, 5),
            other => panic!("expected malformed continuation, got {:?}", other),
        }
    }
}
