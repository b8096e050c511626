//! A trait that can provide the [Span] of a token or syntax node

/// A trait that can provide the [Span] of a token or syntax node
pub trait Spanned {
    fn span(&self) -> Span;
}

/// A region of the source text.
///
/// `offset` is the absolute byte position of the first character, `line` is the
/// 1-based line that character is on.
#[derive(Debug, Default, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Span {
    offset: usize,
    len: usize,
    line: usize,
}

impl Span {
    /// Creates a new span
    pub const fn new(offset: usize, len: usize, line: usize) -> Self {
        Self { offset, len, line }
    }

    /// Gets a span directly after this span
    pub const fn end(&self) -> Self {
        Self {
            offset: self.offset + self.len,
            len: 0,
            line: self.line,
        }
    }

    /// Creates a span that encompasses both
    pub fn join(&self, other: Self) -> Self {
        let min = self.offset.min(other.offset);
        let max = (self.offset + self.len).max(other.offset + other.len);
        Self {
            offset: min,
            len: max - min,
            line: self.line.min(other.line),
        }
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn line(&self) -> usize {
        self.line
    }
}

impl Spanned for Span {
    fn span(&self) -> Span {
        *self
    }
}

/// A line reader struct that's responsible for getting lines from a span
#[derive(Debug, Default)]
pub struct LineReader {
    before: usize,
    after: usize,
}

impl LineReader {
    /// Creates a new line reader that gets `before` number of lines before a span and `after` number
    /// of lines after.
    pub fn new(before: usize, after: usize) -> Self {
        Self { before, after }
    }

    /// Gets the lines of `source` surrounding a given span, plus the base line index.
    ///
    /// Returns `None` if the span's line isn't in the source.
    pub fn lines(&self, source: &str, span: &Span) -> Option<(Vec<Line>, usize)> {
        let base_line = span.line();
        let range = base_line.saturating_sub(self.before)..=base_line.saturating_add(self.after);

        let mut lines = vec![];
        let mut byte_offset = 0usize;
        for (idx, src) in source.split_inclusive('\n').enumerate() {
            let line = idx + 1;
            if range.contains(&line) {
                let col = if line == base_line {
                    let end = span.offset().clamp(byte_offset, byte_offset + src.len());
                    source[byte_offset..end].chars().count()
                } else {
                    0
                };
                lines.push(Line {
                    line,
                    col,
                    byte_offset,
                    src: src.trim_end().to_string(),
                });
            }
            byte_offset += src.len();
        }

        lines
            .iter()
            .any(|line| line.line == base_line)
            .then_some((lines, base_line))
    }
}

#[derive(Debug)]
pub struct Line {
    pub line: usize,
    pub col: usize,
    pub byte_offset: usize,
    pub src: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_end() {
        let p = Span::new(0, 5, 1).end();
        assert_eq!(p.offset(), 5);
        assert_eq!(p.len(), 0);
        assert_eq!(p.line(), 1);
    }

    #[test]
    fn test_join() {
        let p1 = Span::new(16, 8, 2);
        let p2 = Span::new(0, 8, 1);
        assert_eq!(p1.join(p2), Span::new(0, 24, 1));
    }

    #[test]
    fn test_line_reader() {
        let source = "shall a : int = 1.\nshall b : int = c.\na + b.\n";
        let span = Span::new(35, 1, 2);
        let (lines, base) = LineReader::new(1, 0)
            .lines(source, &span)
            .expect("line 2 should be present");
        assert_eq!(base, 2);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].src, "shall b : int = c.");
        assert_eq!(lines[1].col, 16);
    }

    #[test]
    fn test_line_reader_past_end() {
        let span = Span::new(3, 0, 4);
        assert!(LineReader::new(0, 0).lines("a.\n", &span).is_none());
    }
}
