#![doc = include_str!("../README.md")]

use crate::spanned::{LineReader, Span};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod spanned;
pub mod token;
pub mod types;

/// An error with a location
#[derive(Debug)]
pub struct SpannedError<E> {
    error: E,
    location: Option<Span>,
}

impl<E> SpannedError<E> {
    pub fn new(error: E, location: impl Into<Option<Span>>) -> Self {
        Self {
            error,
            location: location.into(),
        }
    }

    /// The error without its location
    pub fn error(&self) -> &E {
        &self.error
    }

    pub fn location(&self) -> Option<Span> {
        self.location
    }

    /// Pairs this error with the source it was found in so it can be displayed with the offending
    /// lines.
    pub fn with_source<'a>(&'a self, source: &'a str) -> SourceReport<'a, E> {
        SourceReport {
            error: self,
            source,
        }
    }
}

impl<E: Display> Display for SpannedError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(location) = &self.location {
            write!(
                f,
                " (line {}, position {})",
                location.line(),
                location.offset()
            )?;
        }
        Ok(())
    }
}

impl<E: Error + 'static> Error for SpannedError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.error.source()
    }
}

/// A [SpannedError] displayed together with the source lines around its location
pub struct SourceReport<'a, E> {
    error: &'a SpannedError<E>,
    source: &'a str,
}

impl<E: Display> Display for SourceReport<'_, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.error.error)?;
        let Some(location) = &self.error.location else {
            return Ok(());
        };
        let Some((lines, base_line)) = LineReader::new(2, 2).lines(self.source, location) else {
            return writeln!(f, "  -> {}:{}", location.line(), location.offset());
        };
        let col = lines
            .iter()
            .find(|line| line.line == base_line)
            .map(|line| line.col)
            .unwrap_or_default();
        writeln!(f, "  -> {base_line}:{col}")?;
        let width = lines.iter().map(|line| line.line).max().unwrap_or(0) / 10 + 1;
        for line in &lines {
            writeln!(f, "{:width$} | {}", line.line, line.src)?;
            if line.line == base_line {
                if !location.is_empty() {
                    writeln!(
                        f,
                        "{}{}{}",
                        " ".repeat(width + 3),
                        " ".repeat(col),
                        "~".repeat(location.len())
                    )?;
                } else {
                    writeln!(f, "{}{}^", " ".repeat(width + 3), "-".repeat(col))?;
                }
            }
        }
        Ok(())
    }
}
