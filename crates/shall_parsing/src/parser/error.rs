use shall_tokens::spanned::{Span, Spanned};
use shall_tokens::token::{TokenKind, TokenTag};
use shall_tokens::{SourceReport, SpannedError};
use std::fmt::{Display, Formatter};

/// Represents an error occurring during parsing
#[derive(Debug)]
pub struct SyntaxError {
    kind: SpannedError<SyntaxErrorKind>,
}

impl SyntaxError {
    /// Creates a new error
    pub fn new(kind: SyntaxErrorKind, location: impl Into<Option<Span>>) -> Self {
        Self {
            kind: SpannedError::new(kind, location),
        }
    }

    pub fn kind(&self) -> &SyntaxErrorKind {
        self.kind.error()
    }

    /// Renders this error with the source lines it points at
    pub fn with_source<'a>(&'a self, source: &'a str) -> SourceReport<'a, SyntaxErrorKind> {
        self.kind.with_source(source)
    }
}

impl Spanned for SyntaxError {
    fn span(&self) -> Span {
        self.kind.location().unwrap_or_default()
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self.kind.error(), f)
    }
}

impl std::error::Error for SyntaxError {}

/// [SyntaxError] kind
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxErrorKind {
    #[error("expected next token to be {expected}, got {found} instead")]
    ExpectedToken { expected: TokenTag, found: TokenKind },
    #[error("no prefix parse function for {0} found")]
    NoPrefixParseFn(TokenTag),
}
