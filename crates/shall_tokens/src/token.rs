//! A lexical token from a source file, along with the keyword tables used to classify words

use crate::spanned::{Span, Spanned};
use crate::types::is_type_name;
use std::fmt::{Debug, Display, Formatter};

/// A lexical token from a source file
#[derive(Clone, PartialEq)]
pub struct Token {
    span: Span,
    kind: TokenKind,
}

impl Token {
    /// Creates a new token
    pub fn new(span: Span, kind: TokenKind) -> Self {
        Self { span, kind }
    }

    /// Gets the kind for this token
    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// Gets the payload-free tag of this token's kind
    pub fn tag(&self) -> TokenTag {
        TokenTag::from(&self.kind)
    }

    /// The 1-based line the token starts on
    pub fn line(&self) -> usize {
        self.span.line()
    }

    /// The absolute byte position of the token
    pub fn position(&self) -> usize {
        self.span.offset()
    }

    pub fn into_kind(self) -> TokenKind {
        self.kind
    }
}

impl Debug for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.kind, f)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Token[{} : line {}, position {}]",
            self.kind,
            self.line(),
            self.position()
        )
    }
}

impl Spanned for Token {
    fn span(&self) -> Span {
        self.span
    }
}

/// The kind for this token, carrying the literal payload where there is one
#[derive(Debug, Clone, PartialEq, strum::EnumDiscriminants)]
#[strum_discriminants(name(TokenTag), derive(Hash, strum::Display))]
pub enum TokenKind {
    /// EOF, will only appear at the end of a token stream
    Eof,
    /// Lexer error, carrying the offending text
    Illegal(String),

    // literals
    Integer(i64),
    Double(f64),
    Identifier(String),
    /// A name from the type-name set
    Type(String),

    // arithmetic operators
    Plus,
    Minus,
    Star,
    Slash,
    /// ^
    Caret,
    Percent,

    /// statement terminator
    Dot,
    LParen,
    RParen,
    Colon,
    /// =
    Assign,
    Comma,
    LCurly,
    RCurly,

    // keywords
    Shall,
    Fn,
    Return,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let tag = TokenTag::from(self);
        match self {
            TokenKind::Illegal(s) | TokenKind::Identifier(s) | TokenKind::Type(s) => {
                write!(f, "{tag}({s:?})")
            }
            TokenKind::Integer(i) => write!(f, "{tag}({i})"),
            TokenKind::Double(d) => write!(f, "{tag}({d})"),
            _ => write!(f, "{tag}"),
        }
    }
}

/// Classifies a word against the keyword table, then the alias table, then the type-name set.
///
/// Anything else is a plain identifier.
pub fn lookup_identifier(word: &str) -> TokenKind {
    if let Some(kind) = keyword(word) {
        return kind;
    }
    if let Some(kind) = alias(word) {
        return kind;
    }
    if is_type_name(word) {
        return TokenKind::Type(word.to_string());
    }
    TokenKind::Identifier(word.to_string())
}

fn keyword(word: &str) -> Option<TokenKind> {
    match word {
        "shall" | "declare" => Some(TokenKind::Shall),
        "fn" => Some(TokenKind::Fn),
        "return" => Some(TokenKind::Return),
        _ => None,
    }
}

/// Abbreviated spellings of punctuation
fn alias(word: &str) -> Option<TokenKind> {
    match word {
        "fr" => Some(TokenKind::Dot),
        "eq" => Some(TokenKind::Assign),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_order() {
        assert_eq!(lookup_identifier("shall"), TokenKind::Shall);
        assert_eq!(lookup_identifier("declare"), TokenKind::Shall);
        assert_eq!(lookup_identifier("fr"), TokenKind::Dot);
        assert_eq!(lookup_identifier("eq"), TokenKind::Assign);
        assert_eq!(lookup_identifier("int"), TokenKind::Type("int".to_string()));
        assert_eq!(
            lookup_identifier("shallow"),
            TokenKind::Identifier("shallow".to_string())
        );
    }

    #[test]
    fn test_display() {
        let token = Token::new(Span::new(4, 2, 1), TokenKind::Integer(12));
        assert_eq!(token.to_string(), "Token[Integer(12) : line 1, position 4]");
        assert_eq!(token.tag(), TokenTag::Integer);
        assert_eq!(TokenKind::Dot.to_string(), "Dot");
    }

    #[test]
    fn test_debug_shows_kind_only() {
        let token = Token::new(Span::new(4, 2, 1), TokenKind::Double(1.5));
        assert_eq!(format!("{token:?}"), "Double(1.5)");
        let token = Token::new(Span::new(0, 0, 1), TokenKind::Eof);
        assert_eq!(format!("{token:?}"), "Eof");
    }
}
