//! Responsible with converting source text into a token stream

use crate::lexer::token_parsing::{parse_lexeme, parse_whitespace, Lexeme};
use shall_tokens::spanned::Span;
use shall_tokens::token::{lookup_identifier, Token, TokenKind, TokenTag};
use tracing::{trace, warn};

mod token_parsing;

/// The decimal separator within number literals
pub const DECIMAL_SEPARATOR: char = ',';

/// Responsible with converting source text into a token stream.
///
/// Tokens are produced lazily, one per [next_token](Lexer::next_token) call, over a single forward
/// cursor. As an [Iterator] the lexer yields every token up to and including [TokenKind::Eof].
#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    source: &'src str,
    offset: usize,
    line: usize,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            finished: false,
        }
    }

    /// Gets the next token. Once the end of input is reached this keeps returning
    /// [TokenKind::Eof].
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let rest = &self.source[self.offset..];
        if rest.is_empty() {
            return Token::new(Span::new(self.offset, 0, self.line), TokenKind::Eof);
        }

        let (len, kind) = match parse_lexeme(rest) {
            Ok((remaining, lexeme)) => {
                let len = rest.len() - remaining.len();
                (len, self.classify(lexeme))
            }
            Err(e) => {
                let len = rest.chars().next().map_or(1, char::len_utf8);
                trace!("no lexeme at {}: {e:?}", self.offset);
                (len, TokenKind::Illegal(rest[..len].to_string()))
            }
        };
        let span = Span::new(self.offset, len, self.line);
        self.offset += len;

        if let TokenKind::Illegal(illegal) = &kind {
            warn!(
                "illegal token {illegal:?} at line {}, position {}",
                span.line(),
                span.offset()
            );
        }
        Token::new(span, kind)
    }

    fn skip_whitespace(&mut self) {
        if let Ok((_, whitespace)) = parse_whitespace(&self.source[self.offset..]) {
            self.line += whitespace.matches('\n').count();
            self.offset += whitespace.len();
        }
    }

    fn classify(&self, lexeme: Lexeme) -> TokenKind {
        match lexeme {
            Lexeme::Word(word) => lookup_identifier(word),
            Lexeme::Number(number) => classify_number(number),
            Lexeme::Punctuation(kind) => kind,
            Lexeme::Unknown(c) => TokenKind::Illegal(c.to_string()),
        }
    }
}

/// Zero separators is an integer, one is a double, more is malformed.
fn classify_number(number: &str) -> TokenKind {
    let separators = number.matches(DECIMAL_SEPARATOR).count();
    match separators {
        0 => number
            .parse::<i64>()
            .map(TokenKind::Integer)
            .unwrap_or_else(|_| TokenKind::Illegal(number.to_string())),
        1 => number
            .replace(DECIMAL_SEPARATOR, ".")
            .parse::<f64>()
            .map(TokenKind::Double)
            .unwrap_or_else(|_| TokenKind::Illegal(number.to_string())),
        _ => TokenKind::Illegal(number.to_string()),
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.tag() == TokenTag::Eof {
            self.finished = true;
        }
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shall_tokens::spanned::Spanned;
    use test_log::test;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).map(Token::into_kind).collect()
    }

    #[test]
    fn test_whitespace_only_is_eof() {
        let tokens = Lexer::new(" \t\r\n  \n").collect::<Vec<_>>();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].tag(), TokenTag::Eof);
        assert_eq!(tokens[0].line(), 3);
    }

    #[test]
    fn test_empty_is_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("12,34"), vec![TokenKind::Double(12.34), TokenKind::Eof]);
        assert_eq!(kinds("12"), vec![TokenKind::Integer(12), TokenKind::Eof]);
        assert_eq!(
            kinds("1,2,3"),
            vec![TokenKind::Illegal("1,2,3".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_malformed_number_realigns_after_run() {
        assert_eq!(
            kinds("1,2,3 + 4"),
            vec![
                TokenKind::Illegal("1,2,3".to_string()),
                TokenKind::Plus,
                TokenKind::Integer(4),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_integer_overflow_is_illegal() {
        assert_eq!(
            kinds("99999999999999999999"),
            vec![
                TokenKind::Illegal("99999999999999999999".to_string()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_dot_is_terminator_not_decimal_point() {
        assert_eq!(
            kinds("12.5"),
            vec![
                TokenKind::Integer(12),
                TokenKind::Dot,
                TokenKind::Integer(5),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_shall_statement() {
        assert_eq!(
            kinds("shall a: int = 137."),
            vec![
                TokenKind::Shall,
                TokenKind::Identifier("a".to_string()),
                TokenKind::Colon,
                TokenKind::Type("int".to_string()),
                TokenKind::Assign,
                TokenKind::Integer(137),
                TokenKind::Dot,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_aliases() {
        assert_eq!(
            kinds("declare x : double eq 2,5 fr"),
            vec![
                TokenKind::Shall,
                TokenKind::Identifier("x".to_string()),
                TokenKind::Colon,
                TokenKind::Type("double".to_string()),
                TokenKind::Assign,
                TokenKind::Double(2.5),
                TokenKind::Dot,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_operators_and_punctuation() {
        assert_eq!(
            kinds("+-*/^%.()=:,{}"),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Caret,
                TokenKind::Percent,
                TokenKind::Dot,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Assign,
                TokenKind::Colon,
                TokenKind::Comma,
                TokenKind::LCurly,
                TokenKind::RCurly,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_unknown_char_is_illegal() {
        assert_eq!(
            kinds("a $ b"),
            vec![
                TokenKind::Identifier("a".to_string()),
                TokenKind::Illegal("$".to_string()),
                TokenKind::Identifier("b".to_string()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_positions_and_lines() {
        let tokens = Lexer::new("a\n  bb +\n3").collect::<Vec<_>>();
        let located = tokens
            .iter()
            .map(|token| (token.line(), token.position(), token.span().len()))
            .collect::<Vec<_>>();
        assert_eq!(located, vec![(1, 0, 1), (2, 4, 2), (2, 7, 1), (3, 9, 1), (3, 10, 0)]);
    }

    #[test]
    fn test_eof_is_terminal() {
        let mut lexer = Lexer::new("x");
        lexer.next_token();
        assert_eq!(lexer.next_token().tag(), TokenTag::Eof);
        assert_eq!(lexer.next_token().tag(), TokenTag::Eof);
        assert!(lexer.next().is_some());
        assert!(lexer.next().is_none());
    }
}
