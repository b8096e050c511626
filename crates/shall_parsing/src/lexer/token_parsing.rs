use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, alphanumeric1, anychar, char, digit1, multispace0};
use nom::combinator::{map, recognize, value};
use nom::error::{context, VerboseError};
use nom::multi::many0_count;
use nom::sequence::pair;
use nom::IResult;
use shall_tokens::token::TokenKind;

type Result<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// The raw text recognized at the front of the input, before it's classified into a [TokenKind]
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Lexeme<'a> {
    Word(&'a str),
    Number(&'a str),
    Punctuation(TokenKind),
    Unknown(char),
}

pub(super) fn parse_whitespace(src: &str) -> Result<'_, &str> {
    context("whitespace", multispace0)(src)
}

/// Recognizes one lexeme. Never fails on non-empty input.
pub(super) fn parse_lexeme(src: &str) -> Result<'_, Lexeme<'_>> {
    context(
        "lexeme",
        alt((
            map(parse_word, Lexeme::Word),
            map(parse_number, Lexeme::Number),
            map(parse_punctuation, Lexeme::Punctuation),
            map(anychar, Lexeme::Unknown),
        )),
    )(src)
}

fn parse_word(src: &str) -> Result<'_, &str> {
    context(
        "word",
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0_count(alt((alphanumeric1, tag("_")))),
        )),
    )(src)
}

/// A run of digits and decimal separators. How many separators it has is checked after.
fn parse_number(src: &str) -> Result<'_, &str> {
    context(
        "number",
        recognize(pair(digit1, many0_count(alt((digit1, tag(",")))))),
    )(src)
}

fn parse_punctuation(src: &str) -> Result<'_, TokenKind> {
    context(
        "punctuation",
        alt((
            value(TokenKind::Plus, char('+')),
            value(TokenKind::Minus, char('-')),
            value(TokenKind::Star, char('*')),
            value(TokenKind::Slash, char('/')),
            value(TokenKind::Caret, char('^')),
            value(TokenKind::Percent, char('%')),
            value(TokenKind::Dot, char('.')),
            value(TokenKind::LParen, char('(')),
            value(TokenKind::RParen, char(')')),
            value(TokenKind::Assign, char('=')),
            value(TokenKind::Colon, char(':')),
            value(TokenKind::Comma, char(',')),
            value(TokenKind::LCurly, char('{')),
            value(TokenKind::RCurly, char('}')),
        )),
    )(src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::combinator::all_consuming;

    #[test]
    fn test_parse_word() {
        let (rest, word) = parse_word("_snake_case1 + 2").expect("could not parse word");
        assert_eq!(word, "_snake_case1");
        assert_eq!(rest, " + 2");
    }

    #[test]
    fn test_parse_number_takes_whole_run() {
        let (rest, number) = all_consuming(parse_number)("1,2,3").expect("could not parse number");
        assert_eq!(number, "1,2,3");
        assert_eq!(rest, "");
        let (rest, number) = parse_number("12.5").expect("could not parse number");
        assert_eq!(number, "12");
        assert_eq!(rest, ".5");
    }

    #[test]
    fn test_parse_lexeme_falls_back_to_unknown() {
        let (rest, lexeme) = parse_lexeme("#x").expect("lexeme never fails on input");
        assert_eq!(lexeme, Lexeme::Unknown('#'));
        assert_eq!(rest, "x");
    }

    #[test]
    fn test_whitespace() {
        let (rest, ws) = parse_whitespace(" \n\t x").unwrap();
        assert_eq!(ws, " \n\t ");
        assert_eq!(rest, "x");
    }
}
