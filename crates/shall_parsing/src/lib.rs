#![doc = include_str!("../README.md")]

use crate::lexer::Lexer;
use crate::parser::{Parsed, Parser};

pub mod lexer;
pub mod parser;

/// Lexes and parses source text to completion.
///
/// The returned [Parsed] always holds a program; if its error list isn't empty the program is
/// incomplete and shouldn't be lowered.
pub fn parse(source: &str) -> Parsed {
    Parser::new(Lexer::new(source)).parse_program()
}
