//! Turns a token stream into a [Program]

use crate::lexer::Lexer;
use itertools::Itertools;
use shall_ast::expr::{Expr, Identifier, InfixOp};
use shall_ast::statements::{
    AssignStmt, BlockStmt, FunctionStmt, Parameter, ShallStmt, Stmt, StmtKind, TypeName,
};
use shall_ast::Program;
use shall_tokens::spanned::Spanned;
use shall_tokens::token::{Token, TokenKind, TokenTag};
use std::mem;
use tracing::{debug, trace};

mod error;

pub use error::*;

/// Binding power of an operator, lowest first.
///
/// `Equals`, `LessGreater`, `Call` and `Index` have no operators yet.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Exponent,
    Prefix,
    Call,
    Index,
}

impl Precedence {
    /// The precedence a token has when it appears in infix position
    pub fn of(tag: TokenTag) -> Self {
        match tag {
            TokenTag::Plus | TokenTag::Minus => Precedence::Sum,
            TokenTag::Star | TokenTag::Slash | TokenTag::Percent => Precedence::Product,
            TokenTag::Caret => Precedence::Exponent,
            _ => Precedence::Lowest,
        }
    }
}

type PrefixParseFn<'src> = fn(&mut Parser<'src>) -> Option<Expr>;
type InfixParseFn<'src> = fn(&mut Parser<'src>, Expr) -> Option<Expr>;

/// The result of parsing a whole source file.
#[derive(Debug)]
pub struct Parsed {
    pub program: Program,
    pub errors: Vec<SyntaxError>,
}

impl Parsed {
    /// Gets the program if no syntax errors were found
    pub fn into_result(self) -> Result<Program, Vec<SyntaxError>> {
        if self.errors.is_empty() {
            Ok(self.program)
        } else {
            Err(self.errors)
        }
    }
}

/// A precedence-climbing parser holding the current token and one token of lookahead.
///
/// Parse functions start with their first token in `current` and leave `current` on their last
/// token. A function that fails records a [SyntaxError] and returns `None`.
#[derive(Debug)]
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token,
    peek: Token,
    errors: Vec<SyntaxError>,
}

impl<'src> Parser<'src> {
    /// Creates a new parser, reading the first two tokens
    pub fn new(mut lexer: Lexer<'src>) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Self {
            lexer,
            current,
            peek,
            errors: vec![],
        }
    }

    /// Parses statements until the end of input.
    pub fn parse_program(mut self) -> Parsed {
        let mut statements = vec![];
        while !self.current_is(TokenTag::Eof) {
            match self.parse_statement() {
                Some(stmt) => statements.push(stmt),
                None => self.synchronize(),
            }
            self.next_token();
        }
        debug!(
            "parsed statements [{}] with {} errors",
            statements
                .iter()
                .map(|stmt| <&'static str>::from(&stmt.kind))
                .join(", "),
            self.errors.len()
        );
        Parsed {
            program: Program::new(statements),
            errors: self.errors,
        }
    }

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.current = mem::replace(&mut self.peek, next);
    }

    fn current_is(&self, tag: TokenTag) -> bool {
        self.current.tag() == tag
    }

    fn peek_is(&self, tag: TokenTag) -> bool {
        self.peek.tag() == tag
    }

    /// Advances if the lookahead has the given tag, otherwise records an error
    fn expect_peek(&mut self, tag: TokenTag) -> Option<()> {
        if self.peek_is(tag) {
            self.next_token();
            Some(())
        } else {
            self.peek_error(tag);
            None
        }
    }

    fn peek_error(&mut self, expected: TokenTag) {
        let error = SyntaxError::new(
            SyntaxErrorKind::ExpectedToken {
                expected,
                found: self.peek.kind().clone(),
            },
            self.peek.span(),
        );
        trace!("{error}");
        self.errors.push(error);
    }

    /// Skips the rest of a failed statement. Stops on a terminator, or just before a closing
    /// brace or the end of input so the enclosing block still sees them.
    fn synchronize(&mut self) {
        while !(self.current_is(TokenTag::Dot)
            || self.current_is(TokenTag::RCurly)
            || self.current_is(TokenTag::Eof)
            || self.peek_is(TokenTag::RCurly)
            || self.peek_is(TokenTag::Eof))
        {
            self.next_token();
        }
    }

    fn parse_statement(&mut self) -> Option<Stmt> {
        trace!("parsing statement at {}", self.current);
        match self.current.tag() {
            TokenTag::Shall => self.parse_shall_statement(),
            TokenTag::Fn => self.parse_function_statement(),
            TokenTag::Return => self.parse_return_statement(),
            TokenTag::LCurly => self
                .parse_block()
                .map(|block| Stmt::new(block.span(), StmtKind::Block(block))),
            TokenTag::Identifier if self.peek_is(TokenTag::Assign) => {
                self.parse_assign_statement()
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_identifier(&self) -> Option<Identifier> {
        match self.current.kind() {
            TokenKind::Identifier(name) => Some(Identifier::new(name.clone(), self.current.span())),
            _ => None,
        }
    }

    fn parse_type_name(&self) -> Option<TypeName> {
        match self.current.kind() {
            TokenKind::Type(name) => Some(TypeName::new(name.clone(), self.current.span())),
            _ => None,
        }
    }

    /// `shall name : type = expression .`
    fn parse_shall_statement(&mut self) -> Option<Stmt> {
        let start = self.current.span();
        self.expect_peek(TokenTag::Identifier)?;
        let name = self.parse_identifier()?;
        self.expect_peek(TokenTag::Colon)?;
        self.expect_peek(TokenTag::Type)?;
        let ty = self.parse_type_name()?;
        self.expect_peek(TokenTag::Assign)?;
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenTag::Dot)?;

        Some(Stmt::new(
            start.join(self.current.span()),
            StmtKind::Shall(ShallStmt { name, ty, value }),
        ))
    }

    /// `name = expression .`
    fn parse_assign_statement(&mut self) -> Option<Stmt> {
        let target = self.parse_identifier()?;
        self.expect_peek(TokenTag::Assign)?;
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenTag::Dot)?;

        Some(Stmt::new(
            target.span().join(self.current.span()),
            StmtKind::Assign(AssignStmt { target, value }),
        ))
    }

    /// `fn name ( parameters ) : type { statements }`
    fn parse_function_statement(&mut self) -> Option<Stmt> {
        let start = self.current.span();
        self.expect_peek(TokenTag::Identifier)?;
        let name = self.parse_identifier()?;
        self.expect_peek(TokenTag::LParen)?;
        let parameters = self.parse_parameters()?;
        self.expect_peek(TokenTag::Colon)?;
        self.expect_peek(TokenTag::Type)?;
        let return_type = self.parse_type_name()?;
        self.expect_peek(TokenTag::LCurly)?;
        let body = self.parse_block()?;

        Some(Stmt::new(
            start.join(body.span()),
            StmtKind::Function(FunctionStmt {
                name,
                parameters,
                return_type,
                body,
            }),
        ))
    }

    /// Starts on `(`, ends on `)`
    fn parse_parameters(&mut self) -> Option<Vec<Parameter>> {
        let mut parameters = vec![];
        if self.peek_is(TokenTag::RParen) {
            self.next_token();
            return Some(parameters);
        }
        loop {
            self.expect_peek(TokenTag::Identifier)?;
            let name = self.parse_identifier()?;
            self.expect_peek(TokenTag::Colon)?;
            self.expect_peek(TokenTag::Type)?;
            let ty = self.parse_type_name()?;
            parameters.push(Parameter { name, ty });
            if self.peek_is(TokenTag::Comma) {
                self.next_token();
            } else {
                break;
            }
        }
        self.expect_peek(TokenTag::RParen)?;
        Some(parameters)
    }

    /// `return expression`, with an optional terminator
    fn parse_return_statement(&mut self) -> Option<Stmt> {
        let start = self.current.span();
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenTag::Dot) {
            self.next_token();
        }
        Some(Stmt::new(
            start.join(self.current.span()),
            StmtKind::Return(value),
        ))
    }

    fn parse_expression_statement(&mut self) -> Option<Stmt> {
        let expression = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenTag::Dot) {
            self.next_token();
        }
        Some(Stmt::new(
            expression.span().join(self.current.span()),
            StmtKind::Expression(expression),
        ))
    }

    /// Starts on `{`, ends on `}`. Statements that fail inside the block are skipped so the rest
    /// of the block is still checked, but the block itself is then dropped.
    fn parse_block(&mut self) -> Option<BlockStmt> {
        let start = self.current.span();
        let errors_before = self.errors.len();
        let mut statements = vec![];
        self.next_token();
        while !self.current_is(TokenTag::RCurly) {
            if self.current_is(TokenTag::Eof) {
                self.errors.push(SyntaxError::new(
                    SyntaxErrorKind::ExpectedToken {
                        expected: TokenTag::RCurly,
                        found: TokenKind::Eof,
                    },
                    self.current.span(),
                ));
                return None;
            }
            match self.parse_statement() {
                Some(stmt) => statements.push(stmt),
                None => {
                    self.synchronize();
                    if self.current_is(TokenTag::RCurly) {
                        break;
                    }
                }
            }
            self.next_token();
        }
        if self.errors.len() > errors_before {
            return None;
        }
        Some(BlockStmt::new(start.join(self.current.span()), statements))
    }

    /// Parses an expression whose operators all bind tighter than `precedence`.
    pub fn parse_expression(&mut self, precedence: Precedence) -> Option<Expr> {
        let Some(prefix) = self.prefix_parse_fn(self.current.tag()) else {
            let error = SyntaxError::new(
                SyntaxErrorKind::NoPrefixParseFn(self.current.tag()),
                self.current.span(),
            );
            trace!("{error}");
            self.errors.push(error);
            return None;
        };
        let mut left = prefix(self)?;

        while !self.peek_is(TokenTag::Dot) && precedence < self.peek_precedence() {
            let Some(infix) = self.infix_parse_fn(self.peek.tag()) else {
                return Some(left);
            };
            self.next_token();
            left = infix(self, left)?;
        }
        Some(left)
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(self.peek.tag())
    }

    fn current_precedence(&self) -> Precedence {
        Precedence::of(self.current.tag())
    }

    fn prefix_parse_fn(&self, tag: TokenTag) -> Option<PrefixParseFn<'src>> {
        let f: PrefixParseFn<'src> = match tag {
            TokenTag::Integer => Self::parse_integer,
            TokenTag::Double => Self::parse_double,
            TokenTag::Identifier => Self::parse_identifier_expression,
            TokenTag::LParen => Self::parse_grouped_expression,
            _ => return None,
        };
        Some(f)
    }

    fn infix_parse_fn(&self, tag: TokenTag) -> Option<InfixParseFn<'src>> {
        let f: InfixParseFn<'src> = match tag {
            TokenTag::Plus
            | TokenTag::Minus
            | TokenTag::Star
            | TokenTag::Slash
            | TokenTag::Percent
            | TokenTag::Caret => Self::parse_infix_expression,
            _ => return None,
        };
        Some(f)
    }

    fn parse_integer(&mut self) -> Option<Expr> {
        match self.current.kind() {
            TokenKind::Integer(value) => Some(Expr::integer(self.current.span(), *value)),
            _ => None,
        }
    }

    fn parse_double(&mut self) -> Option<Expr> {
        match self.current.kind() {
            TokenKind::Double(value) => Some(Expr::double(self.current.span(), *value)),
            _ => None,
        }
    }

    fn parse_identifier_expression(&mut self) -> Option<Expr> {
        self.parse_identifier().map(Expr::identifier)
    }

    fn parse_grouped_expression(&mut self) -> Option<Expr> {
        let start = self.current.span();
        self.next_token();
        let inner = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenTag::RParen)?;
        Some(Expr::new(start.join(self.current.span()), inner.kind))
    }

    fn parse_infix_expression(&mut self, left: Expr) -> Option<Expr> {
        let op = InfixOp::from_token(self.current.kind())?;
        let precedence = self.current_precedence();
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Some(Expr::infix(left, op, right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shall_ast::expr::ExprKind;
    use shall_tokens::spanned::Span;
    use test_log::test;

    fn parse(src: &str) -> Parsed {
        Parser::new(Lexer::new(src)).parse_program()
    }

    fn parse_ok(src: &str) -> Program {
        let parsed = parse(src);
        assert!(
            parsed.errors.is_empty(),
            "unexpected errors: {:?}",
            parsed.errors
        );
        parsed.program
    }

    fn expression(src: &str) -> String {
        let program = parse_ok(src);
        assert_eq!(program.statements.len(), 1);
        match &program.statements[0].kind {
            StmtKind::Expression(expr) => expr.to_string(),
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    fn messages(src: &str) -> Vec<String> {
        parse(src).errors.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(expression("1 + 2 * 3"), "(1 + (2 * 3))");
        assert_eq!(expression("1 * 2 + 3"), "((1 * 2) + 3)");
        assert_eq!(expression("a + b % c ^ d"), "(a + (b % (c ^ d)))");
        assert_eq!(expression("2,5 * x - 1."), "((2.5 * x) - 1)");
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(expression("8 - 2 - 1"), "((8 - 2) - 1)");
        assert_eq!(expression("8 / 2 * 3"), "((8 / 2) * 3)");
    }

    #[test]
    fn test_grouping() {
        assert_eq!(expression("(1 + 2) * 3"), "((1 + 2) * 3)");
        assert_eq!(expression("((a))"), "a");
    }

    #[test]
    fn test_terminator_ends_expression() {
        let program = parse_ok("1 + 2. 3");
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn test_shall_statement() {
        let program = parse_ok("shall a : int = 2 + 3.");
        let StmtKind::Shall(shall) = &program.statements[0].kind else {
            panic!("expected shall statement");
        };
        assert_eq!(shall.name.as_str(), "a");
        assert_eq!(shall.ty.name, "int");
        assert_eq!(shall.value.to_string(), "(2 + 3)");
        assert_eq!(program.statements[0].span(), Span::new(0, 22, 1));
    }

    #[test]
    fn test_declare_alias_statement() {
        let program = parse_ok("declare x : double eq 1,5 fr");
        assert!(matches!(program.statements[0].kind, StmtKind::Shall(_)));
    }

    #[test]
    fn test_assign_statement() {
        let program = parse_ok("x = x * 2.");
        let StmtKind::Assign(assign) = &program.statements[0].kind else {
            panic!("expected assign statement");
        };
        assert_eq!(assign.target.as_str(), "x");
        assert_eq!(assign.value.to_string(), "(x * 2)");
    }

    #[test]
    fn test_function_statement() {
        let program = parse_ok("fn add(a : int, b : int) : int { return a + b. }");
        let StmtKind::Function(function) = &program.statements[0].kind else {
            panic!("expected function statement");
        };
        assert_eq!(function.name.as_str(), "add");
        let params = function
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p.ty.name.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(params, [("a", "int"), ("b", "int")]);
        assert_eq!(function.return_type.name, "int");
        assert_eq!(function.body.statements.len(), 1);
        assert!(matches!(
            function.body.statements[0].kind,
            StmtKind::Return(_)
        ));
    }

    #[test]
    fn test_function_without_parameters() {
        let program = parse_ok("fn main() : double { return 1,0 }");
        let StmtKind::Function(function) = &program.statements[0].kind else {
            panic!("expected function statement");
        };
        assert!(function.parameters.is_empty());
    }

    #[test]
    fn test_nested_blocks() {
        let program = parse_ok("{ shall a : int = 1. { a. } } 2");
        assert_eq!(program.statements.len(), 2);
        let StmtKind::Block(block) = &program.statements[0].kind else {
            panic!("expected block");
        };
        assert_eq!(block.statements.len(), 2);
        assert!(matches!(block.statements[1].kind, StmtKind::Block(_)));
    }

    #[test]
    fn test_missing_terminator() {
        assert_eq!(
            messages("shall a : int = 5"),
            ["expected next token to be Dot, got Eof instead"]
        );
    }

    #[test]
    fn test_missing_type() {
        assert_eq!(
            messages("shall a = 5."),
            ["expected next token to be Colon, got Assign instead"]
        );
    }

    #[test]
    fn test_no_prefix_parse_fn() {
        let parsed = parse("+ 1.");
        assert_eq!(
            parsed.errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            ["no prefix parse function for Plus found"]
        );
        assert!(parsed.program.statements.is_empty());
    }

    #[test]
    fn test_missing_close_paren() {
        assert_eq!(
            messages("(1 + 2 * 3."),
            ["expected next token to be RParen, got Dot instead"]
        );
    }

    #[test]
    fn test_unterminated_block() {
        assert_eq!(
            messages("{ 1. 2."),
            ["expected next token to be RCurly, got Eof instead"]
        );
    }

    #[test]
    fn test_recovery_reports_every_error() {
        let parsed = parse("shall a int = 1. shall b : int = 2. shall c : int 3. b.");
        assert_eq!(
            parsed.errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            [
                "expected next token to be Colon, got Type(\"int\") instead",
                "expected next token to be Assign, got Integer(3) instead"
            ]
        );
        assert_eq!(parsed.program.statements.len(), 2);
    }

    #[test]
    fn test_error_inside_function_body_recovers_at_brace() {
        let parsed = parse("fn f() : int { shall x = 1. return 2. } 3.");
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.program.statements.len(), 1);
        assert!(matches!(
            parsed.program.statements[0].kind,
            StmtKind::Expression(Expr {
                kind: ExprKind::Integer(3),
                ..
            })
        ));
    }

    #[test]
    fn test_errors_carry_offending_span() {
        let parsed = parse("shall a : int = 1\nshall");
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].span(), Span::new(18, 5, 2));
    }

    #[test]
    fn test_into_result() {
        assert!(parse("1 + 2.").into_result().is_ok());
        assert_eq!(parse("1 +").into_result().unwrap_err().len(), 1);
    }
}
