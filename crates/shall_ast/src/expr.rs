//! AST expressions

use shall_tokens::spanned::{Span, Spanned};
use shall_tokens::token::TokenKind;
use std::fmt::{Display, Formatter};

/// An expression
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    span: Span,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(span: Span, kind: ExprKind) -> Self {
        Self { span, kind }
    }

    /// Creates an infix expression spanning both operands
    pub fn infix(left: Expr, op: InfixOp, right: Expr) -> Self {
        let span = left.span.join(right.span);
        Self::new(
            span,
            ExprKind::Infix {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
        )
    }

    pub fn integer(span: Span, value: i64) -> Self {
        Self::new(span, ExprKind::Integer(value))
    }

    pub fn double(span: Span, value: f64) -> Self {
        Self::new(span, ExprKind::Double(value))
    }

    pub fn identifier(identifier: Identifier) -> Self {
        Self::new(identifier.span, ExprKind::Identifier(identifier))
    }
}

impl Spanned for Expr {
    fn span(&self) -> Span {
        self.span
    }
}

/// Fully parenthesized form, so the grouping the parser chose is visible
impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ExprKind::Infix { left, op, right } => write!(f, "({left} {op} {right})"),
            ExprKind::Integer(i) => write!(f, "{i}"),
            ExprKind::Double(d) => write!(f, "{d}"),
            ExprKind::Identifier(id) => f.write_str(id.as_str()),
        }
    }
}

/// Expression kind
#[derive(Debug, Clone, PartialEq, strum::IntoStaticStr)]
pub enum ExprKind {
    Infix {
        left: Box<Expr>,
        op: InfixOp,
        right: Box<Expr>,
    },
    Integer(i64),
    Double(f64),
    Identifier(Identifier),
}

/// A binary operator
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

impl InfixOp {
    /// Gets the operator for a token, if the token is a binary operator
    pub fn from_token(kind: &TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(Self::Add),
            TokenKind::Minus => Some(Self::Sub),
            TokenKind::Star => Some(Self::Mul),
            TokenKind::Slash => Some(Self::Div),
            TokenKind::Percent => Some(Self::Rem),
            TokenKind::Caret => Some(Self::Pow),
            _ => None,
        }
    }

    /// The source symbol of this operator
    pub const fn symbol(&self) -> &'static str {
        match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Rem => "%",
            InfixOp::Pow => "^",
        }
    }
}

impl Display for InfixOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A name as written in the source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub name: String,
    span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl Spanned for Identifier {
    fn span(&self) -> Span {
        self.span
    }
}
