//! AST statements

use crate::expr::{Expr, Identifier};
use shall_tokens::spanned::{Span, Spanned};

/// A statement
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    span: Span,
    pub kind: StmtKind,
}

impl Stmt {
    pub fn new(span: Span, kind: StmtKind) -> Self {
        Self { span, kind }
    }
}

impl Spanned for Stmt {
    fn span(&self) -> Span {
        self.span
    }
}

/// Statement kind
#[derive(Debug, Clone, PartialEq, strum::IntoStaticStr)]
pub enum StmtKind {
    Expression(Expr),
    Shall(ShallStmt),
    Assign(AssignStmt),
    Function(FunctionStmt),
    Block(BlockStmt),
    Return(Expr),
}

/// `shall name : type = value.`
#[derive(Debug, Clone, PartialEq)]
pub struct ShallStmt {
    pub name: Identifier,
    pub ty: TypeName,
    pub value: Expr,
}

/// `target = value.`
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: Identifier,
    pub value: Expr,
}

/// `fn name(param : type, ...) : type { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionStmt {
    pub name: Identifier,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeName,
    pub body: BlockStmt,
}

/// A function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Identifier,
    pub ty: TypeName,
}

/// A block of statements
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    span: Span,
    pub statements: Vec<Stmt>,
}

impl BlockStmt {
    pub fn new(span: Span, statements: impl IntoIterator<Item = Stmt>) -> Self {
        Self {
            span,
            statements: statements.into_iter().collect(),
        }
    }

    /// Creates a new empty block
    pub const fn empty(span: Span) -> Self {
        Self {
            span,
            statements: vec![],
        }
    }
}

impl Spanned for BlockStmt {
    fn span(&self) -> Span {
        self.span
    }
}

/// A type annotation, resolved against the primitive type table during lowering
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    pub name: String,
    span: Span,
}

impl TypeName {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

impl Spanned for TypeName {
    fn span(&self) -> Span {
        self.span
    }
}
