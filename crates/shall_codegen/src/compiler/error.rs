//! A lowering error

use cranelift_module::ModuleError;
use shall_ast::InfixOp;
use shall_tokens::spanned::{Span, Spanned};
use shall_tokens::types::PrimitiveType;
use shall_tokens::{SourceReport, SpannedError};
use thiserror::Error;

/// The kind of error
#[derive(Debug, Error)]
pub enum LowerErrorKind {
    #[error("unresolved identifier `{0}`")]
    UnresolvedIdentifier(String),
    #[error("operands of `{op}` must have the same type, got {left} and {right}")]
    OperandTypeMismatch {
        op: InfixOp,
        left: PrimitiveType,
        right: PrimitiveType,
    },
    #[error("operator `{op}` is not supported for {ty}")]
    UnsupportedOperator { op: InfixOp, ty: PrimitiveType },
    #[error("expected a value of type {expected}, got {found}")]
    TypeMismatch {
        expected: PrimitiveType,
        found: PrimitiveType,
    },
    #[error("unknown type `{0}`")]
    UnknownType(String),
    #[error("function `{0}` can reach its end without returning a value")]
    MissingReturn(String),
    #[error("return is only allowed inside a function body")]
    ReturnOutsideFunction,
    #[error("unreachable statement after return")]
    UnreachableStatement,
    #[error("`{0}` belongs to an enclosing function and can not be captured")]
    CapturedVariable(String),
    #[error("`{0}` is a function, not a value")]
    NotAValue(String),
    #[error("`{0}` is not a variable")]
    NotAVariable(String),
    #[error("function `{0}` is already defined")]
    DuplicateProcedure(String),
    #[error("integer literal {0} does not fit in an int")]
    IntegerOutOfRange(i64),
    #[error("invalid entry function `{name}`: {reason}")]
    InvalidEntry { name: String, reason: String },
    #[error(transparent)]
    Module(#[from] ModuleError),
}

/// An error occurred while lowering a program
#[derive(Debug, Error)]
#[error(transparent)]
pub struct LowerError(SpannedError<LowerErrorKind>);

impl LowerError {
    /// Creates a new [LowerError] using a quick constructor
    #[inline]
    pub fn new(error: impl Into<LowerErrorKind>, location: impl Into<Option<Span>>) -> Self {
        Self(SpannedError::new(error.into(), location))
    }

    pub fn kind(&self) -> &LowerErrorKind {
        self.0.error()
    }

    pub fn location(&self) -> Option<Span> {
        self.0.location()
    }

    /// Renders this error with the source lines it points at
    pub fn with_source<'a>(&'a self, source: &'a str) -> SourceReport<'a, LowerErrorKind> {
        self.0.with_source(source)
    }
}

impl Spanned for LowerError {
    fn span(&self) -> Span {
        self.location().unwrap_or_default()
    }
}

impl<T> From<T> for LowerError
where
    LowerErrorKind: From<T>,
{
    fn from(value: T) -> Self {
        Self(SpannedError::new(LowerErrorKind::from(value), None))
    }
}

/// A type alias for lowering results
pub type LowerResult<T> = Result<T, LowerError>;
