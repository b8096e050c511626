#![doc = include_str!("../README.md")]

pub mod expr;
pub mod program;
pub mod statements;

pub use expr::{Expr, ExprKind, Identifier, InfixOp};
pub use program::Program;
pub use statements::{Stmt, StmtKind, TypeName};
