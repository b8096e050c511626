//! The program is the highest level node

use crate::statements::{Stmt, StmtKind};

/// A whole source file. Statement order is the definition and execution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn new(statements: impl IntoIterator<Item = Stmt>) -> Self {
        Self {
            statements: statements.into_iter().collect(),
        }
    }

    /// Finds a top-level function statement by name
    pub fn function(&self, name: &str) -> Option<&Stmt> {
        self.statements.iter().find(
            |stmt| matches!(&stmt.kind, StmtKind::Function(function) if function.name.as_str() == name),
        )
    }
}
