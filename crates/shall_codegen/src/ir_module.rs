//! The output of lowering a program

use cranelift::codegen::ir::Function;
use cranelift_module::FuncId;
use shall_tokens::types::PrimitiveType;
use std::fmt::{Display, Formatter};

/// A single lowered function, declared in a module under `id`.
#[derive(Debug, Clone)]
pub struct Procedure {
    name: String,
    id: FuncId,
    function: Function,
}

impl Procedure {
    pub fn new(name: impl Into<String>, id: FuncId, function: Function) -> Self {
        Self {
            name: name.into(),
            id,
            function,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> FuncId {
        self.id
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    pub fn into_function(self) -> Function {
        self.function
    }
}

/// Every procedure of a program, in the order they were finished, along with which one is the
/// entry point.
#[derive(Debug, Clone)]
pub struct IrModule {
    name: String,
    procedures: Vec<Procedure>,
    entry: FuncId,
    entry_type: PrimitiveType,
}

impl IrModule {
    pub fn new(
        name: impl Into<String>,
        procedures: Vec<Procedure>,
        entry: FuncId,
        entry_type: PrimitiveType,
    ) -> Self {
        Self {
            name: name.into(),
            procedures,
            entry,
            entry_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn procedures(&self) -> &[Procedure] {
        &self.procedures
    }

    /// Finds a procedure by its source name
    pub fn procedure(&self, name: &str) -> Option<&Procedure> {
        self.procedures.iter().find(|p| p.name == name)
    }

    pub fn entry(&self) -> FuncId {
        self.entry
    }

    /// The entry procedure
    pub fn entry_procedure(&self) -> Option<&Procedure> {
        self.procedures.iter().find(|p| p.id == self.entry)
    }

    /// The type of the value the entry procedure returns
    pub fn entry_type(&self) -> PrimitiveType {
        self.entry_type
    }

    pub fn into_procedures(self) -> Vec<Procedure> {
        self.procedures
    }
}

impl Display for IrModule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "; module {}", self.name)?;
        for procedure in &self.procedures {
            writeln!(f)?;
            write!(f, "; {}", procedure.name)?;
            if procedure.id == self.entry {
                write!(f, " (entry)")?;
            }
            writeln!(f)?;
            write!(f, "{}", procedure.function)?;
        }
        Ok(())
    }
}
