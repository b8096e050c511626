use crate::environment::ScopeId;
use crate::types::ir_type;
use cranelift::prelude::*;
use shall_tokens::types::PrimitiveType;

/// Identifies a procedure within one compilation, before it has been declared in a module.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ProcedureId(pub(crate) usize);

/// The state of a procedure under construction.
///
/// Nested function definitions get a frame of their own, so the enclosing frame is untouched
/// while they're lowered.
pub(crate) struct FunctionFrame<'f> {
    pub builder: FunctionBuilder<'f>,
    pub name: String,
    pub procedure: ProcedureId,
    pub scope: ScopeId,
    /// `None` when the procedure can't be returned from explicitly
    pub return_ty: Option<PrimitiveType>,
    pub terminated: bool,
    params: Vec<Value>,
    next_variable: usize,
}

impl<'f> FunctionFrame<'f> {
    /// Creates the entry block and switches to it
    pub fn new(
        mut builder: FunctionBuilder<'f>,
        name: impl Into<String>,
        procedure: ProcedureId,
        scope: ScopeId,
        return_ty: Option<PrimitiveType>,
    ) -> Self {
        let entry_block = builder.create_block();
        builder.append_block_params_for_function_params(entry_block);
        builder.switch_to_block(entry_block);
        builder.seal_block(entry_block);
        let params = builder.block_params(entry_block).to_vec();
        Self {
            builder,
            name: name.into(),
            procedure,
            scope,
            return_ty,
            terminated: false,
            params,
            next_variable: 0,
        }
    }

    /// The values of the function parameters, in order
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Declares a fresh variable of the given type
    pub fn declare_variable(&mut self, ty: PrimitiveType) -> Variable {
        let variable = Variable::new(self.next_variable);
        self.next_variable += 1;
        self.builder.declare_var(variable, ir_type(ty));
        variable
    }

    pub fn finish(self) {
        self.builder.finalize();
    }
}
