//! Responsible with lowering a [Program] into an [IrModule]

use crate::environment::{Environment, ScopeId};
use crate::ir_module::{IrModule, Procedure};
use crate::types::abi_param;
use cranelift::codegen::ir::{Function, UserFuncName};
use cranelift::prelude::types::I32;
use cranelift::prelude::*;
use cranelift_module::{FuncId, Linkage, Module};
use frame::FunctionFrame;
use itertools::Itertools;
use shall_ast::statements::{FunctionStmt, Parameter};
use shall_ast::{Identifier, Program, Stmt, StmtKind, TypeName};
use shall_tokens::spanned::{Span, Spanned};
use shall_tokens::types::PrimitiveType;
use std::collections::HashMap;
use tracing::{debug, instrument, trace};

mod error;
mod expr;
mod frame;
mod stmt;

pub use error::{LowerError, LowerErrorKind, LowerResult};
pub use frame::ProcedureId;

/// Settings used for configuring a [Compiler]
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// The name of the entry procedure
    pub entry_name: String,
    /// What the synthesized entry returns when the program has no expression statements
    pub exit_sentinel: i32,
    pub module_name: String,
}

impl CompilerOptions {
    /// Creates options with default settings
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry_name(mut self, name: impl Into<String>) -> Self {
        self.entry_name = name.into();
        self
    }

    pub fn exit_sentinel(mut self, value: i32) -> Self {
        self.exit_sentinel = value;
        self
    }

    pub fn module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            entry_name: "main".to_string(),
            exit_sentinel: 69,
            module_name: "shall".to_string(),
        }
    }
}

/// What a name is bound to
#[derive(Debug, Copy, Clone)]
pub struct Binding {
    pub storage: Storage,
    pub ty: PrimitiveType,
    /// Where the binding was introduced
    pub span: Span,
}

/// Where a binding's value lives
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Storage {
    /// A variable, only readable from the procedure that declared it
    Variable {
        variable: Variable,
        procedure: ProcedureId,
    },
    /// A function's binding of its own name. The type of the binding is the return type.
    Procedure(FuncId),
}

/// Lowers programs into cranelift ir, declaring every procedure in the given module.
///
/// A program that defines a function named after the entry uses that function as its entry, with
/// the rest of the top level run before its body. Otherwise an entry is synthesized from the top
/// level, returning the value of the last expression statement.
pub struct Compiler<'m, M: Module> {
    module: &'m mut M,
    options: CompilerOptions,
    environment: Environment<Binding>,
    procedures: Vec<Procedure>,
    /// Every procedure name declared so far, with where it was defined
    procedure_names: HashMap<String, Span>,
    next_procedure: usize,
}

impl<'m, M: Module> Compiler<'m, M> {
    /// Creates a compiler with default options
    pub fn new(module: &'m mut M) -> Self {
        Self::with_options(module, CompilerOptions::default())
    }

    pub fn with_options(module: &'m mut M, options: CompilerOptions) -> Self {
        Self {
            module,
            options,
            environment: Environment::new(),
            procedures: vec![],
            procedure_names: HashMap::new(),
            next_procedure: 0,
        }
    }

    /// Lowers a whole program. The first error stops the compilation.
    #[instrument(skip_all, fields(module = %self.options.module_name))]
    pub fn compile(mut self, program: &Program) -> LowerResult<IrModule> {
        let entry_name = self.options.entry_name.clone();
        let explicit_entry = program
            .statements
            .iter()
            .find_map(|stmt| match &stmt.kind {
                StmtKind::Function(function) if function.name.as_str() == entry_name => {
                    Some((stmt, function))
                }
                _ => None,
            });

        let (entry, entry_type) = match explicit_entry {
            Some((stmt, function)) => self.compile_explicit_entry(program, stmt, function)?,
            None => self.compile_implicit_entry(program)?,
        };
        debug!(
            "lowered procedures: {}",
            self.procedures.iter().map(|p| p.name()).join(", ")
        );
        Ok(IrModule::new(
            self.options.module_name,
            self.procedures,
            entry,
            entry_type,
        ))
    }

    fn compile_explicit_entry(
        &mut self,
        program: &Program,
        entry_stmt: &Stmt,
        entry: &FunctionStmt,
    ) -> LowerResult<(FuncId, PrimitiveType)> {
        if let Some(parameter) = entry.parameters.first() {
            return Err(LowerError::new(
                LowerErrorKind::InvalidEntry {
                    name: entry.name.name.clone(),
                    reason: "the entry function can not take parameters".to_string(),
                },
                parameter.name.span(),
            ));
        }
        let entry_type = resolve_type(&entry.return_type)?;
        let prologue = program
            .statements
            .iter()
            .filter(|stmt| !std::ptr::eq(*stmt, entry_stmt))
            .collect::<Vec<_>>();
        let global = self.environment.global();
        let id = self.lower_function(global, entry, &prologue)?;
        Ok((id, entry_type))
    }

    fn compile_implicit_entry(&mut self, program: &Program) -> LowerResult<(FuncId, PrimitiveType)> {
        let name = self.options.entry_name.clone();
        debug!("synthesizing entry procedure {name:?}");
        let mut function =
            Function::with_name_signature(UserFuncName::default(), self.module.make_signature());
        let mut context = FunctionBuilderContext::new();
        let procedure = self.next_procedure_id();
        let global = self.environment.global();
        let mut frame = FunctionFrame::new(
            FunctionBuilder::new(&mut function, &mut context),
            name.as_str(),
            procedure,
            global,
            None,
        );

        let mut last = None;
        for stmt in &program.statements {
            match &stmt.kind {
                StmtKind::Expression(expr) => last = Some(self.lower_expr(&mut frame, expr)?),
                _ => self.lower_stmt(&mut frame, stmt)?,
            }
        }
        let (value, entry_type) = match last {
            Some(last) => last,
            None => {
                let sentinel = frame
                    .builder
                    .ins()
                    .iconst(I32, i64::from(self.options.exit_sentinel));
                (sentinel, PrimitiveType::Int)
            }
        };
        frame
            .builder
            .func
            .signature
            .returns
            .push(abi_param(entry_type));
        frame.builder.ins().return_(&[value]);
        frame.finish();

        if let Some(&nested) = self.procedure_names.get(&name) {
            return Err(LowerError::new(
                LowerErrorKind::InvalidEntry {
                    name,
                    reason: "the entry function must be defined at the top level".to_string(),
                },
                nested,
            ));
        }
        let id = self
            .module
            .declare_function(&name, Linkage::Export, &function.signature)?;
        function.name = UserFuncName::user(0, id.as_u32());
        trace!("{}", function.display());
        self.procedures.push(Procedure::new(name, id, function));
        Ok((id, entry_type))
    }

    /// Lowers a function definition into a procedure of its own, returning its id.
    ///
    /// `prologue` is lowered into the new procedure in the enclosing scope, before the body.
    fn lower_function(
        &mut self,
        enclosing: ScopeId,
        function: &FunctionStmt,
        prologue: &[&Stmt],
    ) -> LowerResult<FuncId> {
        let name = function.name.as_str();
        if self
            .procedure_names
            .insert(name.to_string(), function.name.span())
            .is_some()
        {
            return Err(LowerError::new(
                LowerErrorKind::DuplicateProcedure(name.to_string()),
                function.name.span(),
            ));
        }

        let return_ty = resolve_type(&function.return_type)?;
        let parameters = function
            .parameters
            .iter()
            .map(|Parameter { name, ty }| resolve_type(ty).map(|ty| (name, ty)))
            .collect::<LowerResult<Vec<_>>>()?;

        let mut signature = self.module.make_signature();
        signature
            .params
            .extend(parameters.iter().map(|(_, ty)| abi_param(*ty)));
        signature.returns.push(abi_param(return_ty));
        let id = self
            .module
            .declare_function(name, Linkage::Export, &signature)
            .map_err(|e| LowerError::new(e, function.name.span()))?;
        debug!("lowering function {name} as {id}");

        let mut func = Function::with_name_signature(UserFuncName::user(0, id.as_u32()), signature);
        let mut context = FunctionBuilderContext::new();
        let procedure = self.next_procedure_id();
        let mut frame = FunctionFrame::new(
            FunctionBuilder::new(&mut func, &mut context),
            name,
            procedure,
            enclosing,
            Some(return_ty),
        );

        for stmt in prologue {
            self.lower_stmt(&mut frame, stmt)?;
        }

        let scope = self.environment.push_scope(enclosing, name);
        frame.scope = scope;
        let result = self.lower_function_body(&mut frame, id, function, &parameters, return_ty);
        self.environment.retire(scope);
        result?;

        frame.finish();
        trace!("{}", func.display());
        self.procedures.push(Procedure::new(name, id, func));
        Ok(id)
    }

    fn lower_function_body(
        &mut self,
        frame: &mut FunctionFrame,
        id: FuncId,
        function: &FunctionStmt,
        parameters: &[(&Identifier, PrimitiveType)],
        return_ty: PrimitiveType,
    ) -> LowerResult<()> {
        self.environment.define(
            frame.scope,
            function.name.as_str(),
            Binding {
                storage: Storage::Procedure(id),
                ty: return_ty,
                span: function.name.span(),
            },
        );
        let params = frame.params().to_vec();
        for ((name, ty), value) in parameters.iter().zip(params) {
            let variable = frame.declare_variable(*ty);
            frame.builder.def_var(variable, value);
            self.environment.define(
                frame.scope,
                name.as_str(),
                Binding {
                    storage: Storage::Variable {
                        variable,
                        procedure: frame.procedure,
                    },
                    ty: *ty,
                    span: name.span(),
                },
            );
        }

        for stmt in &function.body.statements {
            self.lower_stmt(frame, stmt)?;
        }
        if !frame.terminated {
            return Err(LowerError::new(
                LowerErrorKind::MissingReturn(function.name.name.clone()),
                function.body.span(),
            ));
        }
        Ok(())
    }

    fn next_procedure_id(&mut self) -> ProcedureId {
        let id = ProcedureId(self.next_procedure);
        self.next_procedure += 1;
        id
    }
}

/// Resolves a type annotation against the primitive types
fn resolve_type(name: &TypeName) -> LowerResult<PrimitiveType> {
    PrimitiveType::lookup(&name.name).ok_or_else(|| {
        LowerError::new(LowerErrorKind::UnknownType(name.name.clone()), name.span())
    })
}
