use super::frame::FunctionFrame;
use super::{resolve_type, Binding, Compiler, LowerError, LowerErrorKind, LowerResult, Storage};
use cranelift::prelude::*;
use cranelift_module::Module;
use shall_ast::expr::Expr;
use shall_ast::statements::{AssignStmt, ShallStmt};
use shall_ast::{Stmt, StmtKind};
use shall_tokens::spanned::{Span, Spanned};
use tracing::trace;

impl<M: Module> Compiler<'_, M> {
    pub(super) fn lower_stmt(&mut self, frame: &mut FunctionFrame, stmt: &Stmt) -> LowerResult<()> {
        if frame.terminated {
            return Err(LowerError::new(
                LowerErrorKind::UnreachableStatement,
                stmt.span(),
            ));
        }
        trace!(
            "lowering {} statement in {}",
            <&'static str>::from(&stmt.kind),
            frame.name
        );
        match &stmt.kind {
            StmtKind::Expression(expr) => {
                self.lower_expr(frame, expr)?;
            }
            StmtKind::Shall(shall) => self.lower_shall(frame, shall)?,
            StmtKind::Assign(assign) => self.lower_assign(frame, assign)?,
            StmtKind::Function(function) => {
                self.lower_function(frame.scope, function, &[])?;
            }
            StmtKind::Block(block) => {
                for stmt in &block.statements {
                    self.lower_stmt(frame, stmt)?;
                }
            }
            StmtKind::Return(value) => self.lower_return(frame, value, stmt.span())?,
        }
        Ok(())
    }

    /// Declares a variable in the current scope, or overwrites the one already declared there.
    fn lower_shall(&mut self, frame: &mut FunctionFrame, shall: &ShallStmt) -> LowerResult<()> {
        let declared = resolve_type(&shall.ty)?;
        let (value, ty) = self.lower_expr(frame, &shall.value)?;
        if ty != declared {
            return Err(LowerError::new(
                LowerErrorKind::TypeMismatch {
                    expected: declared,
                    found: ty,
                },
                shall.value.span(),
            ));
        }

        let name = shall.name.as_str();
        match self.environment.lookup_local(frame.scope, name).copied() {
            None => {
                let variable = frame.declare_variable(declared);
                frame.builder.def_var(variable, value);
                self.environment.define(
                    frame.scope,
                    name,
                    Binding {
                        storage: Storage::Variable {
                            variable,
                            procedure: frame.procedure,
                        },
                        ty: declared,
                        span: shall.name.span(),
                    },
                );
                trace!("declared {name}: {declared} as {variable}");
            }
            Some(existing) => {
                let variable = self.writable_variable(frame, name, existing, shall.name.span())?;
                if existing.ty != declared {
                    return Err(LowerError::new(
                        LowerErrorKind::TypeMismatch {
                            expected: existing.ty,
                            found: declared,
                        },
                        shall.ty.span(),
                    ));
                }
                frame.builder.def_var(variable, value);
                trace!("redeclared {name}: {declared}");
            }
        }
        Ok(())
    }

    /// Overwrites a variable visible from the current scope
    fn lower_assign(&mut self, frame: &mut FunctionFrame, assign: &AssignStmt) -> LowerResult<()> {
        let name = assign.target.as_str();
        let Some((_, binding)) = self.environment.resolve(frame.scope, name) else {
            return Err(LowerError::new(
                LowerErrorKind::UnresolvedIdentifier(name.to_string()),
                assign.target.span(),
            ));
        };
        let binding = *binding;
        let variable = self.writable_variable(frame, name, binding, assign.target.span())?;
        let (value, ty) = self.lower_expr(frame, &assign.value)?;
        if ty != binding.ty {
            return Err(LowerError::new(
                LowerErrorKind::TypeMismatch {
                    expected: binding.ty,
                    found: ty,
                },
                assign.value.span(),
            ));
        }
        frame.builder.def_var(variable, value);
        Ok(())
    }

    fn writable_variable(
        &self,
        frame: &FunctionFrame,
        name: &str,
        binding: Binding,
        span: Span,
    ) -> LowerResult<Variable> {
        match binding.storage {
            Storage::Variable {
                variable,
                procedure,
            } if procedure == frame.procedure => Ok(variable),
            Storage::Variable { .. } => Err(LowerError::new(
                LowerErrorKind::CapturedVariable(name.to_string()),
                span,
            )),
            Storage::Procedure(_) => Err(LowerError::new(
                LowerErrorKind::NotAVariable(name.to_string()),
                span,
            )),
        }
    }

    fn lower_return(
        &mut self,
        frame: &mut FunctionFrame,
        value: &Expr,
        span: Span,
    ) -> LowerResult<()> {
        let expected = match frame.return_ty {
            Some(ty) if frame.scope != self.environment.global() => ty,
            _ => {
                return Err(LowerError::new(
                    LowerErrorKind::ReturnOutsideFunction,
                    span,
                ))
            }
        };
        let (value, ty) = self.lower_expr(frame, value)?;
        if ty != expected {
            return Err(LowerError::new(
                LowerErrorKind::TypeMismatch {
                    expected,
                    found: ty,
                },
                span,
            ));
        }
        frame.builder.ins().return_(&[value]);
        frame.terminated = true;
        Ok(())
    }
}
