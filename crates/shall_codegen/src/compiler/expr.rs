use super::frame::FunctionFrame;
use super::{Compiler, LowerError, LowerErrorKind, LowerResult, Storage};
use cranelift::prelude::types::I32;
use cranelift::prelude::*;
use cranelift_module::Module;
use shall_ast::expr::{Expr, ExprKind, Identifier, InfixOp};
use shall_tokens::spanned::Spanned;
use shall_tokens::types::PrimitiveType;
use tracing::trace;

impl<M: Module> Compiler<'_, M> {
    /// Lowers an expression, producing its value and type
    pub(super) fn lower_expr(
        &mut self,
        frame: &mut FunctionFrame,
        expr: &Expr,
    ) -> LowerResult<(Value, PrimitiveType)> {
        trace!("lowering {} expression", <&'static str>::from(&expr.kind));
        match &expr.kind {
            ExprKind::Integer(value) => {
                let value = i32::try_from(*value).map_err(|_| {
                    LowerError::new(LowerErrorKind::IntegerOutOfRange(*value), expr.span())
                })?;
                Ok((
                    frame.builder.ins().iconst(I32, i64::from(value)),
                    PrimitiveType::Int,
                ))
            }
            ExprKind::Double(value) => {
                Ok((frame.builder.ins().f64const(*value), PrimitiveType::Double))
            }
            ExprKind::Identifier(identifier) => self.lower_identifier(frame, identifier),
            ExprKind::Infix { left, op, right } => {
                let (left_value, left_ty) = self.lower_expr(frame, left)?;
                let (right_value, right_ty) = self.lower_expr(frame, right)?;
                if left_ty != right_ty {
                    return Err(LowerError::new(
                        LowerErrorKind::OperandTypeMismatch {
                            op: *op,
                            left: left_ty,
                            right: right_ty,
                        },
                        expr.span(),
                    ));
                }
                let value = lower_infix(frame, *op, left_ty, left_value, right_value)
                    .map_err(|kind| LowerError::new(kind, expr.span()))?;
                Ok((value, left_ty))
            }
        }
    }

    fn lower_identifier(
        &mut self,
        frame: &mut FunctionFrame,
        identifier: &Identifier,
    ) -> LowerResult<(Value, PrimitiveType)> {
        let name = identifier.as_str();
        let Some((scope, binding)) = self.environment.resolve(frame.scope, name) else {
            return Err(LowerError::new(
                LowerErrorKind::UnresolvedIdentifier(name.to_string()),
                identifier.span(),
            ));
        };
        trace!("resolved {name} in {}", self.environment.name(scope));
        match binding.storage {
            Storage::Variable {
                variable,
                procedure,
            } if procedure == frame.procedure => Ok((frame.builder.use_var(variable), binding.ty)),
            Storage::Variable { .. } => Err(LowerError::new(
                LowerErrorKind::CapturedVariable(name.to_string()),
                identifier.span(),
            )),
            Storage::Procedure(_) => Err(LowerError::new(
                LowerErrorKind::NotAValue(name.to_string()),
                identifier.span(),
            )),
        }
    }
}

/// Emits the instruction for `op` on two operands of type `ty`
fn lower_infix(
    frame: &mut FunctionFrame,
    op: InfixOp,
    ty: PrimitiveType,
    a: Value,
    b: Value,
) -> Result<Value, LowerErrorKind> {
    let ins = frame.builder.ins();
    let value = match (ty, op) {
        (PrimitiveType::Int, InfixOp::Add) => ins.iadd(a, b),
        (PrimitiveType::Int, InfixOp::Sub) => ins.isub(a, b),
        (PrimitiveType::Int, InfixOp::Mul) => ins.imul(a, b),
        (PrimitiveType::Int, InfixOp::Div) => ins.sdiv(a, b),
        (PrimitiveType::Int, InfixOp::Rem) => ins.srem(a, b),
        (PrimitiveType::Double, InfixOp::Add) => ins.fadd(a, b),
        (PrimitiveType::Double, InfixOp::Sub) => ins.fsub(a, b),
        (PrimitiveType::Double, InfixOp::Mul) => ins.fmul(a, b),
        (PrimitiveType::Double, InfixOp::Div) => ins.fdiv(a, b),
        (PrimitiveType::Double, InfixOp::Rem) => {
            // a - trunc(a / b) * b, the remainder takes the sign of the dividend
            let quotient = ins.fdiv(a, b);
            let truncated = frame.builder.ins().trunc(quotient);
            let product = frame.builder.ins().fmul(truncated, b);
            frame.builder.ins().fsub(a, product)
        }
        (ty, InfixOp::Pow) => return Err(LowerErrorKind::UnsupportedOperator { op, ty }),
    };
    Ok(value)
}
