use crate::diagnostics::LowerError;
use crate::span::Span;

use super::{BlockId, Function, InstKind, Ty, Value};

/// Structural integrity checks for a fully-lowered function. Returns the
/// first violation found. Runs after epilogue consolidation; a function
/// still under construction (open-ended blocks) will not pass.
pub fn verify_function(func: &Function) -> Result<(), LowerError> {
    for &b in func.layout() {
        let block = func.block(b);

        if block.params.len() > 1 {
            return Err(LowerError::function(format!(
                "{b} carries {} parameters; blocks carry at most one",
                block.params.len()
            )));
        }

        let Some(term) = block.terminator else {
            return Err(LowerError::function(format!("{b} has no terminator")));
        };

        for id in block.insts.iter().copied().chain(std::iter::once(term)) {
            let inst = func.inst(id);
            let span = inst.loc.span;
            let in_body = Some(id) != block.terminator;

            if in_body && inst.kind.is_terminator() {
                return Err(LowerError::instruction(
                    format!("terminator in the middle of {b}"),
                    span,
                ));
            }
            if !in_body && !inst.kind.is_terminator() {
                return Err(LowerError::instruction(
                    format!("{b} ends in a non-terminator"),
                    span,
                ));
            }

            match &inst.kind {
                InstKind::IConst(_) | InstKind::FConst(_) | InstKind::UnitConst => {}
                InstKind::Unreachable => {}
                InstKind::Release(v) => check_value(func, *v, span)?,
                InstKind::Jump { target, args } => {
                    check_branch(func, *target, args, span)?;
                }
                InstKind::BrIf { cond, then_dest, then_args, else_dest, else_args } => {
                    check_value(func, *cond, span)?;
                    let cond_ty = func.value_ty(*cond);
                    if cond_ty != Ty::Bool && cond_ty != Ty::Int {
                        return Err(LowerError::instruction(
                            format!("branch condition has type {cond_ty}"),
                            span,
                        ));
                    }
                    check_branch(func, *then_dest, then_args, span)?;
                    check_branch(func, *else_dest, else_args, span)?;
                }
                InstKind::Return(v) => {
                    check_value(func, *v, span)?;
                    // Address-only results travel through memory; the
                    // terminator itself returns unit for them.
                    let want = if func.result.is_unit() || func.result.is_address_only() {
                        Ty::Unit
                    } else {
                        func.result
                    };
                    let got = func.value_ty(*v);
                    if got != want {
                        return Err(LowerError::instruction(
                            format!("return of {got} from a function producing {want}"),
                            span,
                        ));
                    }
                }
            }
        }
    }
    Ok(())
}

fn check_value(func: &Function, v: Value, span: Span) -> Result<(), LowerError> {
    if (v.0 as usize) >= func.num_values() {
        return Err(LowerError::instruction(format!("{v} does not exist"), span));
    }
    Ok(())
}

fn check_branch(
    func: &Function,
    target: BlockId,
    args: &[Value],
    span: Span,
) -> Result<(), LowerError> {
    if !func.is_block_live(target) {
        return Err(LowerError::instruction(
            format!("branch to erased block {target}"),
            span,
        ));
    }
    let params = &func.block(target).params;
    if args.len() != params.len() {
        return Err(LowerError::instruction(
            format!(
                "branch to {target} passes {} arguments for {} parameters",
                args.len(),
                params.len()
            ),
            span,
        ));
    }
    for (arg, param) in args.iter().zip(params) {
        check_value(func, *arg, span)?;
        let got = func.value_ty(*arg);
        let want = func.value_ty(*param);
        if got != want {
            return Err(LowerError::instruction(
                format!("branch to {target} passes {got} for a {want} parameter"),
                span,
            ));
        }
    }
    Ok(())
}
