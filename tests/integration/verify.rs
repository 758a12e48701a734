use ceres::diagnostics::{render_error, LowerError};
use ceres::epilog::FnLowering;
use ceres::ir::builder::FuncBuilder;
use ceres::ir::verify::verify_function;
use ceres::ir::Ty;
use ceres::loc::SourceLoc;
use ceres::span::Span;

fn loc() -> SourceLoc {
    SourceLoc::regular(Span::new(0, 4))
}

#[test]
fn consolidated_function_verifies() {
    let mut fl = FnLowering::new("f", Ty::Int, Span::new(0, 40));
    let entry = fl.builder.create_block();
    fl.builder.switch_to_block(entry);
    fl.prepare_epilog();
    let exit = fl.return_dest().unwrap().block;

    let cond = fl.builder.iconst(1, loc());
    let then_b = fl.builder.create_block();
    let else_b = fl.builder.create_block();
    fl.builder.br_if(cond, then_b, vec![], else_b, vec![], loc());
    fl.builder.switch_to_block(then_b);
    let a = fl.builder.iconst(1, loc());
    fl.builder.jump(exit, vec![a], SourceLoc::explicit_return(Span::new(8, 17)));
    fl.builder.switch_to_block(else_b);
    let b = fl.builder.iconst(2, loc());
    fl.builder.jump(exit, vec![b], SourceLoc::explicit_return(Span::new(20, 29)));
    fl.emit_epilog(SourceLoc::regular(Span::new(0, 40)), false);

    assert!(verify_function(&fl.builder.func).is_ok());
}

#[test]
fn open_ended_block_is_rejected() {
    let mut b = FuncBuilder::new("f", Ty::Unit);
    let entry = b.create_block();
    b.switch_to_block(entry);
    b.iconst(1, loc());

    let err = verify_function(&b.func).unwrap_err();
    assert!(matches!(err, LowerError::Function { .. }));
    assert!(err.to_string().contains("no terminator"));
}

#[test]
fn late_parameter_breaks_branch_arity() {
    let mut b = FuncBuilder::new("f", Ty::Unit);
    let entry = b.create_block();
    let target = b.create_block();
    b.switch_to_block(entry);
    b.jump(target, vec![], loc());

    // The parameter arrived after the branch was built, so the edge now
    // passes too few arguments.
    b.append_block_param(target, Ty::Int);
    b.switch_to_block(target);
    b.unreachable(loc());

    let err = verify_function(&b.func).unwrap_err();
    assert!(err.to_string().contains("0 arguments for 1 parameters"));
}

#[test]
fn branch_argument_type_mismatch_is_rejected() {
    let mut b = FuncBuilder::new("f", Ty::Unit);
    let entry = b.create_block();
    let target = b.create_block();
    b.append_block_param(target, Ty::Float);
    b.switch_to_block(entry);
    let v = b.iconst(3, loc());
    b.jump(target, vec![v], loc());
    b.switch_to_block(target);
    b.unreachable(loc());

    let err = verify_function(&b.func).unwrap_err();
    assert!(err.to_string().contains("passes int for a float parameter"));
}

#[test]
fn return_type_mismatch_is_rejected() {
    let mut b = FuncBuilder::new("f", Ty::Unit);
    let entry = b.create_block();
    b.switch_to_block(entry);
    let v = b.iconst(3, loc());
    b.ret(v, loc());

    let err = verify_function(&b.func).unwrap_err();
    assert!(matches!(err, LowerError::Instruction { .. }));
    assert!(err.to_string().contains("return of int"));
}

#[test]
fn float_branch_condition_is_rejected() {
    let mut b = FuncBuilder::new("f", Ty::Unit);
    let entry = b.create_block();
    let then_b = b.create_block();
    let else_b = b.create_block();
    b.switch_to_block(entry);
    let cond = b.fconst(1.0, loc());
    b.br_if(cond, then_b, vec![], else_b, vec![], loc());
    b.switch_to_block(then_b);
    b.unreachable(loc());
    b.switch_to_block(else_b);
    b.unreachable(loc());

    let err = verify_function(&b.func).unwrap_err();
    assert!(err.to_string().contains("branch condition has type float"));
}

#[test]
fn errors_render_without_panicking() {
    let source = "fn f() {\n    let x = 3\n    return x\n}\n";

    let mut b = FuncBuilder::new("f", Ty::Unit);
    let entry = b.create_block();
    b.switch_to_block(entry);
    let v = b.iconst(3, SourceLoc::regular(Span::new(21, 29)));
    b.ret(v, SourceLoc::regular(Span::new(21, 29)));
    render_error(source, "f.crs", &verify_function(&b.func).unwrap_err());

    let mut b = FuncBuilder::new("f", Ty::Unit);
    let entry = b.create_block();
    b.switch_to_block(entry);
    b.iconst(1, loc());
    render_error(source, "f.crs", &verify_function(&b.func).unwrap_err());
}

#[test]
fn unit_return_of_unit_value_verifies() {
    let mut b = FuncBuilder::new("f", Ty::Unit);
    let entry = b.create_block();
    b.switch_to_block(entry);
    let v = b.unit(loc());
    b.ret(v, loc());

    assert!(verify_function(&b.func).is_ok());
}
