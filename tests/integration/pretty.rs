use ceres::epilog::FnLowering;
use ceres::ir::Ty;
use ceres::loc::SourceLoc;
use ceres::pretty::print_function;
use ceres::span::Span;

fn loc() -> SourceLoc {
    SourceLoc::regular(Span::new(0, 4))
}

#[test]
fn merged_returns_print_with_retained_exit() {
    let mut fl = FnLowering::new("merge", Ty::Int, Span::new(0, 60));
    let entry = fl.builder.create_block();
    fl.builder.switch_to_block(entry);
    fl.prepare_epilog();
    let exit = fl.return_dest().unwrap().block;

    let r = fl.builder.iconst(7, loc());
    fl.cleanups.push(r);
    let cond = fl.builder.iconst(1, loc());
    let then_b = fl.builder.create_block();
    let else_b = fl.builder.create_block();
    fl.builder.br_if(cond, then_b, vec![], else_b, vec![], loc());

    fl.builder.switch_to_block(then_b);
    let a = fl.builder.iconst(10, loc());
    fl.builder.jump(exit, vec![a], SourceLoc::explicit_return(Span::new(10, 19)));

    fl.builder.switch_to_block(else_b);
    let b = fl.builder.iconst(20, loc());
    fl.builder.jump(exit, vec![b], SourceLoc::explicit_return(Span::new(30, 39)));

    fl.emit_epilog(SourceLoc::regular(Span::new(0, 60)), false);

    insta::assert_snapshot!(print_function(&fl.builder.func).trim_end(), @r"
    fn merge() -> int {
    bb0:
        v1 = iconst 7
        v2 = iconst 1
        br_if v2, bb2, bb3
    bb2:
        v3 = iconst 10
        jump bb1(v3)
    bb3:
        v4 = iconst 20
        jump bb1(v4)
    bb1(v0: int):
        release v1
        return v0
    }
    ");
}

#[test]
fn postmatter_block_is_annotated() {
    let mut fl = FnLowering::new("landing", Ty::Unit, Span::new(0, 40));
    let entry = fl.builder.create_block();
    fl.builder.switch_to_block(entry);
    fl.prepare_epilog();
    let exit = fl.return_dest().unwrap().block;

    let cond = fl.builder.iconst(1, loc());
    let ret_b = fl.builder.create_block();
    let fall_b = fl.builder.create_block();
    fl.builder.br_if(cond, ret_b, vec![], fall_b, vec![], loc());

    fl.builder.switch_to_block(ret_b);
    fl.builder.jump(exit, vec![], SourceLoc::explicit_return(Span::new(10, 16)));

    let pm = fl.builder.create_block();
    fl.builder.set_postmatter_start(pm);
    fl.builder.switch_to_block(pm);
    fl.builder.unreachable(loc());

    fl.builder.switch_to_block(fall_b);
    fl.emit_epilog(SourceLoc::regular(Span::new(0, 40)), false);

    insta::assert_snapshot!(print_function(&fl.builder.func).trim_end(), @r"
    fn landing() -> unit {
    bb0:
        v0 = iconst 1
        br_if v0, bb2, bb3
    bb2:
        jump bb1
    bb3:
        jump bb1
    bb1:
        v1 = unit
        return v1
    bb4:    ; postmatter
        unreachable
    }
    ");
}
