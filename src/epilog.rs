use crate::cleanup::{CleanupDepth, CleanupStack};
use crate::ir::builder::FuncBuilder;
use crate::ir::{BlockId, InstKind, ScopeId, Ty, Value};
use crate::loc::SourceLoc;
use crate::span::Span;

/// Where branches that leave the function land: the canonical exit block,
/// plus the cleanup depth that was current when it was prepared.
#[derive(Debug, Clone, Copy)]
pub struct ExitDest {
    pub block: BlockId,
    pub depth: CleanupDepth,
}

/// Outcome of consolidating the epilogue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExitPath {
    /// No path reaches the exit; the caller emits no terminator.
    Unreachable,
    /// The exit is live. `value` is the consolidated return value, if the
    /// function produces one by value; `loc` is the location the return
    /// terminator must carry.
    Reachable { value: Option<Value>, loc: SourceLoc },
}

/// Per-function lowering context. Created once at the start of a function's
/// lowering; owns the builder, the cleanup stack, and the function's main
/// debug scope, and drives epilogue consolidation at the end.
///
/// Protocol, in order: `prepare_epilog` once before body lowering, then the
/// body branches to `return_dest()` for every `return`, then `emit_epilog`
/// once. Violating the order is a bug in the calling pass and panics.
pub struct FnLowering {
    pub builder: FuncBuilder,
    pub cleanups: CleanupStack,
    exit: Option<ExitDest>,
    needs_return: bool,
    main_scope: ScopeId,
}

impl FnLowering {
    pub fn new(name: impl Into<String>, result: Ty, span: Span) -> Self {
        let mut builder = FuncBuilder::new(name, result);
        let main_scope = builder.func.new_scope(span);
        Self {
            builder,
            cleanups: CleanupStack::new(),
            exit: None,
            needs_return: false,
            main_scope,
        }
    }

    pub fn main_scope(&self) -> ScopeId {
        self.main_scope
    }

    /// The prepared exit destination, for body lowering to branch to.
    pub fn return_dest(&self) -> Option<ExitDest> {
        self.exit
    }

    /// Allocate the canonical exit block. If the function returns a non-unit
    /// value by value, the block receives one parameter to carry it;
    /// address-only results travel through memory and get none. Records the
    /// cleanup depth current at this point.
    pub fn prepare_epilog(&mut self) {
        assert!(self.exit.is_none(), "epilogue already prepared");
        let exit_block = self.builder.create_block();
        let result = self.builder.func.result;
        self.needs_return = !result.is_unit();
        if self.needs_return && !result.is_address_only() {
            self.builder.append_block_param(exit_block, result);
        }
        self.exit = Some(ExitDest { block: exit_block, depth: self.cleanups.depth() });
    }

    /// Rewrite the CFG so the function has a single exit point, then replay
    /// pending cleanups along it. Consumes the exit destination.
    pub fn consolidate_epilog(&mut self, top_level: SourceLoc) -> ExitPath {
        let dest = self.exit.take().expect("consolidate_epilog before prepare_epilog");
        let exit_block = dest.block;
        let implicit_ret = SourceLoc::implicit_return_from(top_level);

        // A value-returning function cannot fall off the end of its body.
        // If the cursor is still open there, the spot is unreachable at
        // runtime; encode that structurally before looking at predecessors.
        if self.needs_return && self.builder.is_open() {
            self.builder.unreachable(implicit_ret);
        }

        let preds = self.builder.func.predecessors(exit_block);
        let value: Option<Value>;
        let ret_loc: SourceLoc;

        if preds.is_empty() {
            // Never branched to: kill the exit block and continue at the
            // cursor, if there still is one.
            let had_param = !self.builder.func.block(exit_block).params.is_empty();
            self.builder.erase_block(exit_block);
            if !self.builder.is_open() {
                return ExitPath::Unreachable;
            }
            assert!(
                !had_param,
                "value-carrying exit block was never branched to, yet the body falls through"
            );
            value = None;
            ret_loc = implicit_ret;
        } else if preds.len() == 1 && !self.builder.is_open() {
            // A single return path and nothing to fall through from: weld
            // the epilogue onto that predecessor.
            let pred = preds[0];
            let needs_arg = !self.builder.func.block(exit_block).params.is_empty();
            let branch = self.builder.detach_terminator(pred);
            let args = match branch.kind {
                InstKind::Jump { target, args } => {
                    assert_eq!(target, exit_block, "detached the wrong branch");
                    args
                }
                _ => panic!("exit predecessor must branch unconditionally"),
            };
            assert_eq!(
                args.len(),
                usize::from(needs_arg),
                "exit predecessor arguments do not match block parameters"
            );
            value = needs_arg.then(|| args[0]);
            ret_loc = if branch.loc.is_explicit_return() {
                branch.loc
            } else {
                implicit_ret
            };
            self.builder.erase_block(exit_block);
            self.builder.switch_to_block(pred);
        } else {
            // Multiple return paths, or one plus a live fall-through: the
            // exit block stays. Keep it in front of the postmatter section.
            let postmatter = self.builder.func.postmatter;
            self.builder.move_block_before(exit_block, postmatter);
            value = self.builder.func.block(exit_block).params.first().copied();
            if self.builder.is_open() {
                self.builder.jump(exit_block, Vec::new(), implicit_ret);
            }
            self.builder.switch_to_block(exit_block);
            ret_loc = implicit_ret;
        }

        // Replay what the body left pending, down to the depth recorded at
        // prepare time. Anything active at or below that depth belongs to a
        // scope this function never entered.
        assert!(
            !self.cleanups.has_active_at_or_below(dest.depth),
            "active cleanups at or below the function-entry depth at consolidation time"
        );
        let cleanup_loc = SourceLoc::cleanup_from(top_level);
        self.cleanups.replay_to_depth(&mut self.builder, dest.depth, cleanup_loc);

        ExitPath::Reachable { value, loc: ret_loc }
    }

    /// Consolidate and emit the return terminator, or do nothing when the
    /// exit is unreachable. `auto_gen` marks the location as synthesized,
    /// for returns the compiler inserted on the user's behalf.
    pub fn emit_epilog(&mut self, top_level: SourceLoc, auto_gen: bool) {
        let top_level = if auto_gen {
            top_level.mark_auto_generated()
        } else {
            top_level
        };

        let (value, ret_loc) = match self.consolidate_epilog(top_level) {
            ExitPath::Unreachable => return,
            ExitPath::Reachable { value, loc } => (value, loc),
        };

        // Unit functions and address-only results return the unit value.
        let ret_val = match value {
            Some(v) => v,
            None => self.builder.unit(SourceLoc::cleanup_from(top_level)),
        };
        self.builder.ret(ret_val, ret_loc);

        self.builder.assign_scope_to_unscoped(self.main_scope);
    }
}
