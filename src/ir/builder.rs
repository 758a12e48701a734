use crate::loc::SourceLoc;

use super::{BlockId, Function, InstData, InstId, InstKind, ScopeId, Ty, Value, ValueOrigin};

/// Insertion state: open at the end of a block, or closed (no valid
/// insertion point, e.g. right after a terminator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Open(BlockId),
    Closed,
}

/// Mutable cursor-carrying view over a `Function`, shared by body lowering
/// and epilogue consolidation. Appending a terminator closes the cursor;
/// appending anything with a closed cursor is a contract violation in the
/// calling pass and panics.
pub struct FuncBuilder {
    pub func: Function,
    cursor: Cursor,
    inserted: Vec<InstId>,
}

impl FuncBuilder {
    pub fn new(name: impl Into<String>, result: Ty) -> Self {
        Self {
            func: Function::new(name, result),
            cursor: Cursor::Closed,
            inserted: Vec::new(),
        }
    }

    // ── Cursor ───────────────────────────────────────────────────────

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn is_open(&self) -> bool {
        matches!(self.cursor, Cursor::Open(_))
    }

    pub fn current_block(&self) -> Option<BlockId> {
        match self.cursor {
            Cursor::Open(b) => Some(b),
            Cursor::Closed => None,
        }
    }

    pub fn switch_to_block(&mut self, b: BlockId) {
        assert!(self.func.is_block_live(b), "switching to an erased block");
        assert!(
            self.func.block(b).terminator.is_none(),
            "switching to an already-terminated block"
        );
        self.cursor = Cursor::Open(b);
    }

    pub fn close(&mut self) {
        self.cursor = Cursor::Closed;
    }

    // ── Blocks ───────────────────────────────────────────────────────

    pub fn create_block(&mut self) -> BlockId {
        self.func.push_block()
    }

    /// Add the block's single parameter. Blocks carry at most one.
    pub fn append_block_param(&mut self, b: BlockId, ty: Ty) -> Value {
        assert!(
            self.func.block(b).params.is_empty(),
            "blocks carry at most one parameter"
        );
        let v = self.func.new_value(ty, ValueOrigin::Param(b));
        self.func.block_mut(b).params.push(v);
        v
    }

    pub fn block_params(&self, b: BlockId) -> &[Value] {
        &self.func.block(b).params
    }

    /// Erase a block from the function. The block must have no remaining
    /// predecessors and must not be under the cursor.
    pub fn erase_block(&mut self, b: BlockId) {
        assert!(self.func.is_block_live(b), "erasing an already-erased block");
        assert!(
            self.func.predecessors(b).is_empty(),
            "erasing a block that still has predecessors"
        );
        assert!(
            self.cursor != Cursor::Open(b),
            "erasing the block under the cursor"
        );
        self.func.tombstone_block(b);
    }

    /// Reposition `b` in the layout, immediately before `before`, or at the
    /// end when `before` is `None`.
    pub fn move_block_before(&mut self, b: BlockId, before: Option<BlockId>) {
        assert!(self.func.is_block_live(b), "moving an erased block");
        self.func.layout_mut().retain(|&x| x != b);
        match before {
            Some(anchor) => {
                let pos = self
                    .func
                    .layout()
                    .iter()
                    .position(|&x| x == anchor)
                    .expect("anchor block not in layout");
                self.func.layout_mut().insert(pos, b);
            }
            None => self.func.layout_mut().push(b),
        }
    }

    /// Mark `b` as the first block of the trailing postmatter section.
    pub fn set_postmatter_start(&mut self, b: BlockId) {
        assert!(self.func.is_block_live(b), "postmatter start must be live");
        self.func.postmatter = Some(b);
    }

    /// Detach and return a block's terminator, leaving the block open-ended.
    pub fn detach_terminator(&mut self, b: BlockId) -> InstData {
        let term = self
            .func
            .block_mut(b)
            .terminator
            .take()
            .expect("block has no terminator to detach");
        self.func.inst(term).clone()
    }

    // ── Instructions ─────────────────────────────────────────────────

    fn append(&mut self, kind: InstKind, loc: SourceLoc) -> InstId {
        let Cursor::Open(b) = self.cursor else {
            panic!("instruction appended with no open insertion point")
        };
        match &kind {
            InstKind::Jump { target, args } => {
                assert_eq!(
                    args.len(),
                    self.func.block(*target).params.len(),
                    "branch argument count does not match target parameters"
                );
            }
            InstKind::BrIf { then_dest, then_args, else_dest, else_args, .. } => {
                assert_eq!(
                    then_args.len(),
                    self.func.block(*then_dest).params.len(),
                    "branch argument count does not match target parameters"
                );
                assert_eq!(
                    else_args.len(),
                    self.func.block(*else_dest).params.len(),
                    "branch argument count does not match target parameters"
                );
            }
            _ => {}
        }
        let is_term = kind.is_terminator();
        let id = self.func.push_inst(InstData { kind, loc, scope: None });
        let block = self.func.block_mut(b);
        if is_term {
            assert!(block.terminator.is_none(), "block already terminated");
            block.terminator = Some(id);
            self.cursor = Cursor::Closed;
        } else {
            block.insts.push(id);
        }
        self.inserted.push(id);
        id
    }

    pub fn iconst(&mut self, n: i64, loc: SourceLoc) -> Value {
        let id = self.append(InstKind::IConst(n), loc);
        self.func.new_value(Ty::Int, ValueOrigin::Result(id))
    }

    pub fn fconst(&mut self, n: f64, loc: SourceLoc) -> Value {
        let id = self.append(InstKind::FConst(n), loc);
        self.func.new_value(Ty::Float, ValueOrigin::Result(id))
    }

    pub fn unit(&mut self, loc: SourceLoc) -> Value {
        let id = self.append(InstKind::UnitConst, loc);
        self.func.new_value(Ty::Unit, ValueOrigin::Result(id))
    }

    pub fn release(&mut self, value: Value, loc: SourceLoc) {
        self.append(InstKind::Release(value), loc);
    }

    pub fn jump(&mut self, target: BlockId, args: Vec<Value>, loc: SourceLoc) {
        self.append(InstKind::Jump { target, args }, loc);
    }

    pub fn br_if(
        &mut self,
        cond: Value,
        then_dest: BlockId,
        then_args: Vec<Value>,
        else_dest: BlockId,
        else_args: Vec<Value>,
        loc: SourceLoc,
    ) {
        self.append(
            InstKind::BrIf { cond, then_dest, then_args, else_dest, else_args },
            loc,
        );
    }

    pub fn ret(&mut self, value: Value, loc: SourceLoc) {
        self.append(InstKind::Return(value), loc);
    }

    pub fn unreachable(&mut self, loc: SourceLoc) {
        self.append(InstKind::Unreachable, loc);
    }

    // ── Debug scopes ─────────────────────────────────────────────────

    /// Attach `scope` to every instruction this builder inserted that does
    /// not carry a scope yet.
    pub fn assign_scope_to_unscoped(&mut self, scope: ScopeId) {
        for &id in &self.inserted {
            let inst = self.func.inst_mut(id);
            if inst.scope.is_none() {
                inst.scope = Some(scope);
            }
        }
    }
}
