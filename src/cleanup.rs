use crate::ir::Value;
use crate::ir::builder::FuncBuilder;
use crate::loc::SourceLoc;

/// A point in the cleanup stack. Depths recorded earlier compare smaller
/// than depths recorded after more pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CleanupDepth(pub usize);

/// Handle to one registered cleanup, used to deactivate it when the value
/// it guards is consumed before scope exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupHandle(usize);

#[derive(Debug, Clone)]
struct CleanupSlot {
    value: Value,
    active: bool,
}

/// LIFO stack of pending scoped-resource releases. Body lowering pushes a
/// slot per owned value entering scope; epilogue consolidation replays the
/// active slots back down to the function-entry depth, innermost first.
#[derive(Debug, Default)]
pub struct CleanupStack {
    slots: Vec<CleanupSlot>,
}

impl CleanupStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> CleanupDepth {
        CleanupDepth(self.slots.len())
    }

    /// Register a release for `value`.
    pub fn push(&mut self, value: Value) -> CleanupHandle {
        self.slots.push(CleanupSlot { value, active: true });
        CleanupHandle(self.slots.len() - 1)
    }

    /// The value was consumed; its release must not replay.
    pub fn deactivate(&mut self, handle: CleanupHandle) {
        self.slots[handle.0].active = false;
    }

    pub fn is_active(&self, handle: CleanupHandle) -> bool {
        self.slots[handle.0].active
    }

    /// True when any slot at or below `depth` is still active. The epilogue
    /// asserts this is false before replaying: such a slot would belong to a
    /// scope the function never entered.
    pub fn has_active_at_or_below(&self, depth: CleanupDepth) -> bool {
        self.slots[..depth.0].iter().any(|slot| slot.active)
    }

    /// Emit one release per active slot above `depth`, innermost first,
    /// deactivating each as it is emitted.
    pub fn replay_to_depth(
        &mut self,
        builder: &mut FuncBuilder,
        depth: CleanupDepth,
        loc: SourceLoc,
    ) {
        for slot in self.slots[depth.0..].iter_mut().rev() {
            if slot.active {
                builder.release(slot.value, loc);
                slot.active = false;
            }
        }
    }
}
