use crate::error::OpListClosed;
use crate::ops::{merge_ops, DrawOp};
use crate::target::TargetId;

use slotmap::new_key_type;

new_key_type! {
    /// Handle to an [`OpList`] owned by the drawing manager.
    pub struct OpListId;
}

/// Lifecycle of an op list. `Executed` and `Abandoned` are terminal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum OpListState {
    Open,
    Closed,
    Prepared,
    Executed,
    Abandoned,
}

/// Ordered ops recorded against one render target.
#[derive(Debug)]
pub struct OpList {
    target: TargetId,
    ops: Vec<DrawOp>,
    state: OpListState,
    /// Lists that must execute before this one.
    dependencies: Vec<OpListId>,
    /// Targets this list holds a reference on because its ops sample them.
    sampled_refs: Vec<TargetId>,
    /// Creation order within the frame.
    seq: u64,
}

impl OpList {
    pub(crate) fn new(target: TargetId, seq: u64) -> Self {
        Self {
            target,
            ops: Vec::new(),
            state: OpListState::Open,
            dependencies: Vec::new(),
            sampled_refs: Vec::new(),
            seq,
        }
    }

    #[inline]
    pub fn target(&self) -> TargetId {
        self.target
    }

    #[inline]
    pub fn state(&self) -> OpListState {
        self.state
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.state == OpListState::Open
    }

    #[inline]
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[inline]
    pub fn dependencies(&self) -> &[OpListId] {
        &self.dependencies
    }

    #[inline]
    pub fn sampled_refs(&self) -> &[TargetId] {
        &self.sampled_refs
    }

    #[inline]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub(crate) fn append(&mut self, op: DrawOp) -> Result<(), OpListClosed> {
        if !self.is_open() {
            return Err(OpListClosed);
        }
        log::trace!("op list #{}: append {:?} bounds={:?}", self.seq, op.kind(), op.bounds());
        self.ops.push(op);
        Ok(())
    }

    /// Drops every recorded op. Only open lists may be rewritten.
    pub(crate) fn drop_pending(&mut self) -> usize {
        debug_assert!(self.is_open());
        let n = self.ops.len();
        self.ops.clear();
        n
    }

    /// Open → Closed. Closing twice is harmless.
    pub(crate) fn close(&mut self) {
        if self.state == OpListState::Open {
            self.state = OpListState::Closed;
        }
    }

    pub(crate) fn add_dependency(&mut self, on: OpListId) {
        if !self.dependencies.contains(&on) {
            self.dependencies.push(on);
        }
    }

    /// Records a held reference. Returns `false` if one is already held.
    pub(crate) fn hold_ref(&mut self, target: TargetId) -> bool {
        if self.sampled_refs.contains(&target) {
            return false;
        }
        self.sampled_refs.push(target);
        true
    }

    pub(crate) fn take_refs(&mut self) -> Vec<TargetId> {
        std::mem::take(&mut self.sampled_refs)
    }

    /// Closed → Prepared, running the merge pass when `lookback` is set.
    /// Returns the number of merges.
    pub(crate) fn prepare(&mut self, lookback: Option<usize>) -> usize {
        debug_assert_eq!(self.state, OpListState::Closed, "prepare from {:?}", self.state);
        let merges = match lookback {
            Some(n) => {
                let (ops, merges) = merge_ops(std::mem::take(&mut self.ops), n);
                self.ops = ops;
                merges
            }
            None => 0,
        };
        self.state = OpListState::Prepared;
        merges
    }

    /// Prepared → Executed.
    pub(crate) fn mark_executed(&mut self) {
        debug_assert_eq!(self.state, OpListState::Prepared, "execute from {:?}", self.state);
        self.state = OpListState::Executed;
        self.ops.clear();
    }

    /// Any non-terminal state → Abandoned. Returns the number of dropped ops.
    pub(crate) fn abandon(&mut self) -> usize {
        debug_assert!(!matches!(self.state, OpListState::Executed | OpListState::Abandoned));
        self.state = OpListState::Abandoned;
        let n = self.ops.len();
        self.ops.clear();
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::IRect;
    use crate::paint::Color;
    use slotmap::SlotMap;

    fn list() -> OpList {
        let mut targets: SlotMap<TargetId, ()> = SlotMap::with_key();
        OpList::new(targets.insert(()), 0)
    }

    fn clear() -> DrawOp {
        DrawOp::clear(None, Color::WHITE, IRect::from_wh(4, 4))
    }

    #[test]
    fn closed_list_rejects_appends() {
        let mut l = list();
        assert!(l.append(clear()).is_ok());
        l.close();
        assert_eq!(l.append(clear()), Err(OpListClosed));
        assert_eq!(l.len(), 1);
    }

    #[test]
    fn lifecycle_runs_forward() {
        let mut l = list();
        l.append(clear()).unwrap();
        l.close();
        l.close();
        assert_eq!(l.state(), OpListState::Closed);
        assert_eq!(l.prepare(Some(4)), 0);
        assert_eq!(l.state(), OpListState::Prepared);
        l.mark_executed();
        assert_eq!(l.state(), OpListState::Executed);
        assert!(l.is_empty());
    }

    #[test]
    fn abandon_reports_dropped_ops() {
        let mut l = list();
        l.append(clear()).unwrap();
        l.append(clear()).unwrap();
        assert_eq!(l.abandon(), 2);
        assert_eq!(l.state(), OpListState::Abandoned);
        assert!(l.append(clear()).is_err());
    }

    #[test]
    fn refs_and_dependencies_dedupe() {
        let mut l = list();
        let t = l.target();
        assert!(l.hold_ref(t));
        assert!(!l.hold_ref(t));
        assert_eq!(l.take_refs(), vec![t]);
        assert!(l.sampled_refs().is_empty());

        let mut lists: SlotMap<OpListId, ()> = SlotMap::with_key();
        let dep = lists.insert(());
        l.add_dependency(dep);
        l.add_dependency(dep);
        assert_eq!(l.dependencies(), &[dep]);
    }
}
