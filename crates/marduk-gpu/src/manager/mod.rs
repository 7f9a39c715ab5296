//! Frame-scoped coordination of op lists.
//!
//! The manager owns every op list recorded since the last flush, tracks the
//! newest list per target, and records which lists must execute before which.
//! Its state is empty again after every full flush.

mod flush;
mod validate;

use std::collections::{BTreeMap, HashMap, HashSet};

use slotmap::{SecondaryMap, SlotMap};

use crate::op_list::{OpList, OpListId};
use crate::target::TargetId;

pub(crate) use flush::FlushResources;

#[derive(Debug, Default)]
pub struct DrawingManager {
    lists: SlotMap<OpListId, OpList>,
    last_list: SecondaryMap<TargetId, OpListId>,
    next_seq: u64,
}

impl DrawingManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live (not yet executed or abandoned) lists.
    #[inline]
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    #[inline]
    pub fn op_list(&self, id: OpListId) -> Option<&OpList> {
        self.lists.get(id)
    }

    #[inline]
    pub(crate) fn op_list_mut(&mut self, id: OpListId) -> Option<&mut OpList> {
        self.lists.get_mut(id)
    }

    /// Newest list recorded for `target`.
    #[inline]
    pub fn last_list(&self, target: TargetId) -> Option<OpListId> {
        self.last_list.get(target).copied()
    }

    #[inline]
    pub fn is_open(&self, id: OpListId) -> bool {
        self.lists.get(id).is_some_and(OpList::is_open)
    }

    /// Opens a fresh list for `target`, closing the previous one and ordering
    /// the new list after it.
    ///
    /// Lists of other targets that read the previous list are ordered before
    /// the new one too, so a flush of `target` cannot overwrite what a
    /// pending reader has yet to sample.
    pub(crate) fn new_op_list(&mut self, target: TargetId) -> OpListId {
        let mut list = OpList::new(target, self.next_seq);
        self.next_seq += 1;

        if let Some(prev_id) = self.last_list(target) {
            if let Some(prev) = self.lists.get_mut(prev_id) {
                prev.close();
                list.add_dependency(prev_id);
            }
            for (reader_id, reader) in self.lists.iter_mut() {
                if reader.target() != target && reader.dependencies().contains(&prev_id) {
                    reader.close();
                    list.add_dependency(reader_id);
                }
            }
        }

        let id = self.lists.insert(list);
        self.last_list.insert(target, id);
        log::trace!("op list {id:?} opened for target {target:?}");
        id
    }

    /// Makes `list` wait for the newest list of `on`, closing that list so
    /// later draws to `on` cannot slip in before the read.
    ///
    /// Returns `false` when `on` has no pending work.
    pub(crate) fn add_dependency(&mut self, list: OpListId, on: TargetId) -> bool {
        let Some(dep) = self.last_list(on) else {
            return false;
        };
        if dep == list {
            debug_assert!(false, "op list {list:?} depends on itself");
            return false;
        }
        if let Some(d) = self.lists.get_mut(dep) {
            d.close();
        }
        match self.lists.get_mut(list) {
            Some(l) => {
                l.add_dependency(dep);
                true
            }
            None => false,
        }
    }

    /// Removes and returns every list recorded for `target`.
    pub(crate) fn take_target_lists(&mut self, target: TargetId) -> Vec<OpList> {
        let ids: Vec<OpListId> =
            self.lists.iter().filter(|(_, l)| l.target() == target).map(|(id, _)| id).collect();
        self.last_list.remove(target);
        ids.into_iter()
            .filter_map(|id| self.lists.remove(id))
            .collect()
    }

    /// Removes every list.
    pub(crate) fn take_all(&mut self) -> Vec<OpList> {
        self.last_list.clear();
        self.lists.drain().map(|(_, l)| l).collect()
    }

    /// Execution order: dependencies first, creation order among ready lists.
    ///
    /// With `only`, just the lists of that target and everything they
    /// transitively depend on.
    pub fn flush_order(&self, only: Option<TargetId>) -> Vec<OpListId> {
        let selected: HashSet<OpListId> = match only {
            None => self.lists.keys().collect(),
            Some(target) => {
                let mut seen = HashSet::new();
                let mut stack: Vec<OpListId> = self
                    .lists
                    .iter()
                    .filter(|(_, l)| l.target() == target)
                    .map(|(id, _)| id)
                    .collect();
                while let Some(id) = stack.pop() {
                    if !seen.insert(id) {
                        continue;
                    }
                    if let Some(l) = self.lists.get(id) {
                        stack.extend(l.dependencies().iter().filter(|d| self.lists.contains_key(**d)));
                    }
                }
                seen
            }
        };

        let mut pending: HashMap<OpListId, usize> = HashMap::with_capacity(selected.len());
        let mut dependents: HashMap<OpListId, Vec<OpListId>> = HashMap::new();
        let mut ready: BTreeMap<u64, OpListId> = BTreeMap::new();

        for &id in &selected {
            let deps: Vec<OpListId> =
                self.lists[id].dependencies().iter().copied().filter(|d| selected.contains(d)).collect();
            for &d in &deps {
                dependents.entry(d).or_default().push(id);
            }
            if deps.is_empty() {
                ready.insert(self.lists[id].seq(), id);
            }
            pending.insert(id, deps.len());
        }

        let mut order = Vec::with_capacity(selected.len());
        while let Some((_, id)) = ready.pop_first() {
            order.push(id);
            for &next in dependents.get(&id).map(Vec::as_slice).unwrap_or_default() {
                if let Some(n) = pending.get_mut(&next) {
                    *n -= 1;
                    if *n == 0 {
                        ready.insert(self.lists[next].seq(), next);
                    }
                }
            }
        }

        if order.len() < selected.len() {
            log::error!("op list dependency cycle; executing {} lists in creation order", selected.len() - order.len());
            let done: HashSet<OpListId> = order.iter().copied().collect();
            let mut rest: Vec<OpListId> = selected.into_iter().filter(|id| !done.contains(id)).collect();
            rest.sort_by_key(|id| self.lists[*id].seq());
            order.extend(rest);
        }
        order
    }

    /// Frame boundary: forget everything.
    pub(crate) fn reset(&mut self) {
        debug_assert!(self.lists.is_empty(), "reset with {} live lists", self.lists.len());
        self.lists.clear();
        self.last_list.clear();
        self.next_seq = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(n: usize) -> Vec<TargetId> {
        let mut map: SlotMap<TargetId, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    // ── list creation ──────────────────────────────────────────────────────

    #[test]
    fn new_list_closes_previous_and_depends_on_it() {
        let t = targets(1)[0];
        let mut m = DrawingManager::new();
        let a = m.new_op_list(t);
        let b = m.new_op_list(t);
        assert!(!m.is_open(a));
        assert!(m.is_open(b));
        assert_eq!(m.op_list(b).unwrap().dependencies(), &[a]);
        assert_eq!(m.last_list(t), Some(b));
    }

    #[test]
    fn sampling_closes_the_sampled_list() {
        let ts = targets(2);
        let mut m = DrawingManager::new();
        let a = m.new_op_list(ts[0]);
        let b = m.new_op_list(ts[1]);
        assert!(m.add_dependency(b, ts[0]));
        assert!(!m.is_open(a));
        assert!(m.is_open(b));
        assert!(!m.add_dependency(b, targets(3)[2]));
    }

    #[test]
    fn rewriting_a_sampled_target_waits_for_its_readers() {
        let ts = targets(2);
        let mut m = DrawingManager::new();
        let a1 = m.new_op_list(ts[0]);
        let b = m.new_op_list(ts[1]);
        m.add_dependency(b, ts[0]);
        let a2 = m.new_op_list(ts[0]);
        assert!(!m.is_open(b));
        let deps = m.op_list(a2).unwrap().dependencies();
        assert!(deps.contains(&a1));
        assert!(deps.contains(&b));
    }

    // ── ordering ───────────────────────────────────────────────────────────

    #[test]
    fn dependencies_run_first() {
        let ts = targets(2);
        let mut m = DrawingManager::new();
        let b = m.new_op_list(ts[1]);
        let a = m.new_op_list(ts[0]);
        m.add_dependency(b, ts[0]);
        assert_eq!(m.flush_order(None), vec![a, b]);
    }

    #[test]
    fn independent_lists_keep_creation_order() {
        let ts = targets(3);
        let mut m = DrawingManager::new();
        let ids: Vec<_> = ts.iter().map(|t| m.new_op_list(*t)).collect();
        assert_eq!(m.flush_order(None), ids);
    }

    #[test]
    fn targeted_order_is_the_dependency_closure() {
        let ts = targets(3);
        let mut m = DrawingManager::new();
        let a = m.new_op_list(ts[0]);
        let b = m.new_op_list(ts[1]);
        let _c = m.new_op_list(ts[2]);
        m.add_dependency(b, ts[0]);
        assert_eq!(m.flush_order(Some(ts[1])), vec![a, b]);
        assert_eq!(m.flush_order(Some(ts[0])), vec![a]);
    }

    #[test]
    fn targeted_order_includes_readers_of_overwritten_content() {
        let ts = targets(2);
        let mut m = DrawingManager::new();
        let a1 = m.new_op_list(ts[0]);
        let b = m.new_op_list(ts[1]);
        m.add_dependency(b, ts[0]);
        let a2 = m.new_op_list(ts[0]);
        assert_eq!(m.flush_order(Some(ts[0])), vec![a1, b, a2]);
    }

    #[test]
    fn taking_target_lists_forgets_the_target() {
        let ts = targets(2);
        let mut m = DrawingManager::new();
        m.new_op_list(ts[0]);
        m.new_op_list(ts[0]);
        m.new_op_list(ts[1]);
        assert_eq!(m.take_target_lists(ts[0]).len(), 2);
        assert_eq!(m.last_list(ts[0]), None);
        assert_eq!(m.len(), 1);
    }
}
