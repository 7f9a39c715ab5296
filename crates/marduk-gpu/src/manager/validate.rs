use crate::target::TargetRegistry;

use super::DrawingManager;

impl DrawingManager {
    /// Structural consistency check. Logs every violation and returns whether
    /// the manager is consistent.
    ///
    /// - every list's target and every held reference is registered
    /// - `last_list` points at a live list of the same target
    /// - only the newest list of a target may be open
    /// - dependencies point at lists that are no longer open
    pub fn validate(&self, registry: &TargetRegistry) -> bool {
        let mut ok = true;
        let mut fail = |msg: String| {
            log::error!("drawing manager inconsistent: {msg}");
            ok = false;
        };

        for (id, list) in &self.lists {
            if !registry.contains(list.target()) {
                fail(format!("{id:?} records into released target {:?}", list.target()));
            }
            for t in list.sampled_refs() {
                if !registry.contains(*t) {
                    fail(format!("{id:?} holds a reference on released target {t:?}"));
                }
            }
            if list.is_open() && self.last_list(list.target()) != Some(id) {
                fail(format!("{id:?} is open but not the newest list of its target"));
            }
            for dep in list.dependencies() {
                if *dep == id {
                    fail(format!("{id:?} depends on itself"));
                } else if self.is_open(*dep) {
                    fail(format!("{id:?} depends on open list {dep:?}"));
                }
            }
        }

        for (target, id) in &self.last_list {
            match self.lists.get(*id) {
                Some(l) if l.target() == target => {}
                Some(_) => fail(format!("last list of {target:?} belongs to another target")),
                None => fail(format!("last list of {target:?} no longer exists")),
            }
        }

        ok
    }
}
