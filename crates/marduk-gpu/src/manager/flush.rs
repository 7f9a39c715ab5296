use crate::backend::{Backend, PreparedCall, MeshCall, TextureBinding};
use crate::context::ContextOptions;
use crate::error::InstantiateError;
use crate::op_list::OpList;
use crate::ops::OpPayload;
use crate::stats::GpuStats;
use crate::target::{LiveTarget, LiveTargetId, TargetId, TargetRegistry};

use super::DrawingManager;

/// Everything outside the manager that executing a list touches.
pub(crate) struct FlushResources<'a> {
    pub registry: &'a mut TargetRegistry,
    pub backend: &'a mut dyn Backend,
    pub stats: &'a mut GpuStats,
    pub options: &'a ContextOptions,
}

impl FlushResources<'_> {
    /// Memoized instantiation that also counts fresh allocations.
    pub fn instantiate(&mut self, target: TargetId) -> Result<LiveTarget, InstantiateError> {
        let was_live = self.registry.get(target).is_some_and(|h| h.is_instantiated());
        let live = self.registry.instantiate(target, self.backend)?;
        if !was_live {
            self.stats.target_allocations += 1;
        }
        Ok(live)
    }
}

impl DrawingManager {
    /// Executes every list (`only == None`) or the dependency closure of one
    /// target's lists.
    ///
    /// A multisampled target that was drawn to is resolved before the next op
    /// that reads it, and once more at the end if it was drawn to again.
    ///
    /// Returns the number of lists executed.
    pub(crate) fn flush(&mut self, only: Option<TargetId>, res: &mut FlushResources<'_>) -> usize {
        let order = self.flush_order(only);
        let mut resolves: Vec<LiveTargetId> = Vec::new();
        let mut executed = 0;

        for id in order {
            let Some(list) = self.lists.remove(id) else {
                continue;
            };
            if self.last_list(list.target()) == Some(id) {
                self.last_list.remove(list.target());
            }
            if self.execute(list, res, &mut resolves) {
                executed += 1;
            }
        }

        for live in resolves {
            res.backend.resolve_msaa(live);
            res.stats.msaa_resolves += 1;
        }

        if only.is_none() {
            self.reset();
        }
        log::debug!("flush: {executed} op lists executed, {} pending", self.len());
        executed
    }

    /// Runs one list through Closed → Prepared → Executed.
    fn execute(&mut self, mut list: OpList, res: &mut FlushResources<'_>, resolves: &mut Vec<LiveTargetId>) -> bool {
        list.close();
        let target = list.target();

        if list.is_empty() {
            list.prepare(None);
            list.mark_executed();
            self.release_refs(&mut list, res);
            return true;
        }

        let live = match res.instantiate(target) {
            Ok(live) => live,
            Err(e) => {
                log::warn!("dropping {} ops for target {target:?}: {e}", list.len());
                res.stats.ops_abandoned += list.abandon() as u64;
                self.release_refs(&mut list, res);
                return false;
            }
        };

        let lookback = res.options.enable_merging.then_some(res.options.max_merge_lookback);
        res.stats.merged_ops += list.prepare(lookback) as u64;

        let max_attributes = res.backend.caps().max_vertex_attributes as usize;
        let mut bindings: Vec<TextureBinding> = Vec::new();

        for op in list.ops() {
            let call = match op.payload() {
                OpPayload::Clear { rect, color } => PreparedCall::Clear { rect: *rect, color: *color },
                OpPayload::Discard => PreparedCall::Discard,
                OpPayload::Copy { src, src_rect, dst_point } => {
                    match res.instantiate(*src) {
                        Ok(from) => {
                            resolve_if_drawn(res, resolves, from.id);
                            match res.backend.copy_surface(live.id, from.id, *src_rect, *dst_point) {
                                Ok(()) => res.stats.copies += 1,
                                Err(e) => log::warn!("backend rejected copy from {src:?}: {e}"),
                            }
                        }
                        Err(e) => log::warn!("copy from unusable target {src:?}: {e}"),
                    }
                    continue;
                }
                OpPayload::Mesh(mesh) => {
                    let declared = mesh.program.attribute_count();
                    if declared > max_attributes {
                        log::warn!(
                            "{:?} op declares {declared} vertex attributes, backend allows {max_attributes}; skipped",
                            op.kind()
                        );
                        res.stats.failed_draws += 1;
                        continue;
                    }

                    bindings.clear();
                    let mut bound = true;
                    for &sampled in op.sampled() {
                        match res.instantiate(sampled) {
                            Ok(l) => {
                                resolve_if_drawn(res, resolves, l.id);
                                bindings.push(TextureBinding { target: sampled, live: l.id });
                            }
                            Err(e) => {
                                log::warn!("{:?} op samples unusable target {sampled:?}: {e}", op.kind());
                                bound = false;
                                break;
                            }
                        }
                    }
                    if !bound {
                        res.stats.failed_draws += 1;
                        continue;
                    }

                    PreparedCall::Mesh(MeshCall {
                        program: &mesh.program,
                        vertices: mesh.geometry.vertices(),
                        indices: mesh.geometry.indices(),
                        paint: &mesh.paint,
                        scissor: op.scissor(),
                        stencil: mesh.stencil,
                        textures: &bindings,
                    })
                }
            };

            let is_mesh = matches!(call, PreparedCall::Mesh(_));
            match res.backend.submit(live.id, &call) {
                Ok(()) if is_mesh => res.stats.draws += 1,
                Ok(()) => {}
                Err(e) => {
                    log::warn!("backend rejected {:?} op: {e}", op.kind());
                    if is_mesh {
                        res.stats.failed_draws += 1;
                    }
                }
            }
        }

        if live.sample_count > 1 && !resolves.contains(&live.id) {
            resolves.push(live.id);
        }

        list.mark_executed();
        self.release_refs(&mut list, res);
        true
    }

    fn release_refs(&mut self, list: &mut OpList, res: &mut FlushResources<'_>) {
        for target in list.take_refs() {
            self.release_target(target, res);
        }
    }

    /// Drops one reference on `target`. If it was the last, the target's
    /// pending lists are abandoned, which may in turn release the targets
    /// they sample.
    pub(crate) fn release_target(&mut self, target: TargetId, res: &mut FlushResources<'_>) {
        let mut work = vec![target];
        while let Some(t) = work.pop() {
            if !res.registry.release(t, res.backend) {
                continue;
            }
            for mut list in self.take_target_lists(t) {
                let dropped = list.abandon();
                if dropped > 0 {
                    log::debug!("target {t:?} released with {dropped} pending ops; abandoned");
                }
                res.stats.ops_abandoned += dropped as u64;
                work.extend(list.take_refs());
            }
        }
    }
}

/// Resolves `live` now if an earlier list in this flush drew to it.
fn resolve_if_drawn(res: &mut FlushResources<'_>, resolves: &mut Vec<LiveTargetId>, live: LiveTargetId) {
    if let Some(i) = resolves.iter().position(|r| *r == live) {
        resolves.swap_remove(i);
        res.backend.resolve_msaa(live);
        res.stats.msaa_resolves += 1;
    }
}
