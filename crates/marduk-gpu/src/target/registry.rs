use slotmap::{new_key_type, SlotMap};

use crate::backend::Backend;
use crate::caps::PixelFormat;
use crate::error::InstantiateError;

use super::RenderTargetDesc;

new_key_type! {
    /// Handle to a render target description in the [`TargetRegistry`].
    pub struct TargetId;
}

/// Identity of a backend-owned render target.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct LiveTargetId(pub u64);

/// A backend allocation bound to a handle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LiveTarget {
    pub id: LiveTargetId,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub sample_count: u32,
}

impl LiveTarget {
    fn matches(&self, desc: &RenderTargetDesc) -> bool {
        self.width == desc.width
            && self.height == desc.height
            && self.format == desc.format
            && self.sample_count == desc.sample_count
    }
}

/// Registry entry: the description plus the lazily bound live target.
#[derive(Debug, Clone)]
pub struct RenderTargetHandle {
    desc: RenderTargetDesc,
    live: Option<LiveTarget>,
    refs: u32,
    allocations: u32,
}

impl RenderTargetHandle {
    #[inline]
    pub fn desc(&self) -> &RenderTargetDesc {
        &self.desc
    }

    #[inline]
    pub fn live(&self) -> Option<LiveTarget> {
        self.live
    }

    #[inline]
    pub fn is_instantiated(&self) -> bool {
        self.live.is_some()
    }

    #[inline]
    pub fn ref_count(&self) -> u32 {
        self.refs
    }

    /// Backend allocations made for this handle (0 or 1).
    #[inline]
    pub fn allocations(&self) -> u32 {
        self.allocations
    }
}

/// Arena of render target handles with explicit reference counts.
#[derive(Debug, Default)]
pub struct TargetRegistry {
    handles: SlotMap<TargetId, RenderTargetHandle>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a description with one reference held by the caller.
    pub fn create(&mut self, desc: RenderTargetDesc) -> TargetId {
        let id = self.handles.insert(RenderTargetHandle { desc, live: None, refs: 1, allocations: 0 });
        log::trace!("target {id:?} created: {}x{} {:?}", desc.width, desc.height, desc.format);
        id
    }

    #[inline]
    pub fn get(&self, id: TargetId) -> Option<&RenderTargetHandle> {
        self.handles.get(id)
    }

    #[inline]
    pub fn desc(&self, id: TargetId) -> Option<&RenderTargetDesc> {
        self.handles.get(id).map(|h| &h.desc)
    }

    #[inline]
    pub fn contains(&self, id: TargetId) -> bool {
        self.handles.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Takes an extra reference. Returns `false` for a stale id.
    pub fn add_ref(&mut self, id: TargetId) -> bool {
        match self.handles.get_mut(id) {
            Some(h) => {
                h.refs += 1;
                true
            }
            None => false,
        }
    }

    /// Drops one reference. When it was the last, the handle is removed, its
    /// live target is returned to `backend`, and `true` is returned.
    pub fn release(&mut self, id: TargetId, backend: &mut dyn Backend) -> bool {
        let Some(h) = self.handles.get_mut(id) else {
            debug_assert!(false, "release of unknown target {id:?}");
            return false;
        };
        debug_assert!(h.refs > 0);
        h.refs = h.refs.saturating_sub(1);
        if h.refs > 0 {
            return false;
        }

        if let Some(handle) = self.handles.remove(id) {
            if let Some(live) = handle.live {
                backend.release_render_target(live.id);
            }
        }
        log::trace!("target {id:?} destroyed");
        true
    }

    /// Binds `id` to a live backend target, allocating on the first call only.
    ///
    /// Unsatisfiable descriptions fail without allocating; nothing is ever
    /// substituted for the requested format or sample count.
    pub fn instantiate(
        &mut self,
        id: TargetId,
        backend: &mut dyn Backend,
    ) -> Result<LiveTarget, InstantiateError> {
        let handle = self.handles.get_mut(id).ok_or(InstantiateError::UnknownHandle)?;
        if let Some(live) = handle.live {
            return Ok(live);
        }
        if backend.is_abandoned() {
            return Err(InstantiateError::Abandoned);
        }

        handle.desc.check(backend.caps())?;
        let live = backend.create_render_target(&handle.desc)?;
        debug_assert!(live.matches(&handle.desc), "backend returned {live:?} for {:?}", handle.desc);

        handle.live = Some(live);
        handle.allocations += 1;
        log::debug!("target {id:?} instantiated as {:?}", live.id);
        Ok(live)
    }
}
