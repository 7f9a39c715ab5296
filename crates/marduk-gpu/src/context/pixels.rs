use crate::caps::PixelFormat;
use crate::coords::{IRect, IVec2};
use crate::error::PixelIoError;
use crate::ops::DrawOp;
use crate::target::TargetId;

use super::DrawContext;

/// Layout of a client pixel buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl ImageInfo {
    #[inline]
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self { width, height, format }
    }

    #[inline]
    pub fn min_row_bytes(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Transfer {
    Read,
    Write,
}

/// Validated transfer: the target rectangle and where it starts in the
/// client buffer.
struct TransferPlan {
    rect: IRect,
    offset: usize,
}

impl DrawContext<'_> {
    /// Copies target pixels at (`x`, `y`) into `dst`, flushing pending work
    /// on this target first. Rows outside the target are left untouched.
    pub fn read_pixels(
        &mut self,
        info: &ImageInfo,
        dst: &mut [u8],
        row_bytes: usize,
        x: i32,
        y: i32,
    ) -> Result<(), PixelIoError> {
        let plan = self.plan_transfer(Transfer::Read, info, dst.len(), row_bytes, x, y)?;
        let target = self.state.target;
        self.core.flush(Some(target));
        let live = self.core.instantiate(target)?;
        self.core.backend.read_pixels(live.id, plan.rect, info.format, &mut dst[plan.offset..], row_bytes)?;
        Ok(())
    }

    /// Copies `src` into the target at (`x`, `y`) after flushing pending work
    /// on this target.
    pub fn write_pixels(
        &mut self,
        info: &ImageInfo,
        src: &[u8],
        row_bytes: usize,
        x: i32,
        y: i32,
    ) -> Result<(), PixelIoError> {
        let plan = self.plan_transfer(Transfer::Write, info, src.len(), row_bytes, x, y)?;
        let target = self.state.target;
        self.core.flush(Some(target));
        let live = self.core.instantiate(target)?;
        self.core.backend.write_pixels(live.id, plan.rect, info.format, &src[plan.offset..], row_bytes)?;
        Ok(())
    }

    fn plan_transfer(
        &self,
        direction: Transfer,
        info: &ImageInfo,
        len: usize,
        row_bytes: usize,
        x: i32,
        y: i32,
    ) -> Result<TransferPlan, PixelIoError> {
        if self.was_abandoned() {
            return Err(PixelIoError::Abandoned);
        }
        let target_format = self.state.desc.format;
        let caps = self.core.backend.caps();
        let allowed = match direction {
            Transfer::Read => caps.is_readable(target_format),
            Transfer::Write => caps.is_writable(target_format),
        };
        if !allowed || !info.format.converts_losslessly_to(target_format) {
            return Err(PixelIoError::UnsupportedFormat { requested: info.format, target: target_format });
        }

        let min = info.min_row_bytes();
        if row_bytes < min {
            return Err(PixelIoError::RowBytesTooSmall { row_bytes, min });
        }
        let needed = match info.height {
            0 => 0,
            h => row_bytes * (h as usize - 1) + min,
        };
        if len < needed {
            return Err(PixelIoError::BufferTooSmall { len, needed });
        }

        let request = IRect::new(x, y, info.width as i32, info.height as i32);
        let rect = request.intersect(self.state.desc.bounds()).ok_or(PixelIoError::OutOfBounds)?;
        let offset = (rect.y - y) as usize * row_bytes + (rect.x - x) as usize * info.format.bytes_per_pixel();
        Ok(TransferPlan { rect, offset })
    }

    /// Records a copy of `src_rect` in `src` to `dst_point` in this target.
    /// Both rectangles are clipped to their targets first.
    ///
    /// Returns `false` when nothing was recorded: `src` is this target or was
    /// released, the pixel formats differ, or nothing is left after clipping.
    pub fn copy_surface(&mut self, src: TargetId, src_rect: IRect, dst_point: IVec2) -> bool {
        if self.was_abandoned() {
            return false;
        }
        let target = self.state.target;
        if src == target {
            log::warn!("copy of target {target:?} onto itself; dropped");
            return false;
        }
        let Some(src_desc) = self.core.registry.desc(src) else {
            log::warn!("copy from released target {src:?}; dropped");
            return false;
        };
        if src_desc.format != self.state.desc.format {
            log::warn!(
                "copy from {:?} into {:?} needs a format conversion; dropped",
                src_desc.format,
                self.state.desc.format
            );
            return false;
        }
        let Some((src_rect, dst_point)) =
            clip_copy(src_desc.bounds(), src_rect, self.state.desc.bounds(), dst_point)
        else {
            return false;
        };
        self.record(DrawOp::copy(src, src_rect, dst_point))
    }

    /// Drops pending ops and tells the backend the contents are undefined.
    pub fn discard(&mut self) {
        if self.was_abandoned() {
            return;
        }
        self.drop_pending_ops();
        let op = DrawOp::discard(self.state.desc.bounds());
        self.record(op);
    }

    /// Makes the target's contents visible outside this crate: flushes its
    /// pending work and resolves multisampled storage.
    pub fn prepare_for_external_io(&mut self) {
        if self.was_abandoned() {
            return;
        }
        let target = self.state.target;
        let has_work = self.core.manager.last_list(target).is_some();
        self.core.flush(Some(target));

        // A flush with work on this target already resolved it.
        if has_work || !self.state.desc.is_unified_multisampled() {
            return;
        }
        let live = self.core.registry.get(target).and_then(|h| h.live());
        if let Some(live) = live {
            self.core.backend.resolve_msaa(live.id);
            self.core.stats.msaa_resolves += 1;
        }
    }
}

/// Clips a copy to both targets, keeping source and destination aligned.
fn clip_copy(src_bounds: IRect, src_rect: IRect, dst_bounds: IRect, dst_point: IVec2) -> Option<(IRect, IVec2)> {
    let (dx, dy) = (dst_point.x - src_rect.x, dst_point.y - src_rect.y);
    let dst = src_rect.intersect(src_bounds)?.offset(dx, dy).intersect(dst_bounds)?;
    Some((dst.offset(-dx, -dy), IVec2::new(dst.x, dst.y)))
}
