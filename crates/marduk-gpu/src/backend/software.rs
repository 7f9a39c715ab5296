use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::caps::{Caps, FormatCaps, PixelFormat};
use crate::coords::{IRect, IVec2, Vec2};
use crate::error::BackendError;
use crate::ops::{ProgramKind, StencilMode, Vertex};
use crate::paint::Color;
use crate::shape::FillRule;
use crate::target::{LiveTarget, LiveTargetId, RenderTargetDesc, TargetId};

use super::{Backend, MeshCall, PreparedCall};

/// What a logged submission did.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionKind {
    Clear { rect: Option<IRect>, color: Color },
    Discard,
    Copy { src: LiveTargetId, src_rect: IRect, dst_point: IVec2 },
    Mesh {
        program: ProgramKind,
        attributes: usize,
        triangles: usize,
        stencil: StencilMode,
        sampled: Vec<LiveTargetId>,
    },
    Resolve,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub target: LiveTargetId,
    pub kind: SubmissionKind,
}

#[derive(Debug)]
struct Surface {
    width: u32,
    height: u32,
    /// 8-bit formats round every stored pixel to bytes.
    quantized: bool,
    pixels: Vec<Color>,
    stencil: Vec<i32>,
}

impl Surface {
    fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let n = width as usize * height as usize;
        Self {
            width,
            height,
            quantized: format != PixelFormat::Rgba16Float,
            pixels: vec![Color::TRANSPARENT; n],
            stencil: vec![0; n],
        }
    }

    #[inline]
    fn store(&mut self, i: usize, c: Color) {
        self.pixels[i] = if self.quantized { Color::from_rgba8_premul(c.to_rgba8_premul()) } else { c };
    }

    #[inline]
    fn bounds(&self) -> IRect {
        IRect::from_wh(self.width as i32, self.height as i32)
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Nearest-neighbour lookup; transparent outside the surface.
    fn sample(&self, p: Vec2) -> Color {
        let (x, y) = (p.x.floor(), p.y.floor());
        if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
            return Color::TRANSPARENT;
        }
        self.pixels[self.index(x as i32, y as i32)]
    }
}

#[derive(Debug, Default)]
struct SoftwareState {
    surfaces: HashMap<LiveTargetId, Surface>,
    next_id: u64,
    allocations: u32,
    abandoned: bool,
    fail_allocations: bool,
    log: Vec<Submission>,
}

/// In-memory reference backend.
///
/// Pixels are premultiplied `f32` colors with a signed stencil plane per
/// surface. Triangles are sampled at pixel centers with a top-left fill rule,
/// so edges shared by adjacent triangles are drawn exactly once. Multisampled
/// targets are rendered single-sampled and resolves only get logged.
#[derive(Debug)]
pub struct SoftwareBackend {
    caps: Caps,
    state: Rc<RefCell<SoftwareState>>,
}

/// Read-only view onto a [`SoftwareBackend`] that outlives moving the backend
/// into a context.
#[derive(Debug, Clone)]
pub struct SoftwareInspector {
    state: Rc<RefCell<SoftwareState>>,
}

impl Default for SoftwareBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareBackend {
    /// Default caps, minus half-float pixel transfers.
    pub fn new() -> Self {
        let caps = Caps::default().with_format(
            PixelFormat::Rgba16Float,
            Some(FormatCaps { readable: false, writable: false, ..FormatCaps::renderable(&[1, 4]) }),
        );
        Self::with_caps(caps)
    }

    pub fn with_caps(caps: Caps) -> Self {
        Self { caps, state: Rc::default() }
    }

    pub fn inspector(&self) -> SoftwareInspector {
        SoftwareInspector { state: Rc::clone(&self.state) }
    }

    /// Simulates device loss.
    pub fn abandon(&mut self) {
        self.state.borrow_mut().abandoned = true;
    }

    /// Makes later allocations fail with `OutOfMemory`.
    pub fn set_fail_allocations(&mut self, fail: bool) {
        self.state.borrow_mut().fail_allocations = fail;
    }
}

impl SoftwareInspector {
    pub fn allocation_count(&self) -> u32 {
        self.state.borrow().allocations
    }

    pub fn is_live(&self, id: LiveTargetId) -> bool {
        self.state.borrow().surfaces.contains_key(&id)
    }

    pub fn pixel(&self, id: LiveTargetId, x: u32, y: u32) -> Option<Color> {
        let state = self.state.borrow();
        let s = state.surfaces.get(&id)?;
        (x < s.width && y < s.height).then(|| s.pixels[s.index(x as i32, y as i32)])
    }

    /// Row-major copy of every pixel.
    pub fn pixels(&self, id: LiveTargetId) -> Option<Vec<Color>> {
        self.state.borrow().surfaces.get(&id).map(|s| s.pixels.clone())
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.state.borrow().log.clone()
    }

    /// Mesh submissions issued against `id`.
    pub fn mesh_count(&self, id: LiveTargetId) -> usize {
        self.state
            .borrow()
            .log
            .iter()
            .filter(|s| s.target == id && matches!(s.kind, SubmissionKind::Mesh { .. }))
            .count()
    }

    pub fn clear_log(&self) {
        self.state.borrow_mut().log.clear();
    }

    /// Simulates device loss after the backend was moved into a context.
    pub fn abandon(&self) {
        self.state.borrow_mut().abandoned = true;
    }
}

impl Backend for SoftwareBackend {
    fn caps(&self) -> &Caps {
        &self.caps
    }

    fn is_abandoned(&self) -> bool {
        self.state.borrow().abandoned
    }

    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Result<LiveTarget, BackendError> {
        let mut state = self.state.borrow_mut();
        if state.abandoned {
            return Err(BackendError::Abandoned);
        }
        if state.fail_allocations {
            return Err(BackendError::OutOfMemory);
        }
        state.next_id += 1;
        state.allocations += 1;
        let id = LiveTargetId(state.next_id);
        state.surfaces.insert(id, Surface::new(desc.width, desc.height, desc.format));
        Ok(LiveTarget {
            id,
            width: desc.width,
            height: desc.height,
            format: desc.format,
            sample_count: desc.sample_count,
        })
    }

    fn release_render_target(&mut self, target: LiveTargetId) {
        self.state.borrow_mut().surfaces.remove(&target);
    }

    fn submit(&mut self, target: LiveTargetId, call: &PreparedCall<'_>) -> Result<(), BackendError> {
        let mut state = self.state.borrow_mut();
        if state.abandoned {
            return Err(BackendError::Abandoned);
        }
        if let PreparedCall::Mesh(mesh) = call {
            check_buffers(mesh)?;
        }
        let mut surface = state.surfaces.remove(&target).ok_or(BackendError::UnknownTarget)?;

        let kind = match call {
            PreparedCall::Clear { rect, color } => {
                let area = rect.unwrap_or(surface.bounds()).intersect(surface.bounds());
                if let Some(r) = area {
                    for y in r.y..r.bottom() {
                        for x in r.x..r.right() {
                            let i = surface.index(x, y);
                            surface.store(i, *color);
                        }
                    }
                }
                SubmissionKind::Clear { rect: *rect, color: *color }
            }
            PreparedCall::Discard => {
                surface.pixels.fill(Color::TRANSPARENT);
                surface.stencil.fill(0);
                SubmissionKind::Discard
            }
            PreparedCall::Mesh(mesh) => {
                draw_mesh(&mut surface, mesh, &state.surfaces);
                SubmissionKind::Mesh {
                    program: mesh.program.kind(),
                    attributes: mesh.program.attribute_count(),
                    triangles: mesh.index_bytes().len() / TRIANGLE_BYTES,
                    stencil: mesh.stencil,
                    sampled: mesh.textures.iter().map(|t| t.live).collect(),
                }
            }
        };

        state.surfaces.insert(target, surface);
        state.log.push(Submission { target, kind });
        Ok(())
    }

    fn copy_surface(
        &mut self,
        dst: LiveTargetId,
        src: LiveTargetId,
        src_rect: IRect,
        dst_point: IVec2,
    ) -> Result<(), BackendError> {
        let mut state = self.state.borrow_mut();
        if state.abandoned {
            return Err(BackendError::Abandoned);
        }
        if dst == src {
            return Err(BackendError::Unsupported("copy within one surface"));
        }
        let from = state.surfaces.get(&src).ok_or(BackendError::UnknownTarget)?;
        if !from.bounds().contains(src_rect) {
            return Err(BackendError::Unsupported("copy rect outside the source"));
        }
        let texels: Vec<Color> = (src_rect.y..src_rect.bottom())
            .flat_map(|y| (src_rect.x..src_rect.right()).map(move |x| from.pixels[from.index(x, y)]))
            .collect();

        let to = state.surfaces.get_mut(&dst).ok_or(BackendError::UnknownTarget)?;
        let dst_rect = IRect::new(dst_point.x, dst_point.y, src_rect.width, src_rect.height);
        if !to.bounds().contains(dst_rect) {
            return Err(BackendError::Unsupported("copy rect outside the destination"));
        }
        let rows = (dst_rect.y..dst_rect.bottom()).flat_map(|y| (dst_rect.x..dst_rect.right()).map(move |x| (x, y)));
        for ((x, y), c) in rows.zip(texels) {
            let i = to.index(x, y);
            to.pixels[i] = c;
        }

        state.log.push(Submission { target: dst, kind: SubmissionKind::Copy { src, src_rect, dst_point } });
        Ok(())
    }

    fn resolve_msaa(&mut self, target: LiveTargetId) {
        let mut state = self.state.borrow_mut();
        if !state.abandoned && state.surfaces.contains_key(&target) {
            state.log.push(Submission { target, kind: SubmissionKind::Resolve });
        }
    }

    fn read_pixels(
        &mut self,
        target: LiveTargetId,
        rect: IRect,
        format: PixelFormat,
        dst: &mut [u8],
        row_bytes: usize,
    ) -> Result<(), BackendError> {
        let state = self.state.borrow();
        if state.abandoned {
            return Err(BackendError::Abandoned);
        }
        let surface = state.surfaces.get(&target).ok_or(BackendError::UnknownTarget)?;
        let bpp = format.bytes_per_pixel();

        for (row, y) in (rect.y..rect.bottom()).enumerate() {
            for (col, x) in (rect.x..rect.right()).enumerate() {
                let offset = row * row_bytes + col * bpp;
                let px = encode(surface.pixels[surface.index(x, y)], format)?;
                dst[offset..offset + bpp].copy_from_slice(&px[..bpp]);
            }
        }
        Ok(())
    }

    fn write_pixels(
        &mut self,
        target: LiveTargetId,
        rect: IRect,
        format: PixelFormat,
        src: &[u8],
        row_bytes: usize,
    ) -> Result<(), BackendError> {
        let mut state = self.state.borrow_mut();
        if state.abandoned {
            return Err(BackendError::Abandoned);
        }
        let surface = state.surfaces.get_mut(&target).ok_or(BackendError::UnknownTarget)?;
        let bpp = format.bytes_per_pixel();

        for (row, y) in (rect.y..rect.bottom()).enumerate() {
            for (col, x) in (rect.x..rect.right()).enumerate() {
                let offset = row * row_bytes + col * bpp;
                let color = decode(&src[offset..offset + bpp], format)?;
                let i = surface.index(x, y);
                surface.store(i, color);
            }
        }
        Ok(())
    }
}

fn encode(c: Color, format: PixelFormat) -> Result<[u8; 4], BackendError> {
    let [r, g, b, a] = c.to_rgba8_premul();
    match format {
        PixelFormat::Rgba8Unorm | PixelFormat::Rgba8UnormSrgb => Ok([r, g, b, a]),
        PixelFormat::Bgra8Unorm => Ok([b, g, r, a]),
        PixelFormat::R8Unorm => Ok([a, 0, 0, 0]),
        PixelFormat::Rgba16Float => Err(BackendError::Unsupported("half-float pixel transfer")),
    }
}

fn decode(px: &[u8], format: PixelFormat) -> Result<Color, BackendError> {
    match format {
        PixelFormat::Rgba8Unorm | PixelFormat::Rgba8UnormSrgb => {
            Ok(Color::from_rgba8_premul([px[0], px[1], px[2], px[3]]))
        }
        PixelFormat::Bgra8Unorm => Ok(Color::from_rgba8_premul([px[2], px[1], px[0], px[3]])),
        PixelFormat::R8Unorm => {
            let a = px[0] as f32 / 255.0;
            Ok(Color::from_premul(0.0, 0.0, 0.0, a))
        }
        PixelFormat::Rgba16Float => Err(BackendError::Unsupported("half-float pixel transfer")),
    }
}

// ── rasterization ────────────────────────────────────────────────────────────

const TRIANGLE_BYTES: usize = 3 * std::mem::size_of::<u32>();

/// Rejects buffers the program's vertex layout cannot be bound to.
fn check_buffers(mesh: &MeshCall<'_>) -> Result<(), BackendError> {
    let span = mesh
        .program
        .wgpu_attributes()
        .last()
        .map_or(0, |a| a.offset + a.format.size());
    debug_assert_eq!(span, mesh.program.vertex_stride());
    if span > std::mem::size_of::<Vertex>() as u64 {
        return Err(BackendError::Unsupported("vertex layout wider than a vertex"));
    }
    if mesh.index_bytes().len() % TRIANGLE_BYTES != 0 {
        return Err(BackendError::Unsupported("index buffer ends mid-triangle"));
    }
    debug_assert_eq!(mesh.vertex_bytes().len(), mesh.vertices.len() * std::mem::size_of::<Vertex>());
    Ok(())
}

#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Top-left rule for positively oriented triangles in y-down space.
#[inline]
fn is_top_left(a: Vec2, b: Vec2) -> bool {
    let d = b - a;
    (d.y == 0.0 && d.x > 0.0) || d.y < 0.0
}

#[inline]
fn covers(w: f32, a: Vec2, b: Vec2) -> bool {
    w > 0.0 || (w == 0.0 && is_top_left(a, b))
}

#[inline]
fn position(v: &Vertex) -> Vec2 {
    Vec2::new(v.position[0], v.position[1])
}

fn lerp3<const N: usize>(a: [f32; N], b: [f32; N], c: [f32; N], w: [f32; 3]) -> [f32; N] {
    std::array::from_fn(|i| a[i] * w[0] + b[i] * w[1] + c[i] * w[2])
}

fn draw_mesh(dst: &mut Surface, mesh: &MeshCall<'_>, surfaces: &HashMap<LiveTargetId, Surface>) {
    let Some(clip) = mesh.scissor.map_or(Some(dst.bounds()), |s| s.intersect(dst.bounds())) else {
        return;
    };
    let uses_coverage = mesh.program.uses_coverage();
    let blend = mesh.paint.blend();
    let mut sample = |target: TargetId, p: Vec2| {
        mesh.texture(target)
            .and_then(|live| surfaces.get(&live))
            .map_or(Color::TRANSPARENT, |s| s.sample(p))
    };

    for tri in mesh.indices.chunks_exact(3) {
        let (Some(va), Some(vb), Some(vc)) = (
            mesh.vertices.get(tri[0] as usize),
            mesh.vertices.get(tri[1] as usize),
            mesh.vertices.get(tri[2] as usize),
        ) else {
            continue;
        };
        let (mut vb, mut vc) = (vb, vc);

        let mut area = edge(position(va), position(vb), position(vc));
        if area == 0.0 || !area.is_finite() {
            continue;
        }
        let winding = if area < 0.0 {
            std::mem::swap(&mut vb, &mut vc);
            area = -area;
            -1
        } else {
            1
        };
        let (pa, pb, pc) = (position(va), position(vb), position(vc));

        let x0 = pa.x.min(pb.x).min(pc.x).floor().max(clip.x as f32) as i32;
        let y0 = pa.y.min(pb.y).min(pc.y).floor().max(clip.y as f32) as i32;
        let x1 = (pa.x.max(pb.x).max(pc.x).ceil() as i32).min(clip.right());
        let y1 = (pa.y.max(pb.y).max(pc.y).ceil() as i32).min(clip.bottom());

        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(pb, pc, p);
                let w1 = edge(pc, pa, p);
                let w2 = edge(pa, pb, p);
                if !(covers(w0, pb, pc) && covers(w1, pc, pa) && covers(w2, pa, pb)) {
                    continue;
                }
                let idx = dst.index(x, y);

                match mesh.stencil {
                    StencilMode::Write(FillRule::NonZero) => {
                        dst.stencil[idx] += winding;
                        continue;
                    }
                    StencilMode::Write(FillRule::EvenOdd) => {
                        dst.stencil[idx] ^= 1;
                        continue;
                    }
                    StencilMode::TestAndReset => {
                        if dst.stencil[idx] == 0 {
                            continue;
                        }
                        dst.stencil[idx] = 0;
                    }
                    StencilMode::Disabled => {}
                }

                let w = [w0 / area, w1 / area, w2 / area];
                let color = Color::from_array(lerp3(va.color, vb.color, vc.color, w));
                let mut src = match mesh.paint.shader() {
                    Some(shader) => {
                        let local = lerp3(va.local, vb.local, vc.local, w);
                        shader.eval(Vec2::new(local[0], local[1]), &mut sample).scaled(color.a)
                    }
                    None => color,
                };
                if uses_coverage {
                    let cov = lerp3([va.coverage], [vb.coverage], [vc.coverage], w)[0];
                    src = src.scaled(cov.clamp(0.0, 1.0));
                }
                let blended = blend.apply(src, dst.pixels[idx]);
                dst.store(idx, blended);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Matrix, Rect};
    use crate::ops::{Geometry, GeometryProgram};
    use crate::paint::{AaType, BlendMode, Paint, PaintDescriptor};

    fn target(backend: &mut SoftwareBackend, w: u32, h: u32) -> LiveTargetId {
        backend
            .create_render_target(&RenderTargetDesc::new(w, h, PixelFormat::Rgba8Unorm))
            .unwrap()
            .id
    }

    fn quad(r: Rect, color: Color) -> Geometry {
        let mut g = Geometry::new();
        g.push_quad(r.corners(), &Matrix::identity(), color);
        g
    }

    fn submit_mesh(backend: &mut SoftwareBackend, id: LiveTargetId, g: &Geometry, paint: &Paint, stencil: StencilMode) {
        let program = GeometryProgram::for_paint(false, false);
        let desc = PaintDescriptor::new(paint, AaType::None);
        let call = PreparedCall::Mesh(MeshCall {
            program: &program,
            vertices: g.vertices(),
            indices: g.indices(),
            paint: &desc,
            scissor: None,
            stencil,
            textures: &[],
        });
        backend.submit(id, &call).unwrap();
    }

    // ── rasterization ──────────────────────────────────────────────────────

    #[test]
    fn shared_diagonal_is_drawn_once() {
        let mut b = SoftwareBackend::new();
        let id = target(&mut b, 4, 4);
        let half = Color::from_rgba8_premul([0, 0, 128, 128]);
        submit_mesh(&mut b, id, &quad(Rect::new(0.0, 0.0, 4.0, 4.0), half), &Paint::solid(half), StencilMode::Disabled);

        let inspector = b.inspector();
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(inspector.pixel(id, x, y), Some(half), "pixel {x},{y}");
            }
        }
    }

    #[test]
    fn pixel_centers_decide_coverage() {
        let mut b = SoftwareBackend::new();
        let id = target(&mut b, 4, 4);
        submit_mesh(
            &mut b,
            id,
            &quad(Rect::new(0.6, 0.0, 1.0, 1.0), Color::BLACK),
            &Paint::solid(Color::BLACK),
            StencilMode::Disabled,
        );
        let inspector = b.inspector();
        assert_eq!(inspector.pixel(id, 0, 0), Some(Color::TRANSPARENT));
        assert_eq!(inspector.pixel(id, 1, 0), Some(Color::BLACK));
    }

    #[test]
    fn stencil_then_cover_even_odd() {
        let mut b = SoftwareBackend::new();
        let id = target(&mut b, 8, 8);
        let mut stencil = quad(Rect::new(0.0, 0.0, 8.0, 8.0), Color::BLACK);
        stencil.append(&quad(Rect::new(2.0, 2.0, 4.0, 4.0), Color::BLACK));
        let paint = Paint::solid(Color::WHITE);
        submit_mesh(&mut b, id, &stencil, &paint, StencilMode::Write(FillRule::EvenOdd));
        submit_mesh(&mut b, id, &quad(Rect::new(0.0, 0.0, 8.0, 8.0), Color::WHITE), &paint, StencilMode::TestAndReset);

        let inspector = b.inspector();
        assert_eq!(inspector.pixel(id, 0, 0), Some(Color::WHITE));
        assert_eq!(inspector.pixel(id, 3, 3), Some(Color::TRANSPARENT));
    }

    #[test]
    fn scissor_limits_writes() {
        let mut b = SoftwareBackend::new();
        let id = target(&mut b, 4, 4);
        let g = quad(Rect::new(0.0, 0.0, 4.0, 4.0), Color::BLACK);
        let program = GeometryProgram::for_paint(false, false);
        let desc = PaintDescriptor::new(&Paint::solid(Color::BLACK).with_blend(BlendMode::Src), AaType::None);
        let call = PreparedCall::Mesh(MeshCall {
            program: &program,
            vertices: g.vertices(),
            indices: g.indices(),
            paint: &desc,
            scissor: Some(IRect::new(0, 0, 2, 4)),
            stencil: StencilMode::Disabled,
            textures: &[],
        });
        b.submit(id, &call).unwrap();
        let inspector = b.inspector();
        assert_eq!(inspector.pixel(id, 1, 1), Some(Color::BLACK));
        assert_eq!(inspector.pixel(id, 2, 1), Some(Color::TRANSPARENT));
    }

    #[test]
    fn layouts_wider_than_a_vertex_are_rejected() {
        let mut b = SoftwareBackend::new();
        let id = target(&mut b, 4, 4);
        let g = quad(Rect::new(0.0, 0.0, 4.0, 4.0), Color::BLACK);
        let program = GeometryProgram::with_attribute_count(1, 5);
        let desc = PaintDescriptor::new(&Paint::solid(Color::BLACK), AaType::None);
        let call = PreparedCall::Mesh(MeshCall {
            program: &program,
            vertices: g.vertices(),
            indices: g.indices(),
            paint: &desc,
            scissor: None,
            stencil: StencilMode::Disabled,
            textures: &[],
        });
        assert!(matches!(b.submit(id, &call), Err(BackendError::Unsupported(_))));
        assert_eq!(b.inspector().pixel(id, 1, 1), Some(Color::TRANSPARENT));
        assert!(b.inspector().submissions().is_empty());
    }

    #[test]
    fn partial_triangles_are_rejected() {
        let mut b = SoftwareBackend::new();
        let id = target(&mut b, 4, 4);
        let g = quad(Rect::new(0.0, 0.0, 4.0, 4.0), Color::BLACK);
        let program = GeometryProgram::for_paint(false, false);
        let desc = PaintDescriptor::new(&Paint::solid(Color::BLACK), AaType::None);
        let call = PreparedCall::Mesh(MeshCall {
            program: &program,
            vertices: g.vertices(),
            indices: &g.indices()[..4],
            paint: &desc,
            scissor: None,
            stencil: StencilMode::Disabled,
            textures: &[],
        });
        assert!(matches!(b.submit(id, &call), Err(BackendError::Unsupported(_))));
    }

    // ── copies ─────────────────────────────────────────────────────────────

    #[test]
    fn copy_moves_a_block_of_pixels() {
        let mut b = SoftwareBackend::new();
        let src = target(&mut b, 4, 4);
        let dst = target(&mut b, 4, 4);
        let red = Color::from_premul(1.0, 0.0, 0.0, 1.0);
        b.submit(src, &PreparedCall::Clear { rect: Some(IRect::new(1, 1, 2, 2)), color: red }).unwrap();
        b.copy_surface(dst, src, IRect::new(1, 1, 2, 2), IVec2::new(0, 2)).unwrap();

        let inspector = b.inspector();
        assert_eq!(inspector.pixel(dst, 0, 2), Some(red));
        assert_eq!(inspector.pixel(dst, 1, 3), Some(red));
        assert_eq!(inspector.pixel(dst, 2, 2), Some(Color::TRANSPARENT));
        assert_eq!(inspector.pixel(dst, 0, 1), Some(Color::TRANSPARENT));
        assert_eq!(
            inspector.submissions().last().map(|s| s.kind.clone()),
            Some(SubmissionKind::Copy { src, src_rect: IRect::new(1, 1, 2, 2), dst_point: IVec2::new(0, 2) })
        );
    }

    #[test]
    fn copy_outside_either_surface_fails() {
        let mut b = SoftwareBackend::new();
        let src = target(&mut b, 4, 4);
        let dst = target(&mut b, 2, 2);
        assert!(b.copy_surface(dst, src, IRect::new(3, 3, 2, 2), IVec2::new(0, 0)).is_err());
        assert!(b.copy_surface(dst, src, IRect::new(0, 0, 2, 2), IVec2::new(1, 0)).is_err());
        assert!(b.copy_surface(src, src, IRect::new(0, 0, 1, 1), IVec2::new(2, 2)).is_err());
        assert!(b.inspector().submissions().is_empty());
    }

    // ── pixel transfer / lifecycle ─────────────────────────────────────────

    #[test]
    fn bgra_swizzles_on_read() {
        let mut b = SoftwareBackend::new();
        let id = target(&mut b, 1, 1);
        let red = Color::from_premul(1.0, 0.0, 0.0, 1.0);
        b.submit(id, &PreparedCall::Clear { rect: None, color: red }).unwrap();
        let mut out = [0u8; 4];
        b.read_pixels(id, IRect::from_wh(1, 1), PixelFormat::Bgra8Unorm, &mut out, 4).unwrap();
        assert_eq!(out, [0, 0, 255, 255]);
    }

    #[test]
    fn abandoned_backend_rejects_work() {
        let mut b = SoftwareBackend::new();
        let id = target(&mut b, 1, 1);
        b.abandon();
        assert_eq!(
            b.submit(id, &PreparedCall::Discard),
            Err(BackendError::Abandoned)
        );
        assert!(b.create_render_target(&RenderTargetDesc::new(1, 1, PixelFormat::Rgba8Unorm)).is_err());
    }

    #[test]
    fn released_targets_are_gone() {
        let mut b = SoftwareBackend::new();
        let id = target(&mut b, 1, 1);
        b.release_render_target(id);
        assert!(!b.inspector().is_live(id));
        assert_eq!(b.inspector().allocation_count(), 1);
    }
}
