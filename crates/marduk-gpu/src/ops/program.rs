use std::borrow::Cow;

/// Vertex layout shared by every built-in op.
///
/// Programs that do not declare an attribute simply ignore the field.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Device-space position.
    pub position: [f32; 2],
    /// Shader-space coordinates.
    pub local: [f32; 2],
    /// Premultiplied color.
    pub color: [f32; 4],
    /// Analytic AA coverage in `0..=1`.
    pub coverage: f32,
}

impl Vertex {
    #[inline]
    pub fn new(position: [f32; 2], local: [f32; 2], color: [f32; 4], coverage: f32) -> Self {
        Self { position, local, color, coverage }
    }
}

/// Family of a geometry program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ProgramKind {
    /// position + color
    Color,
    /// position + color + coverage
    ColorCoverage,
    /// position + local + color
    Textured,
    /// position + local + color + coverage
    TexturedCoverage,
    /// Externally described program (text drawers, tests).
    Custom(u32),
}

/// One declared vertex input.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttribute {
    pub name: Cow<'static, str>,
    pub format: wgpu::VertexFormat,
}

impl VertexAttribute {
    pub const fn new(name: &'static str, format: wgpu::VertexFormat) -> Self {
        Self { name: Cow::Borrowed(name), format }
    }
}

const POSITION: VertexAttribute = VertexAttribute::new("position", wgpu::VertexFormat::Float32x2);
const LOCAL: VertexAttribute = VertexAttribute::new("local", wgpu::VertexFormat::Float32x2);
const COLOR: VertexAttribute = VertexAttribute::new("color", wgpu::VertexFormat::Float32x4);
const COVERAGE: VertexAttribute = VertexAttribute::new("coverage", wgpu::VertexFormat::Float32);

/// Declares how an op's vertices feed the device: the attribute list the
/// backend must be able to bind.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct GeometryProgram {
    kind: ProgramKind,
    attributes: Vec<VertexAttribute>,
}

impl GeometryProgram {
    /// Built-in program for a paint that does (not) need local coordinates and
    /// analytic coverage.
    pub fn for_paint(textured: bool, coverage: bool) -> Self {
        let kind = match (textured, coverage) {
            (false, false) => ProgramKind::Color,
            (false, true) => ProgramKind::ColorCoverage,
            (true, false) => ProgramKind::Textured,
            (true, true) => ProgramKind::TexturedCoverage,
        };
        let mut attributes = vec![POSITION];
        if textured {
            attributes.push(LOCAL);
        }
        attributes.push(COLOR);
        if coverage {
            attributes.push(COVERAGE);
        }
        Self { kind, attributes }
    }

    /// Program with an explicit attribute list.
    pub fn custom(id: u32, attributes: Vec<VertexAttribute>) -> Self {
        Self { kind: ProgramKind::Custom(id), attributes }
    }

    /// Custom program declaring `count` two-float attributes.
    pub fn with_attribute_count(id: u32, count: usize) -> Self {
        let attributes = (0..count)
            .map(|i| VertexAttribute {
                name: Cow::Owned(format!("attr{i}")),
                format: wgpu::VertexFormat::Float32x2,
            })
            .collect();
        Self::custom(id, attributes)
    }

    #[inline]
    pub fn kind(&self) -> ProgramKind {
        self.kind
    }

    #[inline]
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    #[inline]
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    #[inline]
    pub fn uses_local_coords(&self) -> bool {
        matches!(self.kind, ProgramKind::Textured | ProgramKind::TexturedCoverage)
    }

    #[inline]
    pub fn uses_coverage(&self) -> bool {
        matches!(self.kind, ProgramKind::ColorCoverage | ProgramKind::TexturedCoverage)
    }

    /// Packed stride of the declared attributes.
    pub fn vertex_stride(&self) -> u64 {
        self.attributes.iter().map(|a| a.format.size()).sum()
    }

    /// Attribute descriptors for a tightly packed wgpu vertex buffer layout.
    pub fn wgpu_attributes(&self) -> Vec<wgpu::VertexAttribute> {
        let mut offset = 0;
        self.attributes
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let attr = wgpu::VertexAttribute {
                    format: a.format,
                    offset,
                    shader_location: i as u32,
                };
                offset += a.format.size();
                attr
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 9 * 4);
        let v = [Vertex::new([1.0, 2.0], [0.0; 2], [1.0; 4], 1.0)];
        assert_eq!(bytemuck::cast_slice::<Vertex, u8>(&v).len(), 36);
    }

    #[test]
    fn paint_programs_declare_what_they_read() {
        assert_eq!(GeometryProgram::for_paint(false, false).attribute_count(), 2);
        assert_eq!(GeometryProgram::for_paint(true, true).attribute_count(), 4);
        let p = GeometryProgram::for_paint(true, false);
        assert!(p.uses_local_coords() && !p.uses_coverage());
        assert_eq!(p.vertex_stride(), 8 + 8 + 16);
    }

    #[test]
    fn wgpu_offsets_accumulate() {
        let attrs = GeometryProgram::for_paint(false, true).wgpu_attributes();
        let offsets: Vec<u64> = attrs.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 8, 24]);
        assert_eq!(attrs[2].shader_location, 2);
    }

    #[test]
    fn explicit_attribute_count() {
        let p = GeometryProgram::with_attribute_count(7, 17);
        assert_eq!(p.attribute_count(), 17);
        assert_eq!(p.kind(), ProgramKind::Custom(7));
        assert_eq!(p.attributes()[3].name, "attr3");
    }
}
