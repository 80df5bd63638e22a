use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// One triangle corner: indices into the owning group's attribute arrays.
///
/// The position index is always set. `None` marks an attribute this corner
/// does not carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VertexDescr {
    /// Position index.
    pub v: u32,
    /// Texture coordinate index.
    pub t: Option<u32>,
    /// Normal index.
    pub n: Option<u32>,
    /// Color index.
    pub c: Option<u32>,
}

impl VertexDescr {
    /// A corner that only references a position.
    pub const fn new(v: u32) -> Self {
        Self {
            v,
            t: None,
            n: None,
            c: None,
        }
    }

    /// A corner that references position, UV and normal.
    pub const fn with(v: u32, t: Option<u32>, n: Option<u32>) -> Self {
        Self { v, t, n, c: None }
    }

    /// Whether two corners carry the same attribute tuple and may therefore
    /// share a position.
    pub fn same_attributes(&self, other: &VertexDescr) -> bool {
        self.t == other.t && self.n == other.n && self.c == other.c
    }
}

/// Three ordered corners. Corner order encodes the winding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Triangle {
    pub a: VertexDescr,
    pub b: VertexDescr,
    pub c: VertexDescr,
}

impl Triangle {
    pub const fn new(a: VertexDescr, b: VertexDescr, c: VertexDescr) -> Self {
        Self { a, b, c }
    }

    /// Triangle that only references positions.
    pub const fn from_positions(a: u32, b: u32, c: u32) -> Self {
        Self::new(VertexDescr::new(a), VertexDescr::new(b), VertexDescr::new(c))
    }

    pub fn corners(&self) -> [&VertexDescr; 3] {
        [&self.a, &self.b, &self.c]
    }

    pub fn corners_mut(&mut self) -> [&mut VertexDescr; 3] {
        [&mut self.a, &mut self.b, &mut self.c]
    }

    pub fn contains_vertex_id(&self, vertex_id: u32) -> bool {
        self.a.v == vertex_id || self.b.v == vertex_id || self.c.v == vertex_id
    }

    /// Position indices in corner order.
    pub fn positions(&self) -> [u32; 3] {
        [self.a.v, self.b.v, self.c.v]
    }
}

impl std::fmt::Display for Triangle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{},{},{}}}", self.a.v, self.b.v, self.c.v)
    }
}

/// Common game-engine vertex: position, UV and normal, tightly packed.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct BasicVertex {
    pub pos: Vec3,
    pub uv: Vec2,
    pub norm: Vec3,
}

/// A weighted vertex selection entry. The weight is carried along but not
/// used by [`MeshGroup::normal_for_selection`](crate::MeshGroup::normal_for_selection).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightId {
    pub id: u32,
    pub weight: f32,
}

impl WeightId {
    pub const fn new(id: u32, weight: f32) -> Self {
        Self { id, weight }
    }
}
