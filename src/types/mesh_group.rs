use std::sync::Arc;

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use tracing::info;

use super::bbox::BoundingBox;
use super::material::Material;
use super::vertex::Triangle;

/// How an attribute array relates to positions and faces, and how corners
/// index into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MapMode {
    /// No attribute data.
    #[default]
    None,
    /// One value per position; every corner's attribute index equals its
    /// position index.
    PerVertex,
    /// Each corner carries its own attribute index; the array may be longer
    /// than the position array.
    PerFaceVertex,
    /// One value per triangle, shared by its three corners.
    PerFace,
    /// Inconsistent mapping. Must be flattened before further editing.
    SharedElements,
}

impl MapMode {
    pub fn as_str(self) -> &'static str {
        match self {
            MapMode::None => "None",
            MapMode::PerVertex => "PerVertex",
            MapMode::PerFaceVertex => "PerFaceVertex",
            MapMode::PerFace => "PerFace",
            MapMode::SharedElements => "SharedElements",
        }
    }
}

impl std::fmt::Display for MapMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rotational order of triangle corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FaceWinding {
    /// Clockwise.
    #[default]
    Cw,
    /// Counter-clockwise.
    Ccw,
}

/// Handedness of the coordinate system the positions are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CoordSys {
    /// OpenGL-style right-handed system.
    #[default]
    RightHanded,
    /// Game-engine style left-handed system.
    LeftHanded,
}

/// One submesh: attribute arrays, triangles and the modes describing how the
/// triangles index into the arrays.
///
/// Corner indices are local to the group. A group can reference a material
/// that other groups share.
#[derive(Debug, Clone)]
pub struct MeshGroup {
    /// Creation-order index inside the owning mesh.
    pub group_id: usize,
    pub name: String,
    pub material: Option<Arc<Material>>,

    /// Local translation.
    pub offset: Vec3,
    /// Local rotation, XYZ Euler angles in degrees.
    pub rotation: Vec3,
    /// Local scale.
    pub scale: Vec3,

    pub verts: Vec<Vec3>,
    pub coords: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub tris: Vec<Triangle>,

    pub coords_mapping: MapMode,
    pub normals_mapping: MapMode,
    pub colors_mapping: MapMode,

    pub winding: FaceWinding,
    pub coord_sys: CoordSys,
}

impl Default for MeshGroup {
    fn default() -> Self {
        Self {
            group_id: 0,
            name: String::new(),
            material: None,
            offset: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            verts: Vec::new(),
            coords: Vec::new(),
            normals: Vec::new(),
            colors: Vec::new(),
            tris: Vec::new(),
            coords_mapping: MapMode::None,
            normals_mapping: MapMode::None,
            colors_mapping: MapMode::None,
            winding: FaceWinding::default(),
            coord_sys: CoordSys::default(),
        }
    }
}

impl MeshGroup {
    pub fn new(group_id: usize, name: impl Into<String>) -> Self {
        Self {
            group_id,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn num_verts(&self) -> usize {
        self.verts.len()
    }

    pub fn num_coords(&self) -> usize {
        self.coords.len()
    }

    pub fn num_normals(&self) -> usize {
        self.normals.len()
    }

    pub fn num_colors(&self) -> usize {
        self.colors.len()
    }

    pub fn num_tris(&self) -> usize {
        self.tris.len()
    }

    pub fn has_coords(&self) -> bool {
        !self.coords.is_empty()
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn has_colors(&self) -> bool {
        !self.colors.is_empty()
    }

    /// Whether the group has no faces.
    pub fn is_empty(&self) -> bool {
        self.tris.is_empty()
    }

    /// Whether the group holds any geometry worth keeping.
    pub fn is_valid(&self) -> bool {
        !self.verts.is_empty() && !self.tris.is_empty()
    }

    /// Replaces the group's material with a fresh default one named `name`.
    ///
    /// The new material is owned by this group alone until the group is
    /// cloned or the `Arc` is shared explicitly.
    pub fn create_material(&mut self, name: impl Into<String>) -> &mut Material {
        let material = self.material.insert(Arc::new(Material::new(name)));
        Arc::make_mut(material)
    }

    /// Sets the color of one position, allocating per-vertex colors first
    /// when the group has none.
    ///
    /// # Panics
    /// When `vertex_id` is not a valid position index.
    pub fn set_vertex_color(&mut self, vertex_id: u32, color: Vec3) {
        let id = vertex_id as usize;
        assert!(
            id < self.verts.len(),
            "invalid vertex id {id} >= num_verts {}",
            self.verts.len()
        );
        if self.colors.is_empty() {
            self.colors = vec![Vec3::ZERO; self.verts.len()];
            self.colors_mapping = MapMode::PerVertex;
            for tri in &mut self.tris {
                for vd in tri.corners_mut() {
                    vd.c = Some(vd.v);
                }
            }
        }
        self.colors[id] = color;
    }

    /// Whether positions and every populated attribute are stored one slot
    /// per triangle corner.
    pub fn is_flattened(&self) -> bool {
        self.verts.len() == self.tris.len() * 3
            && [self.coords_mapping, self.normals_mapping, self.colors_mapping]
                .iter()
                .all(|m| matches!(m, MapMode::None | MapMode::PerFaceVertex))
    }

    pub fn calculate_bbox(&self) -> BoundingBox {
        BoundingBox::from_points(&self.verts)
    }

    /// Local transform built from `scale`, then `rotation`, then `offset`.
    pub fn local_transform(&self) -> Mat4 {
        let r = self.rotation * (std::f32::consts::PI / 180.0);
        let rotation = Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z);
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.offset)
    }

    /// Logs one line of diagnostics for this group.
    pub fn log_summary(&self) {
        info!(
            group = %self.name,
            verts = self.num_verts(),
            tris = self.num_tris(),
            uvs = self.num_coords(),
            normals = self.num_normals(),
            colors = self.num_colors(),
            material = self.material.as_ref().map_or("", |m| m.name.as_str()),
            offset = ?self.offset,
            "Mesh group"
        );
    }
}
