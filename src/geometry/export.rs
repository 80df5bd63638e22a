use glam::{Vec2, Vec3};

use crate::types::{
    BasicVertex, CoordSys, FaceWinding, MapMode, Material, Mesh, MeshGroup, Triangle,
};

impl MeshGroup {
    /// Flat position index buffer, three indices per triangle.
    ///
    /// Corners `b` and `c` are swapped in the output when `winding` differs
    /// from the group's own winding.
    pub fn create_index_array(&self, winding: FaceWinding) -> Vec<u32> {
        let flip = self.winding != winding;
        let mut indices = Vec::with_capacity(self.tris.len() * 3);
        for tri in &self.tris {
            if flip {
                indices.extend_from_slice(&[tri.a.v, tri.c.v, tri.b.v]);
            } else {
                indices.extend_from_slice(&tri.positions());
            }
        }
        indices
    }

    /// Index buffer in the group's own winding.
    pub fn index_array(&self) -> Vec<u32> {
        self.create_index_array(self.winding)
    }

    /// One `(pos, uv, norm)` vertex per triangle corner with sequential
    /// indices. Unset attributes are zero.
    pub fn create_game_vertex_data(&self) -> (Vec<BasicVertex>, Vec<u32>) {
        let vertices: Vec<BasicVertex> = self
            .tris
            .iter()
            .flat_map(|tri| tri.corners())
            .map(|vd| BasicVertex {
                pos: self.verts[vd.v as usize],
                uv: vd.t.map_or(Vec2::ZERO, |t| self.coords[t as usize]),
                norm: vd.n.map_or(Vec3::ZERO, |n| self.normals[n as usize]),
            })
            .collect();
        let indices = (0..vertices.len() as u32).collect();
        (vertices, indices)
    }

    /// Read-only view over this group's data.
    pub fn view(&self) -> GroupView<'_> {
        GroupView {
            group_id: self.group_id,
            name: &self.name,
            material: self.material.as_deref(),
            verts: &self.verts,
            coords: &self.coords,
            normals: &self.normals,
            colors: &self.colors,
            tris: &self.tris,
            coords_mapping: self.coords_mapping,
            normals_mapping: self.normals_mapping,
            colors_mapping: self.colors_mapping,
            winding: self.winding,
            coord_sys: self.coord_sys,
        }
    }
}

/// Borrowed view of one group, valid while the mesh is not mutated.
///
/// Meant for bindings that hand raw array pointers to foreign code: the
/// slices can be exposed directly, with `bytemuck` when bytes are needed.
#[derive(Debug, Clone, Copy)]
pub struct GroupView<'a> {
    pub group_id: usize,
    pub name: &'a str,
    pub material: Option<&'a Material>,
    pub verts: &'a [Vec3],
    pub coords: &'a [Vec2],
    pub normals: &'a [Vec3],
    pub colors: &'a [Vec3],
    pub tris: &'a [Triangle],
    pub coords_mapping: MapMode,
    pub normals_mapping: MapMode,
    pub colors_mapping: MapMode,
    pub winding: FaceWinding,
    pub coord_sys: CoordSys,
}

impl<'a> GroupView<'a> {
    /// Positions as a flat `[x, y, z, ...]` slice.
    pub fn vertex_floats(&self) -> &'a [f32] {
        bytemuck::cast_slice(self.verts)
    }

    pub fn coord_floats(&self) -> &'a [f32] {
        bytemuck::cast_slice(self.coords)
    }

    pub fn normal_floats(&self) -> &'a [f32] {
        bytemuck::cast_slice(self.normals)
    }
}

impl Mesh {
    /// Views of every group in order.
    pub fn views(&self) -> impl Iterator<Item = GroupView<'_>> {
        self.groups.iter().map(MeshGroup::view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VertexDescr;

    fn quad() -> MeshGroup {
        let mut g = MeshGroup::new(0, "quad");
        g.verts = vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y];
        g.coords = vec![Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];
        g.tris = vec![
            Triangle::new(
                VertexDescr::with(0, Some(0), None),
                VertexDescr::with(1, Some(1), None),
                VertexDescr::with(2, Some(2), None),
            ),
            Triangle::new(
                VertexDescr::with(0, Some(0), None),
                VertexDescr::with(2, Some(2), None),
                VertexDescr::with(3, Some(3), None),
            ),
        ];
        g.coords_mapping = MapMode::PerVertex;
        g.winding = FaceWinding::Ccw;
        g
    }

    #[test]
    fn index_array_in_own_winding() {
        let g = quad();
        assert_eq!(g.index_array(), vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(g.create_index_array(FaceWinding::Ccw), g.index_array());
    }

    #[test]
    fn index_array_flips_other_winding() {
        let g = quad();
        assert_eq!(g.create_index_array(FaceWinding::Cw), vec![0, 2, 1, 0, 3, 2]);
    }

    #[test]
    fn game_vertex_data_is_per_corner() {
        let g = quad();
        let (vertices, indices) = g.create_game_vertex_data();

        assert_eq!(vertices.len(), 6);
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(vertices[4].pos, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(vertices[4].uv, Vec2::ONE);
        assert_eq!(vertices[4].norm, Vec3::ZERO);
    }

    #[test]
    fn view_borrows_group_arrays() {
        let mut g = quad();
        g.create_material("paint");
        let view = g.view();

        assert_eq!(view.name, "quad");
        assert_eq!(view.material.map(|m| m.name.as_str()), Some("paint"));
        assert_eq!(view.verts.len(), 4);
        assert_eq!(view.vertex_floats().len(), 12);
        assert_eq!(view.coord_floats()[4..6], [1.0, 1.0]);
        assert!(view.normal_floats().is_empty());
        assert_eq!(view.coords_mapping, MapMode::PerVertex);
    }

    #[test]
    fn mesh_views_follow_group_order() {
        let mut mesh = Mesh::new("m");
        mesh.create_group("a");
        mesh.create_group("b");
        let names: Vec<_> = mesh.views().map(|v| v.name).collect();
        assert_eq!(names, ["a", "b"]);
    }
}
