use glam::Vec3;

use crate::types::{Mesh, MeshGroup, Ray, Triangle, VertexDescr};

/// The nearest triangle hit by a ray.
#[derive(Debug, Clone, Copy)]
pub struct PickedTriangle<'a> {
    pub group: &'a MeshGroup,
    pub face: &'a Triangle,
    face_id: usize,
    /// Ray parameter of the hit, always positive.
    pub distance: f32,
}

impl<'a> PickedTriangle<'a> {
    /// Index of the picked triangle inside its group.
    pub fn id(&self) -> usize {
        self.face_id
    }

    /// Centroid of the picked triangle.
    pub fn center(&self) -> Vec3 {
        (self.vertex(&self.face.a) + self.vertex(&self.face.b) + self.vertex(&self.face.c)) / 3.0
    }

    /// Position of one corner.
    ///
    /// # Panics
    /// When the corner's position index is out of range.
    pub fn vertex(&self, vd: &VertexDescr) -> Vec3 {
        let verts = &self.group.verts;
        assert!(
            (vd.v as usize) < verts.len(),
            "invalid vertex descriptor: {} / {}",
            vd.v,
            verts.len()
        );
        verts[vd.v as usize]
    }
}

impl std::fmt::Display for PickedTriangle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{},{}}}", self.group.group_id, self.face)
    }
}

impl MeshGroup {
    /// Nearest triangle hit by `ray` at a strictly positive distance.
    pub fn pick_triangle(&self, ray: &Ray) -> Option<PickedTriangle<'_>> {
        let mut picked: Option<PickedTriangle<'_>> = None;
        for (face_id, tri) in self.tris.iter().enumerate() {
            let [a, b, c] = tri.positions().map(|i| self.verts[i as usize]);
            let Some(distance) = ray.intersect_triangle(a, b, c) else {
                continue;
            };
            if picked.is_none_or(|p| distance < p.distance) {
                picked = Some(PickedTriangle {
                    group: self,
                    face: tri,
                    face_id,
                    distance,
                });
            }
        }
        picked
    }
}

impl Mesh {
    /// Nearest triangle hit by `ray` over all groups.
    pub fn pick_triangle(&self, ray: &Ray) -> Option<PickedTriangle<'_>> {
        self.groups
            .iter()
            .filter_map(|g| g.pick_triangle(ray))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
