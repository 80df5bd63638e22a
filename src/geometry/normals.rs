use glam::Vec3;

use crate::types::{FaceWinding, MapMode, Mesh, MeshGroup, VertexDescr, WeightId};

impl MeshGroup {
    /// Accumulates the unnormalized normal of triangle `(vd0, vd1, vd2)`.
    ///
    /// With `check_duplicate_verts` every corner of the group whose position
    /// equals one of the three triangle positions receives the contribution,
    /// so unwelded vertices at the same point end up with the same normal.
    /// Otherwise only the three corners' own normal slots are updated.
    ///
    /// # Panics
    /// When a receiving corner has no normal index.
    pub fn update_normal(
        &mut self,
        vd0: &VertexDescr,
        vd1: &VertexDescr,
        vd2: &VertexDescr,
        check_duplicate_verts: bool,
    ) {
        let v0 = self.verts[vd0.v as usize];
        let v1 = self.verts[vd1.v as usize];
        let v2 = self.verts[vd2.v as usize];
        let normal = (v1 - v0).cross(v2 - v0);

        if !check_duplicate_verts {
            for vd in [vd0, vd1, vd2] {
                self.normals[normal_slot(vd)] += normal;
            }
            return;
        }

        for tri in &self.tris {
            for vd in tri.corners() {
                let v = self.verts[vd.v as usize];
                if v == v0 || v == v1 || v == v2 {
                    self.normals[normal_slot(vd)] += normal;
                }
            }
        }
    }

    /// Recomputes every normal from the triangles.
    ///
    /// A group without normals gets per-vertex normals allocated first.
    /// Duplicate checking is quadratic in the number of corners.
    pub fn recalculate_normals(&mut self, check_duplicate_verts: bool) {
        if self.normals.is_empty() {
            self.normals = vec![Vec3::ZERO; self.verts.len()];
            self.normals_mapping = MapMode::PerVertex;
            for tri in &mut self.tris {
                for vd in tri.corners_mut() {
                    vd.n = Some(vd.v);
                }
            }
        } else {
            self.normals.fill(Vec3::ZERO);
        }

        for i in 0..self.tris.len() {
            let tri = self.tris[i];
            match self.winding {
                FaceWinding::Ccw => self.update_normal(&tri.a, &tri.b, &tri.c, check_duplicate_verts),
                FaceWinding::Cw => self.update_normal(&tri.c, &tri.b, &tri.a, check_duplicate_verts),
            }
        }

        for n in &mut self.normals {
            *n = n.normalize_or_zero();
        }
    }

    /// Averaged normal of the selected positions.
    ///
    /// Weights are ignored. Returns zero for an empty selection or when the
    /// normals are not stored per vertex.
    pub fn normal_for_selection(&self, selection: &[WeightId]) -> Vec3 {
        if selection.is_empty() || self.normals_mapping != MapMode::PerVertex {
            return Vec3::ZERO;
        }
        selection
            .iter()
            .map(|wid| self.normals[wid.id as usize])
            .sum::<Vec3>()
            .normalize_or_zero()
    }

    pub fn invert_normals(&mut self) {
        for n in &mut self.normals {
            *n = -*n;
        }
    }
}

fn normal_slot(vd: &VertexDescr) -> usize {
    match vd.n {
        Some(n) => n as usize,
        None => panic!("invalid vertex normal: corner {} has no normal index", vd.v),
    }
}

impl Mesh {
    pub fn recalculate_normals(&mut self, check_duplicate_verts: bool) {
        for group in &mut self.groups {
            group.recalculate_normals(check_duplicate_verts);
        }
    }

    pub fn invert_normals(&mut self) {
        for group in &mut self.groups {
            group.invert_normals();
        }
    }
}
