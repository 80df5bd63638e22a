use crate::types::{CoordSys, FaceWinding, Mesh, MeshGroup};

impl MeshGroup {
    /// Converts the triangles to `winding` by swapping corners `b` and `c`.
    /// No-op when the group already uses that winding.
    pub fn set_face_winding(&mut self, winding: FaceWinding) {
        if self.winding == winding {
            return;
        }
        for tri in &mut self.tris {
            // 0 1 2 --> 0 2 1
            std::mem::swap(&mut tri.b, &mut tri.c);
        }
        self.winding = winding;
    }

    /// Converts positions and normals to `target` by mirroring the X axis.
    /// No-op when the group already uses that system.
    pub fn set_coord_sys(&mut self, target: CoordSys) {
        if self.coord_sys == target {
            return;
        }
        for v in &mut self.verts {
            v.x = -v.x;
        }
        for n in &mut self.normals {
            n.x = -n.x;
        }
        self.coord_sys = target;
    }
}

impl Mesh {
    pub fn set_face_winding(&mut self, winding: FaceWinding) {
        for group in &mut self.groups {
            group.set_face_winding(winding);
        }
    }

    pub fn set_coord_sys(&mut self, target: CoordSys) {
        for group in &mut self.groups {
            group.set_coord_sys(target);
        }
    }
}
