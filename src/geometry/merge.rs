use glam::Vec3;

use crate::types::{MapMode, Mesh, MeshGroup};

impl MeshGroup {
    /// Appends the arrays and triangles of `other`, moving its positions by
    /// `offset`.
    ///
    /// Appended corner indices are re-based by the prior array lengths. When
    /// only one side has colors the other side is backfilled with zero colors,
    /// one per position.
    pub fn add_mesh_data(&mut self, other: &MeshGroup, offset: Vec3) {
        let num_verts_old = self.verts.len() as u32;
        let num_coords_old = self.coords.len() as u32;
        let num_normals_old = self.normals.len() as u32;
        let num_tris_old = self.tris.len();

        let mut other_colors_mapping = other.colors_mapping;
        if !self.has_colors() && other.has_colors() {
            self.colors = vec![Vec3::ZERO; self.verts.len()];
            self.colors_mapping = MapMode::PerVertex;
            for tri in &mut self.tris {
                for vd in tri.corners_mut() {
                    vd.c = Some(vd.v);
                }
            }
        }
        let colors_base = self.colors.len() as u32;
        let backfill_other = self.has_colors() && !other.has_colors();

        self.verts.extend(other.verts.iter().map(|v| *v + offset));
        self.coords.extend_from_slice(&other.coords);
        self.normals.extend_from_slice(&other.normals);
        if backfill_other {
            self.colors.resize(self.colors.len() + other.verts.len(), Vec3::ZERO);
            other_colors_mapping = MapMode::PerVertex;
        } else {
            self.colors.extend_from_slice(&other.colors);
        }

        self.tris.extend_from_slice(&other.tris);
        for tri in &mut self.tris[num_tris_old..] {
            for vd in tri.corners_mut() {
                if backfill_other {
                    vd.c = Some(colors_base + vd.v);
                } else if let Some(c) = &mut vd.c {
                    *c += colors_base;
                }
                vd.v += num_verts_old;
                if let Some(t) = &mut vd.t {
                    *t += num_coords_old;
                }
                if let Some(n) = &mut vd.n {
                    *n += num_normals_old;
                }
            }
        }

        let num_verts = self.verts.len();
        let num_tris = self.tris.len();
        self.coords_mapping = reconcile(
            merged_mode(self.coords_mapping, other.coords_mapping),
            self.coords.len(),
            num_verts,
            num_tris,
        );
        self.normals_mapping = reconcile(
            merged_mode(self.normals_mapping, other.normals_mapping),
            self.normals.len(),
            num_verts,
            num_tris,
        );
        self.colors_mapping = reconcile(
            merged_mode(self.colors_mapping, other_colors_mapping),
            self.colors.len(),
            num_verts,
            num_tris,
        );
    }
}

fn merged_mode(mine: MapMode, theirs: MapMode) -> MapMode {
    match (mine, theirs) {
        (a, b) if a == b => a,
        (MapMode::None, b) => b,
        (a, MapMode::None) => a,
        _ => MapMode::SharedElements,
    }
}

/// Demotes a merged mode whose array length no longer fits it.
fn reconcile(mode: MapMode, len: usize, num_verts: usize, num_tris: usize) -> MapMode {
    match mode {
        MapMode::PerVertex if len != num_verts => MapMode::PerFaceVertex,
        MapMode::PerFace if len != num_tris => MapMode::PerFaceVertex,
        MapMode::None if len > 0 => MapMode::SharedElements,
        mode => mode,
    }
}

impl Mesh {
    /// Folds every trailing group into the first one, working from the back.
    pub fn merge_groups(&mut self) {
        if self.groups.len() <= 1 {
            return;
        }
        let trailing = self.groups.split_off(1);
        for group in trailing.iter().rev() {
            self.groups[0].add_mesh_data(group, Vec3::ZERO);
        }
    }
}
