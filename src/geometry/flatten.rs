use std::collections::HashMap;

use glam::{Vec2, Vec3};

use crate::types::{MapMode, Mesh, MeshGroup, VertexDescr};

impl MeshGroup {
    /// Gives every triangle corner its own slot in every populated array.
    ///
    /// Corners are re-indexed sequentially. Populated attributes become
    /// `PerFaceVertex`, unpopulated ones `None`.
    pub fn flatten_face_data(&mut self) {
        let count = self.tris.len() * 3;
        let mut verts = Vec::with_capacity(count);
        let mut coords = Vec::with_capacity(if self.has_coords() { count } else { 0 });
        let mut normals = Vec::with_capacity(if self.has_normals() { count } else { 0 });
        let mut colors = Vec::with_capacity(if self.has_colors() { count } else { 0 });

        for tri in &mut self.tris {
            for vd in tri.corners_mut() {
                verts.push(self.verts[vd.v as usize]);
                vd.v = (verts.len() - 1) as u32;
                if let Some(t) = vd.t {
                    coords.push(self.coords[t as usize]);
                    vd.t = Some((coords.len() - 1) as u32);
                }
                if let Some(n) = vd.n {
                    normals.push(self.normals[n as usize]);
                    vd.n = Some((normals.len() - 1) as u32);
                }
                if let Some(c) = vd.c {
                    colors.push(self.colors[c as usize]);
                    vd.c = Some((colors.len() - 1) as u32);
                }
            }
        }

        self.verts = verts;
        self.coords = coords;
        self.normals = normals;
        self.colors = colors;
        self.coords_mapping = flattened_mode(&self.coords);
        self.normals_mapping = flattened_mode(&self.normals);
        self.colors_mapping = flattened_mode(&self.colors);
    }

    /// Splits positions shared by corners with different attribute tuples.
    ///
    /// The first `(t, n, c)` tuple met at a position keeps the original
    /// slot; every further distinct tuple gets a cloned position appended to
    /// the array. The triangle count never changes and the position count
    /// never decreases.
    pub fn split_seam_vertices(&mut self) {
        let mut owners: Vec<Option<VertexDescr>> = vec![None; self.verts.len()];
        let mut clones: HashMap<u32, Vec<VertexDescr>> = HashMap::new();
        let num_verts_old = self.verts.len();

        for tri in &mut self.tris {
            for vd in tri.corners_mut() {
                let p = vd.v as usize;
                match owners[p] {
                    None => {
                        owners[p] = Some(*vd);
                        continue;
                    }
                    Some(owner) if owner.same_attributes(vd) => continue,
                    Some(_) => {}
                }

                let emitted = clones.entry(vd.v).or_default();
                if let Some(existing) = emitted.iter().find(|e| e.same_attributes(vd)) {
                    vd.v = existing.v;
                    continue;
                }
                self.verts.push(self.verts[vd.v as usize]);
                vd.v = (self.verts.len() - 1) as u32;
                emitted.push(*vd);
            }
        }

        // attribute indices no longer follow the appended positions
        if self.verts.len() > num_verts_old {
            for mode in [
                &mut self.coords_mapping,
                &mut self.normals_mapping,
                &mut self.colors_mapping,
            ] {
                if *mode == MapMode::PerVertex {
                    *mode = MapMode::PerFaceVertex;
                }
            }
        }
    }

    /// Collapses every populated attribute to one slot per position.
    ///
    /// The first value met at a position wins; unreferenced positions get
    /// zero. Lossless only when seams were split first.
    pub fn per_vertex_flatten(&mut self) {
        if !self.has_coords() && !self.has_normals() && !self.has_colors() {
            return;
        }

        let n = self.verts.len();
        let mut coords = self.has_coords().then(|| vec![Vec2::ZERO; n]);
        let mut normals = self.has_normals().then(|| vec![Vec3::ZERO; n]);
        let mut colors = self.has_colors().then(|| vec![Vec3::ZERO; n]);
        let mut visited = vec![false; n];

        for tri in &mut self.tris {
            for vd in tri.corners_mut() {
                let p = vd.v as usize;
                if !visited[p] {
                    visited[p] = true;
                    if let Some(coords) = &mut coords {
                        coords[p] = vd.t.map_or(Vec2::ZERO, |t| self.coords[t as usize]);
                    }
                    if let Some(normals) = &mut normals {
                        normals[p] = vd.n.map_or(Vec3::ZERO, |i| self.normals[i as usize]);
                    }
                    if let Some(colors) = &mut colors {
                        colors[p] = vd.c.map_or(Vec3::ZERO, |c| self.colors[c as usize]);
                    }
                }
                if coords.is_some() {
                    vd.t = Some(vd.v);
                }
                if normals.is_some() {
                    vd.n = Some(vd.v);
                }
                if colors.is_some() {
                    vd.c = Some(vd.v);
                }
            }
        }

        if let Some(coords) = coords {
            self.coords = coords;
            self.coords_mapping = MapMode::PerVertex;
        }
        if let Some(normals) = normals {
            self.normals = normals;
            self.normals_mapping = MapMode::PerVertex;
        }
        if let Some(colors) = colors {
            self.colors = colors;
            self.colors_mapping = MapMode::PerVertex;
        }
    }

    /// Splits seams, then stores every attribute per vertex. The result is
    /// the most compact layout a game engine can consume directly.
    pub fn optimized_flatten(&mut self) {
        self.split_seam_vertices();
        self.per_vertex_flatten();
    }
}

fn flattened_mode<T>(data: &[T]) -> MapMode {
    if data.is_empty() {
        MapMode::None
    } else {
        MapMode::PerFaceVertex
    }
}

impl Mesh {
    pub fn split_seam_vertices(&mut self) {
        for group in &mut self.groups {
            group.split_seam_vertices();
        }
    }

    /// Flattens every group that is not flattened yet.
    pub fn flatten_mesh_data(&mut self) {
        for group in &mut self.groups {
            if !group.is_flattened() {
                group.flatten_face_data();
            }
        }
    }

    pub fn is_flattened(&self) -> bool {
        self.groups.iter().all(MeshGroup::is_flattened)
    }

    pub fn optimized_flatten(&mut self) {
        for group in &mut self.groups {
            group.optimized_flatten();
        }
    }
}
