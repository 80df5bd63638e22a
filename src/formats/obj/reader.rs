use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::str::SplitAsciiWhitespace;
use std::sync::Arc;

use glam::{Vec2, Vec3};
use memmap2::Mmap;
use tracing::{debug, info, warn};

use super::mtl;
use crate::config::Options;
use crate::error::{MeshError, Result};
use crate::formats::classify_mapping;
use crate::types::{FaceWinding, MapMode, Material, Mesh, MeshGroup, Triangle, VertexDescr};

/// Element counts found by the probing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjCounts {
    pub verts: usize,
    pub coords: usize,
    pub normals: usize,
    pub faces: usize,
}

impl ObjCounts {
    /// Number of `f32` slots the parse arena needs: positions, UVs, normals
    /// and one color per position.
    fn arena_len(&self) -> usize {
        self.verts * 3 + self.coords * 2 + self.normals * 3 + self.verts * 3
    }
}

/// Typed views into the single parse allocation.
struct Arena<'a> {
    verts: &'a mut [Vec3],
    coords: &'a mut [Vec2],
    normals: &'a mut [Vec3],
    colors: &'a mut [Vec3],
}

impl<'a> Arena<'a> {
    fn split(buffer: &'a mut [f32], counts: &ObjCounts) -> Self {
        let (verts, rest) = buffer.split_at_mut(counts.verts * 3);
        let (coords, rest) = rest.split_at_mut(counts.coords * 2);
        let (normals, colors) = rest.split_at_mut(counts.normals * 3);
        Arena {
            verts: bytemuck::cast_slice_mut(verts),
            coords: bytemuck::cast_slice_mut(coords),
            normals: bytemuck::cast_slice_mut(normals),
            colors: bytemuck::cast_slice_mut(colors),
        }
    }
}

/// Load a Wavefront OBJ file into an empty `mesh`.
///
/// OBJ indexes positions, UVs and normals globally; every group of the
/// resulting mesh owns its own locally indexed arrays.
pub fn load_obj(mesh: &mut Mesh, path: &Path, options: Options) -> Result<()> {
    // 1. Map the file
    let file = File::open(path).map_err(|e| {
        MeshError::FileAccess(format!("Failed to open file {}: {e}", path.display()))
    })?;
    let len = file.metadata()?.len();
    if len == 0 {
        return Err(MeshError::MalformedData(format!(
            "No vertices in {}",
            path.display()
        )));
    }
    // SAFETY: the mapping is read-only and does not outlive this function.
    let data = unsafe { Mmap::map(&file) }?;

    // 2. Probe element counts
    let counts = probe(&data);
    if counts.verts == 0 {
        return Err(MeshError::MalformedData(format!(
            "No vertices in {}",
            path.display()
        )));
    }
    if options.contains(Options::LOG) {
        info!(
            file = %file_name(path),
            verts = counts.verts,
            polys = counts.faces,
            options = %options,
            "Load OBJ"
        );
    }

    // 3. Parse into one arena
    let mut buffer = vec![0.0f32; counts.arena_len()];
    let mut arena = Arena::split(&mut buffer, &counts);

    mesh.name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut loader = ObjLoader {
        mesh,
        path,
        options,
        counts,
        materials: Vec::new(),
        tried_default_library: false,
        current: None,
        num_colors: 0,
    };
    loader.parse(&data, &mut arena)?;

    // 4. Build locally indexed groups
    if !options.contains(Options::EMPTY_GROUPS) {
        loader.mesh.groups.retain(|g| !g.is_empty());
    }
    loader.build_groups(&arena);

    debug!(
        groups = loader.mesh.num_groups(),
        verts = loader.mesh.total_verts(),
        tris = loader.mesh.total_tris(),
        "Parsed OBJ"
    );
    Ok(())
}

/// First whitespace-delimited token of a line.
fn first_token(line: &[u8]) -> &[u8] {
    let start = line
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(line.len());
    let line = &line[start..];
    let end = line
        .iter()
        .position(|b| b.is_ascii_whitespace())
        .unwrap_or(line.len());
    &line[..end]
}

/// Counts `v`, `vt`, `vn` and `f` statements.
pub fn probe(data: &[u8]) -> ObjCounts {
    let mut counts = ObjCounts::default();
    for line in data.split(|b| *b == b'\n') {
        match first_token(line) {
            b"v" => counts.verts += 1,
            b"vt" => counts.coords += 1,
            b"vn" => counts.normals += 1,
            b"f" => counts.faces += 1,
            _ => {}
        }
    }
    counts
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

struct ObjLoader<'m> {
    mesh: &'m mut Mesh,
    path: &'m Path,
    options: Options,
    counts: ObjCounts,
    materials: Vec<Arc<Material>>,
    tried_default_library: bool,
    /// Index of the group receiving faces.
    current: Option<usize>,
    num_colors: usize,
}

impl ObjLoader<'_> {
    fn malformed(&self, line_no: usize, what: impl std::fmt::Display) -> MeshError {
        MeshError::MalformedData(format!("{}:{}: {what}", self.path.display(), line_no + 1))
    }

    fn parse(&mut self, data: &[u8], arena: &mut Arena<'_>) -> Result<()> {
        let (mut vertex_id, mut coord_id, mut normal_id) = (0usize, 0usize, 0usize);
        let mut corners: Vec<VertexDescr> = Vec::with_capacity(8);

        for (line_no, raw) in data.split(|b| *b == b'\n').enumerate() {
            let line = String::from_utf8_lossy(raw);
            let mut tokens = line.split_ascii_whitespace();
            let Some(keyword) = tokens.next() else {
                continue;
            };

            match keyword {
                "v" => {
                    let floats = self.parse_floats(&mut tokens, 6, line_no)?;
                    if floats.len() < 3 {
                        return Err(self.malformed(line_no, "vertex needs 3 coordinates"));
                    }
                    arena.verts[vertex_id] = Vec3::new(floats[0], floats[1], floats[2]);
                    if floats.len() == 6 {
                        let color = Vec3::new(floats[3], floats[4], floats[5]);
                        if color.length_squared() > 0.001 {
                            // OBJ colors are always per vertex
                            self.num_colors = self.counts.verts;
                            arena.colors[vertex_id] = color;
                        }
                    }
                    vertex_id += 1;
                }
                "vt" => {
                    let floats = self.parse_floats(&mut tokens, 3, line_no)?;
                    if floats.is_empty() {
                        return Err(self.malformed(line_no, "texture coordinate needs a value"));
                    }
                    let v = floats.get(1).copied().unwrap_or(0.0);
                    arena.coords[coord_id] = Vec2::new(floats[0], v);
                    coord_id += 1;
                }
                "vn" => {
                    let floats = self.parse_floats(&mut tokens, 3, line_no)?;
                    if floats.len() < 3 {
                        return Err(self.malformed(line_no, "normal needs 3 components"));
                    }
                    arena.normals[normal_id] = Vec3::new(floats[0], floats[1], floats[2]);
                    normal_id += 1;
                }
                "f" => {
                    corners.clear();
                    for token in tokens {
                        let defined = [vertex_id, coord_id, normal_id];
                        corners.push(self.parse_corner(token, defined, line_no)?);
                    }
                    if corners.len() < 3 {
                        return Err(self.malformed(line_no, "face needs at least 3 vertices"));
                    }
                    let group = self.current_group();
                    let tris = &mut self.mesh.groups[group].tris;
                    // fan: (first, previous, next)
                    for i in 2..corners.len() {
                        tris.push(Triangle::new(corners[0], corners[i - 1], corners[i]));
                    }
                }
                "g" => {
                    let ignore = self.options.contains(Options::SINGLE_GROUP) && self.current.is_some();
                    if !ignore {
                        let name = tokens.next().unwrap_or_default();
                        self.current = Some(self.find_or_create_group(name));
                    }
                }
                "o" => {
                    if let Some(name) = tokens.next() {
                        self.mesh.name = name.to_string();
                    }
                }
                "mtllib" => {
                    if let Some(lib) = tokens.next() {
                        let folder = self.path.parent().unwrap_or_else(|| Path::new(""));
                        self.materials = self.load_library(&folder.join(lib));
                    }
                }
                "usemtl" => {
                    let name = tokens.next().unwrap_or_default();
                    let material = self.find_material(name);
                    let group = self.current_group();
                    self.mesh.groups[group].material = material;
                }
                _ => {} // comments, smoothing groups, unsupported statements
            }
        }
        Ok(())
    }

    /// Parses up to `max` floats from the remaining tokens.
    fn parse_floats(
        &self,
        tokens: &mut SplitAsciiWhitespace<'_>,
        max: usize,
        line_no: usize,
    ) -> Result<Vec<f32>> {
        tokens
            .take(max)
            .map(|t| {
                t.parse::<f32>()
                    .map_err(|_| self.malformed(line_no, format!("invalid number '{t}'")))
            })
            .collect()
    }

    /// Parses `v`, `v/t`, `v//n` or `v/t/n` into global 0-based indices.
    fn parse_corner(&self, token: &str, defined: [usize; 3], line_no: usize) -> Result<VertexDescr> {
        let totals = [self.counts.verts, self.counts.coords, self.counts.normals];
        let mut parts = token.split('/');
        let mut index = |slot: usize| -> Result<Option<u32>> {
            match parts.next() {
                Some(s) if !s.is_empty() => {
                    resolve_index(s, defined[slot], totals[slot]).map(Some).ok_or_else(|| {
                        self.malformed(line_no, format!("invalid face index '{token}'"))
                    })
                }
                _ => Ok(None),
            }
        };

        let Some(v) = index(0)? else {
            return Err(self.malformed(line_no, format!("face corner without vertex '{token}'")));
        };
        let t = index(1)?;
        let n = index(2)?;
        Ok(VertexDescr::with(v, t, n))
    }

    fn current_group(&mut self) -> usize {
        match self.current {
            Some(index) => index,
            None => {
                self.mesh.create_group("");
                let index = self.mesh.groups.len() - 1;
                self.current = Some(index);
                index
            }
        }
    }

    fn find_or_create_group(&mut self, name: &str) -> usize {
        match self.mesh.groups.iter().position(|g| g.name == name) {
            Some(index) => index,
            None => {
                self.mesh.create_group(name);
                self.mesh.groups.len() - 1
            }
        }
    }

    fn load_library(&self, path: &Path) -> Vec<Arc<Material>> {
        match mtl::load_materials(path) {
            Ok(materials) => materials,
            Err(e) => {
                warn!(%e, "Failed to load material library");
                Vec::new()
            }
        }
    }

    /// Case-insensitive material lookup. Without a declared library, a
    /// same-named `.mtl` next to the mesh is tried once.
    fn find_material(&mut self, name: &str) -> Option<Arc<Material>> {
        if self.materials.is_empty() && !self.tried_default_library {
            self.tried_default_library = true;
            let default_library = self.path.with_extension("mtl");
            if default_library.exists() {
                self.materials = self.load_library(&default_library);
            }
        }
        let found = self
            .materials
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .cloned();
        if found.is_none() {
            warn!(material = name, "Material not found");
        }
        found
    }

    fn build_groups(&mut self, arena: &Arena<'_>) {
        let num_groups = self.mesh.groups.len();
        for group in &mut self.mesh.groups {
            if group.name.is_empty() {
                if let Some(material) = &group.material {
                    group.name = material.name.clone();
                }
            }
            // OBJ default face winding is CCW
            group.winding = FaceWinding::Ccw;
            if group.tris.is_empty() {
                continue;
            }

            if num_groups == 1 {
                copy_all(group, arena, self.num_colors > 0);
            } else {
                remap_to_local(group, arena, self.num_colors > 0);
            }

            group.coords_mapping = classify_mapping(group, group.coords.len(), |vd| vd.t);
            group.normals_mapping = classify_mapping(group, group.normals.len(), |vd| vd.n);
        }

        if let Some(first) = self.mesh.groups.first_mut() {
            if first.name.is_empty() {
                first.name = "default".to_string();
            }
        }
    }
}

/// Resolves a 1-based (or negative, relative) OBJ index.
fn resolve_index(s: &str, defined: usize, total: usize) -> Option<u32> {
    let raw: i64 = s.parse().ok()?;
    let index = match raw {
        0 => return None,
        r if r > 0 => r - 1,
        r => defined as i64 + r,
    };
    (index >= 0 && (index as usize) < total).then_some(index as u32)
}

/// A single group owns the whole file: global indices are already local.
fn copy_all(group: &mut MeshGroup, arena: &Arena<'_>, vertex_colors: bool) {
    group.verts = arena.verts.to_vec();
    group.coords = arena.coords.to_vec();
    group.normals = arena.normals.to_vec();
    if vertex_colors {
        group.colors = arena.colors.to_vec();
        group.colors_mapping = MapMode::PerVertex;
        for tri in &mut group.tris {
            for vd in tri.corners_mut() {
                vd.c = Some(vd.v);
            }
        }
    }
}

/// Maps global indices to local ones in order of first use.
#[derive(Debug, Default)]
struct LocalIndexTable {
    local: HashMap<u32, u32>,
    order: Vec<u32>,
}

impl LocalIndexTable {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            local: HashMap::with_capacity(capacity),
            order: Vec::with_capacity(capacity),
        }
    }

    fn local_index(&mut self, global: u32) -> u32 {
        *self.local.entry(global).or_insert_with(|| {
            self.order.push(global);
            (self.order.len() - 1) as u32
        })
    }

    /// Elements of `src` in local order.
    fn gather<T: Copy>(&self, src: &[T]) -> Vec<T> {
        self.order.iter().map(|&i| src[i as usize]).collect()
    }
}

/// Rewrites every corner of `group` to local indices and copies the used
/// elements out of the global arrays.
fn remap_to_local(group: &mut MeshGroup, arena: &Arena<'_>, vertex_colors: bool) {
    let capacity = group.tris.len() * 3;
    let mut verts = LocalIndexTable::with_capacity(capacity);
    let mut coords = LocalIndexTable::default();
    let mut normals = LocalIndexTable::default();

    for tri in &mut group.tris {
        for vd in tri.corners_mut() {
            vd.v = verts.local_index(vd.v);
            vd.t = vd.t.map(|t| coords.local_index(t));
            vd.n = vd.n.map(|n| normals.local_index(n));
            if vertex_colors {
                vd.c = Some(vd.v);
            }
        }
    }

    group.verts = verts.gather(arena.verts);
    group.coords = coords.gather(arena.coords);
    group.normals = normals.gather(arena.normals);
    if vertex_colors {
        group.colors = verts.gather(arena.colors);
        group.colors_mapping = MapMode::PerVertex;
    }
}
