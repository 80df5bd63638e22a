use std::borrow::Cow;
use std::io::Write;
use std::path::Path;

use glam::Vec3;
use tracing::{debug, info};

use super::mtl;
use crate::config::Options;
use crate::error::{MeshError, Result};
use crate::formats::write_atomic;
use crate::types::{MapMode, Mesh, MeshGroup, VertexDescr};

/// Save `mesh` as Wavefront OBJ, plus a same-named `.mtl` library when any
/// group has a material.
///
/// Each group's local indices are re-based onto the file's global index
/// space by the element counts of the groups written before it.
pub fn save_obj(mesh: &Mesh, path: &Path, options: Options) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if options.contains(Options::LOG) {
        info!(
            file = %file_name,
            groups = mesh.num_groups(),
            verts = mesh.total_verts(),
            tris = mesh.total_tris(),
            "Save OBJ"
        );
    }

    let mut out: Vec<u8> = Vec::new();
    writeln!(out, "# {file_name}")?;

    // 1. Material library
    let mut library = None;
    if mesh.has_any_materials() {
        let library_path = path.with_extension("mtl");
        let mut buffer = Vec::new();
        let count = mtl::write_materials(mesh, &mut buffer, &library_path)?;
        let library_name = library_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        writeln!(out, "mtllib {library_name}")?;
        library = Some((library_path, buffer, count));
    }
    if !mesh.name.is_empty() {
        writeln!(out, "o {}", mesh.name)?;
    }

    // 2. Groups
    let mut base = IndexBase::default();
    for group in &mesh.groups {
        write_group(&mut out, group, base)?;
        base.advance(group);
    }

    // 3. Commit, only once both buffers are complete
    if let Some((library_path, buffer, count)) = library {
        write_atomic(&library_path, &buffer)?;
        debug!(path = %library_path.display(), materials = count, "Wrote material library");
    }
    write_atomic(path, &out)
}

/// Number of elements written by the preceding groups.
#[derive(Debug, Clone, Copy, Default)]
struct IndexBase {
    verts: usize,
    coords: usize,
    normals: usize,
}

impl IndexBase {
    fn advance(&mut self, group: &MeshGroup) {
        self.verts += group.num_verts();
        self.coords += group.num_coords();
        self.normals += group.num_normals();
    }
}

fn write_group(out: &mut Vec<u8>, group: &MeshGroup, base: IndexBase) -> Result<()> {
    match vertex_colors(group)? {
        Some(colors) => {
            for (v, c) in group.verts.iter().zip(colors.iter()) {
                writeln!(
                    out,
                    "v {:.6} {:.6} {:.6} {:.6} {:.6} {:.6}",
                    v.x, v.y, v.z, c.x, c.y, c.z
                )?;
            }
        }
        None => {
            for v in &group.verts {
                writeln!(out, "v {:.6} {:.6} {:.6}", v.x, v.y, v.z)?;
            }
        }
    }
    for t in &group.coords {
        writeln!(out, "vt {:.4} {:.4}", t.x, t.y)?;
    }
    for n in &group.normals {
        writeln!(out, "vn {:.4} {:.4} {:.4}", n.x, n.y, n.z)?;
    }

    if !group.name.is_empty() {
        writeln!(out, "g {}", group.name)?;
    }
    if let Some(material) = &group.material {
        writeln!(out, "usemtl {}", material.name)?;
    }
    for tri in &group.tris {
        write!(out, "f")?;
        for vd in tri.corners() {
            write_corner(out, vd, base)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_corner(out: &mut Vec<u8>, vd: &VertexDescr, base: IndexBase) -> Result<()> {
    let v = base.verts + vd.v as usize + 1;
    let t = vd.t.map(|t| base.coords + t as usize + 1);
    let n = vd.n.map(|n| base.normals + n as usize + 1);
    match (t, n) {
        (Some(t), Some(n)) => write!(out, " {v}/{t}/{n}")?,
        (Some(t), None) => write!(out, " {v}/{t}")?,
        (None, Some(n)) => write!(out, " {v}//{n}")?,
        (None, None) => write!(out, " {v}")?,
    }
    Ok(())
}

/// One color per position, or `None` when the group has no visible colors.
fn vertex_colors(group: &MeshGroup) -> Result<Option<Cow<'_, [Vec3]>>> {
    if group.colors.iter().all(|c| *c == Vec3::ZERO) {
        return Ok(None);
    }
    let num_verts = group.num_verts();
    match group.colors_mapping {
        MapMode::PerVertex if group.colors.len() >= num_verts => {
            Ok(Some(Cow::Borrowed(&group.colors[..num_verts])))
        }
        MapMode::PerFaceVertex if group.colors.len() >= num_verts => {
            Ok(Some(Cow::Owned(flatten_colors(group))))
        }
        mode => Err(MeshError::MalformedData(format!(
            "group '{}': {} colors ({mode}) cannot be written as vertex colors",
            group.name,
            group.colors.len()
        ))),
    }
}

/// Collapses per-corner colors onto positions. A slot still holding black or
/// white takes the next color met.
fn flatten_colors(group: &MeshGroup) -> Vec<Vec3> {
    let mut out = vec![Vec3::ZERO; group.num_verts()];
    for tri in &group.tris {
        for vd in tri.corners() {
            let Some(c) = vd.c else { continue };
            let slot = &mut out[vd.v as usize];
            if *slot == Vec3::ZERO || *slot == Vec3::ONE {
                *slot = group.colors[c as usize];
            }
        }
    }
    out
}
