pub mod obj;
pub mod txt;

use std::io::Write;
use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Options;
use crate::error::{MeshError, Result, apply_policy};
use crate::types::{FaceWinding, MapMode, Mesh, MeshGroup, VertexDescr};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Obj,
    Txt,
}

impl MeshFormat {
    /// Detect format from file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "obj" => Ok(MeshFormat::Obj),
            "txt" => Ok(MeshFormat::Txt),
            _ => Err(MeshError::UnrecognizedFormat(format!(
                "unsupported extension '.{ext}': {}",
                path.display()
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MeshFormat::Obj => "OBJ",
            MeshFormat::Txt => "TXT",
        }
    }

    /// Whether meshes can be written in this format.
    pub fn can_save(&self) -> bool {
        matches!(self, MeshFormat::Obj)
    }
}

impl std::fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies how `count` attribute values relate to the group's positions
/// and faces, given each corner's attribute index.
pub(crate) fn classify_mapping(
    group: &MeshGroup,
    count: usize,
    index: impl Fn(&VertexDescr) -> Option<u32>,
) -> MapMode {
    if count == 0 {
        return MapMode::None;
    }
    let corners = || group.tris.iter().flat_map(|t| t.corners());
    if count == group.num_verts() && corners().all(|vd| index(vd) == Some(vd.v)) {
        return MapMode::PerVertex;
    }
    if count == group.num_tris()
        && group
            .tris
            .iter()
            .enumerate()
            .all(|(i, t)| t.corners().into_iter().all(|vd| index(vd) == Some(i as u32)))
    {
        return MapMode::PerFace;
    }
    if count > group.num_verts() {
        MapMode::PerFaceVertex
    } else {
        MapMode::SharedElements
    }
}

/// Writes `bytes` to a temporary file next to `path` and renames it over
/// `path` once complete.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        MeshError::FileAccess(format!("Failed to create file in {}: {e}", dir.display()))
    })?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| {
        MeshError::FileAccess(format!("Failed to write {}: {}", path.display(), e.error))
    })?;
    Ok(())
}

impl Mesh {
    /// Load a mesh file into `self`, replacing its contents.
    ///
    /// Returns `Ok(true)` on success. On failure the mesh is left empty and
    /// the error is returned, or logged and turned into `Ok(false)` under
    /// [`Options::NO_THROW`].
    pub fn load(&mut self, path: impl AsRef<Path>, options: Options) -> Result<bool> {
        let path = path.as_ref();
        let options = options.expanded();
        let start = Instant::now();
        self.clear();

        let result = MeshFormat::from_path(path).and_then(|format| match format {
            MeshFormat::Obj => obj::load_obj(self, path, options),
            MeshFormat::Txt => txt::load_txt(self, path, options),
        });
        match &result {
            Ok(()) => {
                self.apply_load_options(options);
                debug!(
                    path = %path.display(),
                    groups = self.num_groups(),
                    elapsed = ?start.elapsed(),
                    "Loaded mesh"
                );
            }
            Err(_) => self.clear(),
        }
        Ok(apply_policy(options, result)?.is_some())
    }

    /// Constructor form of [`Mesh::load`].
    pub fn open(path: impl AsRef<Path>, options: Options) -> Result<Mesh> {
        let mut mesh = Mesh::default();
        mesh.load(path, options)?;
        Ok(mesh)
    }

    /// Save the mesh; the format is chosen by the file extension.
    pub fn save_as(&self, path: impl AsRef<Path>, options: Options) -> Result<bool> {
        let path = path.as_ref();
        let start = Instant::now();
        let result = MeshFormat::from_path(path).and_then(|format| {
            if format.can_save() {
                obj::save_obj(self, path, options)
            } else {
                Err(MeshError::UnrecognizedFormat(format!(
                    "saving {format} is not supported: {}",
                    path.display()
                )))
            }
        });
        if result.is_ok() {
            debug!(path = %path.display(), elapsed = ?start.elapsed(), "Saved mesh");
        }
        Ok(apply_policy(options, result)?.is_some())
    }

    /// Post-load pipeline shared by every reader.
    pub fn apply_load_options(&mut self, options: Options) {
        if options.contains(Options::SPLIT_SEAMS) {
            self.split_seam_vertices();
        }
        if options.contains(Options::FLATTEN) {
            self.optimized_flatten();
        }
        if options.contains(Options::CLOCKWISE) {
            self.set_face_winding(FaceWinding::Cw);
        } else {
            self.set_face_winding(FaceWinding::Ccw);
        }
        if let Some(coord_sys) = options.target_coord_sys() {
            self.set_coord_sys(coord_sys);
        }
        if options.contains(Options::LOG) {
            for group in &self.groups {
                group.log_summary();
            }
            info!(
                mesh = %self.name,
                groups = self.num_groups(),
                verts = self.total_verts(),
                tris = self.total_tris(),
                options = %options,
                "Mesh loaded"
            );
        }
    }
}

/// Per-group statistics.
#[derive(Debug, Clone, Serialize)]
pub struct GroupStats {
    pub name: String,
    pub verts: usize,
    pub tris: usize,
    pub coords: usize,
    pub normals: usize,
    pub colors: usize,
    pub coords_mapping: String,
    pub normals_mapping: String,
    pub colors_mapping: String,
    pub material: Option<String>,
}

/// Summary statistics of a loaded mesh.
#[derive(Debug, Clone, Serialize)]
pub struct MeshStats {
    pub name: String,
    pub format: String,
    pub total_verts: usize,
    pub total_tris: usize,
    pub total_coords: usize,
    pub total_normals: usize,
    pub total_colors: usize,
    pub material_count: usize,
    pub bbox_min: [f32; 3],
    pub bbox_max: [f32; 3],
    pub groups: Vec<GroupStats>,
}

/// Compute summary statistics for `mesh`.
pub fn compute_stats(mesh: &Mesh, format: MeshFormat) -> MeshStats {
    let bbox = mesh.calculate_bbox();
    let mut materials: Vec<&str> = mesh
        .groups
        .iter()
        .filter_map(|g| g.material.as_ref().map(|m| m.name.as_str()))
        .collect();
    materials.sort_unstable();
    materials.dedup();

    let groups = mesh
        .groups
        .iter()
        .map(|g| GroupStats {
            name: g.name.clone(),
            verts: g.num_verts(),
            tris: g.num_tris(),
            coords: g.num_coords(),
            normals: g.num_normals(),
            colors: g.num_colors(),
            coords_mapping: g.coords_mapping.to_string(),
            normals_mapping: g.normals_mapping.to_string(),
            colors_mapping: g.colors_mapping.to_string(),
            material: g.material.as_ref().map(|m| m.name.clone()),
        })
        .collect();

    MeshStats {
        name: mesh.name.clone(),
        format: format.to_string(),
        total_verts: mesh.total_verts(),
        total_tris: mesh.total_tris(),
        total_coords: mesh.total_coords(),
        total_normals: mesh.total_normals(),
        total_colors: mesh.total_colors(),
        material_count: materials.len(),
        bbox_min: bbox.min.to_array(),
        bbox_max: bbox.max.to_array(),
        groups,
    }
}
