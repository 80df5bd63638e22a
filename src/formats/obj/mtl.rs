use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use glam::Vec3;
use tracing::{debug, warn};

use crate::error::{MeshError, Result};
use crate::types::{Material, Mesh};

/// Load every material of an MTL library.
///
/// Texture paths are resolved against the library's folder.
pub fn load_materials(path: &Path) -> Result<Vec<Arc<Material>>> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        MeshError::FileAccess(format!("Failed to open material library {}: {e}", path.display()))
    })?;
    let folder = path.parent().unwrap_or_else(|| Path::new(""));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut materials: Vec<Material> = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        let (id, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        if id == "newmtl" {
            materials.push(Material {
                material_file: file_name.clone(),
                ..Material::new(rest)
            });
            continue;
        }
        let Some(mat) = materials.last_mut() else {
            continue;
        };

        let texture = || texture_path(folder, rest);
        match id {
            "Ka" => mat.ambient_color = parse_color(rest, path, line_no)?,
            "Kd" => mat.diffuse_color = parse_color(rest, path, line_no)?,
            "Ks" => mat.specular_color = parse_color(rest, path, line_no)?,
            "Ke" => mat.emissive_color = parse_color(rest, path, line_no)?,
            // Ns is [0, 1000]
            "Ns" => mat.specular = parse_float(rest, path, line_no)? / 1000.0,
            "d" => mat.alpha = parse_float(rest, path, line_no)?,
            "Tr" => mat.alpha = 1.0 - parse_float(rest, path, line_no)?,
            "map_Kd" => mat.diffuse_path = texture(),
            "map_d" => mat.alpha_path = texture(),
            "map_Ks" => mat.specular_path = texture(),
            "map_bump" | "bump" => mat.normal_path = texture(),
            "map_Ke" => mat.emissive_path = texture(),
            _ => {}
        }
    }

    debug!(path = %path.display(), count = materials.len(), "Loaded material library");
    Ok(materials.into_iter().map(Arc::new).collect())
}

/// Texture statements may carry options before the file name; the file is
/// the last token.
fn texture_path(folder: &Path, rest: &str) -> String {
    match rest.split_whitespace().last() {
        Some(file) => folder.join(file).to_string_lossy().into_owned(),
        None => String::new(),
    }
}

fn parse_float(s: &str, path: &Path, line_no: usize) -> Result<f32> {
    let token = s.split_whitespace().next().unwrap_or_default();
    token.parse().map_err(|_| {
        MeshError::MalformedData(format!(
            "{}:{}: invalid number '{token}'",
            path.display(),
            line_no + 1
        ))
    })
}

fn parse_color(s: &str, path: &Path, line_no: usize) -> Result<Vec3> {
    let mut c = [0.0f32; 3];
    for (dst, token) in c.iter_mut().zip(s.split_whitespace()) {
        *dst = token.parse().map_err(|_| {
            MeshError::MalformedData(format!(
                "{}:{}: invalid color component '{token}'",
                path.display(),
                line_no + 1
            ))
        })?;
    }
    Ok(Vec3::from_array(c))
}

/// Write the materials used by `mesh` into an MTL library at `path`.
///
/// Each distinct material is written once. Texture paths are made relative
/// to the library's folder where possible.
pub fn write_materials(mesh: &Mesh, out: &mut impl Write, path: &Path) -> Result<usize> {
    let folder = path.parent().unwrap_or_else(|| Path::new(""));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    writeln!(out, "# {file_name} MTL library")?;

    let mut written: Vec<&Arc<Material>> = Vec::new();
    for group in &mesh.groups {
        let Some(mat) = &group.material else {
            continue;
        };
        if written.iter().any(|w| Arc::ptr_eq(*w, mat)) {
            continue;
        }
        written.push(mat);

        writeln!(out, "newmtl {}", mat.name)?;
        write_color(out, "Ka", mat.ambient_color)?;
        write_color(out, "Kd", mat.diffuse_color)?;
        write_color(out, "Ks", mat.specular_color)?;
        if mat.emissive_color != Vec3::ZERO {
            write_color(out, "Ke", mat.emissive_color)?;
        }
        let ns = (mat.specular * 1000.0).clamp(0.0, 1000.0);
        if ns != 1.0 {
            writeln!(out, "Ns {ns}")?;
        }
        if mat.alpha != 1.0 {
            writeln!(out, "d {}", mat.alpha)?;
        }
        for (keyword, texture) in mat.texture_paths() {
            if texture.is_empty() {
                continue;
            }
            let relative = Path::new(texture).strip_prefix(folder).unwrap_or_else(|_| {
                warn!(texture, "Texture is outside the material library folder");
                Path::new(texture)
            });
            writeln!(out, "{keyword} {}", relative.display())?;
        }
        writeln!(out, "illum 2")?;
        writeln!(out)?;
    }
    Ok(written.len())
}

fn write_color(out: &mut impl Write, id: &str, c: Vec3) -> Result<()> {
    writeln!(out, "{id} {} {} {}", c.x, c.y, c.z)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp_mtl(dir: &Path, contents: &str) -> std::path::PathBuf {
        let path = dir.join("lib.mtl");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn load_material_library() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp_mtl(
            dir.path(),
            "# comment\n\
             newmtl Brick\n\
             Ka 0.1 0.2 0.3\n\
             Kd 0.5 0.5 0.5\n\
             Ns 250\n\
             Tr 0.25\n\
             map_Kd textures/brick.png\n\
             bump -bm 1.0 brick_n.png\n\
             illum 2\n\
             \n\
             newmtl glass\n\
             d 0.1\n",
        );

        let mats = load_materials(&path).unwrap();
        assert_eq!(mats.len(), 2);

        let brick = &mats[0];
        assert_eq!(brick.name, "Brick");
        assert_eq!(brick.material_file, "lib.mtl");
        assert_eq!(brick.ambient_color, Vec3::new(0.1, 0.2, 0.3));
        assert!((brick.specular - 0.25).abs() < 1e-6);
        assert!((brick.alpha - 0.75).abs() < 1e-6);
        assert_eq!(
            Path::new(&brick.diffuse_path),
            dir.path().join("textures/brick.png")
        );
        assert_eq!(Path::new(&brick.normal_path), dir.path().join("brick_n.png"));
        assert!(brick.specular_path.is_empty());

        let glass = &mats[1];
        assert!((glass.alpha - 0.1).abs() < 1e-6);
        assert_eq!(glass.diffuse_color, Vec3::ONE);
    }

    #[test]
    fn missing_library_is_file_access_error() {
        let err = load_materials(Path::new("/nonexistent/lib.mtl")).unwrap_err();
        assert!(matches!(err, MeshError::FileAccess(_)));
    }

    #[test]
    fn bad_number_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp_mtl(dir.path(), "newmtl a\nNs lots\n");
        let err = load_materials(&path).unwrap_err();
        assert!(err.to_string().contains("lib.mtl:2"));
    }

    #[test]
    fn write_shared_material_once() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("out.mtl");

        let mut mesh = Mesh::new("m");
        let mat = mesh.create_group("a").create_material("paint");
        mat.diffuse_path = dir.path().join("paint.png").to_string_lossy().into_owned();
        mat.alpha = 0.5;
        let shared = mesh[0].material.clone();
        mesh.create_group("b").material = shared;
        mesh.create_group("c");

        let mut out = Vec::new();
        let count = write_materials(&mesh, &mut out, &lib).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(count, 1);
        assert_eq!(text.matches("newmtl").count(), 1);
        assert!(text.starts_with("# out.mtl MTL library\n"));
        assert!(text.contains("newmtl paint\n"));
        assert!(text.contains("Kd 1 1 1\n"));
        assert!(text.contains("Ns 1000\n"));
        assert!(text.contains("d 0.5\n"));
        assert!(text.contains("map_Kd paint.png\n"));
        assert!(!text.contains("Ke"));
    }
}
