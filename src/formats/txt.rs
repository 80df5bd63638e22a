//! Block-oriented text mesh format.
//!
//! ```text
//! mesh Cube
//! verts 3
//! 0 0 0
//! 1 0 0
//! 0 1 0
//! coords 1
//! 0.5 0.5
//! polys 1
//! 1/1 2/1 3/1
//! ```
//!
//! Each count line is followed by exactly that many data lines. Polygon
//! descriptors are 1-based and refer to the elements of the current `mesh`
//! block.

use std::path::Path;
use std::str::{Lines, SplitAsciiWhitespace};

use glam::{Vec2, Vec3};
use tracing::info;

use crate::config::Options;
use crate::error::{MeshError, Result};
use crate::formats::classify_mapping;
use crate::types::{FaceWinding, Mesh, MeshGroup, Triangle, VertexDescr};

/// Where the current `mesh` block started inside its group.
#[derive(Debug, Clone, Copy)]
struct Block {
    group: usize,
    verts: u32,
    coords: u32,
    normals: u32,
}

impl Block {
    fn open(group: usize, g: &MeshGroup) -> Self {
        Self {
            group,
            verts: g.num_verts() as u32,
            coords: g.num_coords() as u32,
            normals: g.num_normals() as u32,
        }
    }
}

struct TxtParser<'a> {
    path: &'a Path,
    lines: std::iter::Enumerate<Lines<'a>>,
    line_no: usize,
}

impl<'a> TxtParser<'a> {
    fn malformed(&self, what: impl std::fmt::Display) -> MeshError {
        MeshError::MalformedData(format!("{}:{}: {what}", self.path.display(), self.line_no + 1))
    }

    fn next_line(&mut self) -> Option<&'a str> {
        let (no, line) = self.lines.next()?;
        self.line_no = no;
        Some(line)
    }

    /// Reads the `count` data lines of a block.
    fn block_lines(&mut self, keyword: &str, count: usize) -> Result<Vec<&'a str>> {
        // The count is read from the file, so it only caps the loop.
        let mut lines = Vec::new();
        for i in 0..count {
            match self.next_line() {
                Some(line) => lines.push(line),
                None => {
                    return Err(self.malformed(format!(
                        "'{keyword} {count}' block ends after {i} lines"
                    )));
                }
            }
        }
        Ok(lines)
    }

    fn floats<const N: usize>(&self, line: &str) -> Result<[f32; N]> {
        let mut out = [0.0f32; N];
        let mut tokens = line.split_ascii_whitespace();
        for dst in &mut out {
            let token = tokens
                .next()
                .ok_or_else(|| self.malformed(format!("expected {N} numbers")))?;
            *dst = token
                .parse()
                .map_err(|_| self.malformed(format!("invalid number '{token}'")))?;
        }
        Ok(out)
    }

    fn count(&self, tokens: &mut SplitAsciiWhitespace<'_>, keyword: &str) -> Result<usize> {
        let token = tokens.next().unwrap_or_default();
        token
            .parse()
            .map_err(|_| self.malformed(format!("invalid {keyword} count '{token}'")))
    }

    /// Parses a 1-based `v`, `v/t` or `v/t/n` descriptor relative to `block`.
    fn corner(&self, token: &str, block: &Block, g: &MeshGroup) -> Result<VertexDescr> {
        let mut parts = token.split('/');
        let mut index = |base: u32, len: usize| -> Result<Option<u32>> {
            match parts.next() {
                Some(s) if !s.is_empty() => {
                    let raw: u32 = s
                        .parse()
                        .map_err(|_| self.malformed(format!("invalid descriptor '{token}'")))?;
                    let index = base as usize + raw as usize;
                    if raw == 0 || index > len {
                        return Err(self.malformed(format!("index out of range in '{token}'")));
                    }
                    Ok(Some(index as u32 - 1))
                }
                _ => Ok(None),
            }
        };
        let Some(v) = index(block.verts, g.num_verts())? else {
            return Err(self.malformed(format!("descriptor without vertex '{token}'")));
        };
        let t = index(block.coords, g.num_coords())?;
        let n = index(block.normals, g.num_normals())?;
        Ok(VertexDescr::with(v, t, n))
    }
}

/// Load a `.txt` block mesh into an empty `mesh`.
pub fn load_txt(mesh: &mut Mesh, path: &Path, options: Options) -> Result<()> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        MeshError::FileAccess(format!("Failed to open file {}: {e}", path.display()))
    })?;
    if options.contains(Options::LOG) {
        info!(file = %path.display(), options = %options, "Load TXT");
    }

    mesh.name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut parser = TxtParser {
        path,
        lines: text.lines().enumerate(),
        line_no: 0,
    };
    let mut block: Option<Block> = None;

    while let Some(line) = parser.next_line() {
        let mut tokens = line.split_ascii_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };
        if keyword == "mesh" {
            let name = tokens.next().unwrap_or_default();
            let index = match mesh.groups.iter().position(|g| g.name == name) {
                Some(index) => index,
                None => {
                    mesh.create_group(name);
                    mesh.groups.len() - 1
                }
            };
            block = Some(Block::open(index, &mesh.groups[index]));
            continue;
        }
        if !matches!(keyword, "verts" | "coords" | "normals" | "polys") {
            continue;
        }

        let Some(current) = block else {
            return Err(parser.malformed(format!("'{keyword}' before any 'mesh' declaration")));
        };
        let count = parser.count(&mut tokens, keyword)?;
        let data = parser.block_lines(keyword, count)?;
        let g = &mut mesh.groups[current.group];
        match keyword {
            "verts" => {
                for line in data {
                    g.verts.push(Vec3::from_array(parser.floats::<3>(line)?));
                }
            }
            "coords" => {
                for line in data {
                    g.coords.push(Vec2::from_array(parser.floats::<2>(line)?));
                }
            }
            "normals" => {
                for line in data {
                    g.normals.push(Vec3::from_array(parser.floats::<3>(line)?));
                }
            }
            _ => {
                for line in data {
                    let corners = line
                        .split_ascii_whitespace()
                        .map(|token| parser.corner(token, &current, g))
                        .collect::<Result<Vec<_>>>()?;
                    if corners.len() < 3 {
                        return Err(parser.malformed("polygon needs at least 3 vertices"));
                    }
                    for i in 2..corners.len() {
                        g.tris
                            .push(Triangle::new(corners[0], corners[i - 1], corners[i]));
                    }
                }
            }
        }
    }

    for g in &mut mesh.groups {
        g.coords_mapping = classify_mapping(g, g.coords.len(), |vd| vd.t);
        g.normals_mapping = classify_mapping(g, g.normals.len(), |vd| vd.n);
        g.winding = FaceWinding::Ccw;
    }
    if options.contains(Options::SINGLE_GROUP) {
        mesh.merge_groups();
    }
    Ok(())
}
