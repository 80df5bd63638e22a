use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::info;

use crate::config::{ConvertConfig, Options};
use crate::error::Result;
use crate::formats::{self, MeshFormat, MeshStats};
use crate::types::Mesh;

/// Summary of a completed conversion run.
#[derive(Debug)]
pub struct ProcessingResult {
    pub stats: MeshStats,
    pub output: Option<PathBuf>,
    pub duration: Duration,
}

/// Conversion orchestrator: load, post-process, report, save.
pub struct Pipeline;

impl Pipeline {
    /// Run one conversion as described by `config`.
    pub fn run(config: &ConvertConfig) -> Result<ProcessingResult> {
        let start = Instant::now();
        // failures must surface as errors here, not as an empty mesh
        let options = config.options.difference(Options::NO_THROW);

        info!(input = %config.input.display(), options = %options, "Starting conversion");

        // 1. Detect format
        let format = MeshFormat::from_path(&config.input)?;
        if let Some(output) = &config.output {
            MeshFormat::from_path(output)?;
        }

        // 2. Load
        let mut mesh = Mesh::open(&config.input, options)?;

        // 3. Normals
        if config.recalculate_normals {
            info!(weld = config.weld_normals, "Recalculating normals");
            mesh.recalculate_normals(config.weld_normals);
        }

        // 4. Merge
        if config.merge_groups && mesh.num_groups() > 1 {
            info!(groups = mesh.num_groups(), "Merging groups");
            mesh.merge_groups();
        }

        // 5. Report
        let stats = formats::compute_stats(&mesh, format);
        if !config.json {
            print_stats(&stats);
        }

        // 6. Save
        if let Some(output) = &config.output {
            info!(output = %output.display(), "Writing mesh");
            mesh.save_as(output, options)?;
        }

        let duration = start.elapsed();
        info!(elapsed = ?duration, "Conversion complete");

        Ok(ProcessingResult {
            stats,
            output: config.output.clone(),
            duration,
        })
    }
}

/// Print mesh statistics in human-readable form.
fn print_stats(stats: &MeshStats) {
    println!("=== {} ({}) ===", stats.name, stats.format);
    println!("  Groups:    {}", stats.groups.len());
    println!("  Vertices:  {}", stats.total_verts);
    println!("  Triangles: {}", stats.total_tris);
    println!("  UVs:       {}", stats.total_coords);
    println!("  Normals:   {}", stats.total_normals);
    println!("  Colors:    {}", stats.total_colors);
    println!("  Materials: {}", stats.material_count);
    let (min, max) = (stats.bbox_min, stats.bbox_max);
    println!(
        "  Bounding box: ({:.3}, {:.3}, {:.3}) → ({:.3}, {:.3}, {:.3})",
        min[0], min[1], min[2], max[0], max[1], max[2]
    );
    for g in &stats.groups {
        println!(
            "  - {:<16} verts={} tris={} uvs={} ({}) normals={} ({}) colors={} ({}) material={}",
            g.name,
            g.verts,
            g.tris,
            g.coords,
            g.coords_mapping,
            g.normals,
            g.normals_mapping,
            g.colors,
            g.colors_mapping,
            g.material.as_deref().unwrap_or("-")
        );
    }
}
