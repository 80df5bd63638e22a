use std::fmt::Write as _;
use std::path::Path;

use criterion::{Criterion, criterion_group, criterion_main};
use nanomesh::{Mesh, Options};

/// Write an `n x n` quad grid as OBJ, split into `groups` bands of rows.
fn write_grid_obj(path: &Path, n: usize, groups: usize) {
    let verts_per_side = n + 1;
    let mut obj = String::from("o grid\n");

    for y in 0..verts_per_side {
        for x in 0..verts_per_side {
            let fx = x as f32 / n as f32;
            let fy = y as f32 / n as f32;
            writeln!(obj, "v {fx} {fy} 0").unwrap();
            writeln!(obj, "vt {fx} {fy}").unwrap();
        }
    }
    obj.push_str("vn 0 0 1\n");

    let rows_per_group = n.div_ceil(groups);
    for y in 0..n {
        if y % rows_per_group == 0 {
            writeln!(obj, "g band{}", y / rows_per_group).unwrap();
        }
        for x in 0..n {
            let tl = y * verts_per_side + x + 1; // 1-indexed
            let tr = tl + 1;
            let bl = tl + verts_per_side;
            let br = bl + 1;
            writeln!(obj, "f {tl}/{tl}/1 {bl}/{bl}/1 {br}/{br}/1 {tr}/{tr}/1").unwrap();
        }
    }

    std::fs::write(path, obj).unwrap();
}

fn bench_load(c: &mut Criterion) {
    // 200x200 grid = 40000 quads = 80000 triangles
    let dir = tempfile::tempdir().unwrap();
    let single = dir.path().join("single.obj");
    let banded = dir.path().join("banded.obj");
    write_grid_obj(&single, 200, 1);
    write_grid_obj(&banded, 200, 8);

    c.bench_function("load_obj_single_group_80k", |b| {
        b.iter(|| Mesh::open(&single, Options::empty()).unwrap());
    });

    c.bench_function("load_obj_8_groups_80k", |b| {
        b.iter(|| Mesh::open(&banded, Options::empty()).unwrap());
    });

    c.bench_function("load_obj_engine_preset_80k", |b| {
        b.iter(|| Mesh::open(&banded, Options::ENGINE).unwrap());
    });
}

fn bench_save(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("banded.obj");
    write_grid_obj(&input, 200, 8);
    let mesh = Mesh::open(&input, Options::empty()).unwrap();
    let output = dir.path().join("out.obj");

    c.bench_function("save_obj_8_groups_80k", |b| {
        b.iter(|| mesh.save_as(&output, Options::empty()).unwrap());
    });
}

criterion_group!(benches, bench_load, bench_save);
criterion_main!(benches);
