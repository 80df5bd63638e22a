//! End-to-end integration tests.
//!
//! These tests write small mesh files into temporary directories, load them
//! through the public API and check the resulting geometry.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use approx::assert_abs_diff_eq;
use glam::{Vec2, Vec3};

use nanomesh::{
    CoordSys, FaceWinding, MapMode, Mesh, MeshError, MeshGroup, Options, Ray, Triangle,
    VertexDescr,
};

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// An `n` x `n` grid of quads in the XY plane at height `z`, with per-vertex
/// UVs and a single shared normal.
fn grid_group(name: &str, n: u32, z: f32) -> MeshGroup {
    let mut g = MeshGroup::new(0, name);
    let side = n + 1;
    for y in 0..side {
        for x in 0..side {
            let (fx, fy) = (x as f32 / n as f32, y as f32 / n as f32);
            g.verts.push(Vec3::new(fx, fy, z));
            g.coords.push(Vec2::new(fx, fy));
        }
    }
    g.normals.push(Vec3::Z);
    let vd = |v: u32| VertexDescr::with(v, Some(v), Some(0));
    for y in 0..n {
        for x in 0..n {
            let tl = y * side + x;
            let (tr, bl) = (tl + 1, tl + side);
            let br = bl + 1;
            g.tris.push(Triangle::new(vd(tl), vd(bl), vd(tr)));
            g.tris.push(Triangle::new(vd(tr), vd(bl), vd(br)));
        }
    }
    g.coords_mapping = MapMode::PerVertex;
    g.normals_mapping = MapMode::SharedElements;
    g
}

fn assert_same_corners(a: &MeshGroup, b: &MeshGroup) {
    assert_eq!(a.tris.len(), b.tris.len());
    for (ta, tb) in a.tris.iter().zip(&b.tris) {
        for (ca, cb) in ta.corners().into_iter().zip(tb.corners()) {
            let (pa, pb) = (a.verts[ca.v as usize], b.verts[cb.v as usize]);
            assert_abs_diff_eq!(pa.x, pb.x, epsilon = 1e-5);
            assert_abs_diff_eq!(pa.y, pb.y, epsilon = 1e-5);
            assert_abs_diff_eq!(pa.z, pb.z, epsilon = 1e-5);

            let (ua, ub) = (a.coords[ca.t.unwrap() as usize], b.coords[cb.t.unwrap() as usize]);
            assert_abs_diff_eq!(ua.x, ub.x, epsilon = 1e-4);
            assert_abs_diff_eq!(ua.y, ub.y, epsilon = 1e-4);

            let (na, nb) = (a.normals[ca.n.unwrap() as usize], b.normals[cb.n.unwrap() as usize]);
            assert_abs_diff_eq!(na.dot(nb), 1.0, epsilon = 1e-4);
        }
    }
}

// ---------------------------------------------------------------------------
// OBJ round trip
// ---------------------------------------------------------------------------

#[test]
fn obj_round_trip_preserves_groups_and_corners() {
    let dir = tempfile::tempdir().unwrap();
    let mut mesh = Mesh::new("terrain");
    mesh.groups.push(grid_group("ground", 4, 0.0));
    mesh.groups.push(grid_group("roof", 3, 2.5));
    mesh.groups[1].group_id = 1;

    let path = dir.path().join("terrain.obj");
    assert!(mesh.save_as(&path, Options::empty()).unwrap());

    let loaded = Mesh::open(&path, Options::empty()).unwrap();
    assert_eq!(loaded.name, "terrain");
    assert_eq!(loaded.num_groups(), 2);
    for (a, b) in mesh.groups.iter().zip(&loaded.groups) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.verts.len(), b.verts.len());
        assert_eq!(b.winding, FaceWinding::Ccw);
        assert_same_corners(a, b);
    }
}

#[test]
fn obj_round_trip_shares_materials() {
    let dir = tempfile::tempdir().unwrap();
    let mut mesh = Mesh::new("painted");
    let mut a = grid_group("a", 1, 0.0);
    let mat = a.create_material("Paint");
    mat.diffuse_color = Vec3::new(0.2, 0.4, 0.6);
    mat.alpha = 0.5;
    let mut b = grid_group("b", 1, 1.0);
    b.material = a.material.clone();
    mesh.groups.push(a);
    mesh.groups.push(b);

    let path = dir.path().join("painted.obj");
    mesh.save_as(&path, Options::empty()).unwrap();
    assert!(dir.path().join("painted.mtl").exists());

    let loaded = Mesh::open(&path, Options::empty()).unwrap();
    let ma = loaded[0].material.as_ref().unwrap();
    let mb = loaded[1].material.as_ref().unwrap();
    assert!(Arc::ptr_eq(ma, mb));
    assert_eq!(ma.name, "Paint");
    assert_eq!(ma.material_file, "painted.mtl");
    assert_abs_diff_eq!(ma.diffuse_color.y, 0.4, epsilon = 1e-6);
    assert_abs_diff_eq!(ma.alpha, 0.5, epsilon = 1e-6);
    assert!(loaded.find_material("paint").is_some());
}

// ---------------------------------------------------------------------------
// OBJ reconciliation
// ---------------------------------------------------------------------------

#[test]
fn unit_quad_polygon_becomes_two_triangles() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "quad.obj",
        "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
         vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
         f 1/1 2/2 3/3 4/4\n",
    );
    let mesh = Mesh::open(&path, Options::empty()).unwrap();

    let g = &mesh[0];
    assert_eq!(g.tris.len(), 2);
    let diagonal = [0u32, 2];
    for tri in &g.tris {
        assert!(diagonal.iter().all(|&v| tri.contains_vertex_id(v)));
    }
    assert_eq!(g.index_array(), vec![0, 1, 2, 0, 2, 3]);

    // Texture indices travel with their positions through the fan split.
    for tri in &g.tris {
        for vd in [tri.a, tri.b, tri.c] {
            assert_eq!(vd.t, Some(vd.v));
        }
    }
    assert_eq!(g.coords_mapping, MapMode::PerVertex);
}

#[test]
fn groups_sharing_positions_get_local_indices() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "shared.obj",
        "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
         vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
         g left\nf 1/1 2/2 3/3\n\
         g right\nf 3/3 4/4 1/1\n",
    );
    let mesh = Mesh::open(&path, Options::empty()).unwrap();
    assert_eq!(mesh.num_groups(), 2);

    let left = mesh.find_group("left").unwrap();
    let right = mesh.find_group("right").unwrap();
    assert_eq!(right.tris[0].positions(), [0, 1, 2]);
    assert_eq!(right.verts.len(), 3);
    assert_eq!(right.coords.len(), 3);
    assert_eq!(right.coords_mapping, MapMode::PerVertex);

    // the first global position is duplicated into both groups
    assert_eq!(left.verts[0], right.verts[2]);
    assert_eq!(right.verts[0], Vec3::new(1.0, 1.0, 0.0));
    assert_eq!(right.coords[1], Vec2::new(0.0, 1.0));
}

#[test]
fn single_group_option_collapses_groups() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "groups.obj",
        "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\ng a\nf 1 2 3\ng b\nf 3 4 1\n",
    );
    let mesh = Mesh::open(&path, Options::SINGLE_GROUP).unwrap();
    assert_eq!(mesh.num_groups(), 1);
    assert_eq!(mesh.total_tris(), 2);
    assert_eq!(mesh.total_verts(), 4);
}

// ---------------------------------------------------------------------------
// Load options
// ---------------------------------------------------------------------------

#[test]
fn engine_preset_flattens_and_converts() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "engine.obj",
        "v 1 0 0\nv 2 0 0\nv 2 1 0\n\
         vt 0 0\nvt 1 0\nvt 1 1\n\
         g first\nf 1/1 2/2 3/3\n\
         g second\nf 1/3 3/2 2/1\n",
    );
    let mesh = Mesh::open(&path, Options::ENGINE).unwrap();

    assert_eq!(mesh.num_groups(), 1);
    let g = &mesh[0];
    assert_eq!(g.winding, FaceWinding::Cw);
    assert_eq!(g.coord_sys, CoordSys::LeftHanded);
    assert_eq!(g.tris.len(), 2);
    // seams are split, UVs are one per position
    assert_eq!(g.verts.len(), 6);
    assert_eq!(g.verts.len(), g.coords.len());
    assert_eq!(g.coords_mapping, MapMode::PerVertex);
    // X mirrored, b/c swapped
    assert_eq!(g.verts[0], Vec3::new(-1.0, 0.0, 0.0));
    assert_eq!(g.tris[0].positions(), [0, 2, 1]);
    for tri in &g.tris {
        for vd in tri.corners() {
            assert_eq!(vd.t, Some(vd.v));
        }
    }
}

#[test]
fn clockwise_option_swaps_winding() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "cw.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
    let mesh = Mesh::open(&path, Options::CLOCKWISE).unwrap();
    assert_eq!(mesh[0].winding, FaceWinding::Cw);
    assert_eq!(mesh[0].tris[0].positions(), [0, 2, 1]);
    assert_eq!(mesh[0].create_index_array(FaceWinding::Ccw), vec![0, 1, 2]);
}

#[test]
fn optimized_flatten_is_idempotent() {
    let mut g = grid_group("g", 3, 0.0);
    // break UV continuity on one corner
    g.coords.push(Vec2::new(5.0, 5.0));
    g.tris[0].a.t = Some(g.coords.len() as u32 - 1);
    g.coords_mapping = MapMode::PerFaceVertex;
    let verts_before = g.verts.len();
    let tris_before = g.tris.len();

    g.optimized_flatten();
    assert!(g.verts.len() >= verts_before);
    assert_eq!(g.tris.len(), tris_before);

    let once = g.clone();
    g.optimized_flatten();
    assert_eq!(g.verts, once.verts);
    assert_eq!(g.coords, once.coords);
    assert_eq!(g.normals, once.normals);
    assert_eq!(g.tris, once.tris);
}

// ---------------------------------------------------------------------------
// Normals and picking
// ---------------------------------------------------------------------------

#[test]
fn duplicate_aware_normals_match_at_coincident_positions() {
    let dir = tempfile::tempdir().unwrap();
    // two triangles folded along an edge, with the edge positions duplicated
    let path = write_file(
        dir.path(),
        "hinge.obj",
        "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 0 0\nv 0 1 0\nv 1 1 1\n\
         vn 0 0 1\nvn 0 0 1\nvn 0 0 1\nvn 0 0 1\nvn 0 0 1\nvn 0 0 1\n\
         f 1//1 2//2 3//3\nf 4//4 6//6 5//5\n",
    );
    let mut mesh = Mesh::open(&path, Options::empty()).unwrap();
    mesh.recalculate_normals(true);

    let g = &mesh[0];
    assert_eq!(g.normals_mapping, MapMode::PerVertex);
    for (a, b) in [(1usize, 3usize), (2, 4)] {
        assert_eq!(g.verts[a], g.verts[b]);
        assert_abs_diff_eq!(g.normals[a].x, g.normals[b].x, epsilon = 1e-6);
        assert_abs_diff_eq!(g.normals[a].y, g.normals[b].y, epsilon = 1e-6);
        assert_abs_diff_eq!(g.normals[a].z, g.normals[b].z, epsilon = 1e-6);
        assert_abs_diff_eq!(g.normals[a].length(), 1.0, epsilon = 1e-5);
    }
    // the unshared corners only see their own face
    assert!(g.normals[0].abs_diff_eq(Vec3::Z, 1e-6));
}

#[test]
fn pick_nearest_triangle_across_groups() {
    let mut mesh = Mesh::new("stack");
    mesh.groups.push(grid_group("low", 2, 0.0));
    mesh.groups.push(grid_group("high", 2, 1.0));
    mesh.groups[1].group_id = 1;

    let ray = Ray::new(Vec3::new(0.3, 0.3, 5.0), Vec3::NEG_Z);
    let hit = mesh.pick_triangle(&ray).unwrap();
    assert_eq!(hit.group.name, "high");
    assert_abs_diff_eq!(hit.distance, 4.0, epsilon = 1e-5);

    let miss = Ray::new(Vec3::new(0.3, 0.3, 5.0), Vec3::Z);
    assert!(mesh.pick_triangle(&miss).is_none());
}

// ---------------------------------------------------------------------------
// TXT and dispatch
// ---------------------------------------------------------------------------

#[test]
fn txt_mesh_loads_through_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "Cube.TXT",
        "mesh Face\nverts 4\n0 0 0\n1 0 0\n1 1 0\n0 1 0\n\
         normals 1\n0 0 1\npolys 1\n1//1 2//1 3//1 4//1\n",
    );
    let mesh = Mesh::open(&path, Options::LOG).unwrap();
    assert_eq!(mesh.name, "Cube");
    assert_eq!(mesh[0].name, "Face");
    assert_eq!(mesh[0].tris.len(), 2);
    assert_eq!(mesh[0].winding, FaceWinding::Ccw);
}

#[test]
fn unknown_extension_is_unrecognized() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "model.fbx", "binary");
    let err = Mesh::open(&path, Options::empty()).unwrap_err();
    assert!(matches!(err, MeshError::UnrecognizedFormat(_)));
}

#[test]
fn no_throw_returns_false_and_records_error() {
    nanomesh::take_last_error();
    let mut mesh = Mesh::default();
    let loaded = mesh
        .load("/nonexistent/missing.obj", Options::NO_THROW)
        .unwrap();
    assert!(!loaded);
    assert!(!mesh.is_good());
    let message = nanomesh::last_error().unwrap();
    assert!(message.contains("missing.obj"));

    let saved = mesh.save_as("/nonexistent/dir/out.obj", Options::NO_THROW).unwrap();
    assert!(!saved);
}

#[test]
fn malformed_obj_leaves_mesh_cleared() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "bad.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 7\n");
    let mut mesh = Mesh::new("previous");
    mesh.create_group("old");

    let err = mesh.load(&path, Options::empty()).unwrap_err();
    assert!(matches!(err, MeshError::MalformedData(_)));
    assert!(err.to_string().contains("bad.obj:4"));
    assert!(!mesh.is_good());
}
