use std::path::Path;

use dust_viewer::{
    ParseError, ParseWarning,
    data_structures::mesh::MeshDocument,
    resources::MeshParser,
};

use crate::common::test_utils::{RecordingBackend, write_file, write_png};
mod common;

const SQUARE: &str = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv 0.5 1.5 0\n\
                      vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n";

/// Writes `obj` next to a library with untextured materials `A` and `B`.
fn parse(dir: &Path, obj: &str) -> MeshDocument {
    write_file(dir, "lib.mtl", "newmtl A\nnewmtl B\n");
    let path = write_file(dir, "mesh.obj", &format!("mtllib lib.mtl\n{SQUARE}{obj}"));
    MeshParser::default()
        .parse(&path, &mut RecordingBackend::new())
        .unwrap()
}

#[test]
fn every_index_is_within_its_material() {
    let dir = tempfile::tempdir().unwrap();
    let document = parse(
        dir.path(),
        "usemtl A\nf 1 2 3\nf 1/1 2/2 3/3 4/4 5\nusemtl B\nf 2 3 4 5\n",
    );
    for material in &document.materials {
        assert!(material
            .indices
            .iter()
            .all(|&i| (i as usize) < material.vertices.len()));
    }
    assert_eq!(document.triangle_count(), 1 + 3 + 2);
}

#[test]
fn polygons_fan_around_their_first_corner() {
    let dir = tempfile::tempdir().unwrap();
    let document = parse(dir.path(), "usemtl A\nf 1 2 3 4 5\n");
    let a = document.material("A").unwrap();
    assert_eq!(a.triangle_count(), 5 - 2);
    for triangle in a.indices.chunks(3) {
        assert_eq!(a.vertices[triangle[0] as usize].position, [0.0, 0.0, 0.0]);
    }
    let second = &a.indices[3..6];
    assert_eq!(a.vertices[second[1] as usize].position, [1.0, 1.0, 0.0]);
    assert_eq!(a.vertices[second[2] as usize].position, [0.0, 1.0, 0.0]);
}

#[test]
fn corners_without_uv_sample_the_origin() {
    let dir = tempfile::tempdir().unwrap();
    let document = parse(dir.path(), "usemtl A\nf 1 2//1 3/9\nf 2/3 3/3 4/3\n");
    let a = document.material("A").unwrap();
    assert!(a.vertices[..3].iter().all(|v| v.tex_coords == [0.0, 0.0]));
    assert!(a.vertices[3..].iter().all(|v| v.tex_coords == [1.0, 1.0]));
}

#[test]
fn vertical_uv_is_not_flipped() {
    let dir = tempfile::tempdir().unwrap();
    let document = parse(dir.path(), "vt 0.25 0.125\nusemtl A\nf 1/5 2/5 3/5\n");
    let a = document.material("A").unwrap();
    assert_eq!(a.vertices[0].tex_coords, [0.25, 0.125]);
}

#[test]
fn unknown_material_drops_faces() {
    let dir = tempfile::tempdir().unwrap();
    let document = parse(dir.path(), "usemtl A\nf 1 2 3\nusemtl Missing\nf 1 2 3\nf 2 3 4\n");
    assert_eq!(document.material("A").unwrap().triangle_count(), 1);
    assert_eq!(document.material("B").unwrap().triangle_count(), 0);
    assert_eq!(document.triangle_count(), 1);
}

#[test]
fn quad_before_any_material_is_dropped_with_one_warning() {
    let dir = tempfile::tempdir().unwrap();
    let document = parse(dir.path(), "f 1/1 2/2 3/3 4/4\n");
    assert_eq!(document.triangle_count(), 0);
    assert_eq!(
        document.warnings,
        vec![ParseWarning::FaceBeforeMaterial { line: 11 }]
    );
}

#[test]
fn triangle_then_quad_accumulate_in_one_material() {
    let dir = tempfile::tempdir().unwrap();
    let document = parse(dir.path(), "usemtl A\nf 1 2 3\nf 1 2 3 4\n");
    let a = document.material("A").unwrap();
    assert_eq!(a.vertices.len(), 9);
    assert_eq!(a.indices, (0..9).collect::<Vec<u32>>());
    assert_eq!(a.triangle_count(), 3);
    assert!(document.warnings.is_empty());
}

#[test]
fn out_of_range_corners_are_skipped_not_repaired() {
    let dir = tempfile::tempdir().unwrap();
    let document = parse(dir.path(), "usemtl A\nf 1 2 99\nf 0 1 2\n");
    let a = document.material("A").unwrap();
    assert_eq!(a.vertices.len(), 4);
    assert_eq!(a.indices.len(), 4);
    assert_eq!(
        document.warnings,
        vec![
            ParseWarning::VertexIndexOutOfRange { line: 12, index: 99 },
            ParseWarning::VertexIndexOutOfRange { line: 13, index: 0 },
        ]
    );
}

#[test]
fn pools_keep_every_record() {
    let dir = tempfile::tempdir().unwrap();
    let document = parse(dir.path(), "vn 0 1 0\nvn 1\n# comment\no thing\ns off\n");
    assert_eq!(document.positions.len(), 5);
    assert_eq!(document.tex_coords.len(), 4);
    assert_eq!(document.normals, vec![[0.0, 1.0, 0.0], [1.0, 0.0, 0.0]]);
}

#[test]
fn reparsing_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "a.png", 2);
    write_file(dir.path(), "lib.mtl", "newmtl A\nmap_Kd a.png\nnewmtl B\n");
    let path = write_file(
        dir.path(),
        "mesh.obj",
        &format!("mtllib lib.mtl\n{SQUARE}usemtl A\nf 1/1 2/2 3/3 4/4\nusemtl B\nf 5 1 2\n"),
    );
    let parser = MeshParser::default();
    let first = parser.parse(&path, &mut RecordingBackend::new()).unwrap();
    let second = parser.parse(&path, &mut RecordingBackend::new()).unwrap();
    assert_eq!(first, second);
    for (a, b) in first.materials.iter().zip(&second.materials) {
        assert_eq!(
            bytemuck::cast_slice::<_, u8>(&a.vertices),
            bytemuck::cast_slice::<_, u8>(&b.vertices)
        );
    }
}

#[test]
fn missing_mesh_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let result = MeshParser::default().parse(dir.path().join("nope.obj"), &mut RecordingBackend::new());
    assert!(matches!(result, Err(ParseError::FileOpen { .. })));
}

#[test]
fn missing_material_library_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "mesh.obj", "mtllib gone.mtl\nv 0 0 0\n");
    let result = MeshParser::default().parse(&path, &mut RecordingBackend::new());
    match result {
        Err(ParseError::MaterialLibrary { path, source }) => {
            assert!(path.ends_with("gone.mtl"));
            assert!(matches!(*source, ParseError::FileOpen { .. }));
        }
        other => panic!("expected a material library error, got {other:?}"),
    }
}
