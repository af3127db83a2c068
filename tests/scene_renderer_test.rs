use cgmath::{Deg, Matrix4, Vector3};
use dust_viewer::{
    RenderError,
    data_structures::{
        actor::{Actor, CHARACTER_SCALE, PlacedActor, Team},
        mesh::{Material, MeshDocument, Vertex},
        weapon::WeaponKind,
    },
    gpu::{DepthFunc, Face, RasterState, RenderBackend, TextureId, Uniform},
    render::{Archetype, SceneRenderer, upload_document},
};

use crate::common::test_utils::{Call, RecordingBackend};
mod common;

fn material(name: &str, texture: Option<TextureId>, triangles: usize) -> Material {
    let mut material = Material::new(name);
    material.texture = texture;
    for i in 0..triangles * 3 {
        material.vertices.push(Vertex {
            position: [i as f32, 0.0, 0.0],
            tex_coords: [0.0, 1.0],
        });
        material.indices.push(i as u32);
    }
    material
}

fn textured(n: usize) -> Option<TextureId> {
    Some(TextureId::from_index(n))
}

/// Two textured materials, one untextured and one empty.
fn mixed_document() -> MeshDocument {
    MeshDocument {
        materials: vec![
            material("wall", textured(0), 2),
            material("bare", None, 1),
            material("empty", textured(1), 0),
            material("floor", textured(2), 1),
        ],
        ..MeshDocument::default()
    }
}

fn loaded(gpu: &mut RecordingBackend) -> SceneRenderer<RecordingBackend> {
    let mut renderer = SceneRenderer::new();
    for archetype in Archetype::ALL {
        renderer.load(gpu, archetype, mixed_document());
    }
    gpu.clear();
    renderer
}

#[test]
fn one_buffer_set_per_material_even_when_empty() {
    let mut gpu = RecordingBackend::new();
    let document = mixed_document();
    let buffers = upload_document(&mut gpu, "map", &document);
    assert_eq!(buffers.len(), 4);
    assert_eq!(buffers[0].label, "map/wall");
    assert_eq!(buffers[0].floats.len(), 6 * Vertex::FLOATS);
    assert_eq!(&buffers[0].floats[5..10], &[1.0, 0.0, 0.0, 0.0, 1.0]);
    assert_eq!(buffers[0].indices, (0..6).collect::<Vec<u32>>());
    assert!(buffers[2].floats.is_empty() && buffers[2].indices.is_empty());
}

#[test]
fn map_draws_textured_non_empty_materials_only() {
    let mut gpu = RecordingBackend::new();
    let renderer = loaded(&mut gpu);
    renderer.draw_map(&mut gpu).unwrap();

    let draws: Vec<String> = gpu.indexed_draws().into_iter().map(|(label, _)| label).collect();
    assert_eq!(draws, ["map/wall", "map/floor"]);
    assert_eq!(
        gpu.calls[..3],
        [
            Call::BindTexture(0, TextureId::from_index(0)),
            Call::SetUniform("texture1".to_string(), Uniform::Int(0)),
            Call::DrawIndexed {
                label: "map/wall".to_string(),
                count: 6,
                raster: RasterState::default(),
            },
        ]
    );
}

#[test]
fn actor_draw_uploads_its_model_matrix() {
    let mut gpu = RecordingBackend::new();
    let renderer = loaded(&mut gpu);
    let actor = PlacedActor::new(Team::Terrorist, Vector3::new(1.0, 2.0, 3.0), Deg(30.0));
    renderer.draw_actor(&mut gpu, &actor).unwrap();

    assert_eq!(
        gpu.calls[0],
        Call::SetUniform("model".to_string(), Uniform::Mat4(actor.model_matrix()))
    );
    let expected = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0))
        * Matrix4::from_angle_y(Deg(-90.0 + 30.0))
        * Matrix4::from_scale(CHARACTER_SCALE);
    assert_eq!(actor.model_matrix(), expected);
    let draws: Vec<String> = gpu.indexed_draws().into_iter().map(|(label, _)| label).collect();
    assert_eq!(draws, ["t/wall", "t/floor"]);
}

#[test]
fn knife_draws_each_textured_material_twice() {
    let mut gpu = RecordingBackend::new();
    let renderer = loaded(&mut gpu);
    renderer.draw_weapon(&mut gpu, WeaponKind::Knife).unwrap();

    let draws = gpu.indexed_draws();
    assert_eq!(draws.len(), 2 * 2);
    let culled: Vec<(&str, Option<Face>)> = draws
        .iter()
        .map(|(label, raster)| (label.as_str(), raster.culled()))
        .collect();
    assert_eq!(
        culled,
        [
            ("knife/wall", Some(Face::Front)),
            ("knife/wall", Some(Face::Back)),
            ("knife/floor", Some(Face::Front)),
            ("knife/floor", Some(Face::Back)),
        ]
    );
    assert!(draws.iter().all(|(_, r)| r.depth_test && r.blend));
}

#[test]
fn other_weapons_draw_once_without_culling() {
    for kind in [WeaponKind::Rifle, WeaponKind::Pistol] {
        let mut gpu = RecordingBackend::new();
        let renderer = loaded(&mut gpu);
        renderer.draw_weapon(&mut gpu, kind).unwrap();

        let draws = gpu.indexed_draws();
        assert_eq!(draws.len(), 2, "{kind:?}");
        assert!(draws
            .iter()
            .all(|(_, r)| r.culled().is_none() && r.depth_test && r.blend));
        assert!(draws[0].0.starts_with(kind.name()));
    }
}

#[test]
fn weapon_draw_restores_raster_state() {
    let mut gpu = RecordingBackend::new();
    let renderer = loaded(&mut gpu);
    let before = RasterState {
        depth_test: false,
        depth_func: DepthFunc::LessEqual,
        cull_enabled: true,
        cull_face: Face::Front,
        blend: false,
    };
    gpu.set_raster_state(before);

    for kind in WeaponKind::ALL {
        gpu.set_raster_state(before);
        renderer.draw_weapon(&mut gpu, kind).unwrap();
        assert_eq!(
            gpu.raster_state(),
            RasterState {
                cull_face: Face::Back,
                ..before
            }
        );
    }
}

#[test]
fn missing_weapon_model_is_reported_and_state_untouched() {
    let mut gpu = RecordingBackend::new();
    let mut renderer = SceneRenderer::new();
    renderer.load(&mut gpu, Archetype::Map, mixed_document());
    gpu.clear();

    let result = renderer.draw_weapon(&mut gpu, WeaponKind::Rifle);
    assert!(matches!(
        result,
        Err(RenderError::ArchetypeNotLoaded(Archetype::Weapon(WeaponKind::Rifle)))
    ));
    assert!(gpu.calls.is_empty());
    assert!(renderer.draw_map(&mut gpu).is_ok());
}

#[test]
fn reloading_an_archetype_releases_the_old_buffers() {
    let mut gpu = RecordingBackend::new();
    let mut renderer = SceneRenderer::new();
    renderer.load(&mut gpu, Archetype::Map, mixed_document());
    assert_eq!(gpu.released(), 0);

    let smaller = MeshDocument {
        materials: vec![material("only", textured(0), 1)],
        ..MeshDocument::default()
    };
    renderer.load(&mut gpu, Archetype::Map, smaller);
    assert_eq!(gpu.released(), 4);
    assert_eq!(renderer.document(Archetype::Map).unwrap().materials.len(), 1);
}

#[test]
fn teardown_releases_every_buffer_set_once() {
    let mut gpu = RecordingBackend::new();
    let mut renderer = loaded(&mut gpu);
    let created = 6 * 4;
    assert!(Archetype::ALL.iter().all(|&a| renderer.is_loaded(a)));

    renderer.teardown();
    assert_eq!(gpu.released(), created);
    assert!(!renderer.is_loaded(Archetype::Map));
    assert!(renderer.draw_map(&mut gpu).is_err());

    drop(renderer);
    assert_eq!(gpu.released(), created);
}

#[test]
fn dropping_the_renderer_releases_its_buffers() {
    let mut gpu = RecordingBackend::new();
    let renderer = loaded(&mut gpu);
    drop(renderer);
    assert_eq!(gpu.released(), 6 * 4);
}
