//! Scene rendering.
//!
//! [`SceneRenderer`] owns the GPU buffers of every loaded model, keyed by
//! [`Archetype`], and issues the draw calls for the map, the characters and
//! the held weapon. It only ever talks to the GPU through [`RenderBackend`],
//! so the same code drives wgpu and the recording backend used in tests.
//!
//! # Key types
//!
//! - [`Archetype`] names the six renderable model categories
//! - [`ModelBuffers`] pairs a parsed document with its per-material buffers
//! - [`SceneRenderer`] holds them all and draws them
//!
//! The skybox and crosshair are simple enough to live in their own modules.

use std::collections::HashMap;

use crate::{
    data_structures::{
        actor::{Actor, Team},
        mesh::MeshDocument,
        weapon::{DrawMode, WeaponKind},
    },
    error::RenderError,
    gpu::{Face, RasterState, RasterStateGuard, RenderBackend, TextureId},
};

pub mod buffers;
pub mod crosshair;
pub mod skybox;

pub use buffers::upload_document;

/// One independently loaded model.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Archetype {
    Map,
    Weapon(WeaponKind),
    Character(Team),
}

impl Archetype {
    pub const ALL: [Archetype; 6] = [
        Archetype::Map,
        Archetype::Weapon(WeaponKind::Rifle),
        Archetype::Weapon(WeaponKind::Pistol),
        Archetype::Weapon(WeaponKind::Knife),
        Archetype::Character(Team::CounterTerrorist),
        Archetype::Character(Team::Terrorist),
    ];

    pub fn label(self) -> &'static str {
        match self {
            Archetype::Map => "map",
            Archetype::Weapon(kind) => kind.name(),
            Archetype::Character(Team::CounterTerrorist) => "ct",
            Archetype::Character(Team::Terrorist) => "t",
        }
    }
}

/// A parsed document and one buffer set per material, in material order.
pub struct ModelBuffers<B: RenderBackend> {
    document: MeshDocument,
    buffers: Vec<B::BufferSet>,
}

impl<B: RenderBackend> ModelBuffers<B> {
    pub fn new(gpu: &mut B, label: &str, document: MeshDocument) -> Self {
        let buffers = upload_document(gpu, label, &document);
        Self { document, buffers }
    }

    pub fn document(&self) -> &MeshDocument {
        &self.document
    }

    pub fn buffers(&self) -> &[B::BufferSet] {
        &self.buffers
    }

    /// Materials that produce draw calls: textured and with at least one index.
    fn drawable(&self) -> impl Iterator<Item = (TextureId, &B::BufferSet, u32)> {
        self.document
            .materials
            .iter()
            .zip(&self.buffers)
            .filter(|(material, _)| material.is_drawable())
            .filter_map(|(material, buffers)| {
                let count = u32::try_from(material.indices.len()).unwrap_or(u32::MAX);
                material.texture.map(|texture| (texture, buffers, count))
            })
    }
}

pub struct SceneRenderer<B: RenderBackend> {
    models: HashMap<Archetype, ModelBuffers<B>>,
}

impl<B: RenderBackend> Default for SceneRenderer<B> {
    fn default() -> Self {
        Self {
            models: HashMap::new(),
        }
    }
}

impl<B: RenderBackend> SceneRenderer<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads `document` for `archetype`. A model already loaded for it is
    /// replaced and its buffers released.
    pub fn load(&mut self, gpu: &mut B, archetype: Archetype, document: MeshDocument) {
        let model = ModelBuffers::new(gpu, archetype.label(), document);
        log::info!(
            "Uploaded {}: {} materials, {} triangles",
            archetype.label(),
            model.buffers.len(),
            model.document.triangle_count()
        );
        if self.models.insert(archetype, model).is_some() {
            log::debug!("Replaced previously loaded {}", archetype.label());
        }
    }

    pub fn is_loaded(&self, archetype: Archetype) -> bool {
        self.models.contains_key(&archetype)
    }

    pub fn document(&self, archetype: Archetype) -> Option<&MeshDocument> {
        self.models.get(&archetype).map(ModelBuffers::document)
    }

    pub fn model(&self, archetype: Archetype) -> Result<&ModelBuffers<B>, RenderError> {
        self.models
            .get(&archetype)
            .ok_or(RenderError::ArchetypeNotLoaded(archetype))
    }

    /// Draws the map with whatever model/view/projection are currently set.
    pub fn draw_map(&self, gpu: &mut B) -> Result<(), RenderError> {
        let model = self.model(Archetype::Map)?;
        for (texture, buffers, count) in model.drawable() {
            bind_diffuse(gpu, texture);
            gpu.draw_indexed(buffers, count);
        }
        Ok(())
    }

    /// Draws one character with its own model matrix. View and projection
    /// are left as they are.
    pub fn draw_actor(&self, gpu: &mut B, actor: &dyn Actor) -> Result<(), RenderError> {
        let model = self.model(Archetype::Character(actor.team()))?;
        gpu.set_uniform("model", actor.model_matrix().into());
        for (texture, buffers, count) in model.drawable() {
            bind_diffuse(gpu, texture);
            gpu.draw_indexed(buffers, count);
        }
        Ok(())
    }

    /// Draws the view-model weapon with depth testing and alpha blending on.
    ///
    /// Whatever happens, the raster state is back to what it was on entry
    /// afterwards, except that the cull face is reset to back.
    pub fn draw_weapon(&self, gpu: &mut B, kind: WeaponKind) -> Result<(), RenderError> {
        let model = self.model(Archetype::Weapon(kind))?;
        let mut gpu = RasterStateGuard::new(gpu);
        let weapon_state = RasterState {
            depth_test: true,
            cull_enabled: false,
            blend: true,
            ..gpu.saved()
        };
        gpu.set_raster_state(weapon_state);

        for (texture, buffers, count) in model.drawable() {
            bind_diffuse(&mut *gpu, texture);
            match kind.draw_mode() {
                DrawMode::Normal => gpu.draw_indexed(buffers, count),
                DrawMode::DoubleSided => {
                    for face in [Face::Front, Face::Back] {
                        gpu.set_raster_state(RasterState {
                            cull_enabled: true,
                            cull_face: face,
                            ..weapon_state
                        });
                        gpu.draw_indexed(buffers, count);
                    }
                    gpu.set_raster_state(RasterState {
                        cull_face: Face::Back,
                        ..weapon_state
                    });
                }
            }
        }
        Ok(())
    }

    /// Releases every buffer set. Drawing afterwards reports unloaded models.
    pub fn teardown(&mut self) {
        let released: usize = self.models.values().map(|m| m.buffers.len()).sum();
        self.models.clear();
        log::info!("Released {released} buffer sets");
    }
}

fn bind_diffuse<B: RenderBackend + ?Sized>(gpu: &mut B, texture: TextureId) {
    gpu.bind_texture(0, texture);
    gpu.set_uniform("texture1", 0.into());
}
