//! The GPU boundary.
//!
//! [`RenderBackend`] is everything the loaders and renderers need from a
//! graphics API: resource creation, a small amount of fixed-function state,
//! the shader capability (`use_program` / `set_uniform`) and draw calls. The
//! production implementation is [`backend::WgpuBackend`]; tests drive the
//! renderers with a recording implementation instead.

use std::num::NonZeroU32;

use cgmath::{Matrix4, Vector3};

pub mod backend;
pub mod state;

pub use state::RasterStateGuard;

/// Handle to a texture owned by the backend's texture store.
///
/// There is no "zero" handle: a texture that failed to load is `None` wherever
/// a handle would otherwise be stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(NonZeroU32);

impl TextureId {
    /// Builds the handle for slot `index` of a texture store.
    pub fn from_index(index: usize) -> Self {
        let raw = u32::try_from(index + 1).unwrap_or(u32::MAX);
        Self(NonZeroU32::new(raw).unwrap_or(NonZeroU32::MAX))
    }

    pub fn index(self) -> usize {
        self.0.get() as usize - 1
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    Front,
    Back,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DepthFunc {
    Less,
    LessEqual,
}

/// Fixed-function state that affects how the next draws rasterize.
///
/// Mirrors the classic enable/disable switches: culling has both an enable
/// flag and a face, and blending is always source-alpha / one-minus-source-alpha
/// when enabled.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RasterState {
    pub depth_test: bool,
    pub depth_func: DepthFunc,
    pub cull_enabled: bool,
    pub cull_face: Face,
    pub blend: bool,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            depth_test: true,
            depth_func: DepthFunc::Less,
            cull_enabled: false,
            cull_face: Face::Back,
            blend: false,
        }
    }
}

impl RasterState {
    /// The face that is actually discarded, if any.
    pub fn culled(&self) -> Option<Face> {
        self.cull_enabled.then_some(self.cull_face)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    Triangles,
    Lines,
}

/// The shader programs the backend compiles up front.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Program {
    /// Textured position+uv geometry; also draws the crosshair.
    Scene,
    /// Position-only cube sampled from a cubemap.
    Skybox,
}

/// Value types accepted by [`RenderBackend::set_uniform`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Uniform {
    Int(i32),
    Float(f32),
    Mat4(Matrix4<f32>),
    Vec3(Vector3<f32>),
    Bool(bool),
}

impl From<Matrix4<f32>> for Uniform {
    fn from(value: Matrix4<f32>) -> Self {
        Uniform::Mat4(value)
    }
}

impl From<bool> for Uniform {
    fn from(value: bool) -> Self {
        Uniform::Bool(value)
    }
}

impl From<i32> for Uniform {
    fn from(value: i32) -> Self {
        Uniform::Int(value)
    }
}

pub trait RenderBackend {
    /// Vertex + index buffers for one material. Dropping it releases them.
    type BufferSet;

    fn create_texture(&mut self, label: &str, image: &image::RgbaImage)
    -> anyhow::Result<TextureId>;

    /// Faces are in +X, -X, +Y, -Y, +Z, -Z order.
    fn create_cubemap(
        &mut self,
        label: &str,
        faces: &[image::RgbaImage; 6],
    ) -> anyhow::Result<TextureId>;

    /// `vertex_data` is a tightly packed float stream whose layout is defined by
    /// the program that draws it.
    fn create_buffer_set(
        &mut self,
        label: &str,
        vertex_data: &[f32],
        indices: &[u32],
    ) -> Self::BufferSet;

    fn raster_state(&self) -> RasterState;
    fn set_raster_state(&mut self, state: RasterState);

    fn use_program(&mut self, program: Program);
    fn set_uniform(&mut self, name: &str, value: Uniform);
    fn bind_texture(&mut self, unit: u32, texture: TextureId);

    fn draw_indexed(&mut self, buffers: &Self::BufferSet, index_count: u32);
    fn draw_arrays(&mut self, buffers: &Self::BufferSet, topology: Topology, vertex_count: u32);
}
