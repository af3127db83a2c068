use std::path::PathBuf;

use cgmath::Matrix4;

use crate::{
    gpu::{DepthFunc, Program, RasterState, RenderBackend, TextureId, Topology},
    resources::load_cubemap,
};

/// Half the edge length of the sky cube.
pub const HALF_EXTENT: f32 = 100.0;
const VERTEX_COUNT: u32 = 36;

pub struct Skybox<B: RenderBackend> {
    buffers: B::BufferSet,
    texture: TextureId,
}

impl<B: RenderBackend> Skybox<B> {
    /// Loads the six faces (+X, -X, +Y, -Y, +Z, -Z) into a cubemap.
    pub fn load(gpu: &mut B, faces: &[PathBuf; 6]) -> anyhow::Result<Self> {
        let texture = load_cubemap(gpu, faces)?;
        Ok(Self::with_texture(gpu, texture))
    }

    pub fn with_texture(gpu: &mut B, texture: TextureId) -> Self {
        let buffers = gpu.create_buffer_set("skybox", &cube_vertices(HALF_EXTENT), &[]);
        Self { buffers, texture }
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }

    /// `view` should carry rotation only so the sky never moves with the eye.
    /// Drawn with a less-or-equal depth test; the depth function is `Less`
    /// afterwards.
    pub fn draw(&self, gpu: &mut B, view: Matrix4<f32>, projection: Matrix4<f32>) {
        let saved = gpu.raster_state();
        gpu.set_raster_state(RasterState {
            depth_func: DepthFunc::LessEqual,
            ..saved
        });

        gpu.use_program(Program::Skybox);
        gpu.set_uniform("view", view.into());
        gpu.set_uniform("projection", projection.into());
        gpu.set_uniform("skybox", 0.into());
        gpu.bind_texture(0, self.texture);
        gpu.draw_arrays(&self.buffers, Topology::Triangles, VERTEX_COUNT);

        let current = gpu.raster_state();
        gpu.set_raster_state(RasterState {
            depth_func: DepthFunc::Less,
            ..current
        });
    }
}

/// Twelve triangles, six faces, positions only.
fn cube_vertices(s: f32) -> [f32; 108] {
    #[rustfmt::skip]
    let vertices = [
        -s,  s, -s,  -s, -s, -s,   s, -s, -s,
         s, -s, -s,   s,  s, -s,  -s,  s, -s,

        -s, -s,  s,  -s, -s, -s,  -s,  s, -s,
        -s,  s, -s,  -s,  s,  s,  -s, -s,  s,

         s, -s, -s,   s, -s,  s,   s,  s,  s,
         s,  s,  s,   s,  s, -s,   s, -s, -s,

        -s, -s,  s,  -s,  s,  s,   s,  s,  s,
         s,  s,  s,   s, -s,  s,  -s, -s,  s,

        -s,  s, -s,   s,  s, -s,   s,  s,  s,
         s,  s,  s,  -s,  s,  s,  -s,  s, -s,

        -s, -s, -s,  -s, -s,  s,   s, -s, -s,
         s, -s, -s,  -s, -s,  s,   s, -s,  s,
    ];
    vertices
}
