use cgmath::{Matrix4, SquareMatrix};

use crate::gpu::{Program, RasterState, RenderBackend, Topology};

/// Half the length of each crosshair arm, in pixels.
pub const ARM_LENGTH: f32 = 10.0;

/// Two screen-centred lines drawn over everything else.
pub struct Crosshair<B: RenderBackend> {
    buffers: B::BufferSet,
}

impl<B: RenderBackend> Crosshair<B> {
    pub fn new(gpu: &mut B) -> Self {
        let buffers = gpu.create_buffer_set("crosshair", &line_vertices(ARM_LENGTH), &[]);
        Self { buffers }
    }

    /// `ortho` maps pixels around the window centre to clip space.
    ///
    /// Depth testing is off for the draw and restored afterwards.
    pub fn draw(&self, gpu: &mut B, ortho: Matrix4<f32>) {
        let saved = gpu.raster_state();
        gpu.set_raster_state(RasterState {
            depth_test: false,
            ..saved
        });

        gpu.use_program(Program::Scene);
        gpu.set_uniform("projection", ortho.into());
        gpu.set_uniform("view", Matrix4::identity().into());
        gpu.set_uniform("model", Matrix4::identity().into());
        gpu.set_uniform("isCrosshair", true.into());
        gpu.draw_arrays(&self.buffers, Topology::Lines, 4);
        gpu.set_uniform("isCrosshair", false.into());

        let current = gpu.raster_state();
        gpu.set_raster_state(RasterState {
            depth_test: saved.depth_test,
            ..current
        });
    }
}

/// Horizontal then vertical segment, position + zero uv per vertex.
fn line_vertices(arm: f32) -> [f32; 20] {
    #[rustfmt::skip]
    let vertices = [
        -arm, 0.0, 0.0,  0.0, 0.0,
         arm, 0.0, 0.0,  0.0, 0.0,
        0.0, -arm, 0.0,  0.0, 0.0,
        0.0,  arm, 0.0,  0.0, 0.0,
    ];
    vertices
}
