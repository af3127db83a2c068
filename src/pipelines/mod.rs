//! Render pipelines.
//!
//! wgpu bakes depth, culling, blending and topology into the pipeline, so
//! every distinct [`PipelineKey`] gets its own pipeline. The backend creates
//! them lazily and caches them by key.
//!
//! - `scene` is the textured position+uv pipeline
//! - `skybox` is the cubemap pipeline

use std::num::NonZeroU64;

use crate::{
    data_structures::texture::Texture,
    gpu::{DepthFunc, Face, Program, RasterState, Topology},
};

pub mod scene;
pub mod skybox;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub program: Program,
    pub topology: Topology,
    pub raster: RasterState,
}

impl PipelineKey {
    /// State that has no effect (cull face with culling off, depth function
    /// with depth testing off) is folded so it does not split the cache.
    pub fn new(program: Program, topology: Topology, raster: RasterState) -> Self {
        let defaults = RasterState::default();
        let raster = RasterState {
            cull_face: if raster.cull_enabled {
                raster.cull_face
            } else {
                defaults.cull_face
            },
            depth_func: if raster.depth_test {
                raster.depth_func
            } else {
                defaults.depth_func
            },
            ..raster
        };
        Self {
            program,
            topology,
            raster,
        }
    }
}

/// Bind group layouts shared by every pipeline.
///
/// Group 0 is the per-draw uniform block (dynamic offset), group 1 the
/// texture and its sampler.
#[derive(Debug)]
pub struct BindLayouts {
    pub uniforms: wgpu::BindGroupLayout,
    pub texture_2d: wgpu::BindGroupLayout,
    pub texture_cube: wgpu::BindGroupLayout,
    scene: wgpu::PipelineLayout,
    skybox: wgpu::PipelineLayout,
}

impl BindLayouts {
    pub fn new(device: &wgpu::Device, uniform_size: u64) -> Self {
        let uniforms = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(uniform_size),
                },
                count: None,
            }],
        });
        let texture_2d = texture_layout(device, wgpu::TextureViewDimension::D2, "texture_bind_group_layout");
        let texture_cube =
            texture_layout(device, wgpu::TextureViewDimension::Cube, "skybox_bind_group_layout");

        let scene = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&uniforms, &texture_2d],
            immediate_size: 0,
        });
        let skybox = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Skybox Pipeline Layout"),
            bind_group_layouts: &[&uniforms, &texture_cube],
            immediate_size: 0,
        });

        Self {
            uniforms,
            texture_2d,
            texture_cube,
            scene,
            skybox,
        }
    }

    pub fn pipeline_layout(&self, program: Program) -> &wgpu::PipelineLayout {
        match program {
            Program::Scene => &self.scene,
            Program::Skybox => &self.skybox,
        }
    }
}

fn texture_layout(
    device: &wgpu::Device,
    view_dimension: wgpu::TextureViewDimension,
    label: &str,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some(label),
    })
}

/// Builds the pipeline `key` describes for a surface of `color_format`.
pub fn mk_keyed_pipeline(
    device: &wgpu::Device,
    layouts: &BindLayouts,
    shader: &wgpu::ShaderModule,
    color_format: wgpu::TextureFormat,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    let raster = key.raster;
    let vertex_layout = match key.program {
        Program::Scene => scene::vertex_layout(),
        Program::Skybox => skybox::vertex_layout(),
    };
    let topology = match key.topology {
        Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
        Topology::Lines => wgpu::PrimitiveTopology::LineList,
    };
    let cull_mode = raster.culled().map(|face| match face {
        Face::Front => wgpu::Face::Front,
        Face::Back => wgpu::Face::Back,
    });
    let blend = if raster.blend {
        wgpu::BlendState::ALPHA_BLENDING
    } else {
        wgpu::BlendState::REPLACE
    };
    // With the test off nothing is compared and nothing is written.
    let (depth_write_enabled, depth_compare) = match (raster.depth_test, raster.depth_func) {
        (false, _) => (false, wgpu::CompareFunction::Always),
        (true, DepthFunc::Less) => (true, wgpu::CompareFunction::Less),
        (true, DepthFunc::LessEqual) => (true, wgpu::CompareFunction::LessEqual),
    };

    mk_render_pipeline(
        device,
        layouts.pipeline_layout(key.program),
        color_format,
        Some(blend),
        wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        },
        wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        &[vertex_layout],
        shader,
        &format!("{key:?}"),
    )
}

#[allow(clippy::too_many_arguments)]
pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_stencil: wgpu::DepthStencilState,
    primitive: wgpu::PrimitiveState,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: &wgpu::ShaderModule,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive,
        depth_stencil: Some(depth_stencil),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inert_state_does_not_split_the_cache() {
        let culled_front_but_off = RasterState {
            cull_enabled: false,
            cull_face: Face::Front,
            ..RasterState::default()
        };
        assert_eq!(
            PipelineKey::new(Program::Scene, Topology::Triangles, culled_front_but_off),
            PipelineKey::new(Program::Scene, Topology::Triangles, RasterState::default())
        );

        let no_depth = RasterState {
            depth_test: false,
            depth_func: DepthFunc::LessEqual,
            ..RasterState::default()
        };
        let no_depth_less = RasterState {
            depth_func: DepthFunc::Less,
            ..no_depth
        };
        assert_eq!(
            PipelineKey::new(Program::Scene, Topology::Lines, no_depth),
            PipelineKey::new(Program::Scene, Topology::Lines, no_depth_less)
        );
    }

    #[test]
    fn active_cull_face_is_kept() {
        let front = RasterState {
            cull_enabled: true,
            cull_face: Face::Front,
            ..RasterState::default()
        };
        let back = RasterState {
            cull_face: Face::Back,
            ..front
        };
        assert_ne!(
            PipelineKey::new(Program::Scene, Topology::Triangles, front),
            PipelineKey::new(Program::Scene, Topology::Triangles, back)
        );
    }
}
