//! [`RenderBackend`] on top of wgpu.
//!
//! Draw calls are not executed immediately. Each one snapshots the current
//! program, raster state, bound texture and uniform values into a
//! [`DrawCommand`]; [`WgpuBackend::end_frame`] then encodes the whole frame
//! into a single render pass and presents it. Uniform values for all draws
//! of a frame live in one buffer addressed with dynamic offsets.

use std::{collections::HashMap, iter, num::NonZeroU64};

use anyhow::{bail, ensure};
use wgpu::util::DeviceExt;

use crate::{
    context::Context,
    data_structures::texture::Texture,
    gpu::{Program, RasterState, RenderBackend, TextureId, Topology, Uniform},
    pipelines::{self, BindLayouts, PipelineKey},
};

/// Uniform block shared by both shaders. 208 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct UniformBlock {
    model: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    /// x: isCrosshair
    flags: [u32; 4],
}

impl Default for UniformBlock {
    fn default() -> Self {
        let identity: [[f32; 4]; 4] = <cgmath::Matrix4<f32> as cgmath::SquareMatrix>::identity().into();
        Self {
            model: identity,
            view: identity,
            projection: identity,
            flags: [0; 4],
        }
    }
}

const UNIFORM_SIZE: u64 = std::mem::size_of::<UniformBlock>() as u64;
const INITIAL_UNIFORM_SLOTS: u64 = 256;

/// Vertex and index buffer of one material. Dropping it frees both.
#[derive(Debug)]
pub struct WgpuBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum TextureKind {
    D2,
    Cube,
}

#[derive(Debug)]
struct StoredTexture {
    #[allow(unused)]
    texture: Texture,
    bind_group: wgpu::BindGroup,
    kind: TextureKind,
}

#[derive(Debug)]
struct DrawCommand {
    pipeline: PipelineKey,
    vertex: wgpu::Buffer,
    index: Option<wgpu::Buffer>,
    count: u32,
    textures: wgpu::BindGroup,
    uniform_offset: u32,
}

#[derive(Debug)]
pub struct WgpuBackend {
    ctx: Context,
    layouts: BindLayouts,
    scene_shader: wgpu::ShaderModule,
    skybox_shader: wgpu::ShaderModule,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    textures: Vec<StoredTexture>,
    default_texture: wgpu::BindGroup,

    raster: RasterState,
    program: Program,
    uniforms: HashMap<Program, UniformBlock>,
    bound_2d: Option<TextureId>,
    bound_cube: Option<TextureId>,

    uniform_stride: u64,
    uniform_staging: Vec<u8>,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    commands: Vec<DrawCommand>,
}

impl WgpuBackend {
    pub fn new(ctx: Context) -> Self {
        let device = &ctx.device;
        let layouts = BindLayouts::new(device, UNIFORM_SIZE);
        let scene_shader = pipelines::scene::shader(device);
        let skybox_shader = pipelines::skybox::shader(device);

        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let uniform_stride = UNIFORM_SIZE.div_ceil(alignment) * alignment;
        let (uniform_buffer, uniform_bind_group) =
            create_uniform_buffer(device, &layouts, uniform_stride * INITIAL_UNIFORM_SLOTS);

        let white = Texture::create_default_white(device, &ctx.queue);
        let default_texture = texture_bind_group(device, &layouts.texture_2d, &white, "default white");

        Self {
            layouts,
            scene_shader,
            skybox_shader,
            pipelines: HashMap::new(),
            textures: Vec::new(),
            default_texture,
            raster: RasterState::default(),
            program: Program::Scene,
            uniforms: HashMap::new(),
            bound_2d: None,
            bound_cube: None,
            uniform_stride,
            uniform_staging: Vec::new(),
            uniform_buffer,
            uniform_bind_group,
            commands: Vec::new(),
            ctx,
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
    }

    /// Starts recording a new frame, discarding anything not yet presented.
    pub fn begin_frame(&mut self) {
        self.commands.clear();
        self.uniform_staging.clear();
    }

    /// Encodes every draw recorded since [`begin_frame`](Self::begin_frame)
    /// into one pass over the swapchain image and presents it.
    pub fn end_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let commands = std::mem::take(&mut self.commands);
        if !self.ctx.is_surface_configured() {
            return Ok(());
        }
        self.upload_uniforms();

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            for command in &commands {
                let Some(pipeline) = self.pipelines.get(&command.pipeline) else {
                    continue;
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[command.uniform_offset]);
                render_pass.set_bind_group(1, &command.textures, &[]);
                render_pass.set_vertex_buffer(0, command.vertex.slice(..));
                match &command.index {
                    Some(index) => {
                        render_pass.set_index_buffer(index.slice(..), wgpu::IndexFormat::Uint32);
                        render_pass.draw_indexed(0..command.count, 0, 0..1);
                    }
                    None => render_pass.draw(0..command.count, 0..1),
                }
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        log::debug!("Presented frame with {} draws", commands.len());
        Ok(())
    }

    /// Copies this frame's uniform blocks to the GPU, growing the buffer first
    /// if the frame needs more slots than it has.
    fn upload_uniforms(&mut self) {
        let needed = self.uniform_staging.len() as u64;
        if needed == 0 {
            return;
        }
        if needed > self.uniform_buffer.size() {
            let capacity = needed.next_power_of_two().max(self.uniform_stride);
            log::debug!("Growing uniform buffer to {capacity} bytes");
            let (buffer, bind_group) = create_uniform_buffer(&self.ctx.device, &self.layouts, capacity);
            self.uniform_buffer = buffer;
            self.uniform_bind_group = bind_group;
        }
        self.ctx
            .queue
            .write_buffer(&self.uniform_buffer, 0, &self.uniform_staging);
    }

    /// Appends the current program's uniforms as a new slot; returns its offset.
    fn push_uniforms(&mut self) -> u32 {
        let block = self.uniforms.get(&self.program).copied().unwrap_or_default();
        let offset = self.uniform_staging.len();
        self.uniform_staging
            .extend_from_slice(bytemuck::bytes_of(&block));
        self.uniform_staging
            .resize(offset + self.uniform_stride as usize, 0);
        offset as u32
    }

    fn texture_for_program(&self) -> Option<wgpu::BindGroup> {
        let (bound, fallback) = match self.program {
            Program::Scene => (self.bound_2d, Some(&self.default_texture)),
            Program::Skybox => (self.bound_cube, None),
        };
        bound
            .and_then(|id| self.textures.get(id.index()))
            .map(|stored| &stored.bind_group)
            .or(fallback)
            .cloned()
    }

    fn record(&mut self, vertex: &wgpu::Buffer, index: Option<&wgpu::Buffer>, topology: Topology, count: u32) {
        if count == 0 {
            return;
        }
        let Some(textures) = self.texture_for_program() else {
            log::warn!("Skipping {:?} draw: no texture bound", self.program);
            return;
        };

        let key = PipelineKey::new(self.program, topology, self.raster);
        if !self.pipelines.contains_key(&key) {
            log::debug!("Creating pipeline for {key:?}");
            let shader = match key.program {
                Program::Scene => &self.scene_shader,
                Program::Skybox => &self.skybox_shader,
            };
            let pipeline = pipelines::mk_keyed_pipeline(
                &self.ctx.device,
                &self.layouts,
                shader,
                self.ctx.config.format,
                key,
            );
            self.pipelines.insert(key, pipeline);
        }

        let uniform_offset = self.push_uniforms();
        self.commands.push(DrawCommand {
            pipeline: key,
            vertex: vertex.clone(),
            index: index.cloned(),
            count,
            textures,
            uniform_offset,
        });
    }

    fn store_texture(&mut self, texture: Texture, kind: TextureKind, label: &str) -> TextureId {
        let layout = match kind {
            TextureKind::D2 => &self.layouts.texture_2d,
            TextureKind::Cube => &self.layouts.texture_cube,
        };
        let bind_group = texture_bind_group(&self.ctx.device, layout, &texture, label);
        self.textures.push(StoredTexture {
            texture,
            bind_group,
            kind,
        });
        TextureId::from_index(self.textures.len() - 1)
    }
}

impl RenderBackend for WgpuBackend {
    type BufferSet = WgpuBuffers;

    fn create_texture(&mut self, label: &str, image: &image::RgbaImage) -> anyhow::Result<TextureId> {
        let (width, height) = image.dimensions();
        let max = self.ctx.device.limits().max_texture_dimension_2d;
        ensure!(width > 0 && height > 0, "texture {label} is empty");
        ensure!(
            width <= max && height <= max,
            "texture {label} is {width}x{height}, the device allows at most {max}"
        );
        let texture = Texture::from_image(&self.ctx.device, &self.ctx.queue, image, Some(label));
        Ok(self.store_texture(texture, TextureKind::D2, label))
    }

    fn create_cubemap(&mut self, label: &str, faces: &[image::RgbaImage; 6]) -> anyhow::Result<TextureId> {
        let size = faces[0].dimensions();
        if faces.iter().any(|face| face.dimensions() != size) || size.0 != size.1 || size.0 == 0 {
            bail!("cubemap {label} needs six equal square faces");
        }
        let texture = Texture::cubemap(&self.ctx.device, &self.ctx.queue, faces, Some(label));
        Ok(self.store_texture(texture, TextureKind::Cube, label))
    }

    fn create_buffer_set(&mut self, label: &str, vertex_data: &[f32], indices: &[u32]) -> WgpuBuffers {
        let vertex = self
            .ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Vertex Buffer")),
                contents: bytemuck::cast_slice(vertex_data),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index = self
            .ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Index Buffer")),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        WgpuBuffers { vertex, index }
    }

    fn raster_state(&self) -> RasterState {
        self.raster
    }

    fn set_raster_state(&mut self, state: RasterState) {
        self.raster = state;
    }

    fn use_program(&mut self, program: Program) {
        self.program = program;
    }

    fn set_uniform(&mut self, name: &str, value: Uniform) {
        let block = self.uniforms.entry(self.program).or_default();
        match (name, value) {
            ("model", Uniform::Mat4(m)) => block.model = m.into(),
            ("view", Uniform::Mat4(m)) => block.view = m.into(),
            ("projection", Uniform::Mat4(m)) => block.projection = m.into(),
            ("isCrosshair", Uniform::Bool(on)) => block.flags[0] = u32::from(on),
            ("isCrosshair", Uniform::Int(i)) => block.flags[0] = u32::from(i != 0),
            // Sampler units: textures are bound through bind groups instead.
            ("texture1" | "skybox", Uniform::Int(_)) => (),
            _ => log::debug!("Ignoring uniform {name} = {value:?} for {:?}", self.program),
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        if unit != 0 {
            log::debug!("Only texture unit 0 is used, got {unit}");
        }
        match self.textures.get(texture.index()).map(|t| t.kind) {
            Some(TextureKind::D2) => self.bound_2d = Some(texture),
            Some(TextureKind::Cube) => self.bound_cube = Some(texture),
            None => log::warn!("Binding unknown texture {texture:?}"),
        }
    }

    fn draw_indexed(&mut self, buffers: &WgpuBuffers, index_count: u32) {
        let available = (buffers.index.size() / 4) as u32;
        let count = index_count.min(available);
        self.record(&buffers.vertex, Some(&buffers.index), Topology::Triangles, count);
    }

    fn draw_arrays(&mut self, buffers: &WgpuBuffers, topology: Topology, vertex_count: u32) {
        self.record(&buffers.vertex, None, topology, vertex_count);
    }
}

fn create_uniform_buffer(
    device: &wgpu::Device,
    layouts: &BindLayouts,
    size: u64,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Uniform Buffer"),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &layouts.uniforms,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(UNIFORM_SIZE),
            }),
        }],
        label: Some("uniform_bind_group"),
    });
    (buffer, bind_group)
}

fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
        label: Some(label),
    })
}
