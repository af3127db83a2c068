use std::{
    cell::Cell,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use dust_viewer::{
    ViewerConfig,
    gpu::{Program, RasterState, RenderBackend, TextureId, Topology, Uniform},
};

/// One call made on a [`RecordingBackend`].
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateTexture { label: String, id: TextureId },
    CreateCubemap { label: String, id: TextureId },
    CreateBufferSet { label: String, floats: usize, indices: usize },
    SetRasterState(RasterState),
    UseProgram(Program),
    SetUniform(String, Uniform),
    BindTexture(u32, TextureId),
    DrawIndexed { label: String, count: u32, raster: RasterState },
    DrawArrays { label: String, topology: Topology, count: u32, raster: RasterState },
}

/// A [`RenderBackend`] that does nothing but remember what it was asked.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<Call>,
    /// Texture uploads fail while this is set.
    pub fail_uploads: bool,
    pub(crate) raster: RasterState,
    pub(crate) textures: usize,
    pub(crate) released: Rc<Cell<usize>>,
}

/// Buffer set handed out by [`RecordingBackend`]; counts its own release.
#[derive(Debug)]
pub struct RecordedBuffers {
    pub label: String,
    pub floats: Vec<f32>,
    pub indices: Vec<u32>,
    released: Rc<Cell<usize>>,
}

impl Drop for RecordedBuffers {
    fn drop(&mut self) {
        self.released.set(self.released.get() + 1);
    }
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many buffer sets have been dropped so far.
    pub fn released(&self) -> usize {
        self.released.get()
    }

    pub fn created_buffer_sets(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::CreateBufferSet { .. }))
            .count()
    }

    pub fn texture_count(&self) -> usize {
        self.textures
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Labels of the buffer sets drawn with `draw_indexed`, in order.
    pub fn indexed_draws(&self) -> Vec<(String, RasterState)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::DrawIndexed { label, raster, .. } => Some((label.clone(), *raster)),
                _ => None,
            })
            .collect()
    }

    /// The last value set for `name` before call number `before`.
    pub fn uniform_before(&self, name: &str, before: usize) -> Option<Uniform> {
        self.calls[..before].iter().rev().find_map(|c| match c {
            Call::SetUniform(n, value) if n == name => Some(*value),
            _ => None,
        })
    }

    pub fn position(&self, predicate: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls.iter().position(predicate)
    }

    fn next_texture(&mut self) -> TextureId {
        let id = TextureId::from_index(self.textures);
        self.textures += 1;
        id
    }
}

impl RenderBackend for RecordingBackend {
    type BufferSet = RecordedBuffers;

    fn create_texture(&mut self, label: &str, _image: &image::RgbaImage) -> anyhow::Result<TextureId> {
        anyhow::ensure!(!self.fail_uploads, "upload refused");
        let id = self.next_texture();
        self.calls.push(Call::CreateTexture {
            label: label.to_string(),
            id,
        });
        Ok(id)
    }

    fn create_cubemap(&mut self, label: &str, _faces: &[image::RgbaImage; 6]) -> anyhow::Result<TextureId> {
        anyhow::ensure!(!self.fail_uploads, "upload refused");
        let id = self.next_texture();
        self.calls.push(Call::CreateCubemap {
            label: label.to_string(),
            id,
        });
        Ok(id)
    }

    fn create_buffer_set(&mut self, label: &str, vertex_data: &[f32], indices: &[u32]) -> RecordedBuffers {
        self.calls.push(Call::CreateBufferSet {
            label: label.to_string(),
            floats: vertex_data.len(),
            indices: indices.len(),
        });
        RecordedBuffers {
            label: label.to_string(),
            floats: vertex_data.to_vec(),
            indices: indices.to_vec(),
            released: self.released.clone(),
        }
    }

    fn raster_state(&self) -> RasterState {
        self.raster
    }

    fn set_raster_state(&mut self, state: RasterState) {
        self.raster = state;
        self.calls.push(Call::SetRasterState(state));
    }

    fn use_program(&mut self, program: Program) {
        self.calls.push(Call::UseProgram(program));
    }

    fn set_uniform(&mut self, name: &str, value: Uniform) {
        self.calls.push(Call::SetUniform(name.to_string(), value));
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.calls.push(Call::BindTexture(unit, texture));
    }

    fn draw_indexed(&mut self, buffers: &RecordedBuffers, index_count: u32) {
        self.calls.push(Call::DrawIndexed {
            label: buffers.label.clone(),
            count: index_count,
            raster: self.raster,
        });
    }

    fn draw_arrays(&mut self, buffers: &RecordedBuffers, topology: Topology, vertex_count: u32) {
        self.calls.push(Call::DrawArrays {
            label: buffers.label.clone(),
            topology,
            count: vertex_count,
            raster: self.raster,
        });
    }
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

pub fn write_png(dir: &Path, name: &str, size: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbaImage::from_pixel(size, size, image::Rgba([200, 120, 40, 255]))
        .save(&path)
        .unwrap();
    path
}

/// A one-material quad named `<name>.obj` with its library and texture.
pub fn write_textured_quad(dir: &Path, name: &str) -> PathBuf {
    write_png(dir, &format!("{name}.png"), 4);
    write_file(
        dir,
        &format!("{name}.mtl"),
        &format!("newmtl {name}_skin\nmap_Kd {name}.png\n"),
    );
    write_file(
        dir,
        &format!("{name}.obj"),
        &format!(
            "mtllib {name}.mtl\n\
             v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
             usemtl {name}_skin\n\
             f 1/1 2/2 3/3 4/4\n"
        ),
    )
}

/// A config whose six models and skybox all live in `dir`.
pub fn write_scene(dir: &Path) -> ViewerConfig {
    let mut config = ViewerConfig::default();
    config.assets.map = write_textured_quad(dir, "map");
    config.assets.rifle = write_textured_quad(dir, "rifle");
    config.assets.pistol = write_textured_quad(dir, "pistol");
    config.assets.knife = write_textured_quad(dir, "knife");
    config.assets.counter_terrorist = write_textured_quad(dir, "ct");
    config.assets.terrorist = write_textured_quad(dir, "t");
    let faces = ["right", "left", "top", "bottom", "front", "back"];
    for (slot, face) in config.assets.skybox.iter_mut().zip(faces) {
        *slot = write_png(dir, &format!("sky_{face}.png"), 8);
    }
    config.spawns.seed = Some(7);
    config
}
