//! Parsed mesh data: vertices, materials and whole documents.

use std::path::PathBuf;

use crate::{error::ParseWarning, gpu::TextureId};

/// One face-vertex occurrence: position followed by texture coordinate.
///
/// The layout is `#[repr(C)]` with no padding, so a `&[Vertex]` is already the
/// interleaved stream the scene pipeline consumes (5 floats, 20 byte stride).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    /// Number of `f32`s per vertex in the interleaved stream.
    pub const FLOATS: usize = 5;
}

/// A named group of triangles sharing one diffuse texture.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    pub name: String,
    /// Resolved `map_Kd` path, if the library named one.
    pub texture_path: Option<PathBuf>,
    /// `None` when no texture was named or it failed to load.
    pub texture: Option<TextureId>,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether draw calls are issued for this material at all.
    pub fn is_drawable(&self) -> bool {
        self.texture.is_some() && !self.indices.is_empty()
    }
}

/// Everything parsed from one OBJ file and the material libraries it names.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshDocument {
    /// In `newmtl` order across all referenced libraries.
    pub materials: Vec<Material>,
    pub positions: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    /// Parsed for completeness; nothing downstream reads normals.
    pub normals: Vec<[f32; 3]>,
    pub warnings: Vec<ParseWarning>,
}

impl MeshDocument {
    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name == name)
    }

    pub fn triangle_count(&self) -> usize {
        self.materials.iter().map(Material::triangle_count).sum()
    }
}
