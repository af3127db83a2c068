//! Loading of meshes, material libraries and images from disk.
//!
//! - `obj` parses mesh files into [`MeshDocument`](crate::data_structures::mesh::MeshDocument)s
//! - `mtl` parses the material libraries those files reference
//! - `texture` decodes images and hands them to the GPU backend

use std::path::{Path, PathBuf};

pub mod mtl;
pub mod obj;
pub mod texture;

pub use obj::MeshParser;
pub use texture::{TextureLoader, load_cubemap, load_texture};

/// Prefix that marks a texture path as already rooted at the asset directory.
pub const DEFAULT_ASSET_PREFIX: &str = "Assets/";

pub fn load_string(path: &Path) -> std::io::Result<String> {
    std::fs::read_to_string(path)
}

pub fn load_binary(path: &Path) -> std::io::Result<Vec<u8>> {
    std::fs::read(path)
}

/// Directory a file lives in; the empty path for bare file names.
pub fn parent_dir(file: &Path) -> &Path {
    file.parent().unwrap_or(Path::new(""))
}

/// Resolves a `map_Kd` argument.
///
/// Paths starting with `asset_prefix` are already relative to the working
/// directory and are used verbatim; anything else is relative to the material
/// library's own directory.
pub fn resolve_texture_path(mtl_dir: &Path, raw: &str, asset_prefix: &str) -> PathBuf {
    if raw.starts_with(asset_prefix) {
        PathBuf::from(raw)
    } else {
        mtl_dir.join(raw)
    }
}
