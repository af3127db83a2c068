use std::path::Path;

use crate::{
    data_structures::mesh::{MeshDocument, Vertex},
    error::{ParseError, ParseWarning},
    resources::{DEFAULT_ASSET_PREFIX, TextureLoader, load_string, parent_dir},
};

/// Parses OBJ meshes and the MTL libraries they reference.
///
/// Faces are fan-triangulated and every face-vertex gets its own entry in the
/// active material's vertex array. Nothing is welded, so the output counts are
/// exactly `3 * (n - 2)` vertices and indices per n-gon.
#[derive(Clone, Debug)]
pub struct MeshParser {
    pub(crate) asset_prefix: String,
}

impl Default for MeshParser {
    fn default() -> Self {
        Self::new(DEFAULT_ASSET_PREFIX)
    }
}

impl MeshParser {
    pub fn new(asset_prefix: impl Into<String>) -> Self {
        Self {
            asset_prefix: asset_prefix.into(),
        }
    }

    pub fn asset_prefix(&self) -> &str {
        &self.asset_prefix
    }

    pub fn parse<T>(&self, path: impl AsRef<Path>, textures: &mut T) -> Result<MeshDocument, ParseError>
    where
        T: TextureLoader + ?Sized,
    {
        let path = path.as_ref();
        let source = load_string(path).map_err(|source| ParseError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let document = self.parse_str(&source, parent_dir(path), textures)?;
        log::info!(
            "Loaded {}: {} materials, {} triangles",
            path.display(),
            document.materials.len(),
            document.triangle_count()
        );
        Ok(document)
    }

    /// Parses OBJ text. `base_dir` is where `mtllib` names are resolved from.
    pub fn parse_str<T>(
        &self,
        source: &str,
        base_dir: &Path,
        textures: &mut T,
    ) -> Result<MeshDocument, ParseError>
    where
        T: TextureLoader + ?Sized,
    {
        let mut document = MeshDocument::default();
        let mut active: Option<usize> = None;

        for (line_idx, line) in source.lines().enumerate() {
            let line_no = line_idx + 1;
            let mut tokens = line.split_whitespace();
            let Some(prefix) = tokens.next() else {
                continue;
            };
            match prefix {
                "mtllib" => {
                    for name in tokens {
                        let mtl_path = base_dir.join(name);
                        let library = self.parse_materials(&mtl_path, textures).map_err(|e| {
                            log::error!("Failed to load MTL file: {}", mtl_path.display());
                            ParseError::MaterialLibrary {
                                path: mtl_path.clone(),
                                source: Box::new(e),
                            }
                        })?;
                        document.materials.extend(library.materials);
                        document.warnings.extend(library.warnings);
                    }
                }
                "v" => document.positions.push(read_floats(tokens)),
                "vt" => document.tex_coords.push(read_floats(tokens)),
                "vn" => document.normals.push(read_floats(tokens)),
                "usemtl" => {
                    let name = tokens.next().unwrap_or_default();
                    active = document.materials.iter().position(|m| m.name == name);
                    if active.is_none() {
                        log::debug!("line {line_no}: usemtl {name} names no loaded material");
                    }
                }
                "f" => {
                    let corners: Vec<&str> = tokens.collect();
                    push_face(&mut document, active, &corners, line_no);
                }
                _ => (),
            }
        }

        Ok(document)
    }
}

/// Reads up to `N` floats; missing or malformed components are `0.0`.
fn read_floats<'a, const N: usize>(tokens: impl Iterator<Item = &'a str>) -> [f32; N] {
    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(tokens) {
        *slot = token.parse().unwrap_or(0.0);
    }
    out
}

/// One `pos[/uv[/normal]]` face token, still 1-based.
struct FaceVertex {
    position: Option<i64>,
    tex_coord: Option<i64>,
}

impl FaceVertex {
    fn parse(token: &str) -> Self {
        let mut parts = token.split('/');
        let position = parts.next().and_then(|p| p.parse().ok());
        let tex_coord = parts
            .next()
            .filter(|uv| !uv.is_empty())
            .and_then(|uv| uv.parse().ok());
        Self {
            position,
            tex_coord,
        }
    }
}

/// Converts a 1-based OBJ index into a slice index when it is in range.
fn resolve(index: i64, len: usize) -> Option<usize> {
    let zero_based = usize::try_from(index.checked_sub(1)?).ok()?;
    (zero_based < len).then_some(zero_based)
}

fn push_face(document: &mut MeshDocument, active: Option<usize>, corners: &[&str], line: usize) {
    let MeshDocument {
        materials,
        positions,
        tex_coords,
        warnings,
        ..
    } = document;

    let material = match active {
        Some(idx) => &mut materials[idx],
        None => {
            log::warn!("line {line}: face defined before material");
            warnings.push(ParseWarning::FaceBeforeMaterial { line });
            return;
        }
    };

    for i in 2..corners.len() {
        for corner in [0, i - 1, i] {
            let reference = FaceVertex::parse(corners[corner]);
            let Some(position) = reference
                .position
                .and_then(|idx| resolve(idx, positions.len()))
            else {
                let index = reference.position.unwrap_or(0);
                log::warn!("line {line}: invalid vertex index {index}");
                warnings.push(ParseWarning::VertexIndexOutOfRange { line, index });
                continue;
            };
            let uv = reference
                .tex_coord
                .and_then(|idx| resolve(idx, tex_coords.len()))
                .map_or([0.0, 0.0], |idx| tex_coords[idx]);

            material.vertices.push(Vertex {
                position: positions[position],
                tex_coords: uv,
            });
            material.indices.push((material.vertices.len() - 1) as u32);
        }
    }
}
