use std::path::Path;

use crate::{
    data_structures::mesh::Material,
    error::{ParseError, ParseWarning},
    resources::{MeshParser, TextureLoader, load_string, parent_dir, resolve_texture_path},
};

/// The materials of one `.mtl` file, in `newmtl` order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialLibrary {
    pub materials: Vec<Material>,
    pub warnings: Vec<ParseWarning>,
}

impl MeshParser {
    pub fn parse_materials<T>(
        &self,
        path: impl AsRef<Path>,
        textures: &mut T,
    ) -> Result<MaterialLibrary, ParseError>
    where
        T: TextureLoader + ?Sized,
    {
        let path = path.as_ref();
        let source = load_string(path).map_err(|source| ParseError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.parse_materials_str(&source, parent_dir(path), textures))
    }

    /// Parses MTL text. Relative `map_Kd` paths resolve against `mtl_dir`.
    ///
    /// Only `newmtl` and `map_Kd` are understood; a texture that fails to load
    /// leaves its material untextured and is reported as a warning.
    pub fn parse_materials_str<T>(
        &self,
        source: &str,
        mtl_dir: &Path,
        textures: &mut T,
    ) -> MaterialLibrary
    where
        T: TextureLoader + ?Sized,
    {
        let mut library = MaterialLibrary::default();
        let mut material = Material::default();

        for line in source.lines() {
            let line = line.trim();
            let Some((prefix, rest)) = split_directive(line) else {
                continue;
            };
            match prefix {
                "newmtl" => {
                    if !material.name.is_empty() {
                        library.materials.push(std::mem::take(&mut material));
                    }
                    material.name = rest.split_whitespace().next().unwrap_or_default().to_string();
                    log::info!("Loading material: {}", material.name);
                }
                "map_Kd" if !rest.is_empty() => {
                    let texture_path = resolve_texture_path(mtl_dir, rest, &self.asset_prefix);
                    material.texture = textures.load_texture(&texture_path);
                    match material.texture {
                        Some(id) => log::info!(
                            "Loaded texture for material {} from {} as {:?}",
                            material.name,
                            texture_path.display(),
                            id
                        ),
                        None => {
                            log::warn!(
                                "Failed to load texture for material {} from {}",
                                material.name,
                                texture_path.display()
                            );
                            library.warnings.push(ParseWarning::TextureDecodeFailure {
                                material: material.name.clone(),
                                path: texture_path.clone(),
                            });
                        }
                    }
                    material.texture_path = Some(texture_path);
                }
                _ => (),
            }
        }

        if !material.name.is_empty() {
            library.materials.push(material);
        }
        library
    }
}

/// Splits `directive argument...` into the directive and the trimmed remainder.
fn split_directive(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    match line.split_once(char::is_whitespace) {
        Some((prefix, rest)) => Some((prefix, rest.trim())),
        None => Some((line, "")),
    }
}
