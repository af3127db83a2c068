//! Error and warning types for asset loading and rendering.
//!
//! Fatal conditions are [`ParseError`]s and abort start-up. Recoverable ones
//! are collected as [`ParseWarning`]s on the parsed document so callers (and
//! tests) can inspect what was skipped.

use std::path::PathBuf;

use crate::render::Archetype;

/// A mesh or material file could not be turned into a document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to open {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load material library {}", path.display())]
    MaterialLibrary {
        path: PathBuf,
        #[source]
        source: Box<ParseError>,
    },
}

/// Something malformed was skipped while parsing. Parsing continued.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseWarning {
    /// An `f` record appeared while no material was active.
    FaceBeforeMaterial { line: usize },
    /// A face referenced a position that does not exist (1-based `index` as written).
    VertexIndexOutOfRange { line: usize, index: i64 },
    /// `map_Kd` named an image that could not be read or decoded.
    TextureDecodeFailure { material: String, path: PathBuf },
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::FaceBeforeMaterial { line } => {
                write!(f, "line {line}: face defined before any material")
            }
            ParseWarning::VertexIndexOutOfRange { line, index } => {
                write!(f, "line {line}: invalid vertex index {index}")
            }
            ParseWarning::TextureDecodeFailure { material, path } => write!(
                f,
                "failed to load texture {} for material {material}",
                path.display()
            ),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Nothing was uploaded for this archetype. Weapon and team selections are
    /// closed enums, so this only happens when set-up skipped a model.
    #[error("no model loaded for {0:?}")]
    ArchetypeNotLoaded(Archetype),
}
