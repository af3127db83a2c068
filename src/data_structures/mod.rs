//! Viewer data structures: meshes, textures, actors and weapons.
//!
//! - `mesh` holds parsed vertices, materials and whole mesh documents
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `actor` describes characters placed in the world
//! - `weapon` holds the weapon kinds and their view-model placement

pub mod actor;
pub mod mesh;
pub mod texture;
pub mod weapon;
