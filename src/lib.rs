//! dust-viewer
//!
//! A first-person viewer for textured OBJ/MTL scenes. It loads a map, three
//! view-model weapons and two character models, places the characters around
//! their spawn points and renders everything each frame with a skybox and a
//! crosshair on top.
//!
//! High-level modules
//! - `camera`: first-person camera and projection
//! - `config`: TOML configuration with built-in defaults
//! - `context`: window, surface and device
//! - `data_structures`: meshes, materials, textures, actors and weapons
//! - `error`: parse and render error types
//! - `flow`: the winit application loop
//! - `gpu`: the backend trait the renderers draw through, and its wgpu implementation
//! - `input`: per-frame keyboard and mouse state
//! - `pipelines`: WGSL shaders and pipeline construction
//! - `render`: model buffers, scene renderer, skybox and crosshair
//! - `resources`: OBJ, MTL and image loading
//! - `scene`: the world the app loop updates and draws
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod gpu;
pub mod input;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

pub use config::ViewerConfig;
pub use error::{ParseError, ParseWarning, RenderError};
