//! Viewer configuration (`dust-viewer.toml`).
//!
//! Every field is optional in the file; anything left out keeps the default
//! shipped with the viewer.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::resources::DEFAULT_ASSET_PREFIX;

pub const DEFAULT_CONFIG_FILE: &str = "dust-viewer.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub assets: AssetConfig,
    pub camera: CameraConfig,
    pub spawns: SpawnConfig,
    /// `env_logger` filter used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// `map_Kd` paths starting with this are taken as already resolved.
    pub prefix: String,
    pub map: PathBuf,
    pub rifle: PathBuf,
    pub pistol: PathBuf,
    pub knife: PathBuf,
    pub counter_terrorist: PathBuf,
    pub terrorist: PathBuf,
    /// +X, -X, +Y, -Y, +Z, -Z
    pub skybox: [PathBuf; 6],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub yaw: f32,
    pub pitch: f32,
    /// Initial vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub sensitivity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub counter_terrorist: Vec<[f32; 3]>,
    pub terrorist: Vec<[f32; 3]>,
    /// Fixed seed for reproducible placement; random when absent.
    pub seed: Option<u64>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "CG_Project1".to_string(),
            width: 1366,
            height: 768,
            vsync: true,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        let face = |name: &str| PathBuf::from(format!("Assets/Skybox/Daylight Box_{name}.bmp"));
        Self {
            prefix: DEFAULT_ASSET_PREFIX.to_string(),
            map: "Assets/Dust2/Dust2.obj".into(),
            rifle: "Assets/AK/AK47.obj".into(),
            pistol: "Assets/USP/USP.obj".into(),
            knife: "Assets/Knife/knife.obj".into(),
            counter_terrorist: "Assets/Players/CT/CT.obj".into(),
            terrorist: "Assets/Players/T/T.obj".into(),
            skybox: [
                face("Right"),
                face("Left"),
                face("Top"),
                face("Bottom"),
                face("Front"),
                face("Back"),
            ],
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [-18.0, 4.21, 18.0],
            yaw: -90.0,
            pitch: 0.0,
            fov: 60.0,
            near: 0.1,
            far: 100.0,
            sensitivity: 0.09,
        }
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            counter_terrorist: vec![
                [8.0, -3.18, -59.0],
                [7.0, -3.18, -57.0],
                [6.0, -3.18, -58.0],
                [9.0, -3.18, -56.0],
                [5.0, -3.18, -60.0],
            ],
            terrorist: vec![
                [-15.0, 3.21, 20.0],
                [-17.0, 3.21, 21.0],
                [-19.0, 3.21, 19.0],
                [-18.0, 3.21, 18.0],
            ],
            seed: None,
        }
    }
}

impl ViewerConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}
