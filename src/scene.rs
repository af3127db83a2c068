//! The viewer's world: loaded models, placed characters, the held weapon and
//! the first-person camera.
//!
//! A frame is drawn in a fixed order: skybox, map, characters, weapon,
//! crosshair.

use std::path::Path;

use anyhow::Context as _;
use cgmath::{Deg, Matrix4, Point3, SquareMatrix};
use rand::{SeedableRng, rngs::StdRng};
use winit::keyboard::KeyCode;

use crate::{
    camera::{Camera, Projection},
    config::{AssetConfig, ViewerConfig},
    data_structures::{
        actor::{self, PlacedActor, Team},
        weapon::{self, WeaponKind},
    },
    error::RenderError,
    gpu::{Program, RenderBackend},
    input::InputSnapshot,
    render::{Archetype, SceneRenderer, crosshair::Crosshair, skybox::Skybox},
    resources::MeshParser,
};

const WEAPON_KEYS: [(KeyCode, WeaponKind); 3] = [
    (KeyCode::Digit1, WeaponKind::Rifle),
    (KeyCode::Digit2, WeaponKind::Pistol),
    (KeyCode::Digit3, WeaponKind::Knife),
];

/// What the app loop should do after an update.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

pub struct Scene<B: RenderBackend> {
    renderer: SceneRenderer<B>,
    skybox: Skybox<B>,
    crosshair: Crosshair<B>,
    actors: Vec<PlacedActor>,
    weapon: WeaponKind,
    camera: Camera,
    projection: Projection,
    /// Seconds since the scene was loaded.
    elapsed: f32,
}

impl<B: RenderBackend> Scene<B> {
    /// Loads every model and the skybox, then places the characters.
    ///
    /// Any model or skybox face that cannot be loaded is an error. Textures
    /// that fail to decode only leave their material undrawn.
    pub fn load(gpu: &mut B, config: &ViewerConfig, size: (u32, u32)) -> anyhow::Result<Self> {
        let parser = MeshParser::new(config.assets.prefix.clone());
        let mut renderer = SceneRenderer::new();
        for archetype in Archetype::ALL {
            let path = model_path(&config.assets, archetype);
            let document = parser
                .parse(path, gpu)
                .with_context(|| format!("loading {} model", archetype.label()))?;
            if !document.warnings.is_empty() {
                log::warn!(
                    "{} loaded with {} warnings",
                    path.display(),
                    document.warnings.len()
                );
            }
            renderer.load(gpu, archetype, document);
        }

        let skybox = Skybox::load(gpu, &config.assets.skybox).context("loading skybox")?;
        let crosshair = Crosshair::new(gpu);

        let mut rng = match config.spawns.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let mut actors = actor::spawn_all(Team::CounterTerrorist, &config.spawns.counter_terrorist, &mut rng);
        actors.extend(actor::spawn_all(Team::Terrorist, &config.spawns.terrorist, &mut rng));
        log::info!("Placed {} characters", actors.len());

        let weapon = WeaponKind::default();
        let cam = &config.camera;
        let mut camera = Camera::new(Point3::from(cam.position), Deg(cam.yaw), Deg(cam.pitch))
            .with_zoom(cam.fov);
        camera.sensitivity = cam.sensitivity;
        camera.speed = weapon.movement_speed();

        Ok(Self {
            renderer,
            skybox,
            crosshair,
            actors,
            weapon,
            camera,
            projection: Projection::new(size.0, size.1, cam.near, cam.far),
            elapsed: 0.0,
        })
    }

    pub fn renderer(&self) -> &SceneRenderer<B> {
        &self.renderer
    }

    pub fn actors(&self) -> &[PlacedActor] {
        &self.actors
    }

    pub fn weapon(&self) -> WeaponKind {
        self.weapon
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Switches weapons; movement speed follows the weapon.
    pub fn select_weapon(&mut self, kind: WeaponKind) {
        if self.weapon != kind {
            log::info!("Switched to {}", kind.name());
        }
        self.weapon = kind;
        self.camera.speed = kind.movement_speed();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }

    /// Applies one frame of input. `dt` is in seconds.
    pub fn update(&mut self, input: &InputSnapshot, dt: f32) -> Control {
        self.elapsed += dt;

        if input.was_pressed(KeyCode::Escape) {
            return Control::Exit;
        }
        for (key, kind) in WEAPON_KEYS {
            if input.was_pressed(key) {
                self.select_weapon(kind);
            }
        }
        if input.was_pressed(KeyCode::KeyE) {
            let locked = self.camera.toggle_y_lock();
            log::info!("Height lock {}", if locked { "on" } else { "off" });
        }

        let forward = input.axis(KeyCode::KeyW, KeyCode::KeyS);
        let strafe = input.axis(KeyCode::KeyD, KeyCode::KeyA);
        self.camera.travel(forward, strafe, dt);

        let (dx, dy) = input.mouse_delta;
        if dx != 0.0 || dy != 0.0 {
            // Screen y grows downwards; pitch grows upwards.
            self.camera.process_mouse(dx as f32, -dy as f32);
        }
        if input.scroll != 0.0 {
            self.camera.process_scroll(input.scroll);
        }
        Control::Continue
    }

    pub fn draw(&self, gpu: &mut B) -> Result<(), RenderError> {
        let view = self.camera.view_matrix();
        let projection = self.projection.perspective(self.camera.zoom());

        self.skybox
            .draw(gpu, self.camera.rotation_view_matrix(), projection);

        gpu.use_program(Program::Scene);
        gpu.set_uniform("model", Matrix4::identity().into());
        gpu.set_uniform("view", view.into());
        gpu.set_uniform("projection", projection.into());
        self.renderer.draw_map(gpu)?;

        for actor in &self.actors {
            self.renderer.draw_actor(gpu, actor)?;
        }

        // The weapon is placed in clip space directly and only follows a
        // fraction of the camera pitch.
        let weapon_model = projection * self.weapon.model_matrix(self.elapsed);
        gpu.set_uniform("model", weapon_model.into());
        gpu.set_uniform("view", weapon::pitch_view(self.camera.pitch()).into());
        gpu.set_uniform("projection", Matrix4::identity().into());
        self.renderer.draw_weapon(gpu, self.weapon)?;

        self.crosshair.draw(gpu, self.projection.pixel_ortho());
        Ok(())
    }

    /// Releases every model's buffers.
    pub fn teardown(&mut self) {
        self.renderer.teardown();
    }
}

fn model_path(assets: &AssetConfig, archetype: Archetype) -> &Path {
    match archetype {
        Archetype::Map => &assets.map,
        Archetype::Weapon(WeaponKind::Rifle) => &assets.rifle,
        Archetype::Weapon(WeaponKind::Pistol) => &assets.pistol,
        Archetype::Weapon(WeaponKind::Knife) => &assets.knife,
        Archetype::Character(Team::CounterTerrorist) => &assets.counter_terrorist,
        Archetype::Character(Team::Terrorist) => &assets.terrorist,
    }
}
