use cgmath::{Deg, Matrix4, Vector3};

/// The three weapons a player can hold. The knife is drawn on start-up.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum WeaponKind {
    Rifle,
    Pistol,
    #[default]
    Knife,
}

/// How the renderer rasterizes a weapon's materials.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DrawMode {
    /// One draw per material, culling off.
    Normal,
    /// Back faces, then front faces: two draws per material.
    DoubleSided,
}

/// Where a weapon sits relative to the eye.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewModel {
    pub position: Vector3<f32>,
    pub scale: f32,
    /// Applied y, then x, then z.
    pub rotation: [Deg<f32>; 3],
    pub bobs: bool,
}

/// Downward tilt every weapon gets after scaling.
const TILT: Deg<f32> = Deg(-10.0);

impl WeaponKind {
    pub const ALL: [WeaponKind; 3] = [WeaponKind::Rifle, WeaponKind::Pistol, WeaponKind::Knife];

    /// Camera movement speed in units per second while holding this weapon.
    pub fn movement_speed(self) -> f32 {
        match self {
            WeaponKind::Rifle => 7.0,
            WeaponKind::Pistol => 8.0,
            WeaponKind::Knife => 10.0,
        }
    }

    pub fn draw_mode(self) -> DrawMode {
        match self {
            WeaponKind::Knife => DrawMode::DoubleSided,
            WeaponKind::Rifle | WeaponKind::Pistol => DrawMode::Normal,
        }
    }

    pub fn view_model(self) -> ViewModel {
        match self {
            WeaponKind::Rifle => ViewModel {
                position: Vector3::new(0.4, -0.3, -0.6),
                scale: 0.005,
                rotation: [Deg(0.0), Deg(180.0), Deg(0.0)],
                bobs: false,
            },
            WeaponKind::Pistol => ViewModel {
                position: Vector3::new(0.18, -0.2, -0.6),
                scale: 0.03,
                rotation: [Deg(0.0), Deg(-90.0), Deg(0.0)],
                bobs: false,
            },
            WeaponKind::Knife => ViewModel {
                position: Vector3::new(0.1, -0.2, -0.5),
                scale: 0.1,
                rotation: [Deg(0.0), Deg(180.0), Deg(15.0)],
                bobs: true,
            },
        }
    }

    /// Model matrix of the view-model at `time` seconds since start-up.
    pub fn model_matrix(self, time: f32) -> Matrix4<f32> {
        let vm = self.view_model();
        let [x, y, z] = vm.rotation;
        let mut model = Matrix4::from_translation(vm.position)
            * Matrix4::from_angle_y(y)
            * Matrix4::from_angle_x(x)
            * Matrix4::from_angle_z(z);
        if vm.bobs {
            model = model * Matrix4::from_translation(Vector3::new(0.0, bob_offset(time), 0.0));
        }
        model * Matrix4::from_scale(vm.scale) * Matrix4::from_angle_x(TILT)
    }

    pub fn name(self) -> &'static str {
        match self {
            WeaponKind::Rifle => "rifle",
            WeaponKind::Pistol => "pistol",
            WeaponKind::Knife => "knife",
        }
    }
}

/// Vertical knife sway.
pub fn bob_offset(time: f32) -> f32 {
    (time * 2.0).sin() * 0.02
}

/// The weapon's stand-in view matrix: a tenth of the camera pitch around X.
pub fn pitch_view(pitch: Deg<f32>) -> Matrix4<f32> {
    Matrix4::from_angle_x(pitch * 0.1)
}
