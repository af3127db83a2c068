use cgmath::{Deg, Matrix4, Vector3};
use rand::Rng;

/// Uniform scale applied to every character model.
pub const CHARACTER_SCALE: f32 = 0.025;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Team {
    CounterTerrorist,
    Terrorist,
}

impl Team {
    pub const ALL: [Team; 2] = [Team::CounterTerrorist, Team::Terrorist];

    /// Heading of a freshly spawned character before its random offset.
    pub fn base_yaw(self) -> Deg<f32> {
        match self {
            Team::CounterTerrorist => Deg(90.0),
            Team::Terrorist => Deg(-90.0),
        }
    }
}

/// Read access to something the scene renderer can draw as a character.
pub trait Actor {
    fn team(&self) -> Team;
    fn position(&self) -> Vector3<f32>;
    /// Total rotation around +Y.
    fn yaw(&self) -> Deg<f32>;

    /// translate · rotate-Y · scale
    fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position())
            * Matrix4::from_angle_y(self.yaw())
            * Matrix4::from_scale(CHARACTER_SCALE)
    }
}

/// A character placed once at scene set-up. Never moves afterwards.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlacedActor {
    team: Team,
    position: Vector3<f32>,
    yaw_offset: Deg<f32>,
}

impl PlacedActor {
    pub fn new(team: Team, position: Vector3<f32>, yaw_offset: Deg<f32>) -> Self {
        Self {
            team,
            position,
            yaw_offset,
        }
    }

    /// Places a character near `base`: x and z move by up to one unit either
    /// way and the heading turns by up to half a revolution.
    pub fn spawn<R: Rng + ?Sized>(team: Team, base: Vector3<f32>, rng: &mut R) -> Self {
        let dx: f32 = rng.random_range(-1.0..1.0);
        let dz: f32 = rng.random_range(-1.0..1.0);
        let yaw: f32 = rng.random_range(-180.0..180.0);
        Self::new(team, base + Vector3::new(dx, 0.0, dz), Deg(yaw))
    }

    pub fn yaw_offset(&self) -> Deg<f32> {
        self.yaw_offset
    }
}

impl Actor for PlacedActor {
    fn team(&self) -> Team {
        self.team
    }

    fn position(&self) -> Vector3<f32> {
        self.position
    }

    fn yaw(&self) -> Deg<f32> {
        self.team.base_yaw() + self.yaw_offset
    }
}

/// One actor per spawn point, in the order given.
pub fn spawn_all<R: Rng + ?Sized>(team: Team, bases: &[[f32; 3]], rng: &mut R) -> Vec<PlacedActor> {
    bases
        .iter()
        .map(|&base| PlacedActor::spawn(team, base.into(), rng))
        .collect()
}
