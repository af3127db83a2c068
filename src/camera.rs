//! First-person camera and projection.
//!
//! The camera is a yaw/pitch fly camera with an optional height lock. The
//! projection turns the camera's zoom into a perspective matrix and also
//! provides the pixel-space orthographic matrix the crosshair is drawn with.

use cgmath::{
    Angle, Deg, InnerSpace, Matrix4, Point3, Vector3, Vector4, ortho, perspective,
};

/// cgmath produces OpenGL clip space (z in -1..1); wgpu wants z in 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const WORLD_UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);
const PITCH_LIMIT: f32 = 89.0;
const ZOOM_MIN: f32 = 1.0;
const ZOOM_MAX: f32 = 45.0;
const SCROLL_SENSITIVITY: f32 = 2.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    yaw: Deg<f32>,
    pitch: Deg<f32>,
    front: Vector3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,
    /// Units per second.
    pub speed: f32,
    /// Degrees per pixel of mouse motion.
    pub sensitivity: f32,
    /// Vertical field of view in degrees.
    zoom: f32,
    y_locked: bool,
    locked_y: f32,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>, A: Into<Deg<f32>>>(position: P, yaw: A, pitch: A) -> Self {
        let position = position.into();
        let mut camera = Self {
            position,
            yaw: yaw.into(),
            pitch: pitch.into(),
            front: Vector3::new(0.0, 0.0, -1.0),
            right: Vector3::new(1.0, 0.0, 0.0),
            up: WORLD_UP,
            speed: 2.5,
            sensitivity: 0.09,
            zoom: 60.0,
            y_locked: false,
            locked_y: position.y,
        };
        camera.update_vectors();
        camera
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn yaw(&self) -> Deg<f32> {
        self.yaw
    }

    pub fn pitch(&self) -> Deg<f32> {
        self.pitch
    }

    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn zoom(&self) -> Deg<f32> {
        Deg(self.zoom)
    }

    pub fn is_y_locked(&self) -> bool {
        self.y_locked
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// The view matrix with its translation removed, for the skybox.
    pub fn rotation_view_matrix(&self) -> Matrix4<f32> {
        let mut view = self.view_matrix();
        view.w = Vector4::new(0.0, 0.0, 0.0, 1.0);
        view
    }

    /// Applies relative mouse motion. `dy` is positive when looking up.
    pub fn process_mouse(&mut self, dx: f32, dy: f32) {
        self.yaw += Deg(dx * self.sensitivity);
        let pitch = self.pitch.0 + dy * self.sensitivity;
        self.pitch = Deg(pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT));
        self.update_vectors();
    }

    pub fn process_scroll(&mut self, dy: f32) {
        self.zoom = (self.zoom - dy * SCROLL_SENSITIVITY).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    /// Toggles the height lock and returns whether it is now on. Turning it on
    /// freezes the current height.
    pub fn toggle_y_lock(&mut self) -> bool {
        self.y_locked = !self.y_locked;
        if self.y_locked {
            self.locked_y = self.position.y;
        }
        self.y_locked
    }

    /// Moves along the look direction. `forward` and `strafe` are each -1, 0
    /// or 1; diagonal movement is not faster than straight movement.
    pub fn travel(&mut self, forward: f32, strafe: f32, dt: f32) {
        let (front, right) = if self.y_locked {
            (flatten(self.front), flatten(self.right))
        } else {
            (self.front, self.right)
        };
        let movement = front * forward + right * strafe;
        if movement.magnitude2() == 0.0 {
            return;
        }
        self.position += movement.normalize() * (self.speed * dt);
        if self.y_locked {
            self.position.y = self.locked_y;
        }
    }

    fn update_vectors(&mut self) {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.front = Vector3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch).normalize();
        self.right = self.front.cross(WORLD_UP).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

fn flatten(v: Vector3<f32>) -> Vector3<f32> {
    let flat = Vector3::new(v.x, 0.0, v.z);
    if flat.magnitude2() == 0.0 {
        flat
    } else {
        flat.normalize()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    width: u32,
    height: u32,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, znear: f32, zfar: f32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn perspective(&self, fovy: Deg<f32>) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(fovy, self.aspect(), self.znear, self.zfar)
    }

    /// One unit per pixel with the origin at the window centre.
    pub fn pixel_ortho(&self) -> Matrix4<f32> {
        let half_w = self.width as f32 / 2.0;
        let half_h = self.height as f32 / 2.0;
        OPENGL_TO_WGPU_MATRIX * ortho(-half_w, half_w, -half_h, half_h, -1.0, 1.0)
    }
}
