//! Per-frame input state collected from winit events.

use std::collections::HashSet;

use winit::{
    event::{ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
};

/// Pixels one wheel "line" counts as when the platform reports pixel deltas.
const PIXELS_PER_LINE: f64 = 40.0;

/// Keyboard and mouse state for one frame.
///
/// `held` persists across frames; `pressed`, mouse motion and scroll are
/// cleared by [`InputSnapshot::end_frame`].
#[derive(Clone, Debug, Default)]
pub struct InputSnapshot {
    held: HashSet<KeyCode>,
    pressed: HashSet<KeyCode>,
    /// Relative mouse motion in pixels, +y down.
    pub mouse_delta: (f64, f64),
    /// Wheel lines, +y away from the user.
    pub scroll: f32,
}

impl InputSnapshot {
    pub fn key_event(&mut self, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        match event.state {
            ElementState::Pressed => {
                if !event.repeat {
                    self.pressed.insert(code);
                }
                self.held.insert(code);
            }
            ElementState::Released => {
                self.held.remove(&code);
            }
        }
    }

    /// Same as a non-repeating press followed by no release.
    pub fn press(&mut self, code: KeyCode) {
        self.pressed.insert(code);
        self.held.insert(code);
    }

    pub fn release(&mut self, code: KeyCode) {
        self.held.remove(&code);
    }

    pub fn mouse_motion(&mut self, dx: f64, dy: f64) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
    }

    pub fn wheel(&mut self, delta: MouseScrollDelta) {
        self.scroll += match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
        };
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.held.contains(&code)
    }

    /// Pressed since the last [`end_frame`](Self::end_frame).
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.pressed.contains(&code)
    }

    /// `1.0` if only `positive` is held, `-1.0` if only `negative`, else `0.0`.
    pub fn axis(&self, positive: KeyCode, negative: KeyCode) -> f32 {
        match (self.is_held(positive), self.is_held(negative)) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }

    pub fn end_frame(&mut self) {
        self.pressed.clear();
        self.mouse_delta = (0.0, 0.0);
        self.scroll = 0.0;
    }
}
