use std::ops::{Deref, DerefMut};

use crate::gpu::{Face, RasterState, RenderBackend};

/// Snapshots the backend's raster state and puts it back when dropped.
///
/// The cull face is always reset to [`Face::Back`] on restore, whatever it was
/// when the snapshot was taken. Draw code borrows the backend through the
/// guard, so every exit path (including `?`) restores.
pub struct RasterStateGuard<'a, B: RenderBackend> {
    gpu: &'a mut B,
    saved: RasterState,
}

impl<'a, B: RenderBackend> RasterStateGuard<'a, B> {
    pub fn new(gpu: &'a mut B) -> Self {
        let saved = gpu.raster_state();
        Self { gpu, saved }
    }

    pub fn saved(&self) -> RasterState {
        self.saved
    }
}

impl<B: RenderBackend> Deref for RasterStateGuard<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.gpu
    }
}

impl<B: RenderBackend> DerefMut for RasterStateGuard<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.gpu
    }
}

impl<B: RenderBackend> Drop for RasterStateGuard<'_, B> {
    fn drop(&mut self) {
        self.gpu.set_raster_state(RasterState {
            cull_face: Face::Back,
            ..self.saved
        });
    }
}
