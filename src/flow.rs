//! Application event loop.
//!
//! [`run`] opens the window, loads the scene and then drives one frame per
//! redraw:
//! 1. Collect keyboard, mouse and wheel events into an [`InputSnapshot`]
//! 2. Update the scene with the frame time
//! 3. Record the scene's draws on the backend
//! 4. Present
//!
//! Everything is loaded before the first frame. If set-up fails the loop
//! exits and [`run`] returns the error.

use std::sync::Arc;

use anyhow::Context as _;
use instant::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{CursorGrabMode, Window, WindowId},
};

use crate::{
    config::ViewerConfig,
    context::Context,
    gpu::backend::WgpuBackend,
    input::InputSnapshot,
    scene::{Control, Scene},
};

/// Everything that only exists once the window is up.
struct AppState {
    // Declared before the backend so the scene's buffers go first.
    scene: Scene<WgpuBackend>,
    gpu: WgpuBackend,
}

impl AppState {
    fn new(
        window: Arc<Window>,
        config: &ViewerConfig,
        async_runtime: &tokio::runtime::Runtime,
    ) -> anyhow::Result<Self> {
        let ctx = async_runtime
            .block_on(Context::new(window, config.window.vsync))
            .context("cannot create the main context")?;
        let mut gpu = WgpuBackend::new(ctx);
        let size = gpu.context().size();
        let scene = Scene::load(&mut gpu, config, size)?;
        Ok(Self { scene, gpu })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        if width > 0 && height > 0 {
            self.scene.resize(width, height);
        }
    }

    fn window(&self) -> &Window {
        self.gpu.context().window()
    }

    /// Draws and presents one frame. Returns `false` when the app should quit.
    fn render(&mut self) -> bool {
        self.gpu.begin_frame();
        if let Err(e) = self.scene.draw(&mut self.gpu) {
            log::error!("Unable to draw the scene: {e}");
            return false;
        }
        match self.gpu.end_frame() {
            Ok(()) => true,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.window().inner_size();
                self.resize(size.width, size.height);
                true
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory");
                false
            }
            Err(e) => {
                log::warn!("Dropped frame: {e}");
                true
            }
        }
    }
}

pub struct App {
    config: ViewerConfig,
    async_runtime: tokio::runtime::Runtime,
    state: Option<AppState>,
    input: InputSnapshot,
    last_time: Instant,
    failure: Option<anyhow::Error>,
}

impl App {
    fn new(config: ViewerConfig) -> anyhow::Result<Self> {
        let async_runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .context("cannot start the async runtime")?;
        Ok(Self {
            config,
            async_runtime,
            state: None,
            input: InputSnapshot::default(),
            last_time: Instant::now(),
            failure: None,
        })
    }

    fn init(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<AppState> {
        let window_config = &self.config.window;
        let attributes = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(PhysicalSize::new(window_config.width, window_config.height));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("cannot create the window")?,
        );
        capture_cursor(&window);
        AppState::new(window, &self.config, &self.async_runtime)
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(state) => {
                state.window().request_redraw();
                self.last_time = Instant::now();
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("Start-up failed: {e:#}");
                self.failure = Some(e);
                event_loop.exit();
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.input.mouse_motion(dx, dy);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::KeyboardInput { event, .. } => self.input.key_event(&event),
            WindowEvent::MouseWheel { delta, .. } => self.input.wheel(delta),
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now.duration_since(self.last_time).as_secs_f32();
                self.last_time = now;

                let control = state.scene.update(&self.input, dt);
                self.input.end_frame();
                if control == Control::Exit || !state.render() {
                    event_loop.exit();
                    return;
                }
                state.window().request_redraw();
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            state.scene.teardown();
        }
    }
}

/// Hides the cursor and keeps it inside the window so mouse motion turns the
/// camera. Platforms without pointer lock fall back to confinement.
fn capture_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(e) = grabbed {
        log::warn!("Could not capture the cursor: {e}");
    }
    window.set_cursor_visible(false);
}

pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    let mut logger = env_logger::Builder::from_env(
        env_logger::Env::default()
            .default_filter_or(config.log_filter.clone().unwrap_or_else(|| "info".to_string())),
    );
    if let Err(e) = logger.try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config)?;
    event_loop.run_app(&mut app)?;

    match app.failure.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
