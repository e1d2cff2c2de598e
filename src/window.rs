//! Host window and event loop.
//!
//! [`App`] owns the winit window and mounts an [`Engine`] on a [`GpuState`]
//! once the window exists. Cursor and resize events are forwarded to the
//! engine; every redraw runs one frame against the shared clock.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::SwarmConfig;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::gpu::GpuState;
use crate::time::Time;

pub struct App {
    config: SwarmConfig,
    window: Option<Arc<Window>>,
    engine: Option<Engine<GpuState>>,
    time: Time,
    /// First fatal error; returned from [`run`] after the loop exits.
    error: Option<EngineError>,
}

impl App {
    pub fn new(config: SwarmConfig) -> Self {
        Self {
            config,
            window: None,
            engine: None,
            time: Time::new(),
            error: None,
        }
    }

    fn mount(&mut self, event_loop: &ActiveEventLoop) -> Result<(), EngineError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();

        let gpu_state = pollster::block_on(GpuState::new(window.clone()))?;
        let mut engine = Engine::start(gpu_state, self.config.clone())?;
        engine.resize(size.width, size.height);

        self.time = Time::new();
        self.engine = Some(engine);
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: EngineError) {
        log::error!("{}", error);
        if let Some(engine) = &mut self.engine {
            engine.stop();
        }
        self.error.get_or_insert(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.mount(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(engine) = &mut self.engine else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                engine.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::CursorMoved { .. } => {
                engine.handle_window_event(&event);
            }
            WindowEvent::RedrawRequested => {
                let elapsed = self.time.update();
                if let Err(e) = engine.frame(elapsed) {
                    self.fail(event_loop, e);
                    return;
                }

                if let Some(window) = &self.window {
                    if self.time.fps_refreshed() {
                        log::debug!(
                            "{:.1} fps at frame {} ({:.1}s)",
                            self.time.fps(),
                            self.time.frame(),
                            elapsed
                        );
                        window.set_title(&format!(
                            "{} - {:.0} fps",
                            self.config.window.title,
                            self.time.fps()
                        ));
                    }
                    if engine.is_running() {
                        window.request_redraw();
                    }
                }
            }
            _ => {}
        }
    }
}

/// Open a window and run the engine until it is closed.
pub fn run(config: SwarmConfig) -> Result<(), EngineError> {
    config.validate()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
