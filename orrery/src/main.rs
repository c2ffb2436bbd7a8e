//! Orrery - animated solar system
//!
//! Controls:
//! - Left mouse drag: Orbit camera
//! - Right mouse drag: Pan
//! - Scroll: Zoom
//! - Speed slider, +/-: Speed multiplier
//! - R: Reset view
//! - Esc: Quit

use std::time::Instant;

use common::{GraphicsContext, TextureLoader};
use orrery::{
    compose_scene,
    panel::{draw_control_panel, BodyReadout, PanelStatus},
    register_solar_system,
    renderer::{RenderError, WgpuBackend},
    AnimationLoop, BodyRegistry, RegistryError, SceneError, SceneRoot, SimulationState,
    SpeedControl, ViewerConfig, Viewport,
};
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::ControlFlow,
    keyboard::{KeyCode, PhysicalKey},
};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("graphics unavailable: {0}")]
    Graphics(#[from] common::GraphicsError),

    #[error("invalid body catalogue: {0}")]
    Registry(#[from] RegistryError),

    #[error("scene setup failed: {0}")]
    Scene(#[from] SceneError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// FPS over a two second window
struct FrameStats {
    frames: u32,
    since: Instant,
    fps: f32,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frames: 0,
            since: Instant::now(),
            fps: 0.0,
        }
    }

    /// Returns the new rate whenever a window closes
    fn tick(&mut self) -> Option<f32> {
        self.frames += 1;
        let elapsed = self.since.elapsed().as_secs_f32();
        if elapsed < 2.0 {
            return None;
        }
        self.fps = self.frames as f32 / elapsed;
        self.frames = 0;
        self.since = Instant::now();
        Some(self.fps)
    }
}

struct App {
    config: ViewerConfig,
    backend: WgpuBackend,
    textures: TextureLoader,
    registry: BodyRegistry,
    scene: SceneRoot,
    state: SimulationState,
    speed: SpeedControl,
    viewport: Viewport,
    animation: AnimationLoop,
    stats: FrameStats,
}

impl App {
    fn new(ctx: GraphicsContext, config: ViewerConfig) -> Result<Self, StartupError> {
        let size = ctx.size;
        let backend = WgpuBackend::new(ctx, &config.assets);

        let mut textures = TextureLoader::new();
        let mut registry = BodyRegistry::new();
        register_solar_system(&mut registry, &mut textures, &config.assets.texture_dir)?;
        let scene = compose_scene(&mut registry, &config.lighting)?;

        let viewport = Viewport::new(&config.camera, size.width, size.height);
        let state = SimulationState::new(config.animation.initial_speed);
        let speed = SpeedControl::from_config(&config.animation);
        let animation = AnimationLoop::from_config(&config.animation);

        Ok(Self {
            config,
            backend,
            textures,
            registry,
            scene,
            state,
            speed,
            viewport,
            animation,
            stats: FrameStats::new(),
        })
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.viewport
            .on_resize(new_size.width, new_size.height, &mut self.backend);
    }

    /// Returns true when the app should quit
    fn handle_key(&mut self, key: KeyCode, state: ElementState) -> bool {
        if state != ElementState::Pressed {
            return false;
        }

        match key {
            KeyCode::Escape => return true,
            KeyCode::KeyR => self.viewport.reset_camera(&self.config.camera),
            KeyCode::Equal | KeyCode::NumpadAdd => {
                let speed = self.speed.step_up(&mut self.state);
                log::info!("Speed: {:.2}x", speed);
            }
            KeyCode::Minus | KeyCode::NumpadSubtract => {
                let speed = self.speed.step_down(&mut self.state);
                log::info!("Speed: {:.2}x", speed);
            }
            _ => {}
        }
        false
    }

    fn redraw(&mut self) -> Result<bool, RenderError> {
        self.backend.load_next_texture(&mut self.textures);

        let bodies: Vec<BodyReadout> = self
            .registry
            .iter()
            .map(|(_, body)| BodyReadout {
                name: body.name().to_string(),
                orbital_distance: body.orbital_distance(),
                position: body.position(),
            })
            .collect();
        let status = PanelStatus {
            speed: self.state.speed_multiplier(),
            speed_slider_max: self.config.animation.speed_slider_max,
            time: self.state.time(),
            frames: self.animation.frames(),
            fps: self.stats.fps,
            bodies: &bodies,
        };

        let mut requested_speed = None;
        self.backend.prepare_overlay(|ctx| {
            if let Some(speed) = draw_control_panel(ctx, &status) {
                requested_speed = Some(speed);
            }
        });
        if let Some(speed) = requested_speed {
            self.speed.on_input(speed, &mut self.state);
        }

        let again = self.animation.frame(
            &mut self.registry,
            &mut self.scene,
            &self.state,
            &mut self.viewport,
            &mut self.backend,
        )?;

        if let Some(fps) = self.stats.tick() {
            log::info!(
                "FPS: {:.1} | Speed: {:.2}x | Time: {:.1} s",
                fps,
                self.state.speed_multiplier(),
                self.state.time()
            );
        }

        Ok(again)
    }
}

fn main() {
    common::init_logging();

    if let Err(err) = run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), StartupError> {
    let config = ViewerConfig::default();
    let (ctx, event_loop) = pollster::block_on(GraphicsContext::new(
        &config.window.title,
        config.window.width,
        config.window.height,
    ))?;

    let mut app = App::new(ctx, config)?;
    log::info!("Starting animation");

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { ref event, .. } => {
                let overlay_consumed = app.backend.handle_overlay_event(event);

                match event {
                    WindowEvent::CloseRequested => {
                        app.animation.stop();
                        elwt.exit();
                    }
                    WindowEvent::Resized(size) => app.resize(*size),
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                physical_key: PhysicalKey::Code(key),
                                state,
                                ..
                            },
                        ..
                    } if !overlay_consumed => {
                        if app.handle_key(*key, *state) {
                            app.animation.stop();
                            elwt.exit();
                        }
                    }
                    WindowEvent::RedrawRequested => match app.redraw() {
                        Ok(_) => {}
                        Err(RenderError::Surface(
                            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
                        )) => app.backend.reconfigure(),
                        Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                            log::error!("GPU out of memory, exiting");
                            app.animation.stop();
                            elwt.exit();
                        }
                        Err(e) => log::warn!("Render error: {}", e),
                    },
                    other => {
                        app.viewport.route_input(other, overlay_consumed);
                    }
                }
            }
            Event::AboutToWait => {
                if app.animation.is_running() {
                    app.backend.window().request_redraw();
                }
            }
            _ => {}
        }
    })?;

    Ok(())
}
