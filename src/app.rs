use std::sync::Arc;

use glam::Vec2;
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::cat::CatPose;
use crate::config::ChaseConfig;
use crate::error::AppError;
use crate::game::LaserGame;
use crate::hud::{HudOverlay, HudSnapshot};
use crate::particles::ParticleSystem;
use crate::render::instance::SpriteInstance;
use crate::render::GpuState;

/// How often to log FPS (seconds).
const FPS_LOG_INTERVAL: f64 = 5.0;
/// Initial window size in logical pixels.
const WINDOW_SIZE: LogicalSize<f64> = LogicalSize::new(1024.0, 768.0);

// ---------------------------------------------------------------------------
// Frame timing
// ---------------------------------------------------------------------------

struct FrameStats {
    frame_count: u64,
    last_log_time: Instant,
    frame_time_sum: f64,
    frame_time_min: f64,
    frame_time_max: f64,
    frames_since_log: u32,
    /// Smoothed for the stats panel.
    fps_smoothed: f64,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frame_count: 0,
            last_log_time: Instant::now(),
            frame_time_sum: 0.0,
            frame_time_min: f64::MAX,
            frame_time_max: 0.0,
            frames_since_log: 0,
            fps_smoothed: 0.0,
        }
    }

    fn record_frame(&mut self, dt: f64) {
        self.frame_count += 1;
        self.frames_since_log += 1;
        self.frame_time_sum += dt;
        self.frame_time_min = self.frame_time_min.min(dt);
        self.frame_time_max = self.frame_time_max.max(dt);

        if dt > 0.0 {
            let fps = 1.0 / dt;
            self.fps_smoothed = if self.fps_smoothed == 0.0 {
                fps
            } else {
                self.fps_smoothed * 0.95 + fps * 0.05
            };
        }

        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed >= FPS_LOG_INTERVAL {
            let avg_ms = (self.frame_time_sum / self.frames_since_log as f64) * 1000.0;
            let fps = self.frames_since_log as f64 / elapsed;
            log::info!(
                "FPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | total frames: {}",
                fps,
                avg_ms,
                self.frame_time_min * 1000.0,
                self.frame_time_max * 1000.0,
                self.frame_count,
            );
            self.last_log_time = Instant::now();
            self.frame_time_sum = 0.0;
            self.frame_time_min = f64::MAX;
            self.frame_time_max = 0.0;
            self.frames_since_log = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level application state.
struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    hud: Option<HudOverlay>,

    game: LaserGame,
    particles: ParticleSystem,

    // Cosmetic randomness only; the chase itself is deterministic.
    rng: fastrand::Rng,

    last_frame_time: Option<Instant>,
    start_time: Instant,
    frame_stats: FrameStats,

    screen_w: u32,
    screen_h: u32,

    // Reusable instance buffer (avoid per-frame allocation)
    instance_buf: Vec<SpriteInstance>,

    /// First fatal error; handed back from `run`.
    error: Option<AppError>,
}

impl App {
    fn new(config: ChaseConfig) -> Self {
        Self {
            window: None,
            gpu: None,
            hud: None,
            game: LaserGame::new(config, fastrand::Rng::new()),
            particles: ParticleSystem::new(),
            rng: fastrand::Rng::new(),
            last_frame_time: None,
            start_time: Instant::now(),
            frame_stats: FrameStats::new(),
            screen_w: 0,
            screen_h: 0,
            instance_buf: Vec::with_capacity(64),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        log::error!("{error}");
        if self.error.is_none() {
            self.error = Some(error);
        }
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.game.teardown();
        self.particles.clear();
        event_loop.exit();
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let attrs = WindowAttributes::default()
            .with_title("Laser Chase")
            .with_inner_size(WINDOW_SIZE)
            .with_visible(false);

        let window = Arc::new(event_loop.create_window(attrs)?);

        let size = window.inner_size();
        self.screen_w = size.width;
        self.screen_h = size.height;
        log::info!("Window created: {}x{}", size.width, size.height);

        let gpu = GpuState::new(window.clone())?;
        log::info!("wgpu + sprite pipeline initialized");

        self.hud = Some(HudOverlay::new(&window, &gpu));
        self.gpu = Some(gpu);

        window.set_visible(true);
        self.window = Some(window);
        Ok(())
    }

    /// Advance the game by wall-clock time and collect this frame's sprites.
    fn update(&mut self, dt: f64) -> Option<CatPose> {
        self.game.advance(dt * 1000.0);

        let time_s = self.start_time.elapsed().as_secs_f32();
        let view = self.game.view();
        let pose = view.map(|v| CatPose::derive(&v, self.game.config().cat_half_size, time_s));

        if let Some(pose) = &pose {
            self.particles
                .spawn_from_pose(pose, &mut self.rng, dt as f32);
        }
        self.particles.update(dt as f32);

        self.instance_buf.clear();
        if let Some(view) = &view {
            self.instance_buf
                .extend(SpriteInstance::laser(view.target, time_s));
        }
        self.particles.build_instances(&mut self.instance_buf);
        if let Some(pose) = &pose {
            self.instance_buf.push(SpriteInstance::cat(pose));
        }

        pose
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = match self.last_frame_time {
            Some(last) => now.duration_since(last).as_secs_f64(),
            None => 0.0,
        };
        self.last_frame_time = Some(now);
        if dt > 0.0 {
            self.frame_stats.record_frame(dt);
        }

        let pose = self.update(dt);

        let view = self.game.view();
        let snapshot = HudSnapshot {
            active: self.game.is_active(),
            pose,
            fact: self.game.fact(),
            variant: self.game.config().variant.label(),
            phase: view.and_then(|v| v.phase),
            elapsed_chase_ms: view.map_or(0.0, |v| v.elapsed_chase_ms),
            pending_tasks: self.game.pending_tasks(),
            particles: self.particles.count(),
            fps: self.frame_stats.fps_smoothed,
            time_s: self.start_time.elapsed().as_secs_f32(),
        };

        let (Some(window), Some(gpu), Some(hud)) = (&self.window, &mut self.gpu, &mut self.hud)
        else {
            return;
        };

        let (screen_w, screen_h) = (self.screen_w, self.screen_h);
        gpu.render(&self.instance_buf, |target| {
            // egui only runs when there is a frame to paint it on, so its
            // texture uploads are never dropped.
            let (primitives, textures_delta, screen_descriptor) =
                hud.run_frame(window, screen_w, screen_h, &snapshot);
            let cmd_bufs = hud.paint(target, &primitives, &textures_delta, &screen_descriptor);
            hud.free_textures(&textures_delta);
            cmd_bufs
        });
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.create_window(event_loop) {
            self.fail(event_loop, e);
            return;
        }

        // Continuous game loop
        event_loop.set_control_flow(ControlFlow::Poll);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(window), Some(hud)) = (&self.window, &mut self.hud) {
            // The HUD is display-only; pointer events still reach the game.
            let _ = hud.on_window_event(window, &event);
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                self.shutdown(event_loop);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match logical_key {
                Key::Named(NamedKey::Escape) => {
                    log::info!("ESC pressed, exiting");
                    self.shutdown(event_loop);
                }
                Key::Named(NamedKey::F12) => {
                    if let Some(hud) = &mut self.hud {
                        hud.toggle_stats();
                    }
                }
                _ => {}
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.game
                    .pointer_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.game.pointer_left();
                self.particles.clear();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                    self.screen_w = new_size.width;
                    self.screen_h = new_size.height;
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.game.teardown();
    }
}

/// Create the event loop and run until the window closes.
pub fn run(config: ChaseConfig) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
