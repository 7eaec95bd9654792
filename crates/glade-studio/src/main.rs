mod camera;

use std::time::{Duration, Instant};

use anyhow::Result;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use glade_engine::core::{App, AppControl, FrameCtx};
use glade_engine::device::GpuInit;
use glade_engine::logging::{init_logging, LoggingConfig};
use glade_engine::paint::Color;
use glade_engine::particles::{ParticleConfig, ParticleSystem};
use glade_engine::render::ParticleRenderer;
use glade_engine::window::{Runtime, RuntimeConfig};

use camera::Camera;

/// How often pool statistics are logged.
const STATS_INTERVAL: Duration = Duration::from_secs(1);

/// Movement keys currently held.
#[derive(Debug, Default)]
struct HeldKeys {
    forward: bool,
    back: bool,
    left: bool,
    right: bool,
}

struct Garden {
    particles: ParticleSystem,
    renderer: ParticleRenderer,
    camera: Camera,
    keys: HeldKeys,
    paused: bool,
    reset_requested: bool,
    last_stats: Instant,
}

impl Garden {
    fn new(config: ParticleConfig) -> Result<Self> {
        Ok(Self {
            particles: ParticleSystem::new(config)?,
            renderer: ParticleRenderer::new(),
            camera: Camera::default(),
            keys: HeldKeys::default(),
            paused: false,
            reset_requested: false,
            last_stats: Instant::now(),
        })
    }

    fn on_key(&mut self, event: &KeyEvent) -> AppControl {
        let PhysicalKey::Code(code) = event.physical_key else {
            return AppControl::Continue;
        };
        let pressed = event.state == ElementState::Pressed;

        match code {
            KeyCode::Escape if pressed => return AppControl::Exit,
            KeyCode::Space if pressed && !event.repeat => {
                self.paused = !self.paused;
                log::info!("simulation {}", if self.paused { "paused" } else { "resumed" });
            }
            KeyCode::KeyR if pressed && !event.repeat => self.reset_requested = true,
            KeyCode::KeyW | KeyCode::ArrowUp => self.keys.forward = pressed,
            KeyCode::KeyS | KeyCode::ArrowDown => self.keys.back = pressed,
            KeyCode::KeyA | KeyCode::ArrowLeft => self.keys.left = pressed,
            KeyCode::KeyD | KeyCode::ArrowRight => self.keys.right = pressed,
            _ => {}
        }
        AppControl::Continue
    }

    fn move_camera(&mut self, dt_secs: f32) {
        let k = &self.keys;
        if k.forward {
            self.camera.move_forward(dt_secs, 1.0);
        }
        if k.back {
            self.camera.move_forward(dt_secs, -1.0);
        }
        if k.left {
            self.camera.strafe(dt_secs, -1.0);
        }
        if k.right {
            self.camera.strafe(dt_secs, 1.0);
        }
    }

    fn log_stats(&mut self, now: Instant) {
        if now.duration_since(self.last_stats) < STATS_INTERVAL {
            return;
        }
        self.last_stats = now;

        let pool = self.particles.pool();
        let tick = self.particles.last_tick();
        log::debug!(
            "particles: {}/{} live, last tick +{} -{}",
            pool.live_count(),
            pool.capacity(),
            tick.emitted,
            tick.retired
        );
    }
}

impl App for Garden {
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput { event, .. } => self.on_key(event),
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let time = ctx.time;

        if self.reset_requested {
            self.reset_requested = false;
            self.particles.reset();
            log::info!("particles reset");
        }

        self.move_camera(time.dt);

        let world = self.particles.world_matrix();
        let vertices = if self.paused {
            self.particles.rebuild()
        } else {
            self.particles.update(time.dt_ms())
        };

        let camera = &self.camera;
        let renderer = &mut self.renderer;
        let control = ctx.render(Color::from_u8(200, 180, 180, 255), |rctx, target| {
            let world_view_proj = camera.view_projection(rctx.aspect_ratio()) * world;
            renderer.render(rctx, target, vertices, world_view_proj);
        });

        self.log_stats(time.now);
        control
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let garden = Garden::new(ParticleConfig::default())?;
    log::info!("garden ready: Space pauses, R resets, WASD moves, Esc quits");

    Runtime::run(
        RuntimeConfig {
            title: "Glade".to_string(),
            ..Default::default()
        },
        GpuInit::default(),
        garden,
    )
}
