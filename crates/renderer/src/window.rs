use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::Receiver;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use realm::{Coordinator, RealmEvent};

use crate::gpu::GpuState;
use crate::pointer::PointerState;
use crate::types::RendererConfig;

pub(crate) fn run(config: &RendererConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title("Duskshade")
        .with_inner_size(window_size)
        .build(&event_loop)
        .context("failed to create backdrop window")?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window.clone(), config)?;
    state.window().request_redraw();

    event_loop
        .run(move |event, elwt| {
            // Drive redraws via vblank by waiting between events.
            elwt.set_control_flow(ControlFlow::Wait);

            match event {
                Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                    match event {
                        WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                            state.shutdown();
                            elwt.exit();
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            state.pointer.handle_cursor_moved(position);
                        }
                        WindowEvent::MouseInput {
                            state: button_state,
                            button,
                            ..
                        } => {
                            if button == MouseButton::Left {
                                state.pointer.handle_button(button_state);
                                if button_state == ElementState::Pressed {
                                    state.toggle_realm();
                                }
                            }
                        }
                        WindowEvent::KeyboardInput { event, .. } => {
                            if event.state == ElementState::Pressed {
                                match event.logical_key {
                                    Key::Named(NamedKey::Escape) => {
                                        state.shutdown();
                                        elwt.exit();
                                    }
                                    Key::Character(ref text)
                                        if text.eq_ignore_ascii_case("t") =>
                                    {
                                        state.toggle_realm();
                                    }
                                    _ => {}
                                }
                            }
                        }
                        WindowEvent::Resized(new_size) => {
                            state.resize(new_size);
                        }
                        WindowEvent::ScaleFactorChanged {
                            mut inner_size_writer,
                            ..
                        } => {
                            // Keep the current logical size when the scale factor changes.
                            let _ = inner_size_writer.request_inner_size(state.size());
                        }
                        WindowEvent::RedrawRequested => match state.redraw() {
                            Ok(()) => {}
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                state.resize(state.size());
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                tracing::error!("surface out of memory; exiting");
                                state.shutdown();
                                elwt.exit();
                            }
                            Err(other) => {
                                tracing::warn!(error = ?other, "surface error; retrying next frame");
                            }
                        },
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    // Schedule the next frame once winit is about to wait for events again.
                    state.window().request_redraw();
                }
                _ => {}
            }
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}

/// Per-window state: GPU resources, pointer tracking, the realm coordinator
/// and its event feed, plus optional FPS pacing.
struct WindowState {
    window: Arc<Window>,
    gpu: GpuState,
    pointer: PointerState,
    coordinator: Coordinator,
    events: Receiver<RealmEvent>,
    target_interval: Option<Duration>,
    accumulator: Duration,
    last_tick: Option<Instant>,
}

impl WindowState {
    fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let size = window.inner_size();
        let gpu = GpuState::new(window.as_ref(), size, config)?;

        let mut coordinator =
            Coordinator::new(config.timings, config.curve, config.initial_mode);
        let events = coordinator.subscribe();

        let target_interval = config
            .target_fps
            .filter(|fps| *fps > 0.0)
            .map(|fps| Duration::from_secs_f32(1.0 / fps));
        if let Some(interval) = target_interval {
            tracing::info!(?interval, "frame pacing enabled");
        }

        Ok(Self {
            window,
            gpu,
            pointer: PointerState::new(size),
            coordinator,
            events,
            target_interval,
            accumulator: Duration::ZERO,
            last_tick: None,
        })
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
        self.pointer.resize(new_size);
    }

    fn toggle_realm(&mut self) {
        let now = Instant::now();
        if !self.coordinator.request_toggle(now) {
            tracing::debug!("toggle ignored; transition already in flight");
        }
    }

    /// One frame: advance the coordinator, apply any realm flip, then
    /// render unless the FPS cap skips this callback.
    fn redraw(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        self.coordinator.tick(now);

        while let Ok(event) = self.events.try_recv() {
            match event {
                RealmEvent::TransitionStarted { from, to } => {
                    tracing::info!(?from, ?to, "realm transition started");
                }
                RealmEvent::ModeChanged { mode } => {
                    self.gpu.apply_mode(mode);
                }
                RealmEvent::TransitionFinished { mode } => {
                    tracing::info!(?mode, "realm transition finished");
                }
            }
        }

        if !self.should_render(now) {
            return Ok(());
        }

        let overlay = self.coordinator.overlay(now);
        self.gpu
            .render_frame(now, self.pointer.frame(), overlay.as_ref())
    }

    /// FPS cap accounting; subtracts a single interval per rendered frame
    /// so long gaps never burst.
    fn should_render(&mut self, now: Instant) -> bool {
        let Some(interval) = self.target_interval else {
            return true;
        };

        let delta = self
            .last_tick
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last_tick = Some(now);
        self.accumulator = self.accumulator.saturating_add(delta);

        if self.accumulator + Duration::from_micros(250) < interval {
            false
        } else {
            self.accumulator = self.accumulator.saturating_sub(interval);
            true
        }
    }

    /// Teardown path shared by close, escape, and fatal surface errors:
    /// cancel pending realm deadlines and release the layer state.
    fn shutdown(&mut self) {
        self.coordinator.cancel();
        self.gpu.dispose();
    }
}
