//! Renderer crate for duskshade.
//!
//! Glues the winit window, the `wgpu` layer pipelines, and the realm
//! coordinator together. The overall flow is:
//!
//! ```text
//!   CLI / duskshade
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ WindowState ──▶ winit event loop ──▶ render_frame()
//!          ▲                │                  │
//!          │                │ click / key      └─▶ UniformDriver::advance ─▶ GPU UBO
//!          │                ▼
//!          │        realm::Coordinator ── ModeChanged ──▶ apply_mode()
//! ```
//!
//! `GpuState` owns all GPU resources (surface, device, per-layer pipelines
//! and uniform buffers), while each layer's CPU-side uniform state lives in
//! a `UniformDriver` that tests exercise without a GPU.
//! The realm coordinator is ticked once per frame; when its mode flips, the
//! layers swap palettes in place and keep their clocks running.

mod compile;
mod driver;
mod gpu;
mod pointer;
mod shaders;
mod sparkle;
mod types;
mod uniforms;
mod window;

pub use types::{Antialiasing, LayerKind, LayerProfile, LayerSettings, RendererConfig};

use anyhow::Result;

/// High-level entry point that owns the chosen configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    /// Builds a renderer for the supplied configuration.
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the backdrop window and drives the event loop until the user
    /// closes it. Returns an error when no GPU surface can be acquired.
    pub fn run(&mut self) -> Result<()> {
        window::run(&self.config)
    }
}
