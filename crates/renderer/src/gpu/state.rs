use std::time::Instant;

use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use realm::{OverlayFrame, RealmMode};

use super::context::GpuContext;
use super::pipeline::{LayerPipeline, PipelineLayouts};
use crate::driver::{PointerFrame, UniformDriver};
use crate::shaders;
use crate::sparkle;
use crate::types::{LayerKind, LayerSettings, RendererConfig};

struct LayerSlot {
    settings: LayerSettings,
    driver: UniformDriver,
    pipeline: LayerPipeline,
    active: bool,
}

struct OverlaySlot {
    driver: UniformDriver,
    pipeline: LayerPipeline,
}

struct MultisampleTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl MultisampleTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("duskshade msaa color"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// Aggregates every GPU resource needed to present a frame.
///
/// One uniform driver + pipeline pair per layer, drawn back-to-front, with
/// the transition overlay on top. A layer whose fragment fails to build is
/// dropped with a warning; the rest of the backdrop keeps running.
pub(crate) struct GpuState {
    context: GpuContext,
    multisample_target: Option<MultisampleTarget>,
    layers: Vec<LayerSlot>,
    overlay: Option<OverlaySlot>,
    disposed: bool,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        config: &RendererConfig,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size, config.antialiasing)?;
        let layouts = PipelineLayouts::new(&context.device);

        let mut layers = Vec::with_capacity(config.layers.len());
        for settings in &config.layers {
            let profile = settings.profile(config.initial_mode).clone();
            let mut driver = UniformDriver::new(profile, context.size.width, context.size.height);
            if settings.kind == LayerKind::Sparkles {
                driver.set_sparkles(&sparkle::generate(settings.seed));
            }

            let source = shaders::layer_fragment(settings.kind);
            match LayerPipeline::new(
                &context.device,
                &layouts,
                context.surface_format,
                context.sample_count,
                settings.kind.name(),
                &source,
                driver.uniforms(),
            ) {
                Ok(pipeline) => {
                    let active = settings.kind.active_in(config.initial_mode);
                    layers.push(LayerSlot {
                        settings: settings.clone(),
                        driver,
                        pipeline,
                        active,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        layer = settings.kind.name(),
                        error = %err,
                        "layer pipeline failed to build; continuing without it"
                    );
                }
            }
        }

        let overlay_driver = UniformDriver::new(
            Default::default(),
            context.size.width,
            context.size.height,
        );
        let overlay = match LayerPipeline::new(
            &context.device,
            &layouts,
            context.surface_format,
            context.sample_count,
            "transition overlay",
            &shaders::overlay_fragment(),
            overlay_driver.uniforms(),
        ) {
            Ok(pipeline) => Some(OverlaySlot {
                driver: overlay_driver,
                pipeline,
            }),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "transition overlay failed to build; realm flips will be unconcealed"
                );
                None
            }
        };

        let multisample_target = if context.sample_count > 1 {
            Some(MultisampleTarget::new(
                &context.device,
                context.surface_format,
                context.size,
                context.sample_count,
            ))
        } else {
            None
        };

        tracing::info!(
            layers = layers.len(),
            overlay = overlay.is_some(),
            "built backdrop pipelines"
        );

        Ok(Self {
            context,
            multisample_target,
            layers,
            overlay,
            disposed: false,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    /// Reconfigures the swapchain and every layer's resolution uniform. The
    /// previous multisample buffer is replaced, not leaked.
    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if self.disposed || !self.context.resize(new_size) {
            return;
        }

        self.multisample_target = if self.context.sample_count > 1 {
            Some(MultisampleTarget::new(
                &self.context.device,
                self.context.surface_format,
                new_size,
                self.context.sample_count,
            ))
        } else {
            None
        };

        for slot in &mut self.layers {
            slot.driver.resize(new_size.width, new_size.height);
        }
        if let Some(overlay) = &mut self.overlay {
            overlay.driver.resize(new_size.width, new_size.height);
        }
    }

    /// In-place realm swap across every layer: palette and parameter
    /// uniforms change, time accumulators keep running, and realm-gated
    /// layers toggle their activity.
    pub(crate) fn apply_mode(&mut self, mode: RealmMode) {
        for slot in &mut self.layers {
            slot.driver
                .apply_profile(slot.settings.profile(mode).clone());
            slot.active = slot.settings.kind.active_in(mode);
        }
        tracing::debug!(?mode, "applied realm profiles");
    }

    /// Advances every active driver, uploads uniforms, and submits one
    /// frame. Returns surface errors to the event loop's policy.
    pub(crate) fn render_frame(
        &mut self,
        now: Instant,
        pointer: PointerFrame,
        overlay_frame: Option<&OverlayFrame>,
    ) -> Result<(), wgpu::SurfaceError> {
        if self.disposed {
            return Ok(());
        }

        for slot in &mut self.layers {
            if slot.active && slot.driver.advance(now, pointer, overlay_frame) {
                slot.pipeline.upload(&self.context.queue, slot.driver.uniforms());
            }
        }
        let draw_overlay = overlay_frame.is_some();
        if let Some(overlay) = &mut self.overlay {
            if draw_overlay && overlay.driver.advance(now, pointer, overlay_frame) {
                overlay
                    .pipeline
                    .upload(&self.context.queue, overlay.driver.uniforms());
            }
        }

        let frame = self.context.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("backdrop encoder"),
                });

        let (attachment_view, resolve_target) = match &self.multisample_target {
            Some(msaa) => (&msaa.view, Some(&view)),
            None => (&view, None),
        };

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("backdrop pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment_view,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            for slot in &self.layers {
                if slot.active {
                    slot.pipeline.draw(&mut render_pass);
                }
            }
            if draw_overlay {
                if let Some(overlay) = &self.overlay {
                    overlay.pipeline.draw(&mut render_pass);
                }
            }
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Releases the per-layer state. Safe to call more than once; after the
    /// first call no driver accepts further updates.
    pub(crate) fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        for slot in &mut self.layers {
            slot.driver.dispose();
        }
        if let Some(overlay) = &mut self.overlay {
            overlay.driver.dispose();
        }
        self.layers.clear();
        self.overlay = None;
        self.multisample_target = None;
        self.disposed = true;
        tracing::debug!("disposed GPU layer state");
    }
}
