use bytemuck::{Pod, Zeroable};

use realm::{CoverTint, OverlayFrame};

use crate::types::LayerProfile;

/// Number of scatter slots in the uniform block. Must match the array size
/// declared in the GLSL prelude.
pub(crate) const SPARKLE_COUNT: usize = 24;

/// CPU-side mirror of the layer uniform block.
///
/// The block is deliberately all-vec4 so std140 adds no hidden padding;
/// the layout must match the `LayerParams` declaration in `shaders.rs`.
#[repr(C, align(16))]
#[derive(Clone, Copy, PartialEq, Debug)]
pub(crate) struct LayerUniforms {
    /// width, height, aspect, unused
    pub resolution: [f32; 4],
    /// rgb = colour stop 0, a = layer opacity
    pub color_a: [f32; 4],
    /// rgb = colour stop 1
    pub color_b: [f32; 4],
    /// rgb = colour stop 2
    pub color_c: [f32; 4],
    /// xy = smoothed pointer (0..1, bottom-left origin), z = hover, w = pressed
    pub pointer: [f32; 4],
    /// x = accumulated time, y = frame delta, z = frequency, w = warp strength
    pub motion: [f32; 4],
    /// x = scale, y = pointer influence, z = parallax, w = grain amount
    pub shape: [f32; 4],
    /// x = expansion, y = flash, z = tint (0 dark / 1 light), w = fade
    pub overlay: [f32; 4],
    /// xy = position (0..1), z = base radius, w = pulse phase
    pub sparkle: [[f32; 4]; SPARKLE_COUNT],
}

unsafe impl Zeroable for LayerUniforms {}
unsafe impl Pod for LayerUniforms {}

impl LayerUniforms {
    pub fn new(width: u32, height: u32) -> Self {
        let mut uniforms = Self {
            resolution: [0.0; 4],
            color_a: [0.0, 0.0, 0.0, 1.0],
            color_b: [0.0; 4],
            color_c: [0.0; 4],
            pointer: [0.5, 0.5, 0.0, 0.0],
            motion: [0.0; 4],
            shape: [1.0, 0.0, 0.0, 0.0],
            overlay: [0.0; 4],
            sparkle: [[0.0; 4]; SPARKLE_COUNT],
        };
        uniforms.set_resolution(width, height);
        uniforms
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) {
        let width = width.max(1) as f32;
        let height = height.max(1) as f32;
        self.resolution = [width, height, width / height, 0.0];
    }

    /// Writes the palette and shape parameters of a profile. Everything
    /// time-dependent is left alone so a realm swap never rewinds a layer.
    pub fn set_profile(&mut self, profile: &LayerProfile) {
        let [a, b, c] = profile.color_stops;
        self.color_a = [a[0], a[1], a[2], profile.opacity];
        self.color_b = [b[0], b[1], b[2], 0.0];
        self.color_c = [c[0], c[1], c[2], 0.0];
        self.motion[2] = profile.frequency;
        self.motion[3] = profile.warp_strength;
        self.shape = [
            profile.scale,
            profile.mouse_influence,
            profile.parallax,
            profile.noise_amount,
        ];
    }

    pub fn set_time(&mut self, time: f32, delta: f32) {
        self.motion[0] = time;
        self.motion[1] = delta;
    }

    pub fn set_pointer(&mut self, position: [f32; 2], hover: f32, pressed: bool) {
        self.pointer = [
            position[0],
            position[1],
            hover,
            if pressed { 1.0 } else { 0.0 },
        ];
    }

    pub fn set_overlay(&mut self, frame: Option<&OverlayFrame>) {
        self.overlay = match frame {
            Some(frame) => [
                frame.expansion,
                frame.flash,
                match frame.tint {
                    CoverTint::Dark => 0.0,
                    CoverTint::Light => 1.0,
                },
                frame.fade,
            ],
            None => [0.0; 4],
        };
    }

    pub fn set_sparkles(&mut self, attributes: &[[f32; 4]; SPARKLE_COUNT]) {
        self.sparkle = *attributes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_carries_aspect() {
        let uniforms = LayerUniforms::new(1600, 800);
        assert_eq!(uniforms.resolution[0], 1600.0);
        assert_eq!(uniforms.resolution[1], 800.0);
        assert_eq!(uniforms.resolution[2], 2.0);
    }

    #[test]
    fn zero_dimensions_are_clamped() {
        let mut uniforms = LayerUniforms::new(0, 0);
        assert_eq!(uniforms.resolution[0], 1.0);
        uniforms.set_resolution(0, 4);
        assert_eq!(uniforms.resolution[1], 4.0);
    }

    #[test]
    fn profile_swap_preserves_time() {
        let mut uniforms = LayerUniforms::new(800, 600);
        uniforms.set_time(12.5, 0.016);

        let profile = LayerProfile {
            color_stops: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            frequency: 0.4,
            warp_strength: 1.5,
            opacity: 0.8,
            ..LayerProfile::default()
        };
        uniforms.set_profile(&profile);

        assert_eq!(uniforms.motion[0], 12.5);
        assert_eq!(uniforms.motion[1], 0.016);
        assert_eq!(uniforms.motion[2], 0.4);
        assert_eq!(uniforms.motion[3], 1.5);
        assert_eq!(uniforms.color_a, [1.0, 0.0, 0.0, 0.8]);
    }

    #[test]
    fn overlay_clears_to_zero() {
        let mut uniforms = LayerUniforms::new(800, 600);
        uniforms.set_overlay(Some(&OverlayFrame {
            expansion: 0.5,
            flash: 0.2,
            fade: 1.0,
            tint: CoverTint::Light,
        }));
        assert_eq!(uniforms.overlay, [0.5, 0.2, 1.0, 1.0]);

        uniforms.set_overlay(None);
        assert_eq!(uniforms.overlay, [0.0; 4]);
    }
}
