use std::time::Instant;

use realm::OverlayFrame;

use crate::types::LayerProfile;
use crate::uniforms::{LayerUniforms, SPARKLE_COUNT};

/// How quickly the smoothed pointer chases the raw sample, per second.
/// Roughly equivalent to the per-frame lerp the layers were tuned against
/// at 60 Hz, but frame-rate independent.
const POINTER_CHASE_RATE: f32 = 8.0;

/// Latest raw input sample fed into a driver each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PointerFrame {
    /// Normalised position, 0..1 with a bottom-left origin, clamped to the
    /// viewport.
    pub position: [f32; 2],
    /// Hover target for the frame: 1.0 when the pointer rests on the orb.
    pub hover: f32,
    pub pressed: bool,
}

impl Default for PointerFrame {
    fn default() -> Self {
        Self {
            position: [0.5, 0.5],
            hover: 0.0,
            pressed: false,
        }
    }
}

/// Per-surface uniform state machine: `Uninitialized -> Running -> Disposed`.
///
/// Owns everything the fragment stage reads and nothing the GPU owns, so it
/// is exercised directly by tests. The owning pipeline uploads
/// [`UniformDriver::uniforms`] after every accepted [`UniformDriver::advance`].
pub(crate) struct UniformDriver {
    uniforms: LayerUniforms,
    profile: LayerProfile,
    time_acc: f32,
    last_tick: Option<Instant>,
    smoothed_position: [f32; 2],
    smoothed_hover: f32,
    disposed: bool,
    updates: u64,
}

impl UniformDriver {
    pub fn new(profile: LayerProfile, width: u32, height: u32) -> Self {
        let mut uniforms = LayerUniforms::new(width, height);
        uniforms.set_profile(&profile);
        Self {
            uniforms,
            profile,
            time_acc: 0.0,
            last_tick: None,
            smoothed_position: [0.5, 0.5],
            smoothed_hover: 0.0,
            disposed: false,
            updates: 0,
        }
    }

    /// Advances the accumulator by wall-clock delta scaled by the profile's
    /// speed, eases pointer and hover toward the latest sample, and writes
    /// the overlay state. Returns `false` without touching anything once
    /// disposed.
    pub fn advance(
        &mut self,
        now: Instant,
        pointer: PointerFrame,
        overlay: Option<&OverlayFrame>,
    ) -> bool {
        if self.disposed {
            return false;
        }

        let delta = match self.last_tick {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => 0.0,
        };
        self.last_tick = Some(now);
        self.time_acc += delta * self.profile.speed;

        let chase = 1.0 - (-POINTER_CHASE_RATE * delta).exp();
        for axis in 0..2 {
            self.smoothed_position[axis] +=
                (pointer.position[axis] - self.smoothed_position[axis]) * chase;
        }
        self.smoothed_hover += (pointer.hover - self.smoothed_hover) * chase;

        self.uniforms.set_time(self.time_acc, delta);
        self.uniforms
            .set_pointer(self.smoothed_position, self.smoothed_hover, pointer.pressed);
        self.uniforms.set_overlay(overlay);

        self.updates += 1;
        true
    }

    /// In-place realm swap: colours and shape parameters change, the clock
    /// and the smoothed pointer keep running.
    pub fn apply_profile(&mut self, profile: LayerProfile) {
        if self.disposed {
            return;
        }
        self.uniforms.set_profile(&profile);
        self.profile = profile;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.disposed {
            return;
        }
        self.uniforms.set_resolution(width, height);
    }

    pub fn set_sparkles(&mut self, attributes: &[[f32; 4]; SPARKLE_COUNT]) {
        self.uniforms.set_sparkles(attributes);
    }

    /// Terminal state; calling it again is a safe no-op.
    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn uniforms(&self) -> &LayerUniforms {
        &self.uniforms
    }

    pub fn time(&self) -> f32 {
        self.time_acc
    }

    #[cfg(test)]
    pub fn updates(&self) -> u64 {
        self.updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn profile(speed: f32) -> LayerProfile {
        LayerProfile {
            color_stops: [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6], [0.7, 0.8, 0.9]],
            speed,
            ..LayerProfile::default()
        }
    }

    #[test]
    fn time_advances_by_delta_times_speed() {
        let mut driver = UniformDriver::new(profile(0.5), 800, 600);
        let t0 = Instant::now();
        driver.advance(t0, PointerFrame::default(), None);
        driver.advance(t0 + Duration::from_secs(2), PointerFrame::default(), None);
        assert!((driver.time() - 1.0).abs() < 1e-4);
        assert!((driver.uniforms().motion[0] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn first_advance_has_no_delta() {
        let mut driver = UniformDriver::new(profile(2.0), 800, 600);
        driver.advance(Instant::now(), PointerFrame::default(), None);
        assert_eq!(driver.time(), 0.0);
    }

    #[test]
    fn pointer_eases_toward_the_sample_without_snapping() {
        let mut driver = UniformDriver::new(profile(1.0), 800, 600);
        let t0 = Instant::now();
        driver.advance(t0, PointerFrame::default(), None);

        let sample = PointerFrame {
            position: [1.0, 0.0],
            hover: 1.0,
            pressed: false,
        };
        driver.advance(t0 + Duration::from_millis(16), sample, None);
        let first = driver.uniforms().pointer;
        assert!(first[0] > 0.5 && first[0] < 1.0, "got {first:?}");
        assert!(first[2] > 0.0 && first[2] < 1.0);

        let mut now = t0 + Duration::from_millis(16);
        for _ in 0..600 {
            now += Duration::from_millis(16);
            driver.advance(now, sample, None);
        }
        let settled = driver.uniforms().pointer;
        assert!((settled[0] - 1.0).abs() < 1e-3);
        assert!((settled[2] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn realm_swap_keeps_the_clock_running() {
        let mut driver = UniformDriver::new(profile(1.0), 800, 600);
        let t0 = Instant::now();
        driver.advance(t0, PointerFrame::default(), None);
        driver.advance(t0 + Duration::from_secs(3), PointerFrame::default(), None);
        assert!((driver.time() - 3.0).abs() < 1e-4);

        let mut swapped = profile(1.0);
        swapped.color_stops = [[1.0; 3]; 3];
        swapped.warp_strength = 0.4;
        driver.apply_profile(swapped);

        assert!((driver.uniforms().motion[0] - 3.0).abs() < 1e-4);
        assert_eq!(driver.uniforms().color_a[0], 1.0);
        assert_eq!(driver.uniforms().motion[3], 0.4);
    }

    #[test]
    fn resize_is_idempotent() {
        let mut driver = UniformDriver::new(profile(1.0), 1024, 768);
        driver.resize(512, 384);
        let once = *driver.uniforms();
        driver.resize(512, 384);
        assert_eq!(once, *driver.uniforms());
    }

    #[test]
    fn halving_the_surface_shows_up_next_frame() {
        let mut driver = UniformDriver::new(profile(1.0), 1024, 768);
        let t0 = Instant::now();
        driver.advance(t0, PointerFrame::default(), None);

        driver.resize(512, 384);
        assert!(driver.advance(
            t0 + Duration::from_millis(16),
            PointerFrame::default(),
            None
        ));
        assert_eq!(driver.uniforms().resolution[0], 512.0);
        assert_eq!(driver.uniforms().resolution[1], 384.0);
    }

    #[test]
    fn dispose_freezes_the_driver() {
        let mut driver = UniformDriver::new(profile(1.0), 800, 600);
        let t0 = Instant::now();
        driver.advance(t0, PointerFrame::default(), None);
        assert_eq!(driver.updates(), 1);

        driver.dispose();
        driver.dispose();
        assert!(driver.is_disposed());

        let before = *driver.uniforms();
        assert!(!driver.advance(
            t0 + Duration::from_secs(1),
            PointerFrame {
                position: [0.0, 0.0],
                hover: 1.0,
                pressed: true,
            },
            None
        ));
        driver.resize(64, 64);
        driver.apply_profile(profile(9.0));

        assert_eq!(driver.updates(), 1);
        assert_eq!(before, *driver.uniforms());
    }
}
