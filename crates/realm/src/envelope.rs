use std::time::Duration;

use crate::{CoverTint, RealmTimings};

/// Easing applied to the overlay's expansion and fade-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionCurve {
    Linear,
    Smoothstep,
    #[default]
    EaseInOut,
}

impl TransitionCurve {
    pub fn sample(self, t: f32) -> f32 {
        let clamped = t.clamp(0.0, 1.0);
        match self {
            TransitionCurve::Linear => clamped,
            TransitionCurve::Smoothstep => clamped * clamped * (3.0 - 2.0 * clamped),
            TransitionCurve::EaseInOut => {
                if clamped < 0.5 {
                    2.0 * clamped * clamped
                } else {
                    -1.0 + (4.0 - 2.0 * clamped) * clamped
                }
            }
        }
    }
}

/// One sampled frame of the transition overlay.
///
/// `expansion` grows 0..1 over the expand window and holds at 1 while the
/// swap settles underneath; `fade` drops 1..0 across the settle window;
/// `flash` is the brief white pulse layered on top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayFrame {
    pub expansion: f32,
    pub flash: f32,
    pub fade: f32,
    pub tint: CoverTint,
}

const FLASH_SWEEP: Duration = Duration::from_millis(1200);
const FLASH_PEAK_FRACTION: f32 = 0.4;
const FLASH_PEAK_ALPHA: f32 = 0.7;

pub fn overlay_frame(
    elapsed: Duration,
    timings: RealmTimings,
    curve: TransitionCurve,
    tint: CoverTint,
) -> OverlayFrame {
    let expand = timings.expand().as_secs_f32().max(f32::EPSILON);
    let settle = timings.settle().as_secs_f32();
    let t = elapsed.as_secs_f32();

    let expansion = curve.sample(t / expand);

    let fade = if t <= expand {
        1.0
    } else {
        let tail = (settle - expand).max(f32::EPSILON);
        1.0 - curve.sample((t - expand) / tail)
    };

    OverlayFrame {
        expansion,
        flash: flash_alpha(t),
        fade,
        tint,
    }
}

fn flash_alpha(t: f32) -> f32 {
    let sweep = FLASH_SWEEP.as_secs_f32();
    let progress = (t / sweep).clamp(0.0, 1.0);
    if progress < FLASH_PEAK_FRACTION {
        FLASH_PEAK_ALPHA * progress / FLASH_PEAK_FRACTION
    } else {
        FLASH_PEAK_ALPHA * (1.0 - progress) / (1.0 - FLASH_PEAK_FRACTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn curves_hit_their_endpoints() {
        for curve in [
            TransitionCurve::Linear,
            TransitionCurve::Smoothstep,
            TransitionCurve::EaseInOut,
        ] {
            assert!((curve.sample(0.0) - 0.0).abs() < 1e-6);
            assert!((curve.sample(1.0) - 1.0).abs() < 1e-6);
            assert!((curve.sample(-2.0) - 0.0).abs() < 1e-6);
            assert!((curve.sample(5.0) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn curves_increase_monotonically() {
        for curve in [
            TransitionCurve::Linear,
            TransitionCurve::Smoothstep,
            TransitionCurve::EaseInOut,
        ] {
            let mut last = 0.0;
            for step in 0..=20 {
                let sample = curve.sample(step as f32 / 20.0);
                assert!(sample >= last - f32::EPSILON);
                last = sample;
            }
        }
    }

    #[test]
    fn expansion_reaches_full_cover_at_the_flip() {
        let timings = RealmTimings::default();
        let frame = overlay_frame(
            ms(850),
            timings,
            TransitionCurve::Linear,
            CoverTint::Light,
        );
        assert!((frame.expansion - 1.0).abs() < 1e-6);
        assert!((frame.fade - 1.0).abs() < 1e-6);

        let later = overlay_frame(
            ms(1200),
            timings,
            TransitionCurve::Linear,
            CoverTint::Light,
        );
        assert!((later.expansion - 1.0).abs() < 1e-6);
        assert!(later.fade < 1.0);
    }

    #[test]
    fn fade_runs_out_by_the_settle_deadline() {
        let timings = RealmTimings::default();
        let frame = overlay_frame(
            ms(1800),
            timings,
            TransitionCurve::Linear,
            CoverTint::Dark,
        );
        assert!(frame.fade.abs() < 1e-6);
    }

    #[test]
    fn flash_peaks_partway_then_decays() {
        let rising = flash_alpha(0.24);
        let peak = flash_alpha(0.48);
        let falling = flash_alpha(0.9);
        assert!(rising < peak);
        assert!(falling < peak);
        assert!((peak - FLASH_PEAK_ALPHA).abs() < 1e-5);
        assert!(flash_alpha(0.0).abs() < 1e-6);
        assert!(flash_alpha(1.2).abs() < 1e-6);
    }
}
