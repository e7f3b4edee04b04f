use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};

mod envelope;

pub use envelope::{overlay_frame, OverlayFrame, TransitionCurve};

#[derive(Debug, thiserror::Error)]
pub enum RealmError {
    #[error("invalid transition timings: {0}")]
    InvalidTimings(String),
}

/// The two visual realms. Every consumer reads this; only the
/// [`Coordinator`] writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RealmMode {
    #[default]
    Dark,
    Light,
}

impl RealmMode {
    pub fn opposite(self) -> Self {
        match self {
            RealmMode::Dark => RealmMode::Light,
            RealmMode::Light => RealmMode::Dark,
        }
    }
}

/// Colour class of the expansion overlay. Leaving Dark covers the window
/// with light, leaving Light covers it with dark, so the reveal lands on
/// the correct side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverTint {
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Idle,
    Expanding,
    Settling,
}

/// Deadlines for the two-stage transition, both measured from the trigger.
/// The mode flips at `expand`; the transition clears at `settle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealmTimings {
    expand: Duration,
    settle: Duration,
}

impl RealmTimings {
    pub const DEFAULT_EXPAND: Duration = Duration::from_millis(850);
    pub const DEFAULT_SETTLE: Duration = Duration::from_millis(1800);

    /// Builds validated timings. The flip must land strictly inside the
    /// transition window, so `0 < expand < settle` is required.
    pub fn new(expand: Duration, settle: Duration) -> Result<Self, RealmError> {
        if expand.is_zero() {
            return Err(RealmError::InvalidTimings(
                "expand duration must be greater than zero".into(),
            ));
        }
        if expand >= settle {
            return Err(RealmError::InvalidTimings(format!(
                "expand ({expand:?}) must be shorter than settle ({settle:?})"
            )));
        }
        Ok(Self { expand, settle })
    }

    pub fn expand(&self) -> Duration {
        self.expand
    }

    pub fn settle(&self) -> Duration {
        self.settle
    }
}

impl Default for RealmTimings {
    fn default() -> Self {
        Self {
            expand: Self::DEFAULT_EXPAND,
            settle: Self::DEFAULT_SETTLE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealmEvent {
    TransitionStarted { from: RealmMode, to: RealmMode },
    ModeChanged { mode: RealmMode },
    TransitionFinished { mode: RealmMode },
}

const MODE_LIGHT_BIT: u8 = 0b01;
const TRANSITIONING_BIT: u8 = 0b10;

/// Cloneable, lock-free view of the coordinator state for collaborators
/// that only need to branch on the current realm (audio cues, styling).
#[derive(Debug, Clone)]
pub struct RealmHandle {
    shared: Arc<AtomicU8>,
}

impl RealmHandle {
    pub fn mode(&self) -> RealmMode {
        if self.shared.load(Ordering::Acquire) & MODE_LIGHT_BIT != 0 {
            RealmMode::Light
        } else {
            RealmMode::Dark
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.shared.load(Ordering::Acquire) & TRANSITIONING_BIT != 0
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveTransition {
    requested_at: Instant,
    target: RealmMode,
    tint: CoverTint,
}

/// Owns the realm mode and the transition state machine.
///
/// The machine is advanced explicitly through [`Coordinator::tick`] with a
/// caller-supplied clock, so deadlines cannot fire against a torn-down
/// owner and tests drive it with synthetic instants. Phases run
/// `Idle -> Expanding -> Settling -> Idle`; the mode flips exactly once per
/// accepted toggle, at the expand deadline.
pub struct Coordinator {
    mode: RealmMode,
    phase: TransitionPhase,
    active: Option<ActiveTransition>,
    timings: RealmTimings,
    curve: TransitionCurve,
    shared: Arc<AtomicU8>,
    subscribers: Vec<Sender<RealmEvent>>,
}

impl Coordinator {
    pub fn new(timings: RealmTimings, curve: TransitionCurve, initial: RealmMode) -> Self {
        let coordinator = Self {
            mode: initial,
            phase: TransitionPhase::Idle,
            active: None,
            timings,
            curve,
            shared: Arc::new(AtomicU8::new(0)),
            subscribers: Vec::new(),
        };
        coordinator.publish_shared();
        coordinator
    }

    pub fn mode(&self) -> RealmMode {
        self.mode
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    pub fn is_transitioning(&self) -> bool {
        self.active.is_some()
    }

    pub fn timings(&self) -> RealmTimings {
        self.timings
    }

    pub fn handle(&self) -> RealmHandle {
        RealmHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Registers a subscriber. Receivers that disconnect are pruned on the
    /// next broadcast; a slow subscriber never blocks the coordinator.
    pub fn subscribe(&mut self) -> Receiver<RealmEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Requests a realm toggle. A request while a transition is in flight
    /// is ignored and returns `false`; repeated clicks produce one coherent
    /// transition to the opposite mode.
    pub fn request_toggle(&mut self, now: Instant) -> bool {
        if self.active.is_some() {
            return false;
        }

        let target = self.mode.opposite();
        let tint = match self.mode {
            RealmMode::Dark => CoverTint::Light,
            RealmMode::Light => CoverTint::Dark,
        };
        self.active = Some(ActiveTransition {
            requested_at: now,
            target,
            tint,
        });
        self.phase = TransitionPhase::Expanding;
        self.publish_shared();
        self.broadcast(RealmEvent::TransitionStarted {
            from: self.mode,
            to: target,
        });
        true
    }

    /// Advances the machine to `now`. A single call may cross both
    /// deadlines when the clock jumped past them.
    pub fn tick(&mut self, now: Instant) {
        let Some(active) = self.active else {
            return;
        };

        if self.phase == TransitionPhase::Expanding
            && now >= active.requested_at + self.timings.expand
        {
            self.mode = active.target;
            self.phase = TransitionPhase::Settling;
            self.publish_shared();
            self.broadcast(RealmEvent::ModeChanged { mode: self.mode });
        }

        if self.phase == TransitionPhase::Settling
            && now >= active.requested_at + self.timings.settle
        {
            self.phase = TransitionPhase::Idle;
            self.active = None;
            self.publish_shared();
            self.broadcast(RealmEvent::TransitionFinished { mode: self.mode });
        }
    }

    /// Samples the expansion overlay for the current instant. `None` while
    /// idle.
    pub fn overlay(&self, now: Instant) -> Option<OverlayFrame> {
        let active = self.active?;
        let elapsed = now.saturating_duration_since(active.requested_at);
        Some(overlay_frame(
            elapsed,
            self.timings,
            self.curve,
            active.tint,
        ))
    }

    /// Abandons any in-flight transition without emitting events. Intended
    /// for teardown so no pending deadline acts on stale state.
    pub fn cancel(&mut self) {
        self.active = None;
        self.phase = TransitionPhase::Idle;
        self.publish_shared();
    }

    fn publish_shared(&self) {
        let mut bits = 0u8;
        if self.mode == RealmMode::Light {
            bits |= MODE_LIGHT_BIT;
        }
        if self.active.is_some() {
            bits |= TRANSITIONING_BIT;
        }
        self.shared.store(bits, Ordering::Release);
    }

    fn broadcast(&mut self, event: RealmEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator() -> Coordinator {
        Coordinator::new(
            RealmTimings::default(),
            TransitionCurve::EaseInOut,
            RealmMode::Dark,
        )
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn rejects_inverted_timings() {
        assert!(RealmTimings::new(ms(1800), ms(850)).is_err());
        assert!(RealmTimings::new(ms(850), ms(850)).is_err());
        assert!(RealmTimings::new(Duration::ZERO, ms(850)).is_err());
        assert!(RealmTimings::new(ms(850), ms(1800)).is_ok());
    }

    #[test]
    fn mode_flips_once_inside_the_window() {
        let mut coordinator = coordinator();
        let t0 = Instant::now();
        assert!(coordinator.request_toggle(t0));

        coordinator.tick(t0 + ms(800));
        assert_eq!(coordinator.mode(), RealmMode::Dark);
        assert!(coordinator.is_transitioning());

        coordinator.tick(t0 + ms(900));
        assert_eq!(coordinator.mode(), RealmMode::Light);
        assert!(coordinator.is_transitioning());

        coordinator.tick(t0 + ms(1900));
        assert_eq!(coordinator.mode(), RealmMode::Light);
        assert!(!coordinator.is_transitioning());
    }

    #[test]
    fn transition_window_is_half_open() {
        let mut coordinator = coordinator();
        let t0 = Instant::now();
        coordinator.request_toggle(t0);
        assert!(coordinator.is_transitioning());

        coordinator.tick(t0 + ms(1799));
        assert!(coordinator.is_transitioning());

        coordinator.tick(t0 + ms(1800));
        assert!(!coordinator.is_transitioning());
    }

    #[test]
    fn flip_lands_exactly_at_the_expand_deadline() {
        let mut coordinator = coordinator();
        let t0 = Instant::now();
        coordinator.request_toggle(t0);

        coordinator.tick(t0 + ms(849));
        assert_eq!(coordinator.mode(), RealmMode::Dark);

        coordinator.tick(t0 + ms(850));
        assert_eq!(coordinator.mode(), RealmMode::Light);
        assert_eq!(coordinator.phase(), TransitionPhase::Settling);
    }

    #[test]
    fn rapid_second_toggle_is_ignored() {
        let mut coordinator = coordinator();
        let t0 = Instant::now();
        assert!(coordinator.request_toggle(t0));
        assert!(!coordinator.request_toggle(t0 + ms(100)));

        coordinator.tick(t0 + ms(2000));
        assert_eq!(coordinator.mode(), RealmMode::Light);
        assert!(!coordinator.is_transitioning());
    }

    #[test]
    fn settled_toggles_form_an_involution() {
        let mut coordinator = coordinator();
        let mut now = Instant::now();
        for _ in 0..4 {
            assert!(coordinator.request_toggle(now));
            now += ms(2000);
            coordinator.tick(now);
        }
        assert_eq!(coordinator.mode(), RealmMode::Dark);

        assert!(coordinator.request_toggle(now));
        coordinator.tick(now + ms(2000));
        assert_eq!(coordinator.mode(), RealmMode::Light);
    }

    #[test]
    fn one_late_tick_crosses_both_deadlines() {
        let mut coordinator = coordinator();
        let t0 = Instant::now();
        coordinator.request_toggle(t0);

        let mut events = Vec::new();
        // Subscribed after the trigger, so only the flip and the finish
        // should arrive.
        let rx = coordinator.subscribe();
        coordinator.tick(t0 + ms(5000));
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }

        assert_eq!(
            events,
            vec![
                RealmEvent::ModeChanged {
                    mode: RealmMode::Light
                },
                RealmEvent::TransitionFinished {
                    mode: RealmMode::Light
                },
            ]
        );
    }

    #[test]
    fn stale_tick_before_the_trigger_is_a_noop() {
        let mut coordinator = coordinator();
        let t0 = Instant::now();
        coordinator.request_toggle(t0 + ms(500));
        coordinator.tick(t0);
        assert_eq!(coordinator.mode(), RealmMode::Dark);
        assert_eq!(coordinator.phase(), TransitionPhase::Expanding);
    }

    #[test]
    fn handle_tracks_mode_and_transition_flag() {
        let mut coordinator = coordinator();
        let handle = coordinator.handle();
        assert_eq!(handle.mode(), RealmMode::Dark);
        assert!(!handle.is_transitioning());

        let t0 = Instant::now();
        coordinator.request_toggle(t0);
        assert!(handle.is_transitioning());

        coordinator.tick(t0 + ms(900));
        assert_eq!(handle.mode(), RealmMode::Light);

        coordinator.tick(t0 + ms(1900));
        assert!(!handle.is_transitioning());
    }

    #[test]
    fn cancel_clears_pending_deadlines_silently() {
        let mut coordinator = coordinator();
        let rx = coordinator.subscribe();
        let t0 = Instant::now();
        coordinator.request_toggle(t0);
        let _ = rx.try_recv();

        coordinator.cancel();
        coordinator.tick(t0 + ms(5000));
        assert_eq!(coordinator.mode(), RealmMode::Dark);
        assert!(rx.try_recv().is_err());
        assert!(coordinator.overlay(t0 + ms(100)).is_none());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut coordinator = coordinator();
        let rx = coordinator.subscribe();
        drop(rx);
        let kept = coordinator.subscribe();

        coordinator.request_toggle(Instant::now());
        assert_eq!(coordinator.subscribers.len(), 1);
        assert!(matches!(
            kept.try_recv(),
            Ok(RealmEvent::TransitionStarted { .. })
        ));
    }

    #[test]
    fn cover_tint_comes_from_the_pre_flip_mode() {
        let mut coordinator = coordinator();
        let t0 = Instant::now();
        coordinator.request_toggle(t0);
        let frame = coordinator.overlay(t0 + ms(100)).expect("overlay frame");
        assert_eq!(frame.tint, CoverTint::Light);

        coordinator.tick(t0 + ms(2000));
        coordinator.request_toggle(t0 + ms(2000));
        let frame = coordinator
            .overlay(t0 + ms(2100))
            .expect("overlay frame");
        assert_eq!(frame.tint, CoverTint::Dark);
    }
}
