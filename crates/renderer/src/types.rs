use realm::{RealmMode, RealmTimings, TransitionCurve};

/// Anti-aliasing policy for the render pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

impl Default for Antialiasing {
    fn default() -> Self {
        Self::Auto
    }
}

/// The shader layers composited into the backdrop, in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Field,
    Aurora,
    Sparkles,
    Orb,
}

impl LayerKind {
    pub const ORDERED: [LayerKind; 4] = [
        LayerKind::Field,
        LayerKind::Aurora,
        LayerKind::Sparkles,
        LayerKind::Orb,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Field => "field",
            LayerKind::Aurora => "aurora",
            LayerKind::Sparkles => "sparkles",
            LayerKind::Orb => "orb",
        }
    }

    /// The sparkle field only belongs to the Light realm; every other layer
    /// draws in both.
    pub fn active_in(self, mode: RealmMode) -> bool {
        match self {
            LayerKind::Sparkles => mode == RealmMode::Light,
            _ => true,
        }
    }
}

/// Appearance of one layer within one realm. Swapped in place on a realm
/// flip; the layer's running clock is untouched by the swap.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerProfile {
    pub color_stops: [[f32; 3]; 3],
    pub speed: f32,
    pub scale: f32,
    pub frequency: f32,
    pub warp_strength: f32,
    pub mouse_influence: f32,
    pub parallax: f32,
    pub noise_amount: f32,
    pub opacity: f32,
}

impl Default for LayerProfile {
    fn default() -> Self {
        Self {
            color_stops: [[0.0; 3]; 3],
            speed: 1.0,
            scale: 1.0,
            frequency: 1.0,
            warp_strength: 0.0,
            mouse_influence: 0.0,
            parallax: 0.0,
            noise_amount: 0.0,
            opacity: 1.0,
        }
    }
}

/// One layer's realm pair plus its scatter seed.
#[derive(Debug, Clone)]
pub struct LayerSettings {
    pub kind: LayerKind,
    pub dark: LayerProfile,
    pub light: LayerProfile,
    pub seed: u64,
}

impl LayerSettings {
    pub fn profile(&self, mode: RealmMode) -> &LayerProfile {
        match mode {
            RealmMode::Dark => &self.dark,
            RealmMode::Light => &self.light,
        }
    }
}

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` mirrors the CLI/config file and tells the renderer how
/// large the window should be, which layers to build, and how the realm
/// transition is timed.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Optional FPS cap; None = render every callback.
    pub target_fps: Option<f32>,
    /// Anti-aliasing mode requested by the caller.
    pub antialiasing: Antialiasing,
    /// Realm the backdrop starts in.
    pub initial_mode: RealmMode,
    /// Transition deadlines handed to the coordinator.
    pub timings: RealmTimings,
    /// Easing applied to the transition overlay.
    pub curve: TransitionCurve,
    /// Layers to build, already filtered to the enabled set.
    pub layers: Vec<LayerSettings>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1280, 800),
            target_fps: None,
            antialiasing: Antialiasing::default(),
            initial_mode: RealmMode::Dark,
            timings: RealmTimings::default(),
            curve: TransitionCurve::default(),
            layers: Vec::new(),
        }
    }
}
