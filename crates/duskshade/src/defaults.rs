use anyhow::{Context, Result};
use realmconfig::RealmConfig;

/// Configuration used when no file is present: the stock dark/light
/// palettes for all four layers at the standard transition timings.
pub const DEFAULT_CONFIG: &str = r##"version = 1

[transition]
expand = "850ms"
settle = "1800ms"
curve = "ease-in-out"

[window]
width = 1280
height = 800
fps = 0
antialias = "auto"

[layers.field]
[layers.field.dark]
color_stops = ["#440000", "#110000", "#000000"]
speed = 0.12
scale = 1.2
frequency = 0.4
warp_strength = 1.5
mouse_influence = 0.4
parallax = 0.15
noise_amount = 0.05
opacity = 0.8

[layers.field.light]
color_stops = ["#f0f8ff", "#fdfcf0", "#87cefa"]
speed = 0.06
scale = 1.5
frequency = 0.3
warp_strength = 0.4
mouse_influence = 0.1
parallax = 0.05
noise_amount = 0.005
opacity = 0.8

[layers.aurora]
[layers.aurora.dark]
color_stops = ["#000000", "#550000", "#ff0000"]
speed = 0.5
warp_strength = 1.0

[layers.aurora.light]
color_stops = ["#e8f0ff", "#c0d4ff", "#a0c8ff"]
speed = 0.5
warp_strength = 1.0

[layers.sparkles]
seed = 7
[layers.sparkles.dark]
color_stops = ["#000000", "#000000", "#000000"]
[layers.sparkles.light]
color_stops = ["#d4af37", "#aec6cf", "#ffffff"]
opacity = 0.9

[layers.orb]
[layers.orb.dark]
color_stops = ["#8b0000", "#ff3366", "#ffb347"]
speed = 0.25

[layers.orb.light]
color_stops = ["#87cefa", "#fdfcf0", "#ffd700"]
speed = 0.25
"##;

pub fn default_config() -> Result<RealmConfig> {
    RealmConfig::from_toml_str(DEFAULT_CONFIG).context("embedded default configuration is invalid")
}
