use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Layer names the renderer knows how to draw, in draw order.
pub const KNOWN_LAYERS: [&str; 4] = ["field", "aurora", "sparkles", "orb"];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RealmConfig {
    pub version: u32,
    #[serde(default)]
    pub transition: TransitionSettings,
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default)]
    pub layers: BTreeMap<String, LayerConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransitionSettings {
    /// Delay from trigger to the mode flip, while the cover expands.
    #[serde(
        default = "default_expand",
        deserialize_with = "deserialize_duration"
    )]
    pub expand: Duration,
    /// Delay from trigger until the transition clears. Must exceed `expand`.
    #[serde(
        default = "default_settle",
        deserialize_with = "deserialize_duration"
    )]
    pub settle: Duration,
    #[serde(default)]
    pub curve: CurveSetting,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            expand: default_expand(),
            settle: default_settle(),
            curve: CurveSetting::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CurveSetting {
    Linear,
    Smoothstep,
    #[default]
    EaseInOut,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WindowSettings {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Frame-rate cap; 0 renders on every callback.
    #[serde(default)]
    pub fps: f32,
    #[serde(default, deserialize_with = "deserialize_antialias")]
    pub antialias: AntialiasSetting,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            fps: 0.0,
            antialias: AntialiasSetting::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntialiasSetting {
    #[default]
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LayerConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Deterministic seed for layers that scatter their own geometry
    /// (the sparkle field). Ignored by the purely procedural layers.
    #[serde(default)]
    pub seed: Option<u64>,
    pub dark: LayerProfile,
    pub light: LayerProfile,
}

/// Per-realm appearance of one layer. Swapped wholesale when the realm
/// flips; the renderer keeps its time accumulator across the swap.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayerProfile {
    pub color_stops: Vec<Color>,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    #[serde(default)]
    pub warp_strength: f32,
    #[serde(default)]
    pub mouse_influence: f32,
    #[serde(default)]
    pub parallax: f32,
    #[serde(default)]
    pub noise_amount: f32,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

/// An sRGB colour parsed from `#rgb` or `#rrggbb` notation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub [f32; 3]);

impl Color {
    pub fn to_array(self) -> [f32; 3] {
        self.0
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let hex = raw
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| format!("colour '{raw}' must start with '#'"))?;

        let channels: [u8; 3] = match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, ch) in out.iter_mut().zip(hex.chars()) {
                    let nibble = ch
                        .to_digit(16)
                        .ok_or_else(|| format!("invalid hex digit in colour '{raw}'"))?
                        as u8;
                    *slot = nibble << 4 | nibble;
                }
                out
            }
            6 => {
                let mut out = [0u8; 3];
                for (index, slot) in out.iter_mut().enumerate() {
                    *slot = u8::from_str_radix(&hex[index * 2..index * 2 + 2], 16)
                        .map_err(|_| format!("invalid hex digit in colour '{raw}'"))?;
                }
                out
            }
            _ => {
                return Err(format!(
                    "colour '{raw}' must be 3 or 6 hex digits after '#'"
                ))
            }
        };

        Ok(Color(channels.map(|channel| channel as f32 / 255.0)))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0.map(|channel| (channel * 255.0).round() as u8);
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

fn default_expand() -> Duration {
    Duration::from_millis(850)
}

fn default_settle() -> Duration {
    Duration::from_millis(1800)
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    800
}

fn default_enabled() -> bool {
    true
}

fn default_speed() -> f32 {
    1.0
}

fn default_scale() -> f32 {
    1.0
}

fn default_frequency() -> f32 {
    1.0
}

fn default_opacity() -> f32 {
    1.0
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str(
                "a duration as a human-readable string (\"850ms\") or integer milliseconds",
            )
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_millis(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_millis(v as u64))
        }

        fn visit_f64<E>(self, _: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Err(E::custom(
                "fractional durations are ambiguous; use a string such as \"850ms\"",
            ))
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn deserialize_antialias<'de, D>(deserializer: D) -> Result<AntialiasSetting, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    match Helper::deserialize(deserializer)? {
        Helper::Str(raw) => parse_antialias(&raw).map_err(de::Error::custom),
        Helper::Num(value) => {
            if value < 0 {
                return Err(de::Error::custom("antialias value must be non-negative"));
            }
            parse_antialias(&value.to_string()).map_err(de::Error::custom)
        }
    }
}

pub fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "disable" | "disabled" | "0" | "1" => Ok(AntialiasSetting::Off),
        "2" => Ok(AntialiasSetting::Samples2),
        "4" => Ok(AntialiasSetting::Samples4),
        "8" => Ok(AntialiasSetting::Samples8),
        "16" => Ok(AntialiasSetting::Samples16),
        other => Err(format!("invalid antialias setting '{other}'")),
    }
}

impl RealmConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: RealmConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn layer(&self, name: &str) -> Option<&LayerConfig> {
        self.layers.get(name)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.transition.expand.is_zero() {
            return Err(ConfigError::Invalid(
                "transition.expand must be greater than zero".into(),
            ));
        }
        if self.transition.expand >= self.transition.settle {
            return Err(ConfigError::Invalid(format!(
                "transition.expand ({:?}) must be shorter than transition.settle ({:?})",
                self.transition.expand, self.transition.settle
            )));
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(
                "window dimensions must be greater than zero".into(),
            ));
        }
        if !self.window.fps.is_finite() || self.window.fps < 0.0 {
            return Err(ConfigError::Invalid("window.fps must be >= 0".into()));
        }

        for (name, layer) in &self.layers {
            if !KNOWN_LAYERS.contains(&name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "unknown layer '{name}'; expected one of {KNOWN_LAYERS:?}"
                )));
            }
            validate_profile(name, "dark", &layer.dark)?;
            validate_profile(name, "light", &layer.light)?;
        }

        Ok(())
    }
}

fn validate_profile(layer: &str, realm: &str, profile: &LayerProfile) -> Result<(), ConfigError> {
    let place = format!("layers.{layer}.{realm}");

    if profile.color_stops.len() != 3 {
        return Err(ConfigError::Invalid(format!(
            "{place}.color_stops must contain exactly 3 colours, found {}",
            profile.color_stops.len()
        )));
    }

    for (field, value) in [
        ("speed", profile.speed),
        ("scale", profile.scale),
        ("frequency", profile.frequency),
        ("warp_strength", profile.warp_strength),
        ("mouse_influence", profile.mouse_influence),
        ("parallax", profile.parallax),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "{place}.{field} must be a non-negative number"
            )));
        }
    }

    for (field, value) in [
        ("noise_amount", profile.noise_amount),
        ("opacity", profile.opacity),
    ] {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::Invalid(format!(
                "{place}.{field} must lie within 0..=1"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
version = 1

[transition]
expand = "850ms"
settle = "1800ms"
curve = "ease-in-out"

[window]
width = 1600
height = 900
fps = 60
antialias = 4

[layers.aurora]
[layers.aurora.dark]
color_stops = ["#000000", "#550000", "#ff0000"]
speed = 0.5

[layers.aurora.light]
color_stops = ["#e8f0ff", "#c0d4ff", "#a0c8ff"]
speed = 0.5

[layers.sparkles]
seed = 11
[layers.sparkles.dark]
color_stops = ["#000000", "#000000", "#000000"]
[layers.sparkles.light]
color_stops = ["#d4af37", "#aec6cf", "#ffffff"]
"##;

    #[test]
    fn parses_sample_config() {
        let config = RealmConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.version, 1);
        assert_eq!(config.transition.expand, Duration::from_millis(850));
        assert_eq!(config.transition.settle, Duration::from_millis(1800));
        assert_eq!(config.transition.curve, CurveSetting::EaseInOut);
        assert_eq!(config.window.antialias, AntialiasSetting::Samples4);
        assert_eq!(config.layer("sparkles").and_then(|l| l.seed), Some(11));

        let aurora = config.layer("aurora").expect("aurora layer");
        assert!(aurora.enabled);
        assert_eq!(aurora.dark.speed, 0.5);
        assert_eq!(aurora.dark.color_stops[2], "#ff0000".parse().unwrap());
    }

    #[test]
    fn accepts_integer_millisecond_durations() {
        let config = RealmConfig::from_toml_str(
            r#"
version = 1

[transition]
expand = 850
settle = 1800
"#,
        )
        .unwrap();
        assert_eq!(config.transition.expand, Duration::from_millis(850));
        assert_eq!(config.transition.settle, Duration::from_millis(1800));
    }

    #[test]
    fn rejects_unsupported_version() {
        let err = RealmConfig::from_toml_str("version = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_flip_after_settle() {
        let err = RealmConfig::from_toml_str(
            r#"
version = 1

[transition]
expand = "2s"
settle = "1s"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_wrong_stop_count() {
        let err = RealmConfig::from_toml_str(
            r##"
version = 1

[layers.orb.dark]
color_stops = ["#8b0000", "#ff3366"]
[layers.orb.light]
color_stops = ["#87cefa", "#fdfcf0", "#ffd700"]
"##,
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("layers.orb.dark"), "got: {message}");
    }

    #[test]
    fn rejects_unknown_layer_name() {
        let err = RealmConfig::from_toml_str(
            r##"
version = 1

[layers.nebula.dark]
color_stops = ["#000000", "#000000", "#000000"]
[layers.nebula.light]
color_stops = ["#ffffff", "#ffffff", "#ffffff"]
"##,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown layer"));
    }

    #[test]
    fn rejects_out_of_range_noise() {
        let err = RealmConfig::from_toml_str(
            r##"
version = 1

[layers.field.dark]
color_stops = ["#440000", "#110000", "#000000"]
noise_amount = 1.5
[layers.field.light]
color_stops = ["#f0f8ff", "#fdfcf0", "#87cefa"]
"##,
        )
        .unwrap_err();
        assert!(err.to_string().contains("noise_amount"));
    }

    #[test]
    fn parses_antialias_spellings() {
        assert_eq!(parse_antialias("auto").unwrap(), AntialiasSetting::Auto);
        assert_eq!(parse_antialias("OFF").unwrap(), AntialiasSetting::Off);
        assert_eq!(parse_antialias("1").unwrap(), AntialiasSetting::Off);
        assert_eq!(parse_antialias("16").unwrap(), AntialiasSetting::Samples16);
        assert!(parse_antialias("3").is_err());
    }

    #[test]
    fn parses_short_and_long_hex_colours() {
        let short: Color = "#f80".parse().unwrap();
        let long: Color = "#ff8800".parse().unwrap();
        assert_eq!(short, long);
        assert_eq!(long.to_string(), "#ff8800");

        assert!("#ff88".parse::<Color>().is_err());
        assert!("ff8800".parse::<Color>().is_err());
        assert!("#gg8800".parse::<Color>().is_err());
    }
}
