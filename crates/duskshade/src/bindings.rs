use anyhow::{anyhow, Context, Result};
use realm::{RealmMode, RealmTimings, TransitionCurve};
use realmconfig::{AntialiasSetting, CurveSetting, LayerConfig, RealmConfig};
use renderer::{Antialiasing, LayerKind, LayerProfile, LayerSettings, RendererConfig};

use crate::cli::{parse_size, RunArgs};

/// Fallback scatter seed when a sparkle layer omits one.
const DEFAULT_SEED: u64 = 7;

/// Maps the parsed configuration plus CLI overrides onto the renderer's
/// types. The config crate stays GPU-free; this is the only place the two
/// vocabularies meet.
pub fn renderer_config(config: &RealmConfig, args: &RunArgs) -> Result<RendererConfig> {
    let timings = RealmTimings::new(config.transition.expand, config.transition.settle)
        .context("transition timings rejected")?;

    let surface_size = match &args.size {
        Some(raw) => parse_size(raw).map_err(|err| anyhow!("invalid --size: {err}"))?,
        None => (config.window.width, config.window.height),
    };

    let fps = args.fps.unwrap_or(config.window.fps);
    let target_fps = (fps > 0.0).then_some(fps);

    let antialiasing = args
        .antialias
        .unwrap_or_else(|| map_antialias(config.window.antialias));

    let mut layers = Vec::new();
    for kind in LayerKind::ORDERED {
        let Some(layer) = config.layer(kind.name()) else {
            continue;
        };
        if !layer.enabled {
            tracing::debug!(layer = kind.name(), "layer disabled by configuration");
            continue;
        }
        layers.push(layer_settings(kind, layer));
    }

    Ok(RendererConfig {
        surface_size,
        target_fps,
        antialiasing,
        initial_mode: args.realm.unwrap_or(RealmMode::Dark),
        timings,
        curve: map_curve(config.transition.curve),
        layers,
    })
}

pub fn map_antialias(setting: AntialiasSetting) -> Antialiasing {
    match setting {
        AntialiasSetting::Auto => Antialiasing::Auto,
        AntialiasSetting::Off => Antialiasing::Off,
        AntialiasSetting::Samples2 => Antialiasing::Samples(2),
        AntialiasSetting::Samples4 => Antialiasing::Samples(4),
        AntialiasSetting::Samples8 => Antialiasing::Samples(8),
        AntialiasSetting::Samples16 => Antialiasing::Samples(16),
    }
}

pub fn map_curve(setting: CurveSetting) -> TransitionCurve {
    match setting {
        CurveSetting::Linear => TransitionCurve::Linear,
        CurveSetting::Smoothstep => TransitionCurve::Smoothstep,
        CurveSetting::EaseInOut => TransitionCurve::EaseInOut,
    }
}

fn layer_settings(kind: LayerKind, layer: &LayerConfig) -> LayerSettings {
    LayerSettings {
        kind,
        dark: map_profile(&layer.dark),
        light: map_profile(&layer.light),
        seed: layer.seed.unwrap_or(DEFAULT_SEED),
    }
}

fn map_profile(profile: &realmconfig::LayerProfile) -> LayerProfile {
    // Validation already pinned the stop count to three.
    let mut color_stops = [[0.0f32; 3]; 3];
    for (slot, stop) in color_stops.iter_mut().zip(&profile.color_stops) {
        *slot = stop.to_array();
    }

    LayerProfile {
        color_stops,
        speed: profile.speed,
        scale: profile.scale,
        frequency: profile.frequency,
        warp_strength: profile.warp_strength,
        mouse_influence: profile.mouse_influence,
        parallax: profile.parallax,
        noise_amount: profile.noise_amount,
        opacity: profile.opacity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;

    #[test]
    fn default_config_maps_to_four_layers() {
        let config = defaults::default_config().unwrap();
        let mapped = renderer_config(&config, &RunArgs::default()).unwrap();

        assert_eq!(mapped.layers.len(), 4);
        assert_eq!(mapped.initial_mode, RealmMode::Dark);
        assert_eq!(mapped.surface_size, (1280, 800));
        assert_eq!(mapped.target_fps, None);
        assert_eq!(
            mapped.timings.expand(),
            std::time::Duration::from_millis(850)
        );

        let field = &mapped.layers[0];
        assert_eq!(field.kind, LayerKind::Field);
        assert!((field.dark.color_stops[0][0] - 0x44 as f32 / 255.0).abs() < 1e-6);
        assert_eq!(field.dark.opacity, 0.8);
    }

    #[test]
    fn cli_overrides_win_over_the_file() {
        let config = defaults::default_config().unwrap();
        let args = RunArgs {
            size: Some("640x480".into()),
            fps: Some(30.0),
            antialias: Some(Antialiasing::Off),
            realm: Some(RealmMode::Light),
            ..RunArgs::default()
        };
        let mapped = renderer_config(&config, &args).unwrap();

        assert_eq!(mapped.surface_size, (640, 480));
        assert_eq!(mapped.target_fps, Some(30.0));
        assert_eq!(mapped.antialiasing, Antialiasing::Off);
        assert_eq!(mapped.initial_mode, RealmMode::Light);
    }

    #[test]
    fn disabled_layers_are_filtered() {
        let mut config = defaults::default_config().unwrap();
        config.layers.get_mut("orb").unwrap().enabled = false;
        let mapped = renderer_config(&config, &RunArgs::default()).unwrap();
        assert_eq!(mapped.layers.len(), 3);
        assert!(mapped.layers.iter().all(|l| l.kind != LayerKind::Orb));
    }
}
