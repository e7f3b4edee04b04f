use std::fs;

use anyhow::{Context, Result};
use realmconfig::RealmConfig;
use renderer::Renderer;
use tracing_subscriber::EnvFilter;

use crate::bindings;
use crate::cli::RunArgs;
use crate::defaults;
use crate::paths::AppPaths;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(args: RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let config = load_config(&args, &paths)?;
    let renderer_config = bindings::renderer_config(&config, &args)?;

    tracing::info!(
        width = renderer_config.surface_size.0,
        height = renderer_config.surface_size.1,
        layers = renderer_config.layers.len(),
        initial_mode = ?renderer_config.initial_mode,
        "bootstrapping duskshade backdrop"
    );

    let mut renderer = Renderer::new(renderer_config);
    renderer.run()
}

fn load_config(args: &RunArgs, paths: &AppPaths) -> Result<RealmConfig> {
    if let Some(path) = &args.config {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        return RealmConfig::from_toml_str(&contents)
            .with_context(|| format!("failed to load config at {}", path.display()));
    }

    let discovered = paths.config_file();
    if discovered.exists() {
        tracing::debug!(path = %discovered.display(), "loading discovered config");
        let contents = fs::read_to_string(&discovered)
            .with_context(|| format!("failed to read config at {}", discovered.display()))?;
        return RealmConfig::from_toml_str(&contents)
            .with_context(|| format!("failed to load config at {}", discovered.display()));
    }

    tracing::debug!("no config file found; using embedded defaults");
    defaults::default_config()
}
