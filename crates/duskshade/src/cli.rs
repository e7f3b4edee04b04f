use std::path::PathBuf;

use clap::{Parser, Subcommand};
use realm::RealmMode;
use renderer::Antialiasing;

#[derive(Parser, Debug)]
#[command(
    name = "duskshade",
    author,
    version,
    about = "Dual-realm animated shader backdrop",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Configuration file to load instead of the discovered one.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the window resolution (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub size: Option<String>,

    /// Optional FPS cap (0 = uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = parse_antialias)]
    pub antialias: Option<Antialiasing>,

    /// Realm to start in: `dark` (default) or `light`.
    #[arg(long, value_name = "REALM", value_parser = parse_realm)]
    pub realm: Option<RealmMode>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect or validate configuration files.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Parse and validate a configuration file.
    Check { file: PathBuf },
    /// Print the embedded default configuration.
    Dump,
    /// Print resolved configuration directories.
    Where,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_antialias(value: &str) -> Result<Antialiasing, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("anti-alias mode must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(Antialiasing::Auto),
        "off" | "none" | "disable" | "disabled" | "0" => Ok(Antialiasing::Off),
        _ => {
            let samples: u32 = normalized.parse().map_err(|_| {
                format!("invalid anti-alias sample count '{trimmed}'; use auto/off or 2/4/8/16")
            })?;

            if samples == 0 || samples == 1 {
                return Ok(Antialiasing::Off);
            }

            if !matches!(samples, 2 | 4 | 8 | 16) {
                return Err(format!(
                    "unsupported sample count {samples}; supported values are 2, 4, 8, or 16"
                ));
            }

            Ok(Antialiasing::Samples(samples))
        }
    }
}

pub fn parse_realm(value: &str) -> Result<RealmMode, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "dark" => Ok(RealmMode::Dark),
        "light" => Ok(RealmMode::Light),
        other => Err(format!("unknown realm '{other}'; expected dark or light")),
    }
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid width in resolution".to_string())?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid height in resolution".to_string())?;
    if width == 0 || height == 0 {
        return Err("resolution must be greater than zero".into());
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_antialias_variants() {
        assert_eq!(parse_antialias("auto").unwrap(), Antialiasing::Auto);
        assert_eq!(parse_antialias("OFF").unwrap(), Antialiasing::Off);
        assert_eq!(parse_antialias("1").unwrap(), Antialiasing::Off);
        assert_eq!(parse_antialias("8").unwrap(), Antialiasing::Samples(8));
        assert!(parse_antialias("3").is_err());
        assert!(parse_antialias("").is_err());
    }

    #[test]
    fn parses_realm_names() {
        assert_eq!(parse_realm("dark").unwrap(), RealmMode::Dark);
        assert_eq!(parse_realm(" Light ").unwrap(), RealmMode::Light);
        assert!(parse_realm("dusk").is_err());
    }

    #[test]
    fn parses_resolutions() {
        assert_eq!(parse_size("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_size("1920X1080").unwrap(), (1920, 1080));
        assert!(parse_size("1280").is_err());
        assert!(parse_size("0x720").is_err());
    }
}
