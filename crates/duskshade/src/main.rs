mod bindings;
mod cli;
mod defaults;
mod paths;
mod run;

use std::fs;

use anyhow::{Context, Result};
use realmconfig::RealmConfig;

use cli::{Command, ConfigAction};
use paths::AppPaths;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Config(config_cmd)) => handle_config_command(config_cmd.action),
        None => run::run(cli.run),
    }
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Check { file } => {
            let contents = fs::read_to_string(&file)
                .with_context(|| format!("failed to read config at {}", file.display()))?;
            let config = RealmConfig::from_toml_str(&contents)
                .with_context(|| format!("{} failed validation", file.display()))?;
            println!(
                "{}: OK ({} layer(s) configured)",
                file.display(),
                config.layers.len()
            );
            Ok(())
        }
        ConfigAction::Dump => {
            print!("{}", defaults::DEFAULT_CONFIG);
            Ok(())
        }
        ConfigAction::Where => {
            let paths = AppPaths::discover()?;
            let config_file = paths.config_file();
            println!("Configuration directories:");
            println!("  config: {}", paths.config_dir().display());
            println!("  data:   {}", paths.data_dir().display());
            println!(
                "  file:   {} ({})",
                config_file.display(),
                if config_file.exists() {
                    "present"
                } else {
                    "absent; embedded defaults apply"
                }
            );
            Ok(())
        }
    }
}
