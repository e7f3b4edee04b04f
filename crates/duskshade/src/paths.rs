use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories_next::ProjectDirs;

/// Resolved filesystem locations for the daemon. Environment overrides
/// (`DUSKSHADE_CONFIG_DIR`, `DUSKSHADE_DATA_DIR`) take priority so tests
/// and packaging scripts can pin them.
pub struct AppPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl AppPaths {
    pub fn discover() -> Result<Self> {
        let env_config = env::var_os("DUSKSHADE_CONFIG_DIR").map(PathBuf::from);
        let env_data = env::var_os("DUSKSHADE_DATA_DIR").map(PathBuf::from);

        if let (Some(config_dir), Some(data_dir)) = (env_config.clone(), env_data.clone()) {
            return Ok(Self {
                config_dir,
                data_dir,
            });
        }

        let dirs = ProjectDirs::from("", "", "duskshade")
            .ok_or_else(|| anyhow!("could not determine a home directory for duskshade"))?;

        Ok(Self {
            config_dir: env_config.unwrap_or_else(|| dirs.config_dir().to_path_buf()),
            data_dir: env_data.unwrap_or_else(|| dirs.data_dir().to_path_buf()),
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }
}
