//! Where the config file and default log file live.
//!
//! Priority:
//! 1. `--config-dir` on the command line
//! 2. `TRIMRANGE_CONFIG_DIR` environment variable
//! 3. Current directory, if it already holds a `trimrange.json`
//! 4. Platform directories from `dirs-next`:
//!    - config: `~/.config/trimrange` (Linux), `~/Library/Application Support/trimrange` (macOS), `%APPDATA%\trimrange` (Windows)
//!    - data: `~/.local/share/trimrange` and equivalents

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const CONFIG_FILE: &str = "trimrange.json";
pub const LOG_FILE: &str = "trimrange.log";
const ENV_CONFIG_DIR: &str = "TRIMRANGE_CONFIG_DIR";
const APP_DIR: &str = "trimrange";

#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// CLI value wins over the environment.
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var(ENV_CONFIG_DIR).ok().map(PathBuf::from));
        Self { config_dir }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir().join(CONFIG_FILE)
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir().join(LOG_FILE)
    }

    pub fn config_dir(&self) -> PathBuf {
        self.resolve(dirs_next::config_dir())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.resolve(dirs_next::data_dir())
    }

    /// Create the config and data directories if missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.config_dir(), self.data_dir()] {
            if !dir.exists() {
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            }
        }
        Ok(())
    }

    fn resolve(&self, platform_dir: Option<PathBuf>) -> PathBuf {
        if let Some(dir) = &self.config_dir {
            return dir.clone();
        }
        if let Ok(cwd) = std::env::current_dir() {
            if has_local_config(&cwd) {
                return cwd;
            }
        }
        platform_dir
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn has_local_config(dir: &Path) -> bool {
    dir.join(CONFIG_FILE).exists()
}
