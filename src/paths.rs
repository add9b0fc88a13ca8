//! Where the config file, the scene database and the logs live
//!
//! - **Dev** (debug builds): `config.yaml` in the working directory puts
//!   everything under the working directory.
//! - **Portable**: a `.portable` marker next to the executable keeps all
//!   data beside it.
//! - **Installed** (default): `<data dir>/FLOW8 Remote`, e.g. `%APPDATA%` on
//!   Windows or `~/.local/share` on Linux.

use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "FLOW8 Remote";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMode {
    Dev,
    Portable,
    Installed,
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config: PathBuf,
    /// Holds the sled scene database
    pub state_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub mode: PathMode,
}

impl AppPaths {
    /// Lay out every path under one base directory
    pub fn under(base: impl AsRef<Path>, mode: PathMode) -> Self {
        let base = base.as_ref();
        let state = if mode == PathMode::Installed {
            "state"
        } else {
            ".state"
        };
        Self {
            config: base.join("config.yaml"),
            state_dir: base.join(state),
            logs_dir: base.join("logs"),
            mode,
        }
    }

    /// Pick the layout for this run. Called before logging is up, so the
    /// debug output goes to stderr.
    pub fn detect() -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));

        #[cfg(debug_assertions)]
        {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            if cwd.join("config.yaml").exists() {
                eprintln!("[paths] DEV mode ({})", cwd.display());
                return Self::under(cwd, PathMode::Dev);
            }
        }

        if exe_dir.join(".portable").exists() {
            #[cfg(debug_assertions)]
            eprintln!("[paths] PORTABLE mode ({})", exe_dir.display());
            return Self::under(exe_dir, PathMode::Portable);
        }

        let base = dirs::data_dir()
            .unwrap_or_else(|| {
                eprintln!("[paths] WARNING: no data directory, falling back to exe dir");
                exe_dir.clone()
            })
            .join(APP_NAME);

        #[cfg(debug_assertions)]
        eprintln!("[paths] INSTALLED mode ({})", base.display());
        Self::under(base, PathMode::Installed)
    }

    /// Base directory, for display
    pub fn base_dir(&self) -> PathBuf {
        self.config
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        for dir in [&self.state_dir, &self.logs_dir] {
            if !dir.exists() {
                debug!("Creating directory: {}", dir.display());
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
        }
        Ok(())
    }

    /// sled database holding the saved scene
    pub fn scene_db_path(&self) -> PathBuf {
        self.state_dir.join("scenes")
    }
}
