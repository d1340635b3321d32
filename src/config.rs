//! Application configuration.
//!
//! The configuration is loaded from a JSON file at
//! `$XDG_CONFIG_HOME/gridwall/config.json`.  The top-level schema is split
//! into sections so the file can be extended later without breaking
//! backward compatibility.
//!
//! # Example
//!
//! ```json
//! {
//!   "wall": {
//!     "grid_size": 10,
//!     "cell_width": 192,
//!     "cell_height": 108,
//!     "slot_capacity": 16
//!   },
//!   "renderer": {
//!     "command_socket": "/run/user/1000/renderer-cmd.sock",
//!     "event_socket": "/run/user/1000/renderer-events.sock"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
///
/// Every field is optional — a minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Wall geometry and pool sizing.
    #[serde(default)]
    pub wall: WallConfig,

    /// Renderer socket locations.
    #[serde(default)]
    pub renderer: RendererConfig,

    /// Control and status socket locations.
    #[serde(default)]
    pub ipc: IpcConfig,
}

/// Wall geometry and pool sizing.
///
/// All of these are fixed for the lifetime of the daemon; changing them
/// requires a restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    /// Grid dimension `n`: the wall is `n × n` cells.
    pub grid_size: u32,
    /// Width of one cell in pixels.
    pub cell_width: u32,
    /// Height of one cell in pixels.
    pub cell_height: u32,
    /// Number of rendering slots in the pool.  A layout partitioning into
    /// more regions than this is rejected.
    pub slot_capacity: usize,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            grid_size: 10,
            cell_width: 192,
            cell_height: 108,
            slot_capacity: 16,
        }
    }
}

/// Renderer socket locations.  `None` falls back to paths under
/// `$XDG_RUNTIME_DIR` resolved at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Socket the renderer accepts display commands on.
    pub command_socket: Option<PathBuf>,
    /// Socket the renderer reports `Ready`/`Failed` events on.
    pub event_socket: Option<PathBuf>,
}

/// Control and status socket locations.  `None` falls back to paths under
/// `$XDG_RUNTIME_DIR` resolved at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IpcConfig {
    /// Socket control clients send commands to.
    pub control_socket: Option<PathBuf>,
    /// Socket status subscribers read aggregate state from.
    pub status_socket: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
