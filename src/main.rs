//! Entry point for the **gridwall** daemon.
//!
//! Spawns all configured [`InputSource`](gridwall::traits::InputSource)s
//! and the status publisher on background threads, then processes incoming
//! inputs on the main thread.  Commands and renderer events arrive on one
//! channel, so layout reconciliation and event application are naturally
//! serialized.

use gridwall::command::Input;
use gridwall::config::Config;
use gridwall::ipc::listener::ControlListener;
use gridwall::ipc::status::StatusPublisher;
use gridwall::layout::WallGeometry;
use gridwall::renderer::events::RendererEventSource;
use gridwall::renderer::surface::SocketSurface;
use gridwall::traits::InputSource;
use gridwall::wall::Wall;
use log::{error, info};
use std::path::PathBuf;
use std::sync::mpsc;

/// Default path for a socket under the user's runtime directory.
fn default_runtime_path(name: &str) -> PathBuf {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(runtime).join(name)
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/gridwall`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("gridwall")
}

/// Try to load the config from `$XDG_CONFIG_HOME/gridwall/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

fn main() {
    env_logger::init();

    let config = load_config();
    let geometry = WallGeometry::new(
        config.wall.grid_size,
        config.wall.cell_width,
        config.wall.cell_height,
    );

    let renderer_cmd = config
        .renderer
        .command_socket
        .clone()
        .unwrap_or_else(|| default_runtime_path("gridwall-renderer.sock"));
    let surface = SocketSurface::new(&renderer_cmd);

    let mut wall = Wall::new(surface, geometry, config.wall.slot_capacity);
    info!(
        "wall: {0}x{0} grid, {1}x{2}px cells, {3} slot(s), renderer at {4}",
        config.wall.grid_size,
        config.wall.cell_width,
        config.wall.cell_height,
        config.wall.slot_capacity,
        renderer_cmd.display()
    );

    let (status_tx, status_rx) = mpsc::channel();
    wall.set_status_sink(status_tx);
    spawn_status_publisher(status_rx, &config);

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    spawn_input_sources(input_tx, &config);

    info!("gridwall running");
    for input in input_rx {
        if let Err(e) = wall.handle(input) {
            error!("command error: {}", e);
        }
    }
    info!("all input sources closed, exiting");
}

//  Helpers

fn spawn_status_publisher(
    updates: mpsc::Receiver<gridwall::wall::AggregateState>,
    config: &Config,
) {
    let path = config
        .ipc
        .status_socket
        .clone()
        .unwrap_or_else(|| default_runtime_path("gridwall-status.sock"));
    std::thread::spawn(move || {
        let mut publisher = StatusPublisher::new(&path);
        if let Err(e) = publisher.run(updates) {
            error!("status publisher error: {}", e);
        }
    });
}

fn spawn_input_sources(tx: mpsc::Sender<Input>, config: &Config) {
    {
        let tx = tx.clone();
        let path = config
            .ipc
            .control_socket
            .clone()
            .unwrap_or_else(|| default_runtime_path("gridwall.sock"));
        std::thread::spawn(move || {
            let mut source = ControlListener::new(&path);
            if let Err(e) = source.run(tx) {
                error!("control listener error: {}", e);
            }
        });
    }

    {
        let tx = tx.clone();
        let path = config
            .renderer
            .event_socket
            .clone()
            .unwrap_or_else(|| default_runtime_path("gridwall-renderer-events.sock"));
        std::thread::spawn(move || {
            let mut source = RendererEventSource::new(&path);
            if let Err(e) = source.run(tx) {
                error!("renderer event source error: {}", e);
            }
        });
    }

    drop(tx);
}
