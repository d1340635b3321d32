//! Forwards renderer content-lifecycle events into the control loop.
//!
//! The renderer process reports each slot's load outcome on a dedicated
//! event socket as newline-delimited JSON:
//!
//! ```json
//! {"Ready":{"slot":0,"url":"https://example.org/a","title":"Example"}}
//! {"Failed":{"slot":1,"url":"https://example.org/b"}}
//! ```
//!
//! [`RendererEventSource`] connects to that socket and forwards every
//! parsed event as [`Input::Surface`]. Events are emitted at most once per
//! `display` command and always carry the URL the command was issued for —
//! the slot machine uses that URL to discard stale arrivals.

use crate::command::{Input, SurfaceEvent};
use crate::traits::InputSource;
use log::{debug, error, info, warn};
use std::io::{BufRead, BufReader};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// An [`InputSource`] that listens to the renderer's event socket.
pub struct RendererEventSource {
    path: PathBuf,
}

/// Error from the renderer event source.
#[derive(Debug, thiserror::Error)]
#[error("renderer event error: {0}")]
pub struct RendererEventError(String);

impl RendererEventSource {
    /// Create a source that will connect to the event socket at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The filesystem path of the event socket.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse one event line; `None` for lines that are not valid events.
fn parse_event_line(line: &str) -> Option<SurfaceEvent> {
    match serde_json::from_str::<SurfaceEvent>(line) {
        Ok(event) => Some(event),
        Err(e) => {
            error!("bad renderer event: {} — {}", line, e);
            None
        }
    }
}

impl InputSource for RendererEventSource {
    type Error = RendererEventError;

    /// Connect to the renderer's event socket and start forwarding events.
    ///
    /// This method **blocks** until the socket closes or an error occurs.
    /// Run it on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Input>) -> Result<(), Self::Error> {
        info!("connecting to renderer events: {}", self.path.display());
        let stream = UnixStream::connect(&self.path).map_err(|e| {
            RendererEventError(format!("connect to {}: {}", self.path.display(), e))
        })?;
        info!("renderer event stream connected");
        let reader = BufReader::new(stream);

        for line in reader.lines() {
            match line {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => {
                    if let Some(event) = parse_event_line(&line) {
                        debug!("renderer event: {:?}", event);
                        if sink.send(Input::Surface(event)).is_err() {
                            info!("sink closed, shutting down");
                            return Ok(());
                        }
                    }
                }
                Err(e) => {
                    error!("event socket read error: {}", e);
                    return Err(RendererEventError(format!("read error: {}", e)));
                }
            }
        }

        warn!("renderer event stream ended");
        Ok(())
    }
}

//  Tests
