//! [`RenderSurface`] implementation backed by a renderer process socket.
//!
//! Each surface command is one short-lived request: connect to the
//! renderer's command socket, write a single JSON line, read the reply.
//! The renderer answers `ok` for accepted commands; anything else is
//! surfaced as an error. Content outcomes (`ready`/`failed`) do **not**
//! come back on this socket — they arrive asynchronously on the event
//! socket (see [`events`](crate::renderer::events)).

use crate::command::PixelRect;
use crate::traits::RenderSurface;
use serde::Serialize;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

/// Socket-backed rendering surface.
///
/// No connection is opened eagerly; each method call opens a short-lived
/// request to the renderer's command socket.
pub struct SocketSurface {
    path: PathBuf,
}

/// Errors that can occur when talking to the renderer.
#[derive(Debug, thiserror::Error)]
#[error("renderer IPC error: {0}")]
pub struct SocketSurfaceError(String);

/// Wire format of one command sent to the renderer.
#[derive(Serialize)]
enum SurfaceRequest<'a> {
    Display {
        slot: usize,
        url: &'a str,
        rect: PixelRect,
    },
    Reposition {
        slot: usize,
        rect: PixelRect,
    },
    Clear {
        slot: usize,
    },
    SetMuted {
        slot: usize,
        muted: bool,
    },
}

impl SocketSurface {
    /// Create a handle for the renderer command socket at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The filesystem path of the command socket.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Send one request and check for `ok`.
    fn dispatch(&self, request: &SurfaceRequest<'_>) -> Result<(), SocketSurfaceError> {
        let line = serde_json::to_string(request)
            .map_err(|e| SocketSurfaceError(format!("encode: {}", e)))?;

        let mut stream = UnixStream::connect(&self.path).map_err(|e| {
            SocketSurfaceError(format!("connect to {}: {}", self.path.display(), e))
        })?;

        stream
            .write_all(line.as_bytes())
            .and_then(|_| stream.write_all(b"\n"))
            .map_err(|e| SocketSurfaceError(format!("write: {}", e)))?;
        stream
            .shutdown(std::net::Shutdown::Write)
            .map_err(|e| SocketSurfaceError(format!("shutdown: {}", e)))?;

        let mut response = String::new();
        stream
            .read_to_string(&mut response)
            .map_err(|e| SocketSurfaceError(format!("read: {}", e)))?;

        if response.trim() == "ok" {
            Ok(())
        } else {
            Err(SocketSurfaceError(format!(
                "renderer rejected command: {}",
                response.trim()
            )))
        }
    }
}

impl RenderSurface for SocketSurface {
    type Error = SocketSurfaceError;

    fn display(&self, slot: usize, url: &str, rect: PixelRect) -> Result<(), Self::Error> {
        self.dispatch(&SurfaceRequest::Display { slot, url, rect })
    }

    fn reposition(&self, slot: usize, rect: PixelRect) -> Result<(), Self::Error> {
        self.dispatch(&SurfaceRequest::Reposition { slot, rect })
    }

    fn clear(&self, slot: usize) -> Result<(), Self::Error> {
        self.dispatch(&SurfaceRequest::Clear { slot })
    }

    fn set_muted(&self, slot: usize, muted: bool) -> Result<(), Self::Error> {
        self.dispatch(&SurfaceRequest::SetMuted { slot, muted })
    }
}

//  Tests
