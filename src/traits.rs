//! Core traits that decouple gridwall from any specific renderer or
//! transport mechanism.
//!
//! Every concrete backend (the socket-driven renderer bridge, the Unix
//! control listener, a test harness, …) implements one of these traits.
//! The [`Wall`](crate::wall::Wall) only depends on these abstractions.

use crate::command::{Input, PixelRect};
use std::sync::mpsc;

/// Abstraction over the rendering surface that actually shows content.
///
/// One implementation drives a real renderer process over IPC; tests use
/// recording stubs. All methods address a slot by its pool index — the
/// surface owns one rendering unit per slot and keeps them for the process
/// lifetime.
///
/// Calls are non-blocking dispatches: `display` starts a navigation whose
/// outcome arrives later as a [`SurfaceEvent`](crate::command::SurfaceEvent)
/// (`Ready` or `Failed`, at most once per `display`, carrying the URL it
/// was issued for). `reposition` only moves an already-assigned slot and
/// never triggers a reload.
pub trait RenderSurface {
    /// The error type produced by this surface.
    type Error: std::error::Error + Send + 'static;

    /// Attach slot `slot`, navigate it to `url`, and place it at `rect`.
    fn display(&self, slot: usize, url: &str, rect: PixelRect) -> Result<(), Self::Error>;

    /// Move slot `slot` to `rect` without touching its content.
    fn reposition(&self, slot: usize, rect: PixelRect) -> Result<(), Self::Error>;

    /// Detach and hide slot `slot`, dropping whatever it was showing.
    fn clear(&self, slot: usize) -> Result<(), Self::Error>;

    /// Set the audio mute flag of slot `slot`.
    fn set_muted(&self, slot: usize, muted: bool) -> Result<(), Self::Error>;
}

//  Input Source

/// A source of [`Input`]s.
///
/// Implementations listen on some transport — the control socket, the
/// renderer's event stream, an in-memory channel, … — and forward parsed
/// inputs into the provided [`mpsc::Sender`].
///
/// The trait is deliberately transport-agnostic: the wall does not know
/// (or care) whether an input is a control command from a client or a
/// lifecycle event from the renderer.
///
/// # Contract
///
/// * [`run`](InputSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received input must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait InputSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Input`] into `sink`.
    ///
    /// This method blocks the calling thread.  To run multiple sources
    /// concurrently, spawn each one on its own thread.
    fn run(&mut self, sink: mpsc::Sender<Input>) -> Result<(), Self::Error>;
}
