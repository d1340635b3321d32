//! **gridwall** — a fixed-pool slot orchestrator for grid-layout video
//! walls.
//!
//! A wall is an `n × n` grid of cells, each optionally assigned a content
//! URL.  The daemon maps every desired layout onto a bounded pool of
//! reusable rendering slots, reloading as little as possible when the
//! layout changes, and routes a single listening focus so that exactly one
//! region is audible at a time.
//!
//! # Architecture
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::RenderSurface`] — abstracts the rendering surface so the
//!   reconciliation logic is not coupled to any specific renderer process.
//! * [`traits::InputSource`] — abstracts the transport that delivers
//!   commands and renderer events (a Unix socket, a test harness, …) so
//!   the main loop is not coupled to any specific IPC mechanism.
//!
//! Concrete implementations live in [`renderer`] (socket bridge to the
//! renderer process) and [`ipc`] (Unix-socket control listener and status
//! publisher).  The pure pieces — [`layout`] partitioning, the [`slot`]
//! state machine, and [`scheduler`] reconciliation — are driven by
//! [`wall::Wall`].

pub mod command;
pub mod config;
pub mod ipc;
pub mod layout;
pub mod renderer;
pub mod scheduler;
pub mod slot;
pub mod traits;
pub mod wall;
