//! Renderer-process backends.
//!
//! This module provides concrete implementations of the
//! [`RenderSurface`](crate::traits::RenderSurface) and
//! [`InputSource`](crate::traits::InputSource) traits, bridging to an
//! external renderer process over its Unix sockets.
//!
//! Nothing outside this module should reference the renderer wire
//! protocol directly.

pub mod events;
pub mod surface;
