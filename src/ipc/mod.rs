//! IPC endpoints for control clients and status subscribers.
//!
//! External tools (layout pickers, remote controls, scripts) connect to
//! the control socket and send newline-delimited JSON commands; the
//! overlay surface and other observers connect to the status socket and
//! receive a JSON line with the full aggregate state after every slot
//! transition.

pub mod listener;
pub mod status;
