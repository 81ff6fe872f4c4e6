//! Control socket
//!
//! Exposes feature settings to other processes over a Unix socket so they can
//! be read and changed while the daemon runs.

mod client;
mod protocol;
mod server;

pub use client::{is_daemon_running, DaemonClient};
pub use protocol::*;
pub use server::DaemonServer;
