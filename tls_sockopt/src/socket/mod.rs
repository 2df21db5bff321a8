//! # Socket State
//!
//! Per-socket TLS metadata and the registry that owns it.

pub mod id;
pub mod registry;
pub mod state;

pub use id::{DaemonId, SocketId, IDENTITY_LEN};
pub use registry::SocketRegistry;
pub use state::{ReleasedBuffers, SocketState};
