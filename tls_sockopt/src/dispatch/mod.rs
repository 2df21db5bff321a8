//! # Option Dispatchers
//!
//! Entry points for intercepted `setsockopt`/`getsockopt` calls.
//!
//! | Option                  | setsockopt                         | getsockopt                     |
//! |-------------------------|------------------------------------|--------------------------------|
//! | `SO_HOSTNAME`           | validate + store, daemon decides   | local copy, no truncation      |
//! | `SO_CERTIFICATE_CHAIN`  | daemon decides                     | native                         |
//! | `SO_PRIVATE_KEY`        | daemon decides                     | native                         |
//! | `SO_PEER_CERTIFICATE`   | daemon, then native                | daemon, silent truncation      |
//! | `SO_ID`                 | daemon, then native                | local identity, truncation     |
//! | anything else           | daemon, then native                | native                         |

mod get;
mod set;

use crate::bridge::CallBridge;
use crate::config::ShimConfig;
use crate::socket::{SocketId, SocketRegistry};
use crate::{ShimStats, SockoptResult};

/// Native `setsockopt` of the underlying socket implementation
pub type NativeSetsockopt =
    fn(socket: SocketId, level: i32, optname: i32, optval: &[u8]) -> SockoptResult<()>;

/// Native `getsockopt` of the underlying socket implementation
pub type NativeGetsockopt = fn(
    socket: SocketId,
    level: i32,
    optname: i32,
    optval: Option<&mut [u8]>,
    optlen: Option<&mut u32>,
) -> SockoptResult<()>;

/// Borrowed view of the shim the dispatchers run against
pub struct Dispatcher<'a> {
    registry: &'a SocketRegistry,
    bridge: &'a CallBridge,
    config: &'a ShimConfig,
    stats: &'a ShimStats,
}

impl<'a> Dispatcher<'a> {
    /// Assemble a dispatcher
    pub fn new(
        registry: &'a SocketRegistry,
        bridge: &'a CallBridge,
        config: &'a ShimConfig,
        stats: &'a ShimStats,
    ) -> Self {
        Self {
            registry,
            bridge,
            config,
            stats,
        }
    }
}
