//! # TLS Socket-Option Shim for Exo-OS
//!
//! Intercepts the TLS socket options (hostname, peer certificate, certificate
//! chain, private key, socket identity) and defers the decision to the TLS
//! daemon, blocking the calling thread until the daemon answers or the
//! response bound expires. Every other option goes to the native socket.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │             setsockopt / getsockopt (hooked)                │
//! └───────────────────────────┬─────────────────────────────────┘
//!                             │
//!                             ▼
//!              ┌─────────────────────────────┐
//!              │      Option Dispatchers     │──── unknown code ───┐
//!              │  hostname · id · peer cert  │                     │
//!              └──────┬───────────────┬──────┘                     ▼
//!                     │               │                    ┌──────────────┐
//!                     ▼               ▼                    │    Native    │
//!           ┌──────────────┐  ┌──────────────┐             │ passthrough  │
//!           │   Socket     │  │  Call Bridge │             └──────────────┘
//!           │  Registry    │◀─┤ token+timeout│
//!           └──────▲───────┘  └──────┬───────┘
//!                  │                 │ notification
//!                  │                 ▼
//!                  │          ┌──────────────┐
//!                  └──────────┤ Notification │◀──── TLS daemon
//!                report_*     │   Channel    │
//!                             └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tls_sockopt::{options, DaemonId, ShimConfig, TlsShim};
//!
//! let shim = TlsShim::setup(channel, ShimConfig::new())?;
//! let sock = shim.register_socket(DaemonId::from_raw(1));
//! shim.setsockopt(sock, options::IPPROTO_TLS, options::SO_HOSTNAME,
//!                 Some(b"example.com\0"), 12, None)?;
//! shim.teardown();
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

extern crate alloc;

pub mod bridge;
pub mod channel;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod hostname;
pub mod lifecycle;
pub mod options;
pub mod socket;
pub mod translation;

// Re-exports for public API
pub use bridge::{CallBridge, CallToken, DaemonReply, DaemonRequest, ReplyHandle};
pub use channel::{GetsockoptNotification, NotificationChannel, SetsockoptNotification};
pub use config::ShimConfig;
pub use dispatch::{Dispatcher, NativeGetsockopt, NativeSetsockopt};
pub use error::{to_return_code, SockoptError, SockoptResult};
pub use lifecycle::TlsShim;
pub use options::TlsOption;
pub use socket::{DaemonId, SocketId, SocketRegistry, SocketState, IDENTITY_LEN};

use core::sync::atomic::{AtomicU64, Ordering};

/// Shim version
pub const VERSION: &str = "0.1.0";

/// Call statistics for the shim
///
/// Thread-safe statistics using atomic operations for concurrent access.
#[derive(Debug)]
pub struct ShimStats {
    /// Intercepted setsockopt calls
    setsockopt_calls: AtomicU64,
    /// Intercepted getsockopt calls
    getsockopt_calls: AtomicU64,
    /// Notifications sent to the daemon
    daemon_round_trips: AtomicU64,
    /// Round trips that hit the response bound
    daemon_timeouts: AtomicU64,
    /// Round trips answered with a non-zero status
    daemon_rejections: AtomicU64,
    /// Replies that found no waiting call
    discarded_replies: AtomicU64,
    /// Calls forwarded to the native implementation
    passthrough_calls: AtomicU64,
}

impl Default for ShimStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ShimStats {
    /// Create new statistics tracker
    pub const fn new() -> Self {
        Self {
            setsockopt_calls: AtomicU64::new(0),
            getsockopt_calls: AtomicU64::new(0),
            daemon_round_trips: AtomicU64::new(0),
            daemon_timeouts: AtomicU64::new(0),
            daemon_rejections: AtomicU64::new(0),
            discarded_replies: AtomicU64::new(0),
            passthrough_calls: AtomicU64::new(0),
        }
    }

    /// Record a setsockopt call
    #[inline]
    pub fn record_setsockopt(&self) {
        self.setsockopt_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a getsockopt call
    #[inline]
    pub fn record_getsockopt(&self) {
        self.getsockopt_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a notification sent to the daemon
    #[inline]
    pub fn record_round_trip(&self) {
        self.daemon_round_trips.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a daemon timeout
    #[inline]
    pub fn record_timeout(&self) {
        self.daemon_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a daemon rejection
    #[inline]
    pub fn record_rejection(&self) {
        self.daemon_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a reply nobody was waiting for
    #[inline]
    pub fn record_discarded_reply(&self) {
        self.discarded_replies.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a native passthrough
    #[inline]
    pub fn record_passthrough(&self) {
        self.passthrough_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Fraction of round trips that timed out, as a percentage
    pub fn timeout_ratio(&self) -> f32 {
        let total = self.daemon_round_trips.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        (self.daemon_timeouts.load(Ordering::Relaxed) as f32 / total as f32) * 100.0
    }

    /// Generate a statistics snapshot
    pub fn report(&self) -> ShimReport {
        ShimReport {
            setsockopt_calls: self.setsockopt_calls.load(Ordering::Relaxed),
            getsockopt_calls: self.getsockopt_calls.load(Ordering::Relaxed),
            daemon_round_trips: self.daemon_round_trips.load(Ordering::Relaxed),
            daemon_timeouts: self.daemon_timeouts.load(Ordering::Relaxed),
            daemon_rejections: self.daemon_rejections.load(Ordering::Relaxed),
            discarded_replies: self.discarded_replies.load(Ordering::Relaxed),
            passthrough_calls: self.passthrough_calls.load(Ordering::Relaxed),
            timeout_ratio: self.timeout_ratio(),
        }
    }
}

/// Statistics snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct ShimReport {
    /// Intercepted setsockopt calls
    pub setsockopt_calls: u64,
    /// Intercepted getsockopt calls
    pub getsockopt_calls: u64,
    /// Notifications sent to the daemon
    pub daemon_round_trips: u64,
    /// Round trips that hit the response bound
    pub daemon_timeouts: u64,
    /// Round trips answered with a non-zero status
    pub daemon_rejections: u64,
    /// Replies that found no waiting call
    pub discarded_replies: u64,
    /// Calls forwarded to the native implementation
    pub passthrough_calls: u64,
    /// Timeout percentage
    pub timeout_ratio: f32,
}
