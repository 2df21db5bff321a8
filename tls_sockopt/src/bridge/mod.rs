//! # Synchronous Call Bridge
//!
//! Turns one blocking option call into one round trip over the asynchronous
//! daemon channel.
//!
//! ```text
//!   caller thread                          channel thread
//!   ─────────────                          ──────────────
//!   begin_call()  ── token, completion ──┐
//!   send_*(token) ───────────────────────┼──────▶ daemon
//!   wait(timeout) ◀─── completion ───────┤
//!        │                               └──── report_*(token) ◀── daemon
//!        ├─ reply in time → status 0 → Ok(reply)
//!        │                  status ≠ 0 → DaemonRejected(status)
//!        └─ timeout → abandon_call(token) → DaemonUnresponsive
//!                     (a later reply finds no completion and is dropped)
//! ```

pub mod pending;
pub mod reply;

pub use pending::{CallToken, DaemonReply};
pub use reply::ReplyHandle;

pub(crate) use pending::{CallOutcome, Completion, PendingCall};

use alloc::sync::Arc;
use std::sync::mpsc::RecvTimeoutError;

use crate::channel::{GetsockoptNotification, NotificationChannel, SetsockoptNotification};
use crate::config::ShimConfig;
use crate::socket::SocketState;
use crate::{ShimStats, SockoptError, SockoptResult};

/// Request carried to the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonRequest<'a> {
    /// `setsockopt` with its copied-in value
    Set {
        /// Option level
        level: i32,
        /// Option code
        optname: i32,
        /// Option value
        optval: &'a [u8],
    },
    /// `getsockopt`; the daemon supplies the value
    Get {
        /// Option level
        level: i32,
        /// Option code
        optname: i32,
    },
}

/// Drives daemon round trips
pub struct CallBridge {
    channel: Arc<dyn NotificationChannel>,
    config: Arc<ShimConfig>,
    stats: Arc<ShimStats>,
}

impl CallBridge {
    /// Create a bridge over `channel`
    pub fn new(
        channel: Arc<dyn NotificationChannel>,
        config: Arc<ShimConfig>,
        stats: Arc<ShimStats>,
    ) -> Self {
        Self {
            channel,
            config,
            stats,
        }
    }

    /// Send `request` for `state` and block for the daemon's answer.
    ///
    /// Succeeds only on a zero daemon status; the reply (and any payload it
    /// carries) then belongs to the caller.
    pub fn round_trip(
        &self,
        state: &SocketState,
        request: DaemonRequest<'_>,
    ) -> SockoptResult<DaemonReply> {
        let call = state.begin_call();
        let token = call.token();
        let daemon_id = state.daemon_id();

        match request {
            DaemonRequest::Set {
                level,
                optname,
                optval,
            } => {
                log::debug!("{}: setsockopt({}, {}) -> {}", token, level, optname, daemon_id);
                self.channel.send_setsockopt(SetsockoptNotification {
                    token,
                    level,
                    optname,
                    optval,
                    daemon_id,
                });
            }
            DaemonRequest::Get { level, optname } => {
                log::debug!("{}: getsockopt({}, {}) -> {}", token, level, optname, daemon_id);
                self.channel.send_getsockopt(GetsockoptNotification {
                    token,
                    level,
                    optname,
                    daemon_id,
                });
            }
        }
        self.stats.record_round_trip();

        let timeout = self.config.response_timeout();
        let waited_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let outcome = match call.wait(timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                state.abandon_call(token.seq());
                self.stats.record_timeout();
                log::warn!("{}: {} silent for {} ms", token, daemon_id, waited_ms);
                return Err(SockoptError::DaemonUnresponsive { waited_ms });
            }
            Err(RecvTimeoutError::Disconnected) => {
                log::debug!("{}: call failed by teardown", token);
                return Err(SockoptError::DaemonUnresponsive { waited_ms });
            }
        };

        let reply = outcome?;
        if reply.code() != 0 {
            self.stats.record_rejection();
            log::debug!("{}: daemon status {}", token, reply.code());
            return Err(SockoptError::DaemonRejected(reply.code()));
        }
        Ok(reply)
    }
}
