//! Notification channel to the TLS daemon
//!
//! The transport itself lives outside this crate. It receives fire-and-forget
//! notifications from the bridge and hands daemon replies back through the
//! [`ReplyHandle`] it was given at [`open`](NotificationChannel::open).

use crate::bridge::{CallToken, ReplyHandle};
use crate::socket::DaemonId;
use crate::SockoptResult;

/// `setsockopt` forwarded to the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetsockoptNotification<'a> {
    /// Correlates the daemon's reply with this call
    pub token: CallToken,
    /// Option level
    pub level: i32,
    /// Option code
    pub optname: i32,
    /// Option value as copied in from the caller
    pub optval: &'a [u8],
    /// Daemon serving the socket
    pub daemon_id: DaemonId,
}

/// `getsockopt` forwarded to the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetsockoptNotification {
    /// Correlates the daemon's reply with this call
    pub token: CallToken,
    /// Option level
    pub level: i32,
    /// Option code
    pub optname: i32,
    /// Daemon serving the socket
    pub daemon_id: DaemonId,
}

/// Transport to the TLS daemon
///
/// Sends never report delivery; a lost notification shows up as a daemon
/// timeout on the waiting call.
pub trait NotificationChannel: Send + Sync {
    /// Bring the channel up. Replies must go through `replies`.
    fn open(&self, replies: ReplyHandle) -> SockoptResult<()>;

    /// Forward a `setsockopt`
    fn send_setsockopt(&self, notification: SetsockoptNotification<'_>);

    /// Forward a `getsockopt`
    fn send_getsockopt(&self, notification: GetsockoptNotification);

    /// Tear the channel down. No reply is delivered afterwards.
    fn close(&self);
}
