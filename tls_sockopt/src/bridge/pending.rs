//! Pending daemon calls
//!
//! A call is one token plus one single-shot completion. The completion's
//! sending half sits in the socket's pending table until a reply (or
//! teardown) consumes it; the receiving half stays with the waiting thread.

use core::fmt;
use core::time::Duration;
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender};

use crate::socket::SocketId;
use crate::SockoptResult;

/// Correlation token carried by a notification and echoed by its reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallToken {
    socket: SocketId,
    seq: u64,
}

impl CallToken {
    /// Create a token
    #[inline]
    pub const fn new(socket: SocketId, seq: u64) -> Self {
        Self { socket, seq }
    }

    /// Socket the call was issued on
    #[inline]
    pub const fn socket(&self) -> SocketId {
        self.socket
    }

    /// Per-socket call sequence number
    #[inline]
    pub const fn seq(&self) -> u64 {
        self.seq
    }
}

impl fmt::Display for CallToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/call#{}", self.socket, self.seq)
    }
}

/// Reply from the daemon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonReply {
    status: i32,
    data: Option<Vec<u8>>,
}

impl DaemonReply {
    /// Bare status reply
    pub fn status(status: i32) -> Self {
        Self { status, data: None }
    }

    /// Successful reply carrying a payload
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            status: 0,
            data: Some(data),
        }
    }

    /// Daemon status (0 on success)
    pub fn code(&self) -> i32 {
        self.status
    }

    /// Payload, if the reply carried one
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Take ownership of the payload
    pub fn into_data(self) -> Option<Vec<u8>> {
        self.data
    }
}

/// What a completion delivers
pub(crate) type CallOutcome = SockoptResult<DaemonReply>;

/// Sending half of a completion
pub(crate) type Completion = SyncSender<CallOutcome>;

/// Call awaiting its reply
#[derive(Debug)]
pub(crate) struct PendingCall {
    token: CallToken,
    rx: Receiver<CallOutcome>,
}

impl PendingCall {
    pub(crate) fn new(token: CallToken, rx: Receiver<CallOutcome>) -> Self {
        Self { token, rx }
    }

    pub(crate) fn token(&self) -> CallToken {
        self.token
    }

    /// Block until the reply lands or `timeout` elapses
    pub(crate) fn wait(&self, timeout: Duration) -> Result<CallOutcome, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}
