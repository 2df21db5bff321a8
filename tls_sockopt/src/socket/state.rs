//! Per-socket TLS state
//!
//! One record per socket known to the shim: the stored hostname, the
//! connection flag, the serving daemon and the table of calls awaiting a
//! daemon reply.

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc;

use hashbrown::HashMap;
use spin::Mutex;

use crate::bridge::{CallOutcome, CallToken, Completion, PendingCall};
use crate::hostname::{self, MAX_HOST_LEN};
use crate::socket::id::{DaemonId, SocketId};
use crate::{SockoptError, SockoptResult};

/// TLS metadata attached to one socket
#[derive(Debug)]
pub struct SocketState {
    /// Registry key
    id: SocketId,
    /// Daemon handling this socket's notifications
    daemon_id: DaemonId,
    /// Set once the handshake has completed
    connected: AtomicBool,
    /// Terminated hostname, replaced wholesale on every update
    hostname: Mutex<Option<Vec<u8>>>,
    /// In-flight daemon calls (call sequence -> completion)
    pending: Mutex<HashMap<u64, Completion>>,
    /// Next call sequence
    next_seq: AtomicU64,
}

impl SocketState {
    /// Create state for a fresh socket
    pub fn new(id: SocketId, daemon_id: DaemonId) -> Self {
        Self {
            id,
            daemon_id,
            connected: AtomicBool::new(false),
            hostname: Mutex::new(None),
            pending: Mutex::new(HashMap::new()),
            next_seq: AtomicU64::new(1),
        }
    }

    /// Registry key of this socket
    #[inline]
    pub fn id(&self) -> SocketId {
        self.id
    }

    /// Daemon serving this socket
    #[inline]
    pub fn daemon_id(&self) -> DaemonId {
        self.daemon_id
    }

    /// Record that the connection handshake completed
    pub fn mark_connected(&self) {
        self.connected.store(true, Ordering::Release);
    }

    /// Check the connection flag
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Store a new `SO_HOSTNAME` value.
    ///
    /// `value` includes its terminator. The previous hostname stays in place
    /// unless every check passes.
    pub fn set_hostname(&self, value: &[u8], reject_empty: bool) -> SockoptResult<()> {
        if self.is_connected() {
            return Err(SockoptError::AlreadyConnected);
        }
        if value.len() > MAX_HOST_LEN {
            return Err(SockoptError::InvalidArgument);
        }
        if !hostname::is_valid_host_string(value) || (reject_empty && value.len() == 1) {
            return Err(SockoptError::InvalidArgument);
        }

        let mut stored = Vec::new();
        stored
            .try_reserve_exact(value.len())
            .map_err(|_| SockoptError::OutOfMemory)?;
        stored.extend_from_slice(value);

        *self.hostname.lock() = Some(stored);
        log::trace!("{}: hostname set ({} bytes)", self.id, value.len());
        Ok(())
    }

    /// Run `f` against the stored hostname, if any
    pub fn with_hostname<R>(&self, f: impl FnOnce(Option<&[u8]>) -> R) -> R {
        let guard = self.hostname.lock();
        f(guard.as_deref())
    }

    /// Open a new daemon call on this socket.
    ///
    /// Every call gets its own sequence number and completion, so a reply can
    /// only ever reach the call it was issued for.
    pub(crate) fn begin_call(&self) -> PendingCall {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::sync_channel(1);
        self.pending.lock().insert(seq, tx);
        PendingCall::new(CallToken::new(self.id, seq), rx)
    }

    /// Deliver an outcome to the call `seq`.
    ///
    /// Returns `false` when no such call is waiting (timed out, already
    /// answered, or never issued).
    pub(crate) fn complete_call(&self, seq: u64, outcome: CallOutcome) -> bool {
        let Some(tx) = self.pending.lock().remove(&seq) else {
            return false;
        };
        // Capacity 1 and single use: only a vanished receiver can make this fail.
        tx.try_send(outcome).is_ok()
    }

    /// Forget call `seq`; a reply arriving afterwards is discarded.
    pub(crate) fn abandon_call(&self, seq: u64) {
        self.pending.lock().remove(&seq);
    }

    /// Wake every waiter with a disconnect. Returns how many were waiting.
    pub(crate) fn fail_pending(&self) -> usize {
        let drained: Vec<Completion> = self.pending.lock().drain().map(|(_, tx)| tx).collect();
        drained.len()
    }

    /// Number of calls awaiting a reply
    pub fn pending_calls(&self) -> usize {
        self.pending.lock().len()
    }

    /// Release every owned buffer and fail outstanding calls.
    pub(crate) fn release(&self) -> ReleasedBuffers {
        let hostname = self.hostname.lock().take();
        let failed_calls = self.fail_pending();
        ReleasedBuffers {
            hostname_bytes: hostname.map_or(0, |h| h.len()),
            failed_calls,
        }
    }
}

/// What [`SocketState::release`] gave back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleasedBuffers {
    /// Size of the hostname buffer dropped (0 if none was set)
    pub hostname_bytes: usize,
    /// Calls woken with a disconnect
    pub failed_calls: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::DaemonReply;

    fn state() -> SocketState {
        SocketState::new(SocketId::from_parts(1, 1), DaemonId::from_raw(7))
    }

    #[test]
    fn test_hostname_round_trip() {
        let s = state();
        s.set_hostname(b"a.example.com\0", false).unwrap();
        s.with_hostname(|h| assert_eq!(h, Some(&b"a.example.com\0"[..])));
    }

    #[test]
    fn test_hostname_length_boundary() {
        let s = state();
        let mut max = vec![b'a'; MAX_HOST_LEN - 1];
        max.push(0);
        assert_eq!(s.set_hostname(&max, false), Ok(()));

        let mut over = vec![b'a'; MAX_HOST_LEN];
        over.push(0);
        assert_eq!(s.set_hostname(&over, false), Err(SockoptError::InvalidArgument));
    }

    #[test]
    fn test_connected_socket_refuses_hostname() {
        let s = state();
        s.mark_connected();
        assert_eq!(
            s.set_hostname(b"host_with_bad_chars\0", false),
            Err(SockoptError::AlreadyConnected)
        );
        assert_eq!(s.set_hostname(b"ok\0", false), Err(SockoptError::AlreadyConnected));
    }

    #[test]
    fn test_failed_set_keeps_previous_hostname() {
        let s = state();
        s.set_hostname(b"first.example\0", false).unwrap();
        assert_eq!(
            s.set_hostname(b"bad_name\0", false),
            Err(SockoptError::InvalidArgument)
        );
        s.with_hostname(|h| assert_eq!(h, Some(&b"first.example\0"[..])));
    }

    #[test]
    fn test_empty_hostname_policy() {
        let s = state();
        assert_eq!(s.set_hostname(b"\0", false), Ok(()));
        assert_eq!(s.set_hostname(b"\0", true), Err(SockoptError::InvalidArgument));
    }

    #[test]
    fn test_call_completion_is_single_use() {
        let s = state();
        let call = s.begin_call();
        let seq = call.token().seq();
        assert_eq!(s.pending_calls(), 1);

        assert!(s.complete_call(seq, Ok(DaemonReply::status(0))));
        assert!(!s.complete_call(seq, Ok(DaemonReply::status(-1))));
        assert_eq!(s.pending_calls(), 0);
    }

    #[test]
    fn test_abandoned_call_discards_reply() {
        let s = state();
        let call = s.begin_call();
        s.abandon_call(call.token().seq());
        assert!(!s.complete_call(call.token().seq(), Ok(DaemonReply::status(0))));
    }

    #[test]
    fn test_release_drops_everything() {
        let s = state();
        s.set_hostname(b"abc\0", false).unwrap();
        let _a = s.begin_call();
        let _b = s.begin_call();
        let released = s.release();
        assert_eq!(released, ReleasedBuffers { hostname_bytes: 4, failed_calls: 2 });
        s.with_hostname(|h| assert!(h.is_none()));
        assert_eq!(s.release(), ReleasedBuffers::default());
    }
}
