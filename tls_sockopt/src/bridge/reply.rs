//! Reply delivery
//!
//! Called by the channel on whatever thread the daemon's answer arrives.

use alloc::sync::Arc;

use crate::bridge::pending::{CallOutcome, CallToken, DaemonReply};
use crate::socket::SocketRegistry;
use crate::{ShimStats, SockoptError};

/// Entry point for daemon replies, handed to the channel at open
#[derive(Debug, Clone)]
pub struct ReplyHandle {
    registry: Arc<SocketRegistry>,
    stats: Arc<ShimStats>,
}

impl ReplyHandle {
    pub(crate) fn new(registry: Arc<SocketRegistry>, stats: Arc<ShimStats>) -> Self {
        Self { registry, stats }
    }

    /// Deliver a bare status for `token`.
    ///
    /// Returns `true` if a waiting call received it.
    pub fn report_return(&self, token: CallToken, status: i32) -> bool {
        self.deliver(token, Ok(DaemonReply::status(status)))
    }

    /// Deliver a successful reply carrying `payload` for `token`.
    ///
    /// The payload is copied into a buffer owned by the waiting call.
    pub fn report_data_return(&self, token: CallToken, payload: &[u8]) -> bool {
        let mut data = Vec::new();
        let outcome = match data.try_reserve_exact(payload.len()) {
            Ok(()) => {
                data.extend_from_slice(payload);
                Ok(DaemonReply::with_data(data))
            }
            Err(_) => {
                log::warn!("{}: no memory for {}-byte getsockopt reply", token, payload.len());
                Err(SockoptError::OutOfMemory)
            }
        };
        self.deliver(token, outcome)
    }

    fn deliver(&self, token: CallToken, outcome: CallOutcome) -> bool {
        // The socket may already be gone.
        let Some(state) = self.registry.lookup(token.socket()) else {
            log::debug!("{}: reply for unregistered socket dropped", token);
            self.stats.record_discarded_reply();
            return false;
        };

        if state.complete_call(token.seq(), outcome) {
            log::trace!("{}: reply delivered", token);
            true
        } else {
            log::warn!("{}: late or duplicate reply discarded", token);
            self.stats.record_discarded_reply();
            false
        }
    }
}
