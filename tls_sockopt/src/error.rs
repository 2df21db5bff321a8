//! TLS sockopt error types

use thiserror::Error;

use crate::translation::errno::{sockopt_error_to_errno, Errno};

/// Result type for every option path
pub type SockoptResult<T> = core::result::Result<T, SockoptError>;

/// Failure of an intercepted socket-option call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SockoptError {
    /// Null/empty value, oversized or malformed hostname, short output buffer
    #[error("invalid argument")]
    InvalidArgument,
    /// Hostname changed after the connection was established
    #[error("socket is already connected")]
    AlreadyConnected,
    /// Copy between caller and shim buffers failed, or no hostname is set
    #[error("bad address")]
    TransferFault,
    /// Allocation of a value or response buffer failed
    #[error("out of memory")]
    OutOfMemory,
    /// The daemon did not answer within the response bound
    #[error("TLS daemon did not respond within {waited_ms} ms")]
    DaemonUnresponsive {
        /// Bound that elapsed
        waited_ms: u64,
    },
    /// The daemon refused the option; its status is carried verbatim
    #[error("TLS daemon rejected the option (status {0})")]
    DaemonRejected(i32),
    /// No native handler exists for a passthrough option
    #[error("option not supported")]
    NotSupported,
    /// The socket has no TLS state registered
    #[error("socket not registered with the TLS shim")]
    UnknownSocket,
    /// Status returned by the native socket implementation, verbatim
    #[error("native socket option handler failed (status {0})")]
    Native(i32),
}

impl SockoptError {
    /// Convert to POSIX errno value
    ///
    /// Opaque daemon/native statuses outside the errno table fall back to `EIO`.
    pub fn to_errno(&self) -> i32 {
        match sockopt_error_to_errno(self) {
            Some(errno) => errno.as_i32(),
            None => Errno::EIO.as_i32(),
        }
    }

    /// Return value a hooked `setsockopt`/`getsockopt` hands back.
    ///
    /// Local failures become `-errno`; daemon and native statuses are already in
    /// return-code form and pass through untouched.
    pub fn as_return_code(&self) -> i32 {
        match self {
            SockoptError::DaemonRejected(status) | SockoptError::Native(status) => *status,
            _ => -self.to_errno(),
        }
    }

    /// Whether the failure came from the daemon side of the bridge
    pub fn is_daemon_failure(&self) -> bool {
        matches!(
            self,
            SockoptError::DaemonUnresponsive { .. } | SockoptError::DaemonRejected(_)
        )
    }
}

/// Collapse a call result into a syscall-style return code.
pub fn to_return_code(result: SockoptResult<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => err.as_return_code(),
    }
}
