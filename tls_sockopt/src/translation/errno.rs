//! Error Code Translation (sockopt errors ↔ POSIX errno)
//!
//! Subset of the x86_64 Linux errno table reachable from the TLS option paths.

use crate::SockoptError;

/// POSIX errno codes
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errno {
    /// Success (not actually an error)
    ESUCCESS = 0,
    /// I/O error
    EIO = 5,
    /// Bad file descriptor
    EBADF = 9,
    /// Cannot allocate memory
    ENOMEM = 12,
    /// Bad address
    EFAULT = 14,
    /// Invalid argument
    EINVAL = 22,
    /// Operation not supported on transport endpoint
    EOPNOTSUPP = 95,
    /// No buffer space available
    ENOBUFS = 105,
    /// Transport endpoint is already connected
    EISCONN = 106,
}

impl Errno {
    /// Convert to i32 (for syscall return)
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Convert from i32
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::ESUCCESS),
            5 => Some(Self::EIO),
            9 => Some(Self::EBADF),
            12 => Some(Self::ENOMEM),
            14 => Some(Self::EFAULT),
            22 => Some(Self::EINVAL),
            95 => Some(Self::EOPNOTSUPP),
            105 => Some(Self::ENOBUFS),
            106 => Some(Self::EISCONN),
            _ => None,
        }
    }
}

/// Convert a local sockopt error to errno.
///
/// Daemon and native statuses are opaque; they map to `None` when the value is
/// outside this table.
pub fn sockopt_error_to_errno(err: &SockoptError) -> Option<Errno> {
    match err {
        SockoptError::InvalidArgument => Some(Errno::EINVAL),
        SockoptError::AlreadyConnected => Some(Errno::EISCONN),
        SockoptError::TransferFault => Some(Errno::EFAULT),
        SockoptError::OutOfMemory => Some(Errno::ENOMEM),
        // Reported as a local buffer shortage, not as the daemon outage it is.
        SockoptError::DaemonUnresponsive { .. } => Some(Errno::ENOBUFS),
        SockoptError::NotSupported => Some(Errno::EOPNOTSUPP),
        SockoptError::UnknownSocket => Some(Errno::EBADF),
        SockoptError::DaemonRejected(status) | SockoptError::Native(status) => {
            Errno::from_i32(status.saturating_abs())
        }
    }
}

/// Get error string description
pub fn strerror(errno: Errno) -> &'static str {
    match errno {
        Errno::ESUCCESS => "Success",
        Errno::EIO => "Input/output error",
        Errno::EBADF => "Bad file descriptor",
        Errno::ENOMEM => "Cannot allocate memory",
        Errno::EFAULT => "Bad address",
        Errno::EINVAL => "Invalid argument",
        Errno::EOPNOTSUPP => "Operation not supported",
        Errno::ENOBUFS => "No buffer space available",
        Errno::EISCONN => "Transport endpoint is already connected",
    }
}
