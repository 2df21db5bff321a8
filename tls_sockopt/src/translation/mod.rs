//! # Translation - Sockopt Errors and User Buffers
//!
//! Two boundaries separate this layer from the application:
//!
//! - **errno**: every [`SockoptError`](crate::SockoptError) surfaces to the
//!   application as a POSIX errno (or an opaque status passed through verbatim).
//! - **uaccess**: option values cross in and out through caller-provided
//!   buffers whose declared length may disagree with what was really supplied.

pub mod errno;
pub mod uaccess;

pub use errno::{sockopt_error_to_errno, strerror, Errno};
pub use uaccess::{copy_from_user, copy_to_user, read_user_len, write_user_len};
