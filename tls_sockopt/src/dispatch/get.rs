//! getsockopt path

use super::{Dispatcher, NativeGetsockopt};
use crate::bridge::DaemonRequest;
use crate::hostname::terminated_len;
use crate::options::TlsOption;
use crate::socket::{SocketId, SocketState, IDENTITY_LEN};
use crate::translation::{copy_to_user, read_user_len, write_user_len};
use crate::{SockoptError, SockoptResult};

impl Dispatcher<'_> {
    /// Intercepted `getsockopt`.
    ///
    /// `*optlen` holds the caller's buffer capacity on entry and the number of
    /// bytes produced on success.
    pub fn getsockopt(
        &self,
        socket: SocketId,
        level: i32,
        optname: i32,
        optval: Option<&mut [u8]>,
        mut optlen: Option<&mut u32>,
        native: Option<NativeGetsockopt>,
    ) -> SockoptResult<()> {
        self.stats.record_getsockopt();

        let capacity = read_user_len(optlen.as_deref())?;
        let option = TlsOption::from_raw(optname);

        match option {
            TlsOption::Hostname => {
                let state = self.lookup(socket)?;
                get_hostname(&state, capacity, optval, optlen)
            }
            TlsOption::Id => {
                self.lookup(socket)?;
                get_id(socket, capacity, optval, optlen)
            }
            TlsOption::PeerCertificate => {
                let state = self.lookup(socket)?;
                let reply = self
                    .bridge
                    .round_trip(&state, DaemonRequest::Get { level, optname })?;

                // Owned by this call from here on; dropped on every exit path.
                let data = reply.into_data().unwrap_or_default();
                let len = data.len().min(capacity as usize);
                write_user_len(optlen.as_deref_mut(), len as u32)?;
                copy_to_user(optval, &data[..len])
            }
            TlsOption::CertificateChain | TlsOption::PrivateKey | TlsOption::Passthrough(_) => {
                match native {
                    Some(native) => {
                        self.stats.record_passthrough();
                        native(socket, level, optname, optval, optlen)
                    }
                    None => Err(SockoptError::NotSupported),
                }
            }
        }
    }

    fn lookup(&self, socket: SocketId) -> SockoptResult<alloc::sync::Arc<SocketState>> {
        self.registry
            .lookup(socket)
            .ok_or(SockoptError::UnknownSocket)
    }
}

/// Copy the stored hostname out.
///
/// Unlike every other retrieval path this one never truncates: a buffer
/// shorter than the terminated hostname is `InvalidArgument`.
fn get_hostname(
    state: &SocketState,
    capacity: u32,
    optval: Option<&mut [u8]>,
    optlen: Option<&mut u32>,
) -> SockoptResult<()> {
    state.with_hostname(|hostname| {
        let hostname = hostname.ok_or(SockoptError::TransferFault)?;
        let len = terminated_len(hostname);
        if (capacity as usize) < len {
            return Err(SockoptError::InvalidArgument);
        }
        let bytes = hostname.get(..len).ok_or(SockoptError::TransferFault)?;
        copy_to_user(optval, bytes)?;
        write_user_len(optlen, len as u32)
    })
}

/// Copy the opaque identity out, silently truncated to the caller's capacity.
fn get_id(
    socket: SocketId,
    capacity: u32,
    optval: Option<&mut [u8]>,
    optlen: Option<&mut u32>,
) -> SockoptResult<()> {
    let identity = socket.to_bytes();
    let len = IDENTITY_LEN.min(capacity as usize);
    write_user_len(optlen, len as u32)?;
    copy_to_user(optval, &identity[..len])
}
