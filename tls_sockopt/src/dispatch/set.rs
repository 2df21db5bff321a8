//! setsockopt path

use super::{Dispatcher, NativeSetsockopt};
use crate::bridge::DaemonRequest;
use crate::options::TlsOption;
use crate::socket::SocketId;
use crate::translation::copy_from_user;
use crate::{SockoptError, SockoptResult};

impl Dispatcher<'_> {
    /// Intercepted `setsockopt`.
    ///
    /// Local checks run first and short-circuit without involving the daemon.
    /// After the daemon accepts, TLS-owned options are done; everything else
    /// is replayed on the native socket.
    pub fn setsockopt(
        &self,
        socket: SocketId,
        level: i32,
        optname: i32,
        optval: Option<&[u8]>,
        optlen: u32,
        native: Option<NativeSetsockopt>,
    ) -> SockoptResult<()> {
        self.stats.record_setsockopt();

        let Some(optval) = optval else {
            return Err(SockoptError::InvalidArgument);
        };
        if optlen == 0 {
            return Err(SockoptError::InvalidArgument);
        }
        let value = copy_from_user(Some(optval), optlen as usize)?;

        let state = self
            .registry
            .lookup(socket)
            .ok_or(SockoptError::UnknownSocket)?;

        let option = TlsOption::from_raw(optname);
        match option {
            TlsOption::Hostname => {
                state.set_hostname(&value, self.config.rejects_empty_hostname())?;
            }
            // Reserved: the daemon consumes these, nothing is kept here yet.
            TlsOption::CertificateChain | TlsOption::PrivateKey => {}
            TlsOption::PeerCertificate | TlsOption::Id | TlsOption::Passthrough(_) => {}
        }

        self.bridge.round_trip(
            &state,
            DaemonRequest::Set {
                level,
                optname,
                optval: &value,
            },
        )?;

        if option.daemon_authoritative() {
            log::trace!("{}: {} accepted by daemon", socket, option.name());
            return Ok(());
        }

        match native {
            Some(native) => {
                self.stats.record_passthrough();
                native(socket, level, optname, &value)
            }
            None => Err(SockoptError::NotSupported),
        }
    }
}
