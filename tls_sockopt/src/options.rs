//! TLS socket option codes
//!
//! Numbering follows the TLS socket API header shared with the daemon.

/// Protocol level for TLS sockets
pub const IPPROTO_TLS: i32 = 205;

/// Hostname used for SNI and certificate name checks (set/get)
pub const SO_HOSTNAME: i32 = 85;
/// Peer certificate chain, answered by the daemon (get)
pub const SO_PEER_CERTIFICATE: i32 = 86;
/// Local certificate chain (set, reserved)
pub const SO_CERTIFICATE_CHAIN: i32 = 87;
/// Local private key (set, reserved)
pub const SO_PRIVATE_KEY: i32 = 88;
/// Opaque socket identity (get)
pub const SO_ID: i32 = 89;

/// Option code as seen by the dispatchers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TlsOption {
    /// `SO_HOSTNAME`
    Hostname,
    /// `SO_PEER_CERTIFICATE`
    PeerCertificate,
    /// `SO_CERTIFICATE_CHAIN`
    CertificateChain,
    /// `SO_PRIVATE_KEY`
    PrivateKey,
    /// `SO_ID`
    Id,
    /// Anything else; handled by the native implementation
    Passthrough(i32),
}

impl TlsOption {
    /// Classify a raw option code
    pub const fn from_raw(optname: i32) -> Self {
        match optname {
            SO_HOSTNAME => TlsOption::Hostname,
            SO_PEER_CERTIFICATE => TlsOption::PeerCertificate,
            SO_CERTIFICATE_CHAIN => TlsOption::CertificateChain,
            SO_PRIVATE_KEY => TlsOption::PrivateKey,
            SO_ID => TlsOption::Id,
            other => TlsOption::Passthrough(other),
        }
    }

    /// Raw option code
    pub const fn as_raw(&self) -> i32 {
        match self {
            TlsOption::Hostname => SO_HOSTNAME,
            TlsOption::PeerCertificate => SO_PEER_CERTIFICATE,
            TlsOption::CertificateChain => SO_CERTIFICATE_CHAIN,
            TlsOption::PrivateKey => SO_PRIVATE_KEY,
            TlsOption::Id => SO_ID,
            TlsOption::Passthrough(raw) => *raw,
        }
    }

    /// On a successful set, the daemon's answer is final and the native
    /// socket is never touched.
    pub const fn daemon_authoritative(&self) -> bool {
        matches!(
            self,
            TlsOption::Hostname | TlsOption::CertificateChain | TlsOption::PrivateKey
        )
    }

    /// Retrieval requires a round trip to the daemon
    pub const fn daemon_backed_get(&self) -> bool {
        matches!(self, TlsOption::PeerCertificate)
    }

    /// Name for logging
    pub const fn name(&self) -> &'static str {
        match self {
            TlsOption::Hostname => "SO_HOSTNAME",
            TlsOption::PeerCertificate => "SO_PEER_CERTIFICATE",
            TlsOption::CertificateChain => "SO_CERTIFICATE_CHAIN",
            TlsOption::PrivateKey => "SO_PRIVATE_KEY",
            TlsOption::Id => "SO_ID",
            TlsOption::Passthrough(_) => "passthrough",
        }
    }
}
