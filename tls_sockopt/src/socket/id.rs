//! Socket and daemon identifiers

use core::fmt;

/// Size of the opaque identity returned by `SO_ID`
pub const IDENTITY_LEN: usize = 16;

/// Opaque socket identity
///
/// `handle` comes from a per-registry counter and is never reused;
/// `generation` names the registry that minted it, so ids outliving a
/// teardown never resolve in the next registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SocketId {
    handle: u64,
    generation: u64,
}

impl SocketId {
    /// Create an id from its parts
    #[inline]
    pub const fn from_parts(handle: u64, generation: u64) -> Self {
        Self { handle, generation }
    }

    /// Registry-local handle
    #[inline]
    pub const fn handle(&self) -> u64 {
        self.handle
    }

    /// Minting registry generation
    #[inline]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Opaque identity bytes (native endian, handle then generation)
    pub fn to_bytes(&self) -> [u8; IDENTITY_LEN] {
        let mut out = [0u8; IDENTITY_LEN];
        out[..8].copy_from_slice(&self.handle.to_ne_bytes());
        out[8..].copy_from_slice(&self.generation.to_ne_bytes());
        out
    }

    /// Rebuild an id from `SO_ID` bytes
    pub fn from_bytes(bytes: [u8; IDENTITY_LEN]) -> Self {
        let mut handle = [0u8; 8];
        let mut generation = [0u8; 8];
        handle.copy_from_slice(&bytes[..8]);
        generation.copy_from_slice(&bytes[8..]);
        Self {
            handle: u64::from_ne_bytes(handle),
            generation: u64::from_ne_bytes(generation),
        }
    }
}

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sock#{}.{}", self.handle, self.generation)
    }
}

/// Daemon instance serving a socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct DaemonId(u32);

impl DaemonId {
    /// Create from raw value
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get raw value
    #[inline]
    pub const fn as_raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for DaemonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "daemon#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_bytes_round_trip() {
        let id = SocketId::from_parts(0x0102_0304_0506_0708, 42);
        assert_eq!(SocketId::from_bytes(id.to_bytes()), id);
        assert_eq!(id.to_string(), format!("sock#{}.42", 0x0102_0304_0506_0708u64));
    }

    #[test]
    fn test_generation_distinguishes_ids() {
        assert_ne!(SocketId::from_parts(1, 1), SocketId::from_parts(1, 2));
    }
}
