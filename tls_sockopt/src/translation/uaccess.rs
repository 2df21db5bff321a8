//! User buffer transfer
//!
//! Models `copy_from_user`/`copy_to_user` over caller slices: an absent buffer
//! or a declared length running past the supplied slice is a transfer fault.

use crate::{SockoptError, SockoptResult};

/// Copy `len` bytes of an option value into an owned buffer.
///
/// The declared length is authoritative; the slice only bounds what is
/// actually readable.
pub fn copy_from_user(src: Option<&[u8]>, len: usize) -> SockoptResult<Vec<u8>> {
    let src = src.ok_or(SockoptError::TransferFault)?;
    let readable = src.get(..len).ok_or(SockoptError::TransferFault)?;

    let mut owned = Vec::new();
    owned
        .try_reserve_exact(len)
        .map_err(|_| SockoptError::OutOfMemory)?;
    owned.extend_from_slice(readable);
    Ok(owned)
}

/// Copy `src` into the head of a caller buffer.
pub fn copy_to_user(dst: Option<&mut [u8]>, src: &[u8]) -> SockoptResult<()> {
    let dst = dst.ok_or(SockoptError::TransferFault)?;
    let writable = dst
        .get_mut(..src.len())
        .ok_or(SockoptError::TransferFault)?;
    writable.copy_from_slice(src);
    Ok(())
}

/// Read the caller-declared option length (`get_user`).
#[inline]
pub fn read_user_len(optlen: Option<&u32>) -> SockoptResult<u32> {
    optlen.copied().ok_or(SockoptError::TransferFault)
}

/// Report the produced option length back to the caller (`put_user`).
#[inline]
pub fn write_user_len(optlen: Option<&mut u32>, len: u32) -> SockoptResult<()> {
    let slot = optlen.ok_or(SockoptError::TransferFault)?;
    *slot = len;
    Ok(())
}
