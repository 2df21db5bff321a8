//! Host string validation (RFC 952 / RFC 1123 character set)

/// Maximum hostname length, terminator included
pub const MAX_HOST_LEN: usize = 255;

/// Check a terminated host string.
///
/// `buf.len()` counts the trailing NUL. Every byte before it must be ASCII
/// alphanumeric, `-` or `.`. A lone terminator (the empty hostname) passes;
/// an empty buffer does not.
pub fn is_valid_host_string(buf: &[u8]) -> bool {
    let Some((&last, body)) = buf.split_last() else {
        return false;
    };
    body.iter().all(|&c| c.is_ascii_alphanumeric() || c == b'-' || c == b'.') && last == 0
}

/// Length a stored hostname reports on retrieval: content up to the first
/// NUL (bounded by [`MAX_HOST_LEN`]) plus the terminator.
pub fn terminated_len(stored: &[u8]) -> usize {
    let bound = stored.len().min(MAX_HOST_LEN);
    let content = stored[..bound].iter().position(|&c| c == 0).unwrap_or(bound);
    content + 1
}
