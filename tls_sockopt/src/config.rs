//! TLS Shim Runtime Configuration
//!
//! Tunables read on every call; safe to adjust while calls are in flight.

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use core::time::Duration;

use crate::{SockoptError, SockoptResult};

/// Default bound on a daemon round trip (milliseconds)
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 10_000;

/// Runtime configuration for the shim
#[derive(Debug)]
pub struct ShimConfig {
    /// Bound on every daemon round trip (milliseconds)
    response_timeout_ms: AtomicU64,

    /// Refuse `SO_HOSTNAME` values that are only a terminator
    reject_empty_hostname: AtomicBool,
}

impl ShimConfig {
    /// Create default configuration
    pub const fn new() -> Self {
        Self {
            response_timeout_ms: AtomicU64::new(DEFAULT_RESPONSE_TIMEOUT_MS),
            reject_empty_hostname: AtomicBool::new(false),
        }
    }

    /// Set the daemon response bound
    pub fn set_response_timeout(&self, timeout: Duration) {
        let ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.response_timeout_ms.store(ms, Ordering::Relaxed);
        log::info!("TLS daemon response timeout set to: {} ms", ms);
    }

    /// Get the daemon response bound
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms.load(Ordering::Relaxed))
    }

    /// Enable/disable rejection of the empty hostname
    pub fn set_reject_empty_hostname(&self, enabled: bool) {
        self.reject_empty_hostname.store(enabled, Ordering::Relaxed);
        log::info!(
            "Empty SO_HOSTNAME: {}",
            if enabled { "rejected" } else { "accepted" }
        );
    }

    /// Check if the empty hostname is rejected
    pub fn rejects_empty_hostname(&self) -> bool {
        self.reject_empty_hostname.load(Ordering::Relaxed)
    }

    /// Load configuration from a boot/command-line style string
    ///
    /// Example: `tls.timeout_ms=500 tls.reject_empty_hostname=1`.
    /// Keys outside the `tls.` namespace are ignored; unknown `tls.` keys and
    /// malformed values are rejected before anything is applied.
    pub fn load_from_cmdline(&self, cmdline: &str) -> SockoptResult<()> {
        let mut timeout_ms = None;
        let mut reject_empty = None;

        for param in cmdline.split_whitespace() {
            let Some(param) = param.strip_prefix("tls.") else {
                continue;
            };
            let (key, value) = param.split_once('=').ok_or(SockoptError::InvalidArgument)?;
            match key {
                "timeout_ms" => {
                    timeout_ms = Some(value.parse::<u64>().map_err(|_| SockoptError::InvalidArgument)?);
                }
                "reject_empty_hostname" => {
                    reject_empty = Some(parse_flag(value)?);
                }
                _ => {
                    log::warn!("Unknown TLS shim parameter: tls.{}", key);
                    return Err(SockoptError::InvalidArgument);
                }
            }
        }

        if let Some(ms) = timeout_ms {
            self.set_response_timeout(Duration::from_millis(ms));
        }
        if let Some(enabled) = reject_empty {
            self.set_reject_empty_hostname(enabled);
        }
        log::debug!("Loaded TLS shim config: {}", self.export_config());
        Ok(())
    }

    /// Export configuration as string
    pub fn export_config(&self) -> String {
        format!(
            "timeout={}ms, reject_empty_hostname={}",
            self.response_timeout_ms.load(Ordering::Relaxed),
            self.rejects_empty_hostname()
        )
    }
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_flag(value: &str) -> SockoptResult<bool> {
    match value {
        "1" | "true" | "on" => Ok(true),
        "0" | "false" | "off" => Ok(false),
        _ => Err(SockoptError::InvalidArgument),
    }
}
