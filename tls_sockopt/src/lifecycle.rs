//! TLS Shim Lifecycle
//!
//! Owns the registry, the bridge and the channel for the lifetime of the
//! subsystem. Setup opens the channel only once the registry exists;
//! teardown drains the registry before the channel closes, so no reply
//! callback can reach released state.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::bridge::{CallBridge, ReplyHandle};
use crate::channel::NotificationChannel;
use crate::config::ShimConfig;
use crate::dispatch::{Dispatcher, NativeGetsockopt, NativeSetsockopt};
use crate::socket::{DaemonId, SocketId, SocketRegistry};
use crate::{ShimStats, SockoptError, SockoptResult, VERSION};

/// The TLS socket-option subsystem
pub struct TlsShim {
    registry: Arc<SocketRegistry>,
    channel: Arc<dyn NotificationChannel>,
    bridge: CallBridge,
    config: Arc<ShimConfig>,
    stats: Arc<ShimStats>,
    shut_down: AtomicBool,
}

impl TlsShim {
    /// Initialize the subsystem and open the daemon channel
    ///
    /// # Errors
    ///
    /// Propagates the channel's open failure; nothing is left running.
    pub fn setup(channel: Arc<dyn NotificationChannel>, config: ShimConfig) -> SockoptResult<Self> {
        log::info!("TLS sockopt shim v{} initializing...", VERSION);

        let registry = Arc::new(SocketRegistry::new());
        let config = Arc::new(config);
        let stats = Arc::new(ShimStats::new());
        log::debug!("  ✓ Socket registry ready (generation {})", registry.generation());

        channel.open(ReplyHandle::new(Arc::clone(&registry), Arc::clone(&stats)))?;
        log::debug!("  ✓ Daemon channel open");

        let bridge = CallBridge::new(Arc::clone(&channel), Arc::clone(&config), Arc::clone(&stats));
        log::info!("✓ TLS sockopt shim ready: {}", config.export_config());

        Ok(Self {
            registry,
            channel,
            bridge,
            config,
            stats,
            shut_down: AtomicBool::new(false),
        })
    }

    /// Drain every socket and close the daemon channel
    pub fn teardown(self) {
        self.shutdown();
    }

    fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }
        log::info!("Shutting down TLS sockopt shim...");

        let drained = self.registry.drain_all();
        log::debug!("  ✓ Released {} sockets", drained);

        self.channel.close();
        log::info!("✓ TLS sockopt shim shutdown complete");
    }

    /// Create TLS state for a new socket served by `daemon_id`
    pub fn register_socket(&self, daemon_id: DaemonId) -> SocketId {
        let id = self.registry.create(daemon_id).id();
        log::debug!("{}: registered with {}", id, daemon_id);
        id
    }

    /// Flag a socket as connected; its hostname is frozen from now on
    pub fn mark_connected(&self, socket: SocketId) -> SockoptResult<()> {
        let state = self
            .registry
            .lookup(socket)
            .ok_or(SockoptError::UnknownSocket)?;
        state.mark_connected();
        Ok(())
    }

    /// Drop a socket's TLS state, failing any call still waiting on it
    pub fn unregister_socket(&self, socket: SocketId) -> SockoptResult<()> {
        let state = self
            .registry
            .remove(socket)
            .ok_or(SockoptError::UnknownSocket)?;
        let released = state.release();
        log::debug!(
            "{}: unregistered ({} pending calls failed)",
            socket,
            released.failed_calls
        );
        Ok(())
    }

    /// Intercepted `setsockopt`; see [`Dispatcher::setsockopt`]
    pub fn setsockopt(
        &self,
        socket: SocketId,
        level: i32,
        optname: i32,
        optval: Option<&[u8]>,
        optlen: u32,
        native: Option<NativeSetsockopt>,
    ) -> SockoptResult<()> {
        self.dispatcher()
            .setsockopt(socket, level, optname, optval, optlen, native)
    }

    /// Intercepted `getsockopt`; see [`Dispatcher::getsockopt`]
    pub fn getsockopt(
        &self,
        socket: SocketId,
        level: i32,
        optname: i32,
        optval: Option<&mut [u8]>,
        optlen: Option<&mut u32>,
        native: Option<NativeGetsockopt>,
    ) -> SockoptResult<()> {
        self.dispatcher()
            .getsockopt(socket, level, optname, optval, optlen, native)
    }

    /// Reply entry point, for channels that need another handle after open
    pub fn reply_handle(&self) -> ReplyHandle {
        ReplyHandle::new(Arc::clone(&self.registry), Arc::clone(&self.stats))
    }

    /// Socket registry
    pub fn registry(&self) -> &SocketRegistry {
        &self.registry
    }

    /// Runtime configuration
    pub fn config(&self) -> &ShimConfig {
        &self.config
    }

    /// Call statistics
    pub fn stats(&self) -> &ShimStats {
        &self.stats
    }

    fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(&self.registry, &self.bridge, &self.config, &self.stats)
    }
}

impl Drop for TlsShim {
    fn drop(&mut self) {
        self.shutdown();
    }
}
