//! Socket State Registry
//!
//! Maps [`SocketId`] to its [`SocketState`]. Structural changes (insert,
//! remove, drain) take the write side of one lock; lookups share the read
//! side. Field access inside a state record never touches this lock.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use spin::RwLock;

use crate::socket::id::{DaemonId, SocketId};
use crate::socket::state::SocketState;

/// Generation handed to the next registry created in this process
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Registry of TLS socket state
#[derive(Debug)]
pub struct SocketRegistry {
    /// Generation stamped into every id minted here
    generation: u64,
    /// Next handle to mint (never reused)
    next_handle: AtomicU64,
    /// id -> state
    sockets: RwLock<HashMap<SocketId, Arc<SocketState>>>,
}

impl SocketRegistry {
    /// Create an empty registry with a fresh generation
    pub fn new() -> Self {
        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        log::debug!("Socket registry created (generation {})", generation);
        Self {
            generation,
            next_handle: AtomicU64::new(1),
            sockets: RwLock::new(HashMap::new()),
        }
    }

    /// Generation of this registry
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Mint an id no live or past socket of this registry has used
    pub fn allocate_id(&self) -> SocketId {
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        SocketId::from_parts(handle, self.generation)
    }

    /// Mint an id and register fresh state for it
    pub fn create(&self, daemon_id: DaemonId) -> Arc<SocketState> {
        let state = Arc::new(SocketState::new(self.allocate_id(), daemon_id));
        // Freshly minted ids cannot collide.
        let _ = self.insert(Arc::clone(&state));
        state
    }

    /// Insert state under its own id.
    ///
    /// Returns `false` and leaves the existing entry alone if the id is taken.
    pub fn insert(&self, state: Arc<SocketState>) -> bool {
        let id = state.id();
        let mut sockets = self.sockets.write();
        if sockets.contains_key(&id) {
            log::warn!("{} already registered; keeping existing state", id);
            return false;
        }
        sockets.insert(id, state);
        true
    }

    /// Find state by id
    pub fn lookup(&self, id: SocketId) -> Option<Arc<SocketState>> {
        self.sockets.read().get(&id).cloned()
    }

    /// Take ownership of a socket's state out of the registry
    pub fn remove(&self, id: SocketId) -> Option<Arc<SocketState>> {
        self.sockets.write().remove(&id)
    }

    /// Remove every entry, releasing its buffers and failing its calls.
    ///
    /// Returns the number of entries drained. Not meant to race live traffic.
    pub fn drain_all(&self) -> usize {
        let drained: HashMap<SocketId, Arc<SocketState>> =
            core::mem::take(&mut *self.sockets.write());

        let count = drained.len();
        for (id, state) in drained {
            let released = state.release();
            log::trace!(
                "{}: released {} hostname bytes, failed {} pending calls",
                id,
                released.hostname_bytes,
                released.failed_calls
            );
        }
        count
    }

    /// Number of registered sockets
    pub fn len(&self) -> usize {
        self.sockets.read().len()
    }

    /// Check if no socket is registered
    pub fn is_empty(&self) -> bool {
        self.sockets.read().is_empty()
    }
}

impl Default for SocketRegistry {
    fn default() -> Self {
        Self::new()
    }
}
