//! In-memory snapshot store.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use rocket_cart_core::Cart;

use super::{CartStore, StoreError, decode_snapshot, encode_snapshot};

/// Keeps the serialized snapshot in memory.
///
/// The snapshot goes through the same encode/decode path as [`super::FileStore`],
/// so round-trip behavior is identical. Clones share the snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryStoreInner>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    snapshot: Mutex<Option<String>>,
    read_only: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing raw snapshot.
    #[must_use]
    pub fn with_snapshot(raw: impl Into<String>) -> Self {
        let store = Self::new();
        *store.snapshot() = Some(raw.into());
        store
    }

    /// The raw stored snapshot, if any.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.snapshot().clone()
    }

    /// Number of successful saves.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Refuse (or accept again) all further writes.
    pub fn set_read_only(&self, read_only: bool) {
        self.inner.read_only.store(read_only, Ordering::SeqCst);
    }

    fn snapshot(&self) -> MutexGuard<'_, Option<String>> {
        self.inner
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn load(&self) -> Result<Option<Cart>, StoreError> {
        self.raw().as_deref().map(decode_snapshot).transpose()
    }

    async fn save(&self, cart: &Cart) -> Result<(), StoreError> {
        if self.inner.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::ReadOnly);
        }
        let raw = encode_snapshot(cart)?;
        *self.snapshot() = Some(raw);
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
