//! File-backed snapshot store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rocket_cart_core::Cart;
use tracing::{debug, instrument};

use super::{CartStore, StoreError, decode_snapshot, encode_snapshot};

/// Stores the snapshot for `key` at `<dir>/<key>.json`.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// snapshot, so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            path: dir.join(format!("{key}.json")),
            tmp_path: dir.join(format!(".{key}.json.tmp")),
        }
    }

    /// Location of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CartStore for FileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Option<Cart>, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No snapshot found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        decode_snapshot(&raw).map(Some)
    }

    #[instrument(skip(self, cart), fields(path = %self.path.display(), items = cart.len()))]
    async fn save(&self, cart: &Cart) -> Result<(), StoreError> {
        let raw = encode_snapshot(cart)?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.tmp_path, raw).await?;
        tokio::fs::rename(&self.tmp_path, &self.path).await?;
        debug!("Snapshot written");
        Ok(())
    }
}
