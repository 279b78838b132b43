//! Rendered PNGs on disk, keyed by the canonical request path.

use std::{
    path::{Component, Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use tracing::{debug, warn};

use crate::foundation::error::{CitizenError, CitizenResult};

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Debug)]
pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<key>.png`. Keys are relative, `/`-separated, and may not
    /// climb out of the root.
    pub fn path_for(&self, key: &str) -> CitizenResult<PathBuf> {
        let rel = Path::new(key.trim_start_matches('/'));
        let clean = !key.is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(CitizenError::cache(format!("invalid cache key '{key}'")));
        }
        Ok(self.root.join(format!("{}.png", rel.display())))
    }

    /// Cached bytes, or `None` on a miss. Read errors count as misses.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.path_for(key).ok()?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!(path = %path.display(), "cache hit");
                Some(bytes)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cache read failed");
                None
            }
        }
    }

    /// Write through a temp file in the same directory, then rename, so a
    /// reader never sees a partial PNG.
    pub async fn put(&self, key: &str, bytes: &[u8]) -> CitizenResult<PathBuf> {
        let path = self.path_for(key)?;
        let dir = path
            .parent()
            .ok_or_else(|| CitizenError::cache("cache path has no parent"))?;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| CitizenError::cache(format!("create {}: {e}", dir.display())))?;

        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("png.{}.{seq}.tmp", std::process::id()));
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| CitizenError::cache(format!("write {}: {e}", tmp.display())))?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(CitizenError::cache(format!(
                "rename to {}: {e}",
                path.display()
            )));
        }
        debug!(path = %path.display(), bytes = bytes.len(), "cached");
        Ok(path)
    }
}
