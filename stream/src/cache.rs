//! Size-bounded frame cache filled by background loads.
//!
//! `request_load` never blocks the caller: the read happens on a background
//! tokio task and the finished frame lands in the cache, where consumers pick
//! it up with the non-blocking [`FrameCache::resolve`]. Pausing playback does
//! not cancel in-flight loads; a late completion still populates the cache.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use moka::sync::Cache;
use thiserror::Error;

use crate::assets::FrameHandle;

pub type FrameData = Arc<Vec<u8>>;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to load frame {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Sink for the scheduler's prefetch and evict side effects.
pub trait FrameLoader: Send + Sync {
    /// Starts loading a frame; returns immediately.
    fn request_load(&self, handle: &FrameHandle);
    /// Drops a frame that left the cache window.
    fn unload(&self, handle: &FrameHandle);
}

#[derive(Clone)]
pub struct FrameCache {
    frames: Cache<PathBuf, FrameData>,
}

impl FrameCache {
    /// `capacity` is a byte budget; frames are weighed by their length.
    pub fn new(capacity: u64) -> Self {
        Self {
            frames: Cache::builder()
                .max_capacity(capacity)
                .weigher(|_, data: &FrameData| data.len().try_into().unwrap_or(u32::MAX))
                .build(),
        }
    }

    /// Non-blocking lookup; `None` means the frame has not finished loading
    /// (or was evicted again).
    pub fn resolve(&self, handle: &FrameHandle) -> Option<FrameData> {
        self.frames.get(&handle.path)
    }

    /// Blocking load, used only to prime the first frames at registration.
    pub fn load_sync(&self, handle: &FrameHandle) -> Result<FrameData, CacheError> {
        if let Some(data) = self.resolve(handle) {
            return Ok(data);
        }
        let data = std::fs::read(&handle.path).map_err(|source| CacheError::Io {
            path: handle.path.clone(),
            source,
        })?;
        let data = Arc::new(data);
        self.frames.insert(handle.path.clone(), data.clone());
        Ok(data)
    }
}

impl FrameLoader for FrameCache {
    fn request_load(&self, handle: &FrameHandle) {
        if self.frames.contains_key(&handle.path) {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(name = %handle.name, "no async runtime, skipping prefetch");
            return;
        };
        let frames = self.frames.clone();
        let path = handle.path.clone();
        let name = handle.name.clone();
        runtime.spawn(async move {
            match tokio::fs::read(&path).await {
                Ok(data) => frames.insert(path, Arc::new(data)),
                Err(error) => tracing::warn!(name, %error, "frame load failed"),
            }
        });
    }

    fn unload(&self, handle: &FrameHandle) {
        self.frames.invalidate(&handle.path);
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;

    fn handle_for(dir: &std::path::Path, name: &str, bytes: &[u8]) -> FrameHandle {
        let path = dir.join(format!("{name}.raw"));
        std::fs::write(&path, bytes).unwrap();
        FrameHandle {
            path,
            name: name.to_string(),
            index: 0,
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn background_load_lands_in_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FrameCache::new(1 << 20);
        let handle = handle_for(dir.path(), "VT_smoke_Data_t0", &[1, 2, 3]);

        cache.request_load(&handle);
        let mut data = None;
        for _ in 0..200 {
            data = cache.resolve(&handle);
            if data.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(*data.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn missing_file_stays_unresolved() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FrameCache::new(1 << 20);
        let handle = FrameHandle {
            path: dir.path().join("gone.raw"),
            name: "gone".to_string(),
            index: 0,
        };

        cache.request_load(&handle);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(cache.resolve(&handle).is_none());
    }

    #[test]
    fn prefetch_without_runtime_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FrameCache::new(1 << 20);
        let handle = handle_for(dir.path(), "VT_smoke_Data_t0", &[1]);

        // No runtime on this thread; the request must degrade to a warning
        // instead of panicking.
        cache.request_load(&handle);
        assert!(cache.resolve(&handle).is_none());
    }

    #[test]
    fn sync_load_and_unload() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FrameCache::new(1 << 20);
        let handle = handle_for(dir.path(), "ST_temp_Data_t0", &[7]);

        let data = cache.load_sync(&handle).unwrap();
        assert_eq!(*data, vec![7]);
        assert!(cache.resolve(&handle).is_some());

        cache.unload(&handle);
        assert!(cache.resolve(&handle).is_none());
    }
}
