//! On-disk cache of encoded image variants.
//!
//! Artifacts are keyed by source content hash, width and format, so they are
//! shared between pages and reused across builds. Two mechanisms keep the
//! cache consistent under parallel page rendering:
//!
//! - a per-key claim inside the process, so only one worker encodes a given
//!   artifact and the others reuse it;
//! - writes go to a temporary file in the cache directory that is renamed
//!   into place, so no reader ever sees a partial file.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::image::format::OutputFormat;

/// Identifies one artifact in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantKey {
    pub hash: String,
    pub width: u32,
    pub format: OutputFormat,
}

impl VariantKey {
    /// File name of the artifact, `{hash}-{width}.{ext}`.
    pub fn file_name(&self) -> String {
        format!("{}-{}.{}", self.hash, self.width, self.format.extension())
    }
}

/// An artifact present in the cache directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedArtifact {
    pub path: PathBuf,
    pub size: u64,
    /// Whether this call encoded the artifact rather than reusing it.
    pub created: bool,
}

/// Cache rooted at the image output directory.
#[derive(Debug)]
pub struct VariantCache {
    dir: PathBuf,
    claims: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl VariantCache {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            claims: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &VariantKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Returns the cached artifact for `key`, calling `produce` to encode it
    /// on a miss.
    ///
    /// Holds the claim for `key` while checking and writing, so concurrent
    /// callers for the same key run `produce` at most once between them.
    pub fn get_or_create<F>(&self, key: &VariantKey, produce: F) -> Result<CachedArtifact>
    where
        F: FnOnce() -> Result<Vec<u8>>,
    {
        let claim = self.claim(key);
        let result = {
            let _guard = claim.lock().unwrap_or_else(PoisonError::into_inner);
            self.fetch_or_write(key, produce)
        };
        self.release(key, &claim);
        result
    }

    fn fetch_or_write<F>(&self, key: &VariantKey, produce: F) -> Result<CachedArtifact>
    where
        F: FnOnce() -> Result<Vec<u8>>,
    {
        let path = self.path_for(key);
        if let Ok(metadata) = fs::metadata(&path) {
            debug!("Reusing cached image {}", path.display());
            return Ok(CachedArtifact {
                path,
                size: metadata.len(),
                created: false,
            });
        }

        let bytes = produce()?;
        self.write_atomic(&path, &bytes)?;
        debug!("Wrote image {} ({} bytes)", path.display(), bytes.len());

        Ok(CachedArtifact {
            path,
            size: bytes.len() as u64,
            created: true,
        })
    }

    fn claim(&self, key: &VariantKey) -> Arc<Mutex<()>> {
        let mut claims = self.claims.lock().unwrap_or_else(PoisonError::into_inner);
        claims.entry(key.file_name()).or_default().clone()
    }

    /// Drops the claim for `key` once no other caller holds it.
    fn release(&self, key: &VariantKey, claim: &Arc<Mutex<()>>) {
        let mut claims = self.claims.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map and one held by this caller
        if Arc::strong_count(claim) <= 2 {
            claims.remove(&key.file_name());
        }
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| Error::IoError(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn key(width: u32) -> VariantKey {
        VariantKey {
            hash: "0123456789".to_string(),
            width,
            format: OutputFormat::Webp,
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(key(300).file_name(), "0123456789-300.webp");
    }

    #[test]
    fn test_second_call_is_a_hit() {
        let temp_dir = TempDir::new().unwrap();
        let cache = VariantCache::new(temp_dir.path().join("img"));

        let first = cache.get_or_create(&key(150), || Ok(vec![1, 2, 3])).unwrap();
        assert!(first.created);
        assert_eq!(first.size, 3);

        let second = cache
            .get_or_create(&key(150), || panic!("cached artifact re-encoded"))
            .unwrap();
        assert!(!second.created);
        assert_eq!(second.path, first.path);
        assert_eq!(fs::read(&second.path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_failed_produce_leaves_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let cache = VariantCache::new(temp_dir.path());

        let result = cache.get_or_create(&key(150), || {
            Err(Error::ConfigError("boom".to_string()))
        });
        assert!(result.is_err());
        assert!(!cache.path_for(&key(150)).exists());
    }

    #[test]
    fn test_concurrent_claims_produce_once() {
        let temp_dir = TempDir::new().unwrap();
        let cache = VariantCache::new(temp_dir.path());
        let produced = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    cache
                        .get_or_create(&key(600), || {
                            produced.fetch_add(1, Ordering::SeqCst);
                            Ok(vec![7; 4096])
                        })
                        .unwrap();
                });
            }
        });

        assert_eq!(produced.load(Ordering::SeqCst), 1);
        assert_eq!(fs::read(cache.path_for(&key(600))).unwrap(), vec![7; 4096]);
        assert!(cache.claims.lock().unwrap().is_empty());
    }

    #[test]
    fn test_claims_are_released() {
        let temp_dir = TempDir::new().unwrap();
        let cache = VariantCache::new(temp_dir.path());

        for width in [150, 300, 600] {
            cache.get_or_create(&key(width), || Ok(vec![1])).unwrap();
        }
        let _ = cache.get_or_create(&key(900), || Err(Error::ConfigError("boom".to_string())));

        assert!(cache.claims.lock().unwrap().is_empty());
    }
}
