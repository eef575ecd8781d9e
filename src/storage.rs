//! The storage collaborator.
//!
//! Submissions never embed uploaded bytes; they hold a [`StoredRef`] returned
//! by a [`Storage`] implementation. Two implementations ship with the crate:
//! [`MemoryStorage`] and [`LocalDiskStorage`].

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// A storage-relative path such as `signatures/3f2c....png`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredRef(String);

impl StoredRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StoredRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("refusing storage name '{0}'")]
    InvalidName(String),

    #[error("IO error writing {0}: {1}")]
    Io(PathBuf, std::io::Error),
}

/// Durable storage for uploaded files and signature images.
///
/// `suggested_name` is a relative path chosen by the caller; backends may
/// reject names that would escape their storage area.
pub trait Storage: Send + Sync {
    fn store(&self, bytes: &[u8], suggested_name: &str) -> Result<StoredRef, StorageError>;

    /// The URL at which a stored object is publicly served.
    fn public_url_for(&self, path: &StoredRef) -> String;
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn store(&self, bytes: &[u8], suggested_name: &str) -> Result<StoredRef, StorageError> {
        (**self).store(bytes, suggested_name)
    }

    fn public_url_for(&self, path: &StoredRef) -> String {
        (**self).public_url_for(path)
    }
}

/// Rejects absolute names and any `..` or root component.
fn checked_relative(name: &str) -> Result<&Path, StorageError> {
    let path = Path::new(name);
    let clean = !name.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if clean {
        Ok(path)
    } else {
        Err(StorageError::InvalidName(name.to_string()))
    }
}

fn join_url(base_url: &str, path: &StoredRef) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.as_str())
}

/// Thread-safe in-process storage.
///
/// # Example
///
/// ```rust
/// use formkit::{MemoryStorage, Storage};
///
/// let storage = MemoryStorage::new("https://cdn.example.org/storage");
/// let stored = storage.store(b"bytes", "uploads/a.txt").unwrap();
///
/// assert_eq!(storage.get(&stored).as_deref(), Some(&b"bytes"[..]));
/// assert_eq!(
///     storage.public_url_for(&stored),
///     "https://cdn.example.org/storage/uploads/a.txt"
/// );
/// ```
#[derive(Clone)]
pub struct MemoryStorage {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    base_url: String,
}

impl MemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            base_url: base_url.into(),
        }
    }

    pub fn get(&self, path: &StoredRef) -> Option<Vec<u8>> {
        self.objects.read().get(path.as_str()).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new("/storage")
    }
}

impl Storage for MemoryStorage {
    fn store(&self, bytes: &[u8], suggested_name: &str) -> Result<StoredRef, StorageError> {
        checked_relative(suggested_name)?;
        self.objects
            .write()
            .insert(suggested_name.to_string(), bytes.to_vec());
        Ok(StoredRef::new(suggested_name))
    }

    fn public_url_for(&self, path: &StoredRef) -> String {
        join_url(&self.base_url, path)
    }
}

/// Storage rooted at a local directory. Area directories are created on
/// first write.
#[derive(Debug, Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a stored object on disk.
    pub fn path_of(&self, stored: &StoredRef) -> PathBuf {
        self.root.join(stored.as_str())
    }
}

impl Storage for LocalDiskStorage {
    fn store(&self, bytes: &[u8], suggested_name: &str) -> Result<StoredRef, StorageError> {
        let relative = checked_relative(suggested_name)?;
        let target = self.root.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Io(parent.to_path_buf(), e))?;
        }
        std::fs::write(&target, bytes).map_err(|e| StorageError::Io(target.clone(), e))?;
        tracing::debug!(path = %target.display(), bytes = bytes.len(), "stored object on disk");
        Ok(StoredRef::new(suggested_name))
    }

    fn public_url_for(&self, path: &StoredRef) -> String {
        join_url(&self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_relative() {
        assert!(checked_relative("uploads/a.txt").is_ok());
        assert!(checked_relative("../a.txt").is_err());
        assert!(checked_relative("uploads/../../a.txt").is_err());
        assert!(checked_relative("/etc/passwd").is_err());
        assert!(checked_relative("").is_err());
    }

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::default();
        let stored = storage.store(b"abc", "signatures/x.png").unwrap();
        assert_eq!(stored.as_str(), "signatures/x.png");
        assert_eq!(storage.get(&stored), Some(b"abc".to_vec()));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_memory_storage_rejects_escape() {
        let storage = MemoryStorage::default();
        assert!(matches!(
            storage.store(b"abc", "../x"),
            Err(StorageError::InvalidName(_))
        ));
        assert!(storage.is_empty());
    }

    #[test]
    fn test_public_url_join() {
        let storage = MemoryStorage::new("https://example.org/storage/");
        assert_eq!(
            storage.public_url_for(&StoredRef::new("uploads/a.pdf")),
            "https://example.org/storage/uploads/a.pdf"
        );
    }

    #[test]
    fn test_arc_storage_delegates() {
        let storage = Arc::new(MemoryStorage::default());
        let stored = Storage::store(&storage, b"1", "a/b").unwrap();
        assert_eq!(storage.get(&stored), Some(b"1".to_vec()));
    }
}
