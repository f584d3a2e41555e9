//! Storage collaborator - directory listing and open-by-name
//!
//! The device reads voice notes from a flat filesystem. `DirStorage` maps
//! that onto a directory on disk; `MemoryStorage` keeps files in memory for
//! tests and demos.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by a storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage mount failed at {path}: {reason}")]
    Mount { path: PathBuf, reason: String },
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Invalid file name: {0}")]
    InvalidName(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One listed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub size: u64,
}

/// An open file: readable and seekable, movable to the audio thread
pub trait StorageFile: Read + Seek + Send {}

impl<T: Read + Seek + Send> StorageFile for T {}

/// Filesystem collaborator consumed by the catalog and the playback controller
pub trait Storage {
    /// List every file at the storage root
    fn list(&self) -> Result<Vec<DirEntry>, StorageError>;

    /// Open a file by the name `list` reported
    fn open(&self, name: &str) -> Result<Box<dyn StorageFile>, StorageError>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn list(&self) -> Result<Vec<DirEntry>, StorageError> {
        (**self).list()
    }

    fn open(&self, name: &str) -> Result<Box<dyn StorageFile>, StorageError> {
        (**self).open(name)
    }
}

/// Names may carry a leading separator; anything else that could escape the
/// root is rejected.
fn normalize_name(name: &str) -> Result<&str, StorageError> {
    let trimmed = name.strip_prefix('/').unwrap_or(name);
    if trimmed.is_empty()
        || trimmed.contains('/')
        || trimmed.contains('\\')
        || trimmed == "."
        || trimmed == ".."
    {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(trimmed)
}

/// Storage backed by a flat directory
#[derive(Debug, Clone)]
pub struct DirStorage {
    root: PathBuf,
}

impl DirStorage {
    /// Mount a directory. Fails if it does not exist or is not a directory.
    pub fn mount(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        match fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => {
                tracing::info!(path = %root.display(), "storage mounted");
                Ok(Self { root })
            }
            Ok(_) => Err(StorageError::Mount {
                path: root,
                reason: "not a directory".into(),
            }),
            Err(e) => Err(StorageError::Mount {
                path: root,
                reason: e.to_string(),
            }),
        }
    }

    /// Root directory of this storage
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Storage for DirStorage {
    fn list(&self) -> Result<Vec<DirEntry>, StorageError> {
        let mut entries = Vec::new();

        for entry in fs::read_dir(&self.root)?.flatten() {
            let meta = match entry.metadata() {
                Ok(m) => m,
                Err(_) => continue,
            };
            if !meta.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                entries.push(DirEntry {
                    name: name.to_string(),
                    size: meta.len(),
                });
            }
        }

        // Sort by filename for consistent ordering
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn open(&self, name: &str) -> Result<Box<dyn StorageFile>, StorageError> {
        let name = normalize_name(name)?;
        match fs::File::open(self.root.join(name)) {
            Ok(file) => Ok(Box::new(io::BufReader::new(file))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage; listing order is name order
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: BTreeMap<String, Arc<[u8]>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file
    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.files.insert(name.into(), Arc::from(data.into()));
    }

    /// Builder form of `insert`
    pub fn with_file(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(name, data);
        self
    }

    pub fn remove(&mut self, name: &str) {
        self.files.remove(name);
    }
}

/// Shared byte slice readable through a cursor
struct SharedBytes(Arc<[u8]>);

impl AsRef<[u8]> for SharedBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Storage for MemoryStorage {
    fn list(&self) -> Result<Vec<DirEntry>, StorageError> {
        Ok(self
            .files
            .iter()
            .map(|(name, data)| DirEntry {
                name: name.clone(),
                size: data.len() as u64,
            })
            .collect())
    }

    fn open(&self, name: &str) -> Result<Box<dyn StorageFile>, StorageError> {
        let key = normalize_name(name)?;
        let data = self
            .files
            .get(key)
            .or_else(|| self.files.get(name))
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        Ok(Box::new(Cursor::new(SharedBytes(Arc::clone(data)))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "lumivox-storage-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_mount_missing_dir_fails() {
        let result = DirStorage::mount("/nonexistent/lumivox");
        assert!(matches!(result, Err(StorageError::Mount { .. })));
    }

    #[test]
    fn test_dir_storage_lists_files_sorted() {
        let dir = temp_dir("list");
        fs::write(dir.join("voice_b_1.wav"), [0u8; 10]).unwrap();
        fs::write(dir.join("voice_a_1.wav"), [0u8; 4]).unwrap();
        fs::create_dir_all(dir.join("nested")).unwrap();

        let storage = DirStorage::mount(&dir).unwrap();
        let entries = storage.list().unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "voice_a_1.wav");
        assert_eq!(entries[0].size, 4);
        assert_eq!(entries[1].name, "voice_b_1.wav");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_dir_storage_open_with_leading_slash() {
        let dir = temp_dir("open");
        fs::write(dir.join("note.wav"), [1u8, 2, 3]).unwrap();
        let storage = DirStorage::mount(&dir).unwrap();

        let mut file = storage.open("/note.wav").unwrap();
        let mut data = Vec::new();
        file.read_to_end(&mut data).unwrap();
        assert_eq!(data, vec![1, 2, 3]);

        assert!(matches!(
            storage.open("missing.wav"),
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            storage.open("../etc/passwd"),
            Err(StorageError::InvalidName(_))
        ));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_memory_storage_open_and_seek() {
        let storage = MemoryStorage::new().with_file("a.wav", vec![9u8, 8, 7, 6]);

        let mut file = storage.open("/a.wav").unwrap();
        file.seek(io::SeekFrom::Start(2)).unwrap();
        let mut rest = Vec::new();
        file.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, vec![7, 6]);

        let listed = storage.list().unwrap();
        assert_eq!(
            listed,
            vec![DirEntry {
                name: "a.wav".into(),
                size: 4
            }]
        );
    }
}
