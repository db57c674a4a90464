//! Reading and writing the files edits are applied to.
//!
//! A [`FileSnapshot`] remembers what was read. [`FileSnapshot::commit`]
//! writes the new content only if the file still holds exactly that.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("File I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("File is not valid UTF-8: {0}")]
    NotUtf8(PathBuf),

    #[error("File changed since it was read: {0}")]
    ConcurrentModification(PathBuf),

    #[error("File already exists: {0}")]
    AlreadyExists(PathBuf),
}

impl PersistError {
    fn io(path: &Path, source: io::Error) -> Self {
        PersistError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// What a file contained when it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Baseline {
    /// The file did not exist
    Missing,
    /// xxh3 hash of the content that was read
    Hash(u64),
}

/// File content captured for editing.
#[derive(Debug, Clone)]
#[must_use = "a snapshot does nothing until commit() is called"]
pub struct FileSnapshot {
    path: PathBuf,
    content: String,
    baseline: Baseline,
}

/// Result of committing a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "CommitResult should be checked for written/unchanged"]
pub enum CommitResult {
    /// New content was written
    Written { path: PathBuf, bytes: usize },
    /// New content equals what was read; nothing was written
    Unchanged { path: PathBuf },
}

impl FileSnapshot {
    /// Read an existing UTF-8 file.
    pub fn read(path: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let path = path.into();
        let bytes = fs::read(&path).map_err(|e| PersistError::io(&path, e))?;
        let content = String::from_utf8(bytes).map_err(|_| PersistError::NotUtf8(path.clone()))?;
        let baseline = Baseline::Hash(xxh3_64(content.as_bytes()));
        Ok(Self {
            path,
            content,
            baseline,
        })
    }

    /// Stand-in for a file that is about to be created.
    pub fn missing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            content: String::new(),
            baseline: Baseline::Missing,
        }
    }

    /// Read `path` if it exists, otherwise start from a missing snapshot.
    pub fn read_or_missing(path: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let path = path.into();
        if path.exists() {
            Self::read(path)
        } else {
            Ok(Self::missing(path))
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_missing(&self) -> bool {
        self.baseline == Baseline::Missing
    }

    /// Check that the file on disk still matches the snapshot.
    pub fn verify(&self) -> Result<(), PersistError> {
        match self.baseline {
            Baseline::Missing => {
                if self.path.exists() {
                    return Err(PersistError::AlreadyExists(self.path.clone()));
                }
            }
            Baseline::Hash(expected) => {
                let current = fs::read(&self.path).map_err(|e| PersistError::io(&self.path, e))?;
                if xxh3_64(&current) != expected {
                    return Err(PersistError::ConcurrentModification(self.path.clone()));
                }
            }
        }
        Ok(())
    }

    /// Write `new_content` in place of the snapshot, atomically.
    pub fn commit(&self, new_content: &str) -> Result<CommitResult, PersistError> {
        if !self.is_missing() && new_content == self.content {
            return Ok(CommitResult::Unchanged {
                path: self.path.clone(),
            });
        }

        self.verify()?;
        atomic_write(&self.path, new_content.as_bytes())?;
        tracing::debug!(path = %self.path.display(), bytes = new_content.len(), "file written");

        Ok(CommitResult::Written {
            path: self.path.clone(),
            bytes: new_content.len(),
        })
    }
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write lands or the file is left as it was.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), PersistError> {
    let parent = path.parent().ok_or_else(|| {
        PersistError::io(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "Path has no parent directory"),
        )
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(|e| PersistError::io(path, e))?;
    temp.write_all(content)
        .map_err(|e| PersistError::io(path, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| PersistError::io(path, e))?;
    temp.persist(path)
        .map_err(|e| PersistError::io(path, e.error))?;

    Ok(())
}
