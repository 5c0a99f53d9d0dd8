//! Output persistence boundary.

use std::fs;
use std::path::PathBuf;

use crate::{Error, Result};

/// Persists a string to durable storage under a name.
///
/// A sink failure is reported to the caller with its underlying reason; it
/// never invalidates in-memory processing that already completed.
pub trait Sink {
    /// Persist `content` under `name`.
    fn persist(&self, content: &str, name: &str) -> Result<()>;
}

/// Sink writing plain files into a directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    /// Create a sink writing into `dir`. The directory is created on first
    /// persist if missing.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Sink for FileSink {
    fn persist(&self, content: &str, name: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::persist(name, e))?;
        let path = self.dir.join(name);
        fs::write(&path, content).map_err(|e| Error::persist(name, e))?;
        log::info!("persisted {} bytes to {}", content.len(), path.display());
        Ok(())
    }
}
