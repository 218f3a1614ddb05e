//! Run-scoped scratch space for intermediate media files.
//!
//! Every pipeline run gets its own directory, named after a freshly generated
//! token, and every artifact inside it gets another fresh token. Nothing is
//! derived from user-supplied file names, so repeated or concurrent runs can
//! never overwrite each other's files. The directory and everything left in it
//! is removed when the [`Scratch`] is dropped, on success and on error alike.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Result;

pub struct Scratch {
    dir: TempDir,
    run_id: Uuid,
}

impl Scratch {
    /// Create a scratch directory under the system temp directory
    pub fn new() -> Result<Self> {
        Self::create(None)
    }

    /// Create a scratch directory under `parent`
    pub fn new_in<P: AsRef<Path>>(parent: P) -> Result<Self> {
        Self::create(Some(parent.as_ref()))
    }

    /// Create a scratch directory under `parent`, or under the system temp
    /// directory when no parent is given
    pub fn create(parent: Option<&Path>) -> Result<Self> {
        let run_id = Uuid::new_v4();
        let prefix = format!("square-motion-{}-", run_id.simple());

        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let dir = match parent {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };

        debug!("Created scratch directory {:?}", dir.path());
        Ok(Self { dir, run_id })
    }

    /// Token identifying this run
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// A fresh, unused file path inside the scratch directory
    pub fn artifact(&self, extension: &str) -> ScratchFile {
        let name = format!("{}.{}", Uuid::new_v4().simple(), extension);
        ScratchFile {
            path: self.dir.path().join(name),
        }
    }
}

/// A single intermediate file; removed on drop if it still exists
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file back and remove it
    pub fn take_bytes(self) -> Result<Vec<u8>> {
        let bytes = fs::read(&self.path)?;
        Ok(bytes)
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!("Failed to remove scratch file {:?}: {}", self.path, e);
            }
        }
    }
}
