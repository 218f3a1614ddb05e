use std::path::{Path, PathBuf};

use tracing::debug;

use crate::audio::loader::AudioLoader;
use crate::audio::types::AudioTrack;
use crate::error::{AudioError, Result};

/// A directory of bundled background tracks, addressed by file stem
pub struct AudioLibrary {
    root: PathBuf,
}

impl AudioLibrary {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of all loadable tracks, sorted. A missing directory is an empty library.
    pub fn names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .entries()?
            .into_iter()
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Resolve a track name (stem or full file name) to its path
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let mut candidates: Vec<PathBuf> = self
            .entries()?
            .into_iter()
            .filter(|path| {
                path.file_name().and_then(|n| n.to_str()) == Some(name)
                    || path.file_stem().and_then(|s| s.to_str()) == Some(name)
            })
            .collect();
        candidates.sort();

        candidates
            .into_iter()
            .next()
            .ok_or_else(|| AudioError::NotInLibrary { name: name.to_string() }.into())
    }

    /// Decode a library track by name
    pub fn load(&self, name: &str) -> Result<AudioTrack> {
        let path = self.resolve(name)?;
        debug!("Loading library track '{}' from {:?}", name, path);
        let mut track = AudioLoader::load(&path)?;
        track.source = name.to_string();
        Ok(track)
    }

    fn entries(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            let supported = path.is_file()
                && AudioLoader::detect_format(&path)
                    .map(|ext| AudioLoader::is_format_supported(&ext))
                    .unwrap_or(false);
            if supported {
                entries.push(path);
            }
        }
        Ok(entries)
    }
}
