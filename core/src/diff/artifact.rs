//! diff/artifact.rs
//! Inputs, difference artifacts, and the guard that removes partial artifacts.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::{CoreError, CoreResult};
use crate::utils::remove_if_exists;

/// A resolved, existing regular file and its length at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFile {
    path: PathBuf,
    len: u64,
}

impl InputFile {
    /// Stat `path` and capture its length.
    ///
    /// # Errors
    /// `Io` if the path does not exist or is not a regular file.
    pub fn open(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let meta = fs::metadata(&path).map_err(|e| CoreError::io(&path, e))?;
        if !meta.is_file() {
            return Err(CoreError::io(
                &path,
                io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }
        Ok(Self { path, len: meta.len() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DifferenceArtifact {
    /// Inputs are equal under the XOR convention; nothing is left on disk.
    NoDifference,
    Produced { path: PathBuf, byte_len: u64 },
}

impl DifferenceArtifact {
    pub fn is_different(&self) -> bool {
        matches!(self, DifferenceArtifact::Produced { .. })
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            DifferenceArtifact::Produced { path, .. } => Some(path),
            DifferenceArtifact::NoDifference => None,
        }
    }
}

/// Owns an artifact path until the producing call commits it.
///
/// Dropping an armed guard deletes whatever is at the path, so every early
/// return and `?` leaves no partial artifact behind.
#[derive(Debug)]
pub struct ArtifactGuard {
    path: PathBuf,
    armed: bool,
}

impl ArtifactGuard {
    /// Create (truncate) the artifact file for writing.
    pub fn create(path: &Path) -> CoreResult<(Self, File)> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| CoreError::io(path, e))?;
        Ok((Self { path: path.to_path_buf(), armed: true }, file))
    }

    /// Claim a path an external helper will write; a stale file is removed first.
    pub fn reserve(path: &Path) -> CoreResult<Self> {
        remove_if_exists(path).map_err(|e| CoreError::io(path, e))?;
        Ok(Self { path: path.to_path_buf(), armed: true })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the file; the caller now owns it.
    pub fn commit(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }

    /// Remove the file now, surfacing a failed delete.
    pub fn discard(mut self) -> CoreResult<()> {
        self.armed = false;
        remove_if_exists(&self.path).map_err(|e| CoreError::io(&self.path, e))
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match remove_if_exists(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed partial artifact"),
            Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "failed to remove partial artifact"),
        }
    }
}
