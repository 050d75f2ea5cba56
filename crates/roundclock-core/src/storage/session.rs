//! JSON persistence for the timer snapshot between runs.
//!
//! The store holds at most one [`Snapshot`], at `<data_dir>/session.json`.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::data_dir;
use crate::error::Result;
use crate::timer::Snapshot;

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store at the default location.
    pub fn open() -> Result<Self> {
        Ok(Self::at(data_dir()?.join("session.json")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved snapshot, if any. An unreadable file is discarded with a
    /// warning rather than failing every later command.
    pub fn load(&self) -> Result<Option<Snapshot>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&content) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding unreadable session");
                Ok(None)
            }
        }
    }

    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let content = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, content)?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Remove the saved snapshot. Missing files are fine.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
