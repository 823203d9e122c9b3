//! Plain-text announcement store.

use std::fs;
use std::path::PathBuf;

const MISSING: &str = "No hay comunicados aún.";
const EMPTY: &str = "No hay comunicados por el momento.";

/// Read-only fetch of the announcements blob. A missing or blank file
/// renders as a fixed placeholder, not an error.
#[derive(Debug, Clone)]
pub struct AnnouncementStore {
    path: PathBuf,
}

impl AnnouncementStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the announcement text or a placeholder.
    pub fn read(&self) -> String {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let trimmed = contents.trim();
                if trimmed.is_empty() {
                    EMPTY.to_string()
                } else {
                    trimmed.to_string()
                }
            }
            Err(_) => MISSING.to_string(),
        }
    }
}
