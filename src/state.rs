use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// App ids that have already been announced. Stored on disk as a bare JSON array.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeenSet {
    ids: HashSet<String>,
}

impl SeenSet {
    pub fn load(path: &Path) -> Self {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No seen-set file yet, starting empty");
                return SeenSet::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Seen-set file unreadable, resetting");
                return SeenSet::default();
            }
        };
        match serde_json::from_str(&data) {
            Ok(set) => set,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Seen-set file is corrupt, resetting");
                SeenSet::default()
            }
        }
    }

    /// Overwrites `path`. Ids are written sorted so the file diffs cleanly.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut ids: Vec<&String> = self.ids.iter().collect();
        ids.sort();
        let data = serde_json::to_string_pretty(&ids)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Returns true if the id was not already present.
    pub fn mark_seen(&mut self, id: &str) -> bool {
        self.ids.insert(id.to_string())
    }

    pub fn is_new(&self, id: &str) -> bool {
        !self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SeenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}
