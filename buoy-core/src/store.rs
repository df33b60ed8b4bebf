use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Mapping from target name to the last-known content digest.
pub type HashRecord = BTreeMap<String, String>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Flat JSON file holding the digest map between runs.
///
/// Loading never fails: missing or unparseable history degrades to an empty
/// mapping. Saving overwrites the file wholesale and is fatal on error.
pub struct HashStore {
    path: PathBuf,
}

impl HashStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> HashRecord {
        if !self.path.exists() {
            debug!("No hash store at {}, starting fresh", self.path.display());
            return HashRecord::new();
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    "Could not read {}: {}. Starting fresh.",
                    self.path.display(),
                    e
                );
                return HashRecord::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    "Could not decode {}: {}. Starting fresh.",
                    self.path.display(),
                    e
                );
                HashRecord::new()
            }
        }
    }

    pub fn save(&self, record: &HashRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
