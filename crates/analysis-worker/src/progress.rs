//! Progress store: which games have already been analyzed.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::WorkerError;
use crate::storage;

/// Shapes the progress artifact has been written in.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProgressFile {
    Current(Vec<String>),
    Legacy {
        #[serde(default)]
        processed_urls: Vec<String>,
    },
}

impl From<ProgressFile> for BTreeSet<String> {
    fn from(file: ProgressFile) -> Self {
        match file {
            ProgressFile::Current(urls) | ProgressFile::Legacy { processed_urls: urls } => {
                urls.into_iter().collect()
            }
        }
    }
}

/// Identifiers of processed games, persisted as a bare JSON list.
#[derive(Debug, Clone, Default)]
pub struct ProgressStore {
    path: PathBuf,
    processed: BTreeSet<String>,
}

impl ProgressStore {
    /// Load the set from `path`; a missing file is an empty set.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, WorkerError> {
        let path = path.into();
        let processed = storage::read_json::<ProgressFile>(&path)?
            .map(BTreeSet::from)
            .unwrap_or_default();
        Ok(Self { path, processed })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.processed.contains(id)
    }

    /// Record `id`; returns false if it was already present.
    pub fn mark(&mut self, id: impl Into<String>) -> bool {
        self.processed.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.processed.iter().map(String::as_str)
    }

    pub fn save(&self) -> Result<(), WorkerError> {
        storage::write_json_atomic(&self.path, &self.processed)
    }
}
