use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::loader::load_file;
use super::model::CatalogTable;
use super::sentiment::{SentimentScorer, VaderScorer};
use crate::error::LoadError;

/// Identity of a loaded source: where it lives and when it last changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceKey {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
}

impl SourceKey {
    pub fn for_path(path: &Path) -> Result<Self, LoadError> {
        let io_err = |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let path = std::fs::canonicalize(path).map_err(io_err)?;
        let modified = std::fs::metadata(&path).map_err(io_err)?.modified().ok();
        Ok(SourceKey { path, modified })
    }
}

/// Load-once memo of the enriched table, keyed by [`SourceKey`]. A changed
/// file (new mtime) or a different path triggers a reload.
pub struct DatasetCache {
    scorer: Box<dyn SentimentScorer>,
    entry: Option<(SourceKey, Arc<CatalogTable>)>,
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new(Box::new(VaderScorer::new()))
    }
}

impl DatasetCache {
    pub fn new(scorer: Box<dyn SentimentScorer>) -> Self {
        DatasetCache {
            scorer,
            entry: None,
        }
    }

    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<CatalogTable>, LoadError> {
        let key = SourceKey::for_path(path)?;
        if let Some((cached_key, table)) = &self.entry {
            if *cached_key == key {
                log::info!("Using cached catalog for {}", key.path.display());
                return Ok(Arc::clone(table));
            }
        }

        log::info!("Loading catalog from {}", key.path.display());
        let table = Arc::new(load_file(&key.path, self.scorer.as_ref())?);
        self.entry = Some((key, Arc::clone(&table)));
        Ok(table)
    }

    pub fn cached_key(&self) -> Option<&SourceKey> {
        self.entry.as_ref().map(|(key, _)| key)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
