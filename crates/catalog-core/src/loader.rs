use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::traits::{CatalogSource, HistorySource};
use crate::types::{Catalog, CatalogItem, UserHistory};

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })
}

/// Reads a JSON array of catalog items and validates it into a [`Catalog`].
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let raw = read(path)?;
    let items: Vec<CatalogItem> = serde_json::from_str(&raw)?;
    tracing::debug!(path = %path.display(), items = items.len(), "catalog file decoded");
    Catalog::new(items)
}

/// Reads a JSON object mapping user ids to ordered item-id lists.
pub fn load_histories(path: &Path) -> Result<BTreeMap<String, UserHistory>> {
    let raw = read(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Catalog backed by a JSON file, re-read on every [`CatalogSource::load`].
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for JsonFileCatalog {
    fn load(&self) -> Result<Catalog> {
        load_catalog(&self.path)
    }
}

// Unknown users simply have no history yet.
impl HistorySource for BTreeMap<String, UserHistory> {
    fn history(&self, user_id: &str) -> Result<UserHistory> {
        Ok(self.get(user_id).cloned().unwrap_or_default())
    }
}
