//! The in-memory catalog snapshot.
//!
//! Loaded once before indexing, never mutated afterwards. Shared between the
//! index and the hydration fetcher behind an `Arc`.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::traits::ItemFetcher;
use crate::types::{CatalogItem, ItemId, RawCatalogItem};

/// On-disk snapshot layouts: `{ "<id>": item, ... }` or `[item, ...]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Snapshot {
    Keyed(BTreeMap<String, RawCatalogItem>),
    Listed(Vec<RawCatalogItem>),
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: BTreeMap<ItemId, CatalogItem>,
}

impl Catalog {
    /// Build a catalog from already materialized items. Later duplicates
    /// replace earlier ones.
    pub fn from_items<I>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = CatalogItem>,
    {
        let mut catalog = Self::default();
        for item in items {
            catalog.insert(item)?;
        }
        Ok(catalog)
    }

    /// Load a snapshot file, or every `*.json` file below a directory.
    pub fn load(path: &Path) -> Result<Self> {
        let files = if path.is_dir() { list_json_files(path) } else { vec![path.to_path_buf()] };
        if files.is_empty() {
            return Err(Error::NotFound(format!("no catalog files under {}", path.display())));
        }
        let mut catalog = Self::default();
        for file in &files {
            let content = fs::read_to_string(file)?;
            let added = catalog.extend_from_json(&content).map_err(|e| match e {
                Error::Json(e) => Error::Catalog(format!("{}: {}", file.display(), e)),
                other => other,
            })?;
            info!(file = %file.display(), items = added, "loaded catalog file");
        }
        info!(items = catalog.len(), files = files.len(), "catalog ready");
        Ok(catalog)
    }

    /// Parse one JSON snapshot document and merge its items.
    pub fn from_json(content: &str) -> Result<Self> {
        let mut catalog = Self::default();
        catalog.extend_from_json(content)?;
        Ok(catalog)
    }

    fn extend_from_json(&mut self, content: &str) -> Result<usize> {
        let raw: Vec<(Option<String>, RawCatalogItem)> = match serde_json::from_str(content)? {
            Snapshot::Keyed(map) => map.into_iter().map(|(k, v)| (Some(k), v)).collect(),
            Snapshot::Listed(list) => list.into_iter().map(|v| (None, v)).collect(),
        };
        let count = raw.len();
        for (key, mut record) in raw {
            // keyed snapshots may leave the id implicit
            if record.identifier().is_none() {
                record.id = key.map(serde_json::Value::String);
            }
            let item = CatalogItem::try_from(record).map_err(Error::Catalog)?;
            self.insert(item)?;
        }
        Ok(count)
    }

    fn insert(&mut self, item: CatalogItem) -> Result<()> {
        if item.id.trim().is_empty() {
            return Err(Error::Catalog(format!("item '{}' has an empty id", item.name)));
        }
        if let Some(previous) = self.items.insert(item.id.clone(), item) {
            warn!(id = %previous.id, "duplicate catalog id, keeping the last record");
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&CatalogItem> { self.items.get(id) }

    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogItem> { self.items.values() }

    /// Records for the given ids in request order; unknown ids are skipped.
    pub fn get_many(&self, ids: &[ItemId]) -> Vec<CatalogItem> {
        ids.iter().filter_map(|id| self.get(id)).cloned().collect()
    }
}

#[async_trait]
impl ItemFetcher for Catalog {
    async fn fetch_items(&self, ids: &[ItemId]) -> anyhow::Result<Vec<CatalogItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.get_many(ids))
    }
}

fn list_json_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    files.sort();
    files
}
