use async_trait::async_trait;

use crate::types::{CatalogItem, FilterParameters, ItemId, SearchResults};

/// Resolves item ids to full catalog records.
///
/// Implementations return only what they can resolve: unknown ids are left
/// out rather than reported as errors, and an empty request returns an empty
/// result without doing any work.
#[async_trait]
pub trait ItemFetcher: Send + Sync {
    async fn fetch_items(&self, ids: &[ItemId]) -> anyhow::Result<Vec<CatalogItem>>;
}

/// The product search tool as seen by the chat layer.
pub trait ProductSearcher: Send + Sync {
    fn search(&self, params: &FilterParameters) -> anyhow::Result<SearchResults>;
}
