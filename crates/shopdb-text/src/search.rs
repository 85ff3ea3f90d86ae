use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::debug;

use shopdb_core::config::SearchSettings;
use shopdb_core::traits::ProductSearcher;
use shopdb_core::{FilterParameters, SearchResult, SearchResults};

use crate::index::{Candidate, CatalogIndex};
use crate::query::QueryCompiler;

pub const MAX_RESULTS: usize = 10;

/// Ordering of the capped result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchOrder {
	/// Uniformly shuffle the matches so repeated, similar requests surface
	/// different products.
	#[default]
	Shuffled,
	/// Keep relevance order; used for pinned lookups.
	Ranked,
}

/// The product search tool: compile, retrieve, post-filter, shuffle, cap.
pub struct ProductSearch {
	index: Arc<CatalogIndex>,
	compiler: QueryCompiler,
	order: SearchOrder,
	max_results: usize,
}

impl ProductSearch {
	/// Filter keys are checked against the metadata properties the index
	/// was built with.
	pub fn new(index: Arc<CatalogIndex>, order: SearchOrder) -> Self {
		let compiler = QueryCompiler::with_allowed_keys(index.meta_props());
		Self { index, compiler, order, max_results: MAX_RESULTS }
	}

	pub fn from_settings(index: Arc<CatalogIndex>, settings: &SearchSettings) -> Self {
		let order = if settings.randomize { SearchOrder::Shuffled } else { SearchOrder::Ranked };
		Self::new(index, order).with_max_results(settings.max_results)
	}

	#[must_use]
	pub fn with_max_results(mut self, max_results: usize) -> Self {
		self.max_results = max_results.max(1);
		self
	}

	pub fn order(&self) -> SearchOrder { self.order }

	pub fn search(&self, params: &FilterParameters) -> Result<SearchResults> {
		let mut rng = StdRng::from_entropy();
		self.search_with_rng(params, &mut rng)
	}

	/// Same as [`search`](Self::search) with a caller-provided source of
	/// randomness for the shuffle.
	pub fn search_with_rng<R: Rng + ?Sized>(&self, params: &FilterParameters, rng: &mut R) -> Result<SearchResults> {
		let compiled = self.compiler.compile(params);
		let candidates = self.index.candidates(&compiled)?;
		let total = candidates.len();
		let mut kept = self.post_filter(candidates, params);
		debug!(clauses = compiled.clauses.len(), candidates = total, kept = kept.len(), "product search");
		if self.order == SearchOrder::Shuffled {
			kept.shuffle(rng);
		}
		kept.truncate(self.max_results);
		Ok(SearchResults { items: kept })
	}

	/// Apply the id pin and the budget ceiling (price equal to the budget
	/// passes). Ids missing from the catalog fail the budget check.
	fn post_filter(&self, candidates: Vec<Candidate>, params: &FilterParameters) -> Vec<SearchResult> {
		let ceiling = params.price_ceiling();
		let pinned = params.pinned_id();
		let catalog = self.index.catalog();
		candidates
			.into_iter()
			.filter(|c| pinned.map_or(true, |id| c.id == id))
			.filter_map(|c| {
				let item = catalog.get(&c.id);
				if let Some(budget) = ceiling {
					if !item.is_some_and(|item| item.price <= budget) { return None; }
				}
				let name = item.map(|item| item.name.clone()).unwrap_or_default();
				Some(SearchResult { id: c.id, name })
			})
			.collect()
	}
}

impl ProductSearcher for ProductSearch {
	fn search(&self, params: &FilterParameters) -> Result<SearchResults> {
		ProductSearch::search(self, params)
	}
}
