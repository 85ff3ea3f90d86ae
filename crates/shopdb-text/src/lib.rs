//! shopdb-text
//!
//! Tantivy-based catalog index and the product search tool built on it. See
//! `query` for how filter parameters become a boolean text query and `search`
//! for post-filtering, shuffling and the result cap.

pub mod tantivy_utils;
pub mod index;
pub mod query;
pub mod search;

pub use index::{Candidate, CatalogIndex};
pub use query::{compile, CompiledQuery, QueryClause, QueryCompiler};
pub use search::{ProductSearch, SearchOrder, MAX_RESULTS};
