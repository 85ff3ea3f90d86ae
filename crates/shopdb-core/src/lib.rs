//! shopdb-core
//!
//! Shared data model for the shopping assistant: catalog records and the
//! in-memory snapshot, filter parameters and search results, parsed message
//! segments, plus configuration, errors and the collaborator traits used by
//! the text and message crates.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use catalog::Catalog;
pub use types::{
    CatalogItem, ContentSegment, FilterParameters, HydratedMessage, ItemId, ItemState, Message,
    Role, SearchResult, SearchResults,
};
