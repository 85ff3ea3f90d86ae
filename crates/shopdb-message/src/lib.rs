//! shopdb-message
//!
//! Assistant message pipeline: item ids travel through the model's text
//! wrapped in a marker pair, come back out as ordered prose and item-group
//! segments, and are finally hydrated with catalog records.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod codec;
pub mod hydrate;
pub mod optimize;
pub mod tokenize;

pub use codec::{DelimitedSearch, IdCodec};
pub use hydrate::hydrate;
pub use optimize::optimize;
pub use tokenize::{assistant_message, parse_assistant, parse_assistant_with, tokenize, tokenize_with};
