use std::collections::BTreeSet;
use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer, Token, TokenStream};
use tantivy::Index;

pub const CATALOG_TOKENIZER: &str = "catalog_text";
pub const ID_FIELD: &str = "id";
pub const NAME_FIELD: &str = "name";

/// Schema handles for a catalog index: the raw id key, the display name and
/// one analysed field per allow-listed metadata property.
pub struct CatalogSchema {
	pub schema: Schema,
	pub id: Field,
	pub name: Field,
	/// `(item path, field)` pairs, e.g. `("meta.Sleeve Length", meta_sleeve_length)`.
	pub meta: Vec<(String, Field)>,
}

/// `Sleeve Length` -> `meta_sleeve_length`.
pub fn meta_field_name(prop: &str) -> String {
	let slug: String = prop
		.trim()
		.chars()
		.map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
		.collect();
	format!("meta_{slug}")
}

pub fn build_schema(meta_props: &[String]) -> CatalogSchema {
	let mut schema_builder = Schema::builder();
	let id = schema_builder.add_text_field(ID_FIELD, STRING | STORED);
	let text_field_indexing = TextFieldIndexing::default().set_tokenizer(CATALOG_TOKENIZER).set_index_option(IndexRecordOption::WithFreqsAndPositions);
	let text_options = TextOptions::default().set_indexing_options(text_field_indexing);
	let name = schema_builder.add_text_field(NAME_FIELD, text_options.clone().set_stored());
	let mut seen = BTreeSet::new();
	let mut meta = Vec::new();
	for prop in meta_props {
		let field_name = meta_field_name(prop);
		// two spellings of one property share a field
		if !seen.insert(field_name.clone()) { continue; }
		let field = schema_builder.add_text_field(&field_name, text_options.clone());
		meta.push((format!("meta.{}", prop.trim()), field));
	}
	CatalogSchema { schema: schema_builder.build(), id, name, meta }
}

pub fn build_analyzer() -> TextAnalyzer {
	let stop_words = vec![
		"a","an","and","are","as","at","be","by","for","from","has","in","is","it","its","of","on","or","that","the","this","to","was","with",
	];
	TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.filter(StopWordFilter::remove(stop_words.into_iter().map(|s| s.to_string())))
		.build()
}

pub fn register_tokenizer(index: &Index) {
	index.tokenizers().register(CATALOG_TOKENIZER, build_analyzer());
}

/// Run `text` through the catalog analyzer, returning the index terms it
/// produces in order.
pub fn analyze(analyzer: &mut TextAnalyzer, text: &str) -> Vec<String> {
	let mut tokens = Vec::new();
	let mut stream = analyzer.token_stream(text);
	stream.process(&mut |token: &Token| tokens.push(token.text.clone()));
	tokens
}
