use anyhow::{Context, Result};
use std::sync::Arc;
use tantivy::collector::TopDocs;
use tantivy::query::{AllQuery, BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::tokenizer::TextAnalyzer;
use tantivy::{Index, IndexReader, IndexWriter, TantivyDocument, Term};
use tracing::{debug, info};

use shopdb_core::{Catalog, CatalogItem};

use crate::query::{term_rule, CompiledQuery, QueryClause, FUZZY_WEIGHT, NAME_BOOST, PREFIX_WEIGHT};
use crate::tantivy_utils::{analyze, build_analyzer, build_schema, register_tokenizer, CatalogSchema};

/// A full-text match before post-filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
	pub id: String,
	pub score: f32,
}

/// Read-only, in-memory full-text index over a catalog snapshot.
///
/// Built once; every search opens its own searcher so concurrent callers
/// share nothing mutable.
pub struct CatalogIndex {
	catalog: Arc<Catalog>,
	reader: IndexReader,
	id_field: Field,
	/// Searchable fields with their boost, the name field first.
	text_fields: Vec<(Field, f32)>,
	meta_props: Vec<String>,
	analyzer: TextAnalyzer,
}

impl CatalogIndex {
	/// Index `name` plus every allow-listed metadata property of each item.
	/// Properties outside the list are never indexed.
	pub fn build(catalog: Arc<Catalog>, meta_props: &[String]) -> Result<Self> {
		let CatalogSchema { schema, id, name, meta } = build_schema(meta_props);
		let index = Index::create_in_ram(schema);
		register_tokenizer(&index);
		let mut index_writer: IndexWriter = index.writer(50_000_000).context("open index writer")?;
		for item in catalog.iter() {
			index_writer.add_document(Self::to_document(item, id, name, &meta))?;
		}
		index_writer.commit().context("commit catalog index")?;
		let reader = index.reader().context("open index reader")?;
		info!(items = catalog.len(), fields = meta.len() + 1, "catalog index built");

		let mut text_fields = vec![(name, NAME_BOOST)];
		text_fields.extend(meta.iter().map(|(_, field)| (*field, 1.0)));
		let meta_props = meta.into_iter().map(|(path, _)| path.trim_start_matches("meta.").to_string()).collect();
		Ok(Self { catalog, reader, id_field: id, text_fields, meta_props, analyzer: build_analyzer() })
	}

	fn to_document(item: &CatalogItem, id: Field, name: Field, meta: &[(String, Field)]) -> TantivyDocument {
		let mut doc = TantivyDocument::default();
		doc.add_text(id, &item.id);
		if let Some(text) = item.field_text("name") { doc.add_text(name, text); }
		for (path, field) in meta {
			if let Some(text) = item.field_text(path) { doc.add_text(*field, text); }
		}
		doc
	}

	pub fn catalog(&self) -> &Catalog { &self.catalog }

	/// The metadata properties this index searches.
	pub fn meta_props(&self) -> &[String] { &self.meta_props }

	pub fn len(&self) -> usize { self.catalog.len() }

	pub fn is_empty(&self) -> bool { self.catalog.is_empty() }

	/// Every item matching `compiled`, best score first.
	pub fn candidates(&self, compiled: &CompiledQuery) -> Result<Vec<Candidate>> {
		let query = self.to_query(compiled);
		let searcher = self.reader.searcher();
		let limit = usize::try_from(searcher.num_docs()).unwrap_or(usize::MAX).max(1);
		let top_docs = searcher.search(&query, &TopDocs::with_limit(limit))?;
		let mut hits = Vec::with_capacity(top_docs.len());
		for (score, addr) in top_docs {
			let doc: TantivyDocument = searcher.doc(addr)?;
			let id = doc.get_first(self.id_field).and_then(|v| v.as_str()).unwrap_or("");
			if id.is_empty() { continue; }
			hits.push(Candidate { id: id.to_string(), score });
		}
		debug!(clauses = compiled.clauses.len(), hits = hits.len(), "catalog query");
		Ok(hits)
	}

	/// Lower the compiled clauses to a tantivy query. Alternatives that
	/// analyse to nothing (only stop words or punctuation) are dropped, and so
	/// are clauses left without alternatives.
	pub fn to_query(&self, compiled: &CompiledQuery) -> Box<dyn Query> {
		let mut analyzer = self.analyzer.clone();
		let clauses: Vec<(Occur, Box<dyn Query>)> = compiled
			.clauses
			.iter()
			.filter_map(|clause| self.clause_query(&mut analyzer, clause))
			.map(|q| (Occur::Must, q))
			.collect();
		if clauses.is_empty() { Box::new(AllQuery) as Box<dyn Query> } else { Box::new(BooleanQuery::new(clauses)) }
	}

	fn clause_query(&self, analyzer: &mut TextAnalyzer, clause: &QueryClause) -> Option<Box<dyn Query>> {
		let mut alternatives: Vec<Box<dyn Query>> = clause
			.alternatives()
			.iter()
			.filter_map(|alt| self.alternative_query(analyzer, alt))
			.collect();
		match alternatives.len() {
			0 => None,
			1 => alternatives.pop(),
			_ => Some(Box::new(BooleanQuery::new(alternatives.into_iter().map(|q| (Occur::Should, q)).collect())) as Box<dyn Query>),
		}
	}

	/// All tokens of one alternative must match, each in any indexed field.
	fn alternative_query(&self, analyzer: &mut TextAnalyzer, text: &str) -> Option<Box<dyn Query>> {
		let mut tokens: Vec<Box<dyn Query>> = analyze(analyzer, text).iter().map(|t| self.token_query(t)).collect();
		match tokens.len() {
			0 => None,
			1 => tokens.pop(),
			_ => Some(Box::new(BooleanQuery::new(tokens.into_iter().map(|q| (Occur::Must, q)).collect())) as Box<dyn Query>),
		}
	}

	fn token_query(&self, token: &str) -> Box<dyn Query> {
		let rule = term_rule(token);
		let per_field = self
			.text_fields
			.iter()
			.map(|(field, boost)| {
				let term = Term::from_field_text(*field, token);
				let mut variants: Vec<(Occur, Box<dyn Query>)> =
					vec![(Occur::Should, Box::new(TermQuery::new(term.clone(), IndexRecordOption::WithFreqs)) as Box<dyn Query>)];
				if rule.prefix {
					let prefix = FuzzyTermQuery::new_prefix(term.clone(), 0, true);
					variants.push((Occur::Should, Box::new(BoostQuery::new(Box::new(prefix), PREFIX_WEIGHT))));
				}
				if let Some(distance) = rule.fuzzy_distance {
					let fuzzy = FuzzyTermQuery::new(term, distance, true);
					variants.push((Occur::Should, Box::new(BoostQuery::new(Box::new(fuzzy), FUZZY_WEIGHT))));
				}
				let field_query: Box<dyn Query> = Box::new(BooleanQuery::new(variants));
				(Occur::Should, Box::new(BoostQuery::new(field_query, *boost)) as Box<dyn Query>)
			})
			.collect();
		Box::new(BooleanQuery::new(per_field))
	}
}
