use anyhow::{bail, Result};

use shopdb_core::config::{MessageSettings, DEFAULT_ID_MARKER};
use shopdb_core::traits::ProductSearcher;
use shopdb_core::{FilterParameters, ItemId, SearchResult, SearchResults};

/// Wraps item ids in a literal marker pair (`--SKU123--`) so they survive a
/// trip through the model's text and can be located again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdCodec {
    marker: String,
}

impl Default for IdCodec {
    fn default() -> Self { Self { marker: DEFAULT_ID_MARKER.to_string() } }
}

impl IdCodec {
    /// The marker may not contain identifier characters (`[A-Za-z0-9_]`),
    /// otherwise ids could not be told apart from their delimiters.
    pub fn new(marker: impl Into<String>) -> Result<Self> {
        let marker = marker.into();
        if marker.is_empty() {
            bail!("id marker must not be empty");
        }
        if marker.chars().any(is_id_char) {
            bail!("id marker '{marker}' contains identifier characters");
        }
        if marker.contains('\n') {
            bail!("id marker must fit on one line");
        }
        Ok(Self { marker })
    }

    pub fn from_settings(settings: &MessageSettings) -> Result<Self> { Self::new(settings.id_marker.clone()) }

    pub fn marker(&self) -> &str { &self.marker }

    pub fn wrap(&self, id: &str) -> String { format!("{m}{id}{m}", m = self.marker) }

    /// Strip every non-identifier character from a captured id. Markers or
    /// punctuation that leaked into the capture are dropped with it.
    pub fn unwrap(&self, captured: &str) -> ItemId { captured.chars().filter(|c| is_id_char(*c)).collect() }

    /// Raw spans enclosed by a marker pair, left to right.
    ///
    /// Matching is non-greedy and never crosses a line break; the span holds
    /// at least one character and both markers must be present.
    pub fn captures<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let m = self.marker.as_str();
        let mut found = Vec::new();
        let mut pos = 0;
        while let Some(offset) = text[pos..].find(m) {
            let open = pos + offset;
            let body_start = open + m.len();
            let rest = &text[body_start..];
            let Some(first) = rest.chars().next().filter(|c| *c != '\n') else {
                pos = next_char(text, open);
                continue;
            };
            let line_end = rest.find('\n').unwrap_or(rest.len());
            let search_from = first.len_utf8();
            match rest[search_from..line_end].find(m) {
                Some(close) => {
                    let body_end = body_start + search_from + close;
                    found.push(&text[body_start..body_end]);
                    pos = body_end + m.len();
                }
                None => pos = next_char(text, open),
            }
        }
        found
    }

    /// Delimited ids in `text`, unwrapped, in order. Captures that unwrap to
    /// nothing are skipped.
    pub fn find_ids(&self, text: &str) -> Vec<ItemId> {
        self.captures(text).into_iter().map(|c| self.unwrap(c)).filter(|id| !id.is_empty()).collect()
    }

    pub fn contains_id(&self, line: &str) -> bool { !self.captures(line).is_empty() }
}

fn is_id_char(c: char) -> bool { c.is_ascii_alphanumeric() || c == '_' }

fn next_char(text: &str, at: usize) -> usize { at + text[at..].chars().next().map_or(1, char::len_utf8) }

/// Search tool wrapper that hands results to the model with delimited ids.
pub struct DelimitedSearch<S> where S: ProductSearcher {
    inner: S,
    codec: IdCodec,
}

impl<S> DelimitedSearch<S> where S: ProductSearcher {
    pub fn new(inner: S, codec: IdCodec) -> Self { Self { inner, codec } }

    pub fn codec(&self) -> &IdCodec { &self.codec }

    pub fn search(&self, params: &FilterParameters) -> Result<SearchResults> {
        let results = self.inner.search(params)?;
        let items = results
            .items
            .into_iter()
            .map(|r| SearchResult { id: self.codec.wrap(&r.id), name: r.name })
            .collect();
        Ok(SearchResults { items })
    }
}

impl<S> ProductSearcher for DelimitedSearch<S> where S: ProductSearcher {
    fn search(&self, params: &FilterParameters) -> Result<SearchResults> { Self::search(self, params) }
}
