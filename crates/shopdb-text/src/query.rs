//! Filter parameters -> boolean text query.
//!
//! Every text filter becomes one clause and all clauses must hold. A value
//! holding commas is an OR over its trimmed alternatives. `budget` and `id`
//! never become text; the search engine applies them after retrieval.

use std::collections::BTreeMap;

use shopdb_core::FilterParameters;

pub const OR_SEPARATOR: char = ',';

/// Terms longer than this get prefix matching.
pub const PREFIX_MIN_CHARS: usize = 4;
/// Terms longer than this additionally get fuzzy matching.
pub const FUZZY_MIN_CHARS: usize = 6;
/// Allowed edits as a fraction of the term length.
pub const FUZZY_RATIO: f64 = 0.2;
/// Levenshtein automata in the index are only built up to two edits.
pub const MAX_FUZZY_DISTANCE: u8 = 2;
pub const NAME_BOOST: f32 = 2.0;
pub const PREFIX_WEIGHT: f32 = 0.375;
pub const FUZZY_WEIGHT: f32 = 0.45;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryClause {
    Term(String),
    AnyOf(Vec<String>),
}

impl QueryClause {
    pub fn alternatives(&self) -> &[String] {
        match self {
            Self::Term(term) => std::slice::from_ref(term),
            Self::AnyOf(terms) => terms,
        }
    }
}

/// AND of clauses. No clauses means the whole catalog matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledQuery {
    pub clauses: Vec<QueryClause>,
}

impl CompiledQuery {
    pub fn is_match_all(&self) -> bool { self.clauses.is_empty() }
}

/// How a single analysed term is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermRule {
    pub prefix: bool,
    pub fuzzy_distance: Option<u8>,
}

/// Short terms ("red") match exactly; longer ones tolerate truncation and
/// typos.
pub fn term_rule(term: &str) -> TermRule {
    let len = term.chars().count();
    let fuzzy_distance = if len > FUZZY_MIN_CHARS {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let edits = (len as f64 * FUZZY_RATIO).round() as u8;
        Some(edits.min(MAX_FUZZY_DISTANCE)).filter(|d| *d > 0)
    } else {
        None
    };
    TermRule { prefix: len > PREFIX_MIN_CHARS, fuzzy_distance }
}

#[derive(Debug, Clone, Default)]
pub struct QueryCompiler {
    /// Normalized key -> declared property name. `None` accepts any key.
    allowed: Option<BTreeMap<String, String>>,
}

impl QueryCompiler {
    /// Accept every string-valued key.
    pub fn permissive() -> Self { Self::default() }

    /// Accept only the given property names. Matching ignores case and treats
    /// `_`, `-` and spaces alike, so `sleeve_length` selects `Sleeve Length`.
    pub fn with_allowed_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = keys
            .into_iter()
            .map(|k| (normalize_key(k.as_ref()), k.as_ref().to_string()))
            .collect();
        Self { allowed: Some(allowed) }
    }

    pub fn accepts(&self, key: &str) -> bool {
        self.allowed.as_ref().map_or(true, |allowed| allowed.contains_key(&normalize_key(key)))
    }

    pub fn compile(&self, params: &FilterParameters) -> CompiledQuery {
        let clauses = params
            .text_filters()
            .filter(|(key, _)| self.accepts(key))
            .filter_map(|(_, value)| clause_for(value))
            .collect();
        CompiledQuery { clauses }
    }
}

/// Compile without a key allow-list.
pub fn compile(params: &FilterParameters) -> CompiledQuery {
    QueryCompiler::permissive().compile(params)
}

fn clause_for(value: &str) -> Option<QueryClause> {
    if value.contains(OR_SEPARATOR) {
        let alternatives: Vec<String> = value
            .split(OR_SEPARATOR)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        return (!alternatives.is_empty()).then_some(QueryClause::AnyOf(alternatives));
    }
    let value = value.trim();
    (!value.is_empty()).then(|| QueryClause::Term(value.to_string()))
}

fn normalize_key(key: &str) -> String {
    key.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn comma_value_becomes_or_clause_and_budget_is_not_text() {
        let params = FilterParameters::new().with("color", "red,blue").with_budget(50.0);
        let compiled = compile(&params);
        assert_eq!(
            compiled.clauses,
            vec![QueryClause::AnyOf(vec!["red".to_string(), "blue".to_string()])]
        );
    }

    #[test]
    fn each_key_is_one_and_clause() {
        let params = FilterParameters::new()
            .with("Type", "Dress")
            .with("Color", " Green , Olive ")
            .with_id("sku1");
        let compiled = compile(&params);
        assert_eq!(
            compiled.clauses,
            vec![
                QueryClause::AnyOf(vec!["Green".to_string(), "Olive".to_string()]),
                QueryClause::Term("Dress".to_string()),
            ]
        );
    }

    #[test]
    fn budget_only_matches_everything() {
        let compiled = compile(&FilterParameters::new().with_budget(20.0));
        assert!(compiled.is_match_all());
    }

    #[test]
    fn empty_alternatives_are_dropped() {
        let params = FilterParameters::new().with("Color", "red, ,").with("Style", "  ").with("Fabric", ",");
        assert_eq!(compile(&params).clauses, vec![QueryClause::AnyOf(vec!["red".to_string()])]);
    }

    #[test]
    fn allow_list_ignores_unknown_and_non_string_keys() {
        let compiler = QueryCompiler::with_allowed_keys(["Color", "Sleeve Length"]);
        let params: FilterParameters = serde_json::from_value(json!({
            "colour": "red",
            "sleeve_length": "Long Sleeve",
            "COLOR": 7,
            "budget": 30
        }))
        .unwrap();
        assert!(compiler.accepts("SLEEVE-length"));
        assert!(!compiler.accepts("colour"));
        assert_eq!(
            compiler.compile(&params).clauses,
            vec![QueryClause::Term("Long Sleeve".to_string())]
        );
    }

    #[test]
    fn term_rule_depends_on_length() {
        assert_eq!(term_rule("red"), TermRule { prefix: false, fuzzy_distance: None });
        assert_eq!(term_rule("denim"), TermRule { prefix: true, fuzzy_distance: None });
        assert_eq!(term_rule("cotton"), TermRule { prefix: true, fuzzy_distance: None });
        assert_eq!(term_rule("cardigan"), TermRule { prefix: true, fuzzy_distance: Some(2) });
        assert_eq!(term_rule("sweater"), TermRule { prefix: true, fuzzy_distance: Some(1) });
        assert_eq!(term_rule("turtleneckdress"), TermRule { prefix: true, fuzzy_distance: Some(2) });
    }
}
