//! Domain types used by the catalog index, the search engine and the message
//! pipeline.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub type ItemId = String;
pub type Meta = Map<String, Value>;

/// One product of the catalog snapshot.
///
/// - `id`: stable unique identifier (`skuId` in vendor snapshots)
/// - `name`: display title (`title` in vendor snapshots)
/// - `price`: non-negative list price
/// - `meta`: free-form product properties, only allow-listed ones are searchable
/// - `extra`: every other field of the snapshot record (url, imageUrl, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCatalogItem")]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub meta: Meta,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Snapshot records as they appear on disk, before the id and title aliases
/// are resolved.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCatalogItem {
    #[serde(default)]
    pub(crate) id: Option<Value>,
    #[serde(default)]
    pub(crate) sku_id: Option<Value>,
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) price: Option<f64>,
    #[serde(default)]
    pub(crate) meta: Meta,
    #[serde(flatten)]
    pub(crate) extra: Map<String, Value>,
}

impl RawCatalogItem {
    /// The identifier field, preferring `skuId` over `id`.
    pub(crate) fn identifier(&self) -> Option<String> {
        self.sku_id.as_ref().or(self.id.as_ref()).and_then(scalar_text)
    }
}

impl TryFrom<RawCatalogItem> for CatalogItem {
    type Error = String;

    fn try_from(raw: RawCatalogItem) -> Result<Self, Self::Error> {
        let id = raw.identifier().ok_or_else(|| "item without an id".to_string())?;
        let price = raw.price.unwrap_or(0.0);
        if !price.is_finite() || price < 0.0 {
            return Err(format!("item {id} has an invalid price {price}"));
        }
        let name = raw.title.or(raw.name).unwrap_or_default();
        Ok(Self { id, name, price, meta: raw.meta, extra: raw.extra })
    }
}

impl CatalogItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self { id: id.into(), name: name.into(), price, meta: Map::new(), extra: Map::new() }
    }

    /// Builder-style helper used when assembling catalogs in code.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Text of a dotted field path such as `name` or `meta.Sleeve Length`.
    ///
    /// Returns `None` whenever a segment of the path is absent or the value
    /// has no text form (null, empty string, nested object).
    pub fn field_text(&self, path: &str) -> Option<String> {
        let segments: Vec<&str> = path.split('.').collect();
        let (head, rest) = segments.split_first()?;
        match (*head, rest.is_empty()) {
            ("id", true) => Some(self.id.clone()),
            ("name" | "title", true) => Some(self.name.clone()).filter(|s| !s.is_empty()),
            ("price", true) => Some(self.price.to_string()),
            ("meta", false) => lookup_in(&self.meta, rest).and_then(value_text),
            (_, _) => lookup_in(&self.extra, &segments).and_then(value_text),
        }
    }
}

fn lookup_in<'a>(object: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (head, rest) = path.split_first()?;
    // property names may themselves contain dots
    if let Some(value) = object.get(&path.join(".")) {
        return Some(value);
    }
    let value = object.get(*head)?;
    if rest.is_empty() {
        return Some(value);
    }
    lookup_in(value.as_object()?, rest)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(values) => {
            let parts: Vec<String> = values.iter().filter_map(scalar_text).collect();
            if parts.is_empty() { None } else { Some(parts.join(" ")) }
        }
        other => scalar_text(other),
    }
}

/// Structured arguments of the product search tool.
///
/// `budget` and `id` are post-filters; every other string property is a text
/// filter, and a comma inside its value separates alternatives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterParameters {
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub properties: BTreeMap<String, Value>,
}

/// Tool callers occasionally send `"50"` instead of `50`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_start_matches('$').parse().ok(),
        _ => None,
    })
}

impl FilterParameters {
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), Value::String(value.into()));
        self
    }

    /// Price ceiling to enforce. A zero or non-finite budget does not filter;
    /// a negative one admits nothing.
    pub fn price_ceiling(&self) -> Option<f64> {
        self.budget.filter(|b| b.is_finite() && *b != 0.0)
    }

    /// The exact id every result must have, if any. Compared verbatim; only
    /// an empty id leaves results unpinned.
    pub fn pinned_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// String-valued filter properties in key order; other value types are
    /// ignored.
    pub fn text_filters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.as_str(), s)))
    }
}

/// Lightweight projection of a catalog item returned to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: ItemId,
    pub name: String,
}

/// Output of the search tool: `{ "items": [{ "id", "name" }, ...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub items: Vec<SearchResult>,
}

impl SearchResults {
    pub fn len(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn ids(&self) -> impl Iterator<Item = &str> { self.items.iter().map(|r| r.id.as_str()) }
}

/// A unit of parsed assistant content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ContentSegment {
    Prose(String),
    ItemGroup(Vec<ItemId>),
}

impl ContentSegment {
    pub fn is_prose(&self) -> bool { matches!(self, Self::Prose(_)) }

    pub fn item_ids(&self) -> Option<&[ItemId]> {
        match self {
            Self::ItemGroup(ids) => Some(ids),
            Self::Prose(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A chat message. Only assistant messages carry parsed segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<ContentSegment>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into(), segments: Vec::new() }
    }

    /// Every item id referenced by the message, in order, repeats included.
    pub fn item_ids(&self) -> impl Iterator<Item = &ItemId> {
        self.segments.iter().filter_map(ContentSegment::item_ids).flatten()
    }

    pub fn has_items(&self) -> bool { self.item_ids().next().is_some() }
}

/// A message together with the catalog records resolved for its item ids.
///
/// Ids that did not resolve are absent from `items`; renderers show them as
/// still loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydratedMessage {
    #[serde(flatten)]
    pub message: Message,
    #[serde(default)]
    pub items: BTreeMap<ItemId, CatalogItem>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemState<'a> {
    Loaded(&'a CatalogItem),
    Loading,
}

impl HydratedMessage {
    pub fn unhydrated(message: Message) -> Self {
        Self { message, items: BTreeMap::new() }
    }

    pub fn item_state(&self, id: &str) -> ItemState<'_> {
        self.items.get(id).map_or(ItemState::Loading, ItemState::Loaded)
    }
}
