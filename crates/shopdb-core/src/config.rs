//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` +
//! `config.<env>.toml` + `APP_*` env vars (`__` separates nested keys, e.g.
//! `APP_SEARCH__RANDOMIZE=false`). Provides helpers to expand `~` and `${VAR}`
//! and to resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Metadata properties indexed for search unless `catalog.meta_props`
/// overrides them.
pub const DEFAULT_META_PROPS: &[&str] = &[
    "Bottom Type",
    "Bra Type",
    "Closure Type",
    "Color",
    "Composition",
    "Details",
    "Fabric",
    "Fit Type",
    "Length",
    "Material",
    "Neckline",
    "Pattern Type",
    "Pockets",
    "Sleeve Length",
    "Sleeve Type",
    "Style",
    "Top Type",
    "Type",
    "Waist Line",
];

pub const DEFAULT_ID_MARKER: &str = "--";
pub const DEFAULT_MAX_RESULTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub path: String,
    pub meta_props: Vec<String>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            path: "data/catalog.json".to_string(),
            meta_props: DEFAULT_META_PROPS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub randomize: bool,
    pub max_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self { Self { randomize: true, max_results: DEFAULT_MAX_RESULTS } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageSettings {
    pub id_marker: String,
}

impl Default for MessageSettings {
    fn default() -> Self { Self { id_marker: DEFAULT_ID_MARKER.to_string() } }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub search: SearchSettings,
    pub message: MessageSettings,
}

impl Settings {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.search.max_results == 0 {
            return Err(Error::InvalidConfig("search.max_results must be at least 1".into()));
        }
        if self.catalog.meta_props.iter().any(|p| p.trim().is_empty()) {
            return Err(Error::InvalidConfig("catalog.meta_props contains an empty name".into()));
        }
        let marker = &self.message.id_marker;
        if marker.is_empty() || marker.chars().any(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::InvalidConfig(format!(
                "message.id_marker '{marker}' must be non-empty and free of identifier characters"
            )));
        }
        Ok(())
    }

    pub fn catalog_path(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.catalog.path)
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?;
        Ok(config)
    }

    /// Wrap an explicit figment, layered over the built-in defaults.
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment: Figment::from(Serialized::defaults(Settings::default())).merge(figment) }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed, validated settings.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
