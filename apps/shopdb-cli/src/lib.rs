//! Shared plumbing for the shopdb command line tools.

use anyhow::{bail, Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shopdb_core::config::Settings;
use shopdb_core::{Catalog, FilterParameters};

/// Log to stderr so stdout stays clean JSON. `RUST_LOG` overrides the
/// default `info` level.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

/// Load the catalog from `override_path` or from `catalog.path` resolved
/// against the working directory.
pub fn open_catalog(settings: &Settings, override_path: Option<&Path>) -> Result<Arc<Catalog>> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => settings.catalog_path(&env::current_dir()?),
    };
    let catalog = Catalog::load(&path).with_context(|| format!("loading catalog from {}", path.display()))?;
    info!(path = %path.display(), items = catalog.len(), "catalog loaded");
    Ok(Arc::new(catalog))
}

#[derive(Debug, Default, PartialEq)]
pub struct SearchArgs {
    pub params: FilterParameters,
    pub ranked: bool,
    pub raw_ids: bool,
    pub catalog: Option<PathBuf>,
}

/// `Color=red,blue "Sleeve Length=Long Sleeve" --budget 30 --id sw1 --ranked
/// --raw-ids --catalog path`
pub fn parse_search_args(args: &[String]) -> Result<SearchArgs> {
    let mut parsed = SearchArgs::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--budget" | "-b" => {
                let value = flag_value(args, i)?;
                let budget = value.parse::<f64>().with_context(|| format!("--budget expects a number, got '{value}'"))?;
                parsed.params.budget = Some(budget);
                i += 1;
            }
            "--id" => { parsed.params.id = Some(flag_value(args, i)?.to_string()); i += 1; }
            "--catalog" | "-c" => { parsed.catalog = Some(PathBuf::from(flag_value(args, i)?)); i += 1; }
            "--ranked" => parsed.ranked = true,
            "--raw-ids" => parsed.raw_ids = true,
            arg if arg.starts_with('-') => bail!("unknown flag '{arg}'"),
            arg => {
                let Some((key, value)) = arg.split_once('=') else { bail!("expected key=value, got '{arg}'") };
                parsed.params = std::mem::take(&mut parsed.params).with(key.trim(), value);
            }
        }
        i += 1;
    }
    Ok(parsed)
}

fn flag_value(args: &[String], i: usize) -> Result<&str> {
    match args.get(i + 1) {
        Some(v) => Ok(v.as_str()),
        None => bail!("{} requires a value", args[i]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> { list.iter().map(|s| s.to_string()).collect() }

    #[test]
    fn parses_filters_and_flags() {
        let parsed = parse_search_args(&args(&["Color=red,blue", "Sleeve Length=Long Sleeve", "--budget", "30", "--ranked"])).unwrap();
        assert_eq!(parsed.params.price_ceiling(), Some(30.0));
        assert!(parsed.ranked);
        assert!(!parsed.raw_ids);
        let text: Vec<_> = parsed.params.text_filters().collect();
        assert_eq!(text, vec![("Color", "red,blue"), ("Sleeve Length", "Long Sleeve")]);
    }

    #[test]
    fn pin_and_catalog_override() {
        let parsed = parse_search_args(&args(&["--id", "sw1", "-c", "/tmp/c.json"])).unwrap();
        assert_eq!(parsed.params.pinned_id(), Some("sw1"));
        assert_eq!(parsed.catalog, Some(PathBuf::from("/tmp/c.json")));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_search_args(&args(&["--budget", "cheap"])).is_err());
        assert!(parse_search_args(&args(&["--budget"])).is_err());
        assert!(parse_search_args(&args(&["red"])).is_err());
        assert!(parse_search_args(&args(&["--verbose"])).is_err());
    }
}
