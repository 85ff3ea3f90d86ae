use std::env;
use std::sync::Arc;
use tracing::info;

use shopdb_cli::{init_tracing, open_catalog, parse_search_args};
use shopdb_core::config::Config;
use shopdb_core::traits::ProductSearcher;
use shopdb_message::{DelimitedSearch, IdCodec};
use shopdb_text::{CatalogIndex, ProductSearch};

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("Usage: shopdb-search [Key=value ...] [--budget N] [--id ID] [--ranked] [--raw-ids] [--catalog PATH]");
        eprintln!("Example: shopdb-search Type=dress Color=red,blue --budget 30");
        std::process::exit(if args.is_empty() { 1 } else { 0 });
    }
    let parsed = parse_search_args(&args)?;
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;

    let catalog = open_catalog(&settings, parsed.catalog.as_deref())?;
    let index = Arc::new(CatalogIndex::build(catalog, &settings.catalog.meta_props)?);
    let mut search_settings = settings.search.clone();
    if parsed.ranked { search_settings.randomize = false; }
    let search = ProductSearch::from_settings(index, &search_settings);
    info!(order = ?search.order(), filters = parsed.params.text_filters().count(), "searching");

    // the model sees delimited ids unless asked otherwise
    let searcher: Box<dyn ProductSearcher> = if parsed.raw_ids {
        Box::new(search)
    } else {
        Box::new(DelimitedSearch::new(search, IdCodec::from_settings(&settings.message)?))
    };
    let results = searcher.search(&parsed.params)?;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
