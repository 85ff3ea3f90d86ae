use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

use shopdb_core::config::DEFAULT_META_PROPS;
use shopdb_core::traits::ProductSearcher;
use shopdb_core::{Catalog, CatalogItem, FilterParameters};
use shopdb_text::{CatalogIndex, ProductSearch, SearchOrder};

fn meta_props() -> Vec<String> {
    DEFAULT_META_PROPS.iter().map(|s| s.to_string()).collect()
}

fn catalog() -> Catalog {
    let mut items = vec![
        CatalogItem::new("dr1", "Floral Wrap Dress", 24.0)
            .with_meta("Color", "Red")
            .with_meta("Type", "Wrap")
            .with_meta("Sleeve Length", "Short Sleeve"),
        CatalogItem::new("dr2", "Ruched Bodycon Dress", 30.0)
            .with_meta("Color", "Blue")
            .with_meta("Sleeve Length", "Long Sleeve"),
        CatalogItem::new("dr3", "Tiered Maxi Dress", 45.0)
            .with_meta("Color", "Green")
            .with_meta("Pockets", "Yes"),
        CatalogItem::new("cg1", "Cable Knit Cardigan", 19.99)
            .with_meta("Color", "Red")
            .with_meta("Sleeve Length", "Long Sleeve"),
        CatalogItem::new("tp1", "Reddish Crop Top", 8.0).with_meta("Color", "Burgundy"),
    ];
    for i in 0..25 {
        items.push(
            CatalogItem::new(format!("tee{i:02}"), format!("Basic Tee {i}"), 5.0 + i as f64)
                .with_meta("Color", "White"),
        );
    }
    Catalog::from_items(items).unwrap()
}

fn engine(order: SearchOrder) -> ProductSearch {
    let index = CatalogIndex::build(Arc::new(catalog()), &meta_props()).expect("index");
    ProductSearch::new(Arc::new(index), order)
}

fn ids(engine: &ProductSearch, params: &FilterParameters) -> HashSet<String> {
    engine.search(params).expect("search").items.into_iter().map(|r| r.id).collect()
}

fn set(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn clauses_are_anded_and_alternatives_ored() {
    let engine = engine(SearchOrder::Ranked);
    let params = FilterParameters::new().with("Type", "dress").with("Color", "red,blue");
    assert_eq!(ids(&engine, &params), set(&["dr1", "dr2"]));
}

#[test]
fn short_terms_match_exactly() {
    let engine = engine(SearchOrder::Ranked);
    // "red" must not reach "Reddish"
    let params = FilterParameters::new().with("Color", "Red");
    assert_eq!(ids(&engine, &params), set(&["dr1", "cg1"]));
}

#[test]
fn long_terms_match_by_prefix_and_with_typos() {
    let engine = engine(SearchOrder::Ranked);
    let prefix = FilterParameters::new().with("Sleeve Length", "sleev");
    assert_eq!(ids(&engine, &prefix), set(&["dr1", "dr2", "cg1"]));

    let truncated = FilterParameters::new().with("Type", "Cardig");
    assert_eq!(ids(&engine, &truncated), set(&["cg1"]));

    let typo = FilterParameters::new().with("Type", "cardigen");
    assert_eq!(ids(&engine, &typo), set(&["cg1"]));
}

#[test]
fn multi_word_value_requires_every_word() {
    let engine = engine(SearchOrder::Ranked);
    let params = FilterParameters::new().with("Sleeve Length", "Long Sleeve");
    assert_eq!(ids(&engine, &params), set(&["dr2", "cg1"]));
}

#[test]
fn budget_is_an_inclusive_ceiling() {
    let engine = engine(SearchOrder::Shuffled);
    let params = FilterParameters::new().with("Type", "dress").with_budget(30.0);
    assert_eq!(ids(&engine, &params), set(&["dr1", "dr2"]));

    let catalog = catalog();
    let everything = engine.search(&FilterParameters::new().with_budget(10.0)).unwrap();
    assert!(!everything.is_empty());
    for result in &everything.items {
        assert!(catalog.get(&result.id).unwrap().price <= 10.0);
    }
}

#[test]
fn negative_budget_returns_nothing() {
    let engine = engine(SearchOrder::Ranked);
    assert!(engine.search(&FilterParameters::new().with_budget(-5.0)).unwrap().is_empty());
    let params = FilterParameters::new().with("Color", "White").with_budget(-0.01);
    assert!(engine.search(&params).unwrap().is_empty());
}

#[test]
fn padded_pin_is_not_trimmed() {
    let engine = engine(SearchOrder::Ranked);
    assert!(engine.search(&FilterParameters::new().with_id(" cg1 ")).unwrap().is_empty());
    assert_eq!(ids(&engine, &FilterParameters::new().with_id("")).len(), 10);
}

#[test]
fn budget_only_search_is_not_empty() {
    let engine = engine(SearchOrder::Ranked);
    let results = engine.search(&FilterParameters::new().with_budget(1000.0)).unwrap();
    assert_eq!(results.len(), 10);
}

#[test]
fn pinned_id_returns_at_most_that_item() {
    let engine = engine(SearchOrder::Shuffled);
    let pinned = engine.search(&FilterParameters::new().with_id("cg1")).unwrap();
    assert_eq!(pinned.items.len(), 1);
    assert_eq!(pinned.items[0].id, "cg1");
    assert_eq!(pinned.items[0].name, "Cable Knit Cardigan");

    let broad = FilterParameters::new().with("Color", "white,red").with_id("tee07");
    assert_eq!(ids(&engine, &broad), set(&["tee07"]));

    let mismatch = FilterParameters::new().with("Color", "Green").with_id("cg1");
    assert!(engine.search(&mismatch).unwrap().is_empty());

    let over_budget = FilterParameters::new().with_id("dr3").with_budget(40.0);
    assert!(engine.search(&over_budget).unwrap().is_empty());
}

#[test]
fn results_are_capped() {
    let engine = engine(SearchOrder::Shuffled);
    let params = FilterParameters::new().with("Color", "White");
    assert_eq!(engine.search(&params).unwrap().len(), 10);

    let narrow = engine.with_max_results(3);
    assert_eq!(narrow.search(&params).unwrap().len(), 3);
}

#[test]
fn unknown_and_non_string_filters_are_ignored() {
    let engine = engine(SearchOrder::Ranked);
    let params: FilterParameters = serde_json::from_value(json!({
        "Color": "green",
        "Occasion": "wedding",
        "Size": 8
    }))
    .unwrap();
    assert_eq!(ids(&engine, &params), set(&["dr3"]));
}

#[test]
fn shuffled_search_draws_from_the_matches() {
    let engine = engine(SearchOrder::Shuffled);
    let params = FilterParameters::new().with("Color", "White");
    let all: HashSet<String> = (0..25).map(|i| format!("tee{i:02}")).collect();

    let mut seen = HashSet::new();
    for seed in 0..20u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let results = engine.search_with_rng(&params, &mut rng).unwrap();
        let ids: HashSet<String> = results.items.into_iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 10, "no duplicates within one result set");
        assert!(ids.is_subset(&all));
        seen.extend(ids);
    }
    assert!(seen.len() > 10, "shuffling reaches beyond a fixed top ten");
}

#[test]
fn seeded_shuffle_is_reproducible() {
    let engine = engine(SearchOrder::Shuffled);
    let params = FilterParameters::new().with("Color", "White");
    let a = engine.search_with_rng(&params, &mut StdRng::seed_from_u64(7)).unwrap();
    let b = engine.search_with_rng(&params, &mut StdRng::seed_from_u64(7)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn ranked_search_is_deterministic() {
    let engine = engine(SearchOrder::Ranked);
    let params = FilterParameters::new().with("Color", "White");
    assert_eq!(engine.search(&params).unwrap(), engine.search(&params).unwrap());
}

#[test]
fn concurrent_searches_share_one_index() {
    let engine: Arc<dyn ProductSearcher> = Arc::new(engine(SearchOrder::Shuffled));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let params = FilterParameters::new().with("Type", "dress").with_budget(30.0);
                engine.search(&params).unwrap().items.len()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 2);
    }
}
