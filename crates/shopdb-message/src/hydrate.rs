use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

use shopdb_core::traits::ItemFetcher;
use shopdb_core::{CatalogItem, HydratedMessage, ItemId, Message};

/// Attach catalog records to every message's item groups.
///
/// The ids of all messages are deduplicated and fetched in a single call.
/// Each message then gets only the records for its own ids that resolved;
/// unresolved ids are left out so they render as loading. A failed fetch
/// hydrates nothing instead of failing the messages.
pub async fn hydrate<F>(messages: Vec<Message>, fetcher: &F) -> Vec<HydratedMessage>
where
    F: ItemFetcher + ?Sized,
{
    let wanted: BTreeSet<&ItemId> = messages.iter().flat_map(Message::item_ids).collect();
    let ids: Vec<ItemId> = wanted.into_iter().cloned().collect();

    let fetched = match fetcher.fetch_items(&ids).await {
        Ok(items) => items,
        Err(e) => {
            warn!(ids = ids.len(), error = %e, "item fetch failed; messages left unhydrated");
            Vec::new()
        }
    };
    let by_id: HashMap<ItemId, CatalogItem> = fetched.into_iter().map(|item| (item.id.clone(), item)).collect();
    debug!(messages = messages.len(), requested = ids.len(), resolved = by_id.len(), "hydrated messages");

    messages
        .into_iter()
        .map(|message| {
            let items = message
                .item_ids()
                .filter_map(|id| by_id.get(id).map(|item| (id.clone(), item.clone())))
                .collect();
            HydratedMessage { message, items }
        })
        .collect()
}
