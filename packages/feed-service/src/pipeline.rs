use std::collections::HashMap;

use feed_domain::{Item, ItemId};

use crate::{Error, ItemCache, ItemStore, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Materialized {
	/// Known items in candidate order; unknown ids are dropped.
	pub items: Vec<Item>,
	pub round_trips: u32,
}

/// Serves cached items and fetches the rest in a single batch, refreshing the cache.
pub async fn materialize(
	cache: &ItemCache,
	store: &dyn ItemStore,
	ids: &[ItemId],
) -> Result<Materialized> {
	let (found, missing) = cache.lookup(ids);

	if missing.is_empty() {
		return Ok(Materialized { items: found, round_trips: 0 });
	}

	tracing::info!(
		count = missing.len(),
		cached = found.len(),
		"Fetching item rows for cache misses."
	);

	let fetched = store
		.fetch_by_ids(&missing)
		.await
		.map_err(|err| Error::Fetch { message: format!("Item fetch failed: {err}") })?;

	cache.store(&fetched);

	let mut by_id: HashMap<ItemId, Item> =
		found.into_iter().chain(fetched).map(|item| (item.id, item)).collect();
	let items = ids.iter().filter_map(|id| by_id.remove(id)).collect();

	Ok(Materialized { items, round_trips: 1 })
}
