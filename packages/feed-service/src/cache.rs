use std::{collections::HashSet, sync::Arc, time::Duration};

use moka::sync::Cache;
use tokio::{
	task::JoinHandle,
	time::{MissedTickBehavior, interval},
};

use feed_domain::{Item, ItemId};

/// Shared `id -> Item` cache. Entries expire a fixed duration after their last store.
pub struct ItemCache {
	entries: Cache<ItemId, Item>,
	ttl: Duration,
}
impl ItemCache {
	pub fn new(ttl: Duration, max_entries: u64) -> Self {
		let entries = Cache::builder().max_capacity(max_entries).time_to_live(ttl).build();

		Self { entries, ttl }
	}

	pub fn from_config(cfg: &feed_config::Cache) -> Self {
		Self::new(cfg.ttl(), cfg.max_entries)
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Approximate until the next [`ItemCache::sweep`].
	pub fn len(&self) -> u64 {
		self.entries.entry_count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Splits `ids` into cached items and ids that still need a fetch, both in input order.
	/// Expired entries count as misses and repeated ids are reported once.
	pub fn lookup(&self, ids: &[ItemId]) -> (Vec<Item>, Vec<ItemId>) {
		let mut seen = HashSet::with_capacity(ids.len());
		let mut found = Vec::with_capacity(ids.len());
		let mut missing = Vec::new();

		for id in ids.iter().filter(|id| seen.insert(**id)) {
			match self.entries.get(id) {
				Some(item) => found.push(item),
				None => missing.push(*id),
			}
		}

		(found, missing)
	}

	pub fn store(&self, items: &[Item]) {
		for item in items {
			self.entries.insert(item.id, item.clone());
		}
	}

	/// Evicts expired entries now instead of waiting for cache traffic to do it.
	pub fn sweep(&self) {
		self.entries.run_pending_tasks();
	}
}

/// Runs [`ItemCache::sweep`] on a fixed interval until the handle is aborted.
pub fn spawn_sweeper(cache: Arc<ItemCache>, every: Duration) -> JoinHandle<()> {
	tokio::spawn(async move {
		let mut ticker = interval(every);

		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

		loop {
			ticker.tick().await;

			let before = cache.len();

			cache.sweep();

			let remaining = cache.len();

			if remaining < before {
				tracing::debug!(
					removed = before - remaining,
					remaining,
					"Swept expired cache entries."
				);
			}
		}
	})
}
