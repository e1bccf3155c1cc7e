use std::sync::Arc;

use feed_providers::TagsClient;
use feed_service::{FeedService, ItemCache, PgItemStore, cache};
use feed_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<FeedService>,
}
impl AppState {
	/// Wires Postgres, the tag search client and the shared item cache, and starts the sweeper.
	pub async fn new(config: feed_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let search = TagsClient::new(&config.search)?;
		let item_cache = Arc::new(ItemCache::from_config(&config.cache));

		cache::spawn_sweeper(item_cache.clone(), config.cache.sweep_interval());

		let service = FeedService::new(
			config,
			item_cache,
			Arc::new(PgItemStore::new(db)),
			Arc::new(search),
		);

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: FeedService) -> Self {
		Self { service: Arc::new(service) }
	}
}
