pub mod cache;
pub mod pipeline;
pub mod resolve;

mod error;

pub use cache::ItemCache;
pub use error::{Error, Result};
pub use pipeline::Materialized;
pub use resolve::Candidates;

use std::{future::Future, pin::Pin, sync::Arc, time::Instant};

use time::OffsetDateTime;

use feed_config::Config;
use feed_domain::{
	Category, Item, ItemFilter, ItemId, ItemsPage, ItemsQuery, PageOrder, PageRules, Paginated,
	SampleKind, page,
};
use feed_providers::{SearchOptions, TagsClient};
use feed_storage::{db::Db, queries};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read access to item rows.
pub trait ItemStore
where
	Self: Send + Sync,
{
	fn fetch_by_ids<'a>(
		&'a self,
		ids: &'a [ItemId],
	) -> BoxFuture<'a, feed_storage::Result<Vec<Item>>>;

	fn fetch_filtered<'a>(
		&'a self,
		filter: &'a ItemFilter,
	) -> BoxFuture<'a, feed_storage::Result<Vec<ItemId>>>;

	fn resolve_promoted_cursor<'a>(
		&'a self,
		promoted: i64,
	) -> BoxFuture<'a, feed_storage::Result<ItemId>>;

	fn sample_random<'a>(
		&'a self,
		kind: SampleKind,
	) -> BoxFuture<'a, feed_storage::Result<Vec<ItemId>>>;
}

pub trait SearchProvider
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		expression: &'a str,
		options: SearchOptions,
	) -> BoxFuture<'a, feed_providers::Result<Vec<ItemId>>>;
}

/// Postgres-backed [`ItemStore`].
pub struct PgItemStore {
	db: Db,
}
impl PgItemStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}
}
impl ItemStore for PgItemStore {
	fn fetch_by_ids<'a>(
		&'a self,
		ids: &'a [ItemId],
	) -> BoxFuture<'a, feed_storage::Result<Vec<Item>>> {
		Box::pin(queries::fetch_by_ids(&self.db, ids))
	}

	fn fetch_filtered<'a>(
		&'a self,
		filter: &'a ItemFilter,
	) -> BoxFuture<'a, feed_storage::Result<Vec<ItemId>>> {
		Box::pin(queries::fetch_filtered(&self.db, filter))
	}

	fn resolve_promoted_cursor<'a>(
		&'a self,
		promoted: i64,
	) -> BoxFuture<'a, feed_storage::Result<ItemId>> {
		Box::pin(queries::resolve_promoted_id(&self.db, promoted))
	}

	fn sample_random<'a>(
		&'a self,
		kind: SampleKind,
	) -> BoxFuture<'a, feed_storage::Result<Vec<ItemId>>> {
		Box::pin(queries::sample_random(&self.db, kind))
	}
}

impl SearchProvider for TagsClient {
	fn search<'a>(
		&'a self,
		expression: &'a str,
		options: SearchOptions,
	) -> BoxFuture<'a, feed_providers::Result<Vec<ItemId>>> {
		Box::pin(TagsClient::search(self, expression, options))
	}
}

pub struct FeedService {
	pub cfg: Config,
	pub cache: Arc<ItemCache>,
	pub store: Arc<dyn ItemStore>,
	pub search: Arc<dyn SearchProvider>,
}
impl FeedService {
	pub fn new(
		cfg: Config,
		cache: Arc<ItemCache>,
		store: Arc<dyn ItemStore>,
		search: Arc<dyn SearchProvider>,
	) -> Self {
		Self { cfg, cache, store, search }
	}

	/// Resolves, materializes and paginates one category page within the request timeout.
	pub async fn page(&self, category: Category, query: ItemsQuery) -> Result<ItemsPage> {
		let started = Instant::now();
		let timeout = self.cfg.service.request_timeout();
		let (paginated, query_count) =
			tokio::time::timeout(timeout, self.build_page(category, &query)).await.map_err(
				|_| Error::Fetch {
					message: format!(
						"Page for {category} did not complete within {} ms.",
						timeout.as_millis()
					),
				},
			)??;

		Ok(ItemsPage {
			items: paginated.items,
			at_start: paginated.at_start,
			at_end: paginated.at_end,
			server_time: OffsetDateTime::now_utc().unix_timestamp(),
			query_count,
			response_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
		})
	}

	async fn build_page(&self, category: Category, query: &ItemsQuery) -> Result<(Paginated, u32)> {
		query.validate().map_err(|err| Error::Validation { message: err.to_string() })?;

		let plan = category.plan(query, &self.cfg.feed)?;
		let candidates = resolve::resolve(self.store.as_ref(), self.search.as_ref(), &plan).await?;
		let materialized =
			pipeline::materialize(&self.cache, self.store.as_ref(), &candidates.ids).await?;
		let order = PageOrder::for_query(category, query);
		let rules = PageRules::from(&self.cfg.feed);
		let paginated =
			page::paginate(&materialized.items, query, order, rules, &mut rand::thread_rng());

		tracing::debug!(
			%category,
			candidates = candidates.ids.len(),
			items = paginated.items.len(),
			at_end = paginated.at_end,
			"Page resolved."
		);

		Ok((paginated, candidates.round_trips + materialized.round_trips))
	}
}
