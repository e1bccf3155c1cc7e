use std::{sync::Arc, time::Duration};

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
};
use serde_json::Value;
use time::OffsetDateTime;
use tower::util::ServiceExt;

use feed_api::{routes, state::AppState};
use feed_config::{Cache, Config, Feed, Postgres, Search, Service, Storage};
use feed_domain::{ContentFlags, Item, ItemFilter, ItemId, SampleKind};
use feed_providers::SearchOptions;
use feed_service::{BoxFuture, FeedService, ItemCache, ItemStore, SearchProvider};

struct FixtureStore {
	items: Vec<Item>,
}
impl ItemStore for FixtureStore {
	fn fetch_by_ids<'a>(
		&'a self,
		ids: &'a [ItemId],
	) -> BoxFuture<'a, feed_storage::Result<Vec<Item>>> {
		let items = self.items.iter().filter(|item| ids.contains(&item.id)).cloned().collect();

		Box::pin(async move { Ok(items) })
	}

	fn fetch_filtered<'a>(
		&'a self,
		filter: &'a ItemFilter,
	) -> BoxFuture<'a, feed_storage::Result<Vec<ItemId>>> {
		let ids = self
			.items
			.iter()
			.filter(|item| item.flags.intersects(filter.content_types))
			.map(|item| item.id)
			.collect();

		Box::pin(async move { Ok(ids) })
	}

	fn resolve_promoted_cursor<'a>(
		&'a self,
		promoted: i64,
	) -> BoxFuture<'a, feed_storage::Result<ItemId>> {
		Box::pin(async move {
			Err(feed_storage::Error::NotFound(format!("No item with promoted id {promoted}.")))
		})
	}

	fn sample_random<'a>(
		&'a self,
		_kind: SampleKind,
	) -> BoxFuture<'a, feed_storage::Result<Vec<ItemId>>> {
		let ids = self.items.iter().map(|item| item.id).collect();

		Box::pin(async move { Ok(ids) })
	}
}

struct FixtureSearch {
	ids: Vec<ItemId>,
}
impl SearchProvider for FixtureSearch {
	fn search<'a>(
		&'a self,
		_expression: &'a str,
		options: SearchOptions,
	) -> BoxFuture<'a, feed_providers::Result<Vec<ItemId>>> {
		let ids = self
			.ids
			.iter()
			.copied()
			.filter(|id| options.older_than == 0 || *id < options.older_than)
			.collect();

		Box::pin(async move { Ok(ids) })
	}
}

fn item(id: ItemId, promoted: i64, flags: ContentFlags) -> Item {
	Item {
		id,
		promoted,
		up: 600,
		down: 20,
		created: OffsetDateTime::from_unix_timestamp(1_600_000_000 + id)
			.expect("Timestamp must be valid."),
		image: format!("2020/09/13/{id}.jpg"),
		thumb: format!("2020/09/13/{id}.thumb.jpg"),
		fullsize: String::new(),
		source: String::new(),
		flags,
		user: "cha0s".to_string(),
		mark: 1,
		width: 1_024,
		height: 768,
		audio: false,
	}
}

fn test_config() -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
			request_timeout_ms: 5_000,
		},
		storage: Storage {
			postgres: Postgres {
				dsn: "postgres://127.0.0.1:1/unused".to_string(),
				pool_max_conns: 1,
				pool_min_idle: 0,
				conn_max_lifetime_secs: 300,
			},
		},
		search: Search {
			api_base: "http://127.0.0.1:1".to_string(),
			path: "/query".to_string(),
			timeout_ms: 1_000,
			pool_max_idle_per_host: 4,
			idle_timeout_ms: 5_000,
		},
		cache: Cache::default(),
		feed: Feed::default(),
	}
}

fn app() -> Router {
	let items = vec![
		item(900, 0, ContentFlags::SFW),
		item(950, 2, ContentFlags::SFW),
		item(980, 0, ContentFlags::NSFW),
		item(999, 0, ContentFlags::SFW),
	];
	let search = FixtureSearch { ids: items.iter().map(|item| item.id).collect() };
	let service = FeedService::new(
		test_config(),
		Arc::new(ItemCache::new(Duration::from_secs(300), 10_000)),
		Arc::new(FixtureStore { items }),
		Arc::new(search),
	);

	routes::router(AppState::from_service(service))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
	let response = app
		.oneshot(Request::builder().uri(uri).body(Body::empty()).expect("Failed to build request."))
		.await
		.expect("Failed to call router.");
	let status = response.status();
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let json = if body.is_empty() {
		Value::Null
	} else {
		serde_json::from_slice(&body).expect("Failed to parse response.")
	};

	(status, json)
}

#[tokio::test]
async fn ping_ok() {
	let (status, _) = get(app(), "/ping").await;

	assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn general_page_serializes_items_and_sentinels() {
	let (status, json) = get(app(), "/general?older=1000&flags=1").await;

	assert_eq!(status, StatusCode::OK);

	let ids: Vec<i64> = json["items"]
		.as_array()
		.expect("items must be an array")
		.iter()
		.filter_map(|item| item["id"].as_i64())
		.collect();

	assert_eq!(ids, vec![999, 950, 900]);
	assert_eq!(json["atStart"], false);
	assert_eq!(json["atEnd"], true);
	assert_eq!(json["queryCount"], 2);
	assert_eq!(json["items"][0]["flags"], 1);
	assert_eq!(json["items"][0]["created"], 1_600_000_999);
	assert_eq!(json["items"][0]["user"], "cha0s");
	assert!(json["serverTime"].as_i64().is_some());
	assert!(json["responseTimeMs"].as_u64().is_some());
}

#[tokio::test]
async fn malformed_parameters_fall_back_to_defaults() {
	let (status, json) = get(app(), "/general?older=abc&flags=nope").await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["atStart"], true);
	assert_eq!(json["items"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn malformed_tags_are_service_unavailable() {
	let (status, json) = get(app(), "/bestof?tags=(cat").await;

	assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
	assert_eq!(json["error_code"], "RESOLUTION_FAILED");
}

#[tokio::test]
async fn unresolved_top_cursor_is_service_unavailable() {
	let (status, json) = get(app(), "/general?promoted=1&older=12").await;

	assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
	assert_eq!(json["error_code"], "RESOLUTION_FAILED");
}

#[tokio::test]
async fn random_route_returns_a_page() {
	let (status, json) = get(app(), "/random?flags=2").await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["items"].as_array().map(Vec::len), Some(1));
	assert_eq!(json["items"][0]["id"], 980);
	assert_eq!(json["atEnd"], true);
}
