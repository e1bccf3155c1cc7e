use std::{collections::HashMap, net::SocketAddr};

use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use feed_config::Search;
use feed_providers::{SearchOptions, TagsClient};

async fn echo(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
	let q = params.get("q").cloned().unwrap_or_default();
	let older = params.get("older").and_then(|raw| raw.parse::<i64>().ok()).unwrap_or(0);
	let random = params.get("random").map(String::as_str) == Some("true");

	// Encodes what the client sent so the test can assert on it.
	let mut items = vec![q.len() as i64, older];

	if random {
		items.push(-1);
	}

	Json(json!({ "items": items }))
}

async fn broken() -> (StatusCode, &'static str) {
	(StatusCode::BAD_GATEWAY, "upstream down")
}

async fn spawn_stub() -> SocketAddr {
	let app = Router::new().route("/query", get(echo)).route("/broken", get(broken));
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind stub.");
	let addr = listener.local_addr().expect("Failed to read stub address.");

	tokio::spawn(async move {
		let _ = axum::serve(listener, app).await;
	});

	addr
}

fn search_config(addr: SocketAddr, path: &str) -> Search {
	Search {
		api_base: format!("http://{addr}"),
		path: path.to_string(),
		timeout_ms: 2_000,
		pool_max_idle_per_host: 4,
		idle_timeout_ms: 5_000,
	}
}

#[tokio::test]
async fn forwards_expression_cursor_and_random_flag() {
	let addr = spawn_stub().await;
	let client = TagsClient::new(&search_config(addr, "/query")).expect("Failed to build client.");

	assert_eq!(client.url(), format!("http://{addr}/query"));

	let ids = client
		.search("f:sfw&(cat)", SearchOptions { older_than: 1_000, random: false })
		.await
		.expect("search");

	assert_eq!(ids, vec![11, 1_000]);

	let ids = client
		.search("f:sfw", SearchOptions { older_than: 0, random: true })
		.await
		.expect("search");

	assert_eq!(ids, vec![5, 0, -1]);
}

#[tokio::test]
async fn upstream_errors_surface() {
	let addr = spawn_stub().await;
	let client = TagsClient::new(&search_config(addr, "/broken")).expect("Failed to build client.");
	let result = client.search("f:sfw", SearchOptions::default()).await;

	assert!(result.is_err());
}
