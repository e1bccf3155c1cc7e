use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

/// Options forwarded alongside a search expression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchOptions {
	/// Id cursor, zero for the first page.
	pub older_than: i64,
	pub random: bool,
}

#[derive(Serialize)]
struct SearchParams<'a> {
	q: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	older: Option<i64>,
	random: bool,
}

/// Client for the tag search service. One instance owns a keep-alive connection pool.
pub struct TagsClient {
	client: Client,
	url: String,
}
impl TagsClient {
	pub fn new(cfg: &feed_config::Search) -> Result<Self> {
		let client = Client::builder()
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.pool_max_idle_per_host(cfg.pool_max_idle_per_host)
			.pool_idle_timeout(Duration::from_millis(cfg.idle_timeout_ms))
			.build()?;

		Ok(Self { client, url: format!("{}{}", cfg.api_base, cfg.path) })
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	/// Ordered item ids matching `expression`, as ranked by the service.
	pub async fn search(&self, expression: &str, options: SearchOptions) -> Result<Vec<i64>> {
		let params = SearchParams {
			q: expression,
			older: (options.older_than > 0).then_some(options.older_than),
			random: options.random,
		};
		let res = self.client.get(&self.url).query(&params).send().await?;
		let json: Value = res.error_for_status()?.json().await?;

		parse_search_response(json)
	}
}

pub fn parse_search_response(json: Value) -> Result<Vec<i64>> {
	let items = json.get("items").and_then(Value::as_array).ok_or_else(|| {
		Error::InvalidResponse { message: "Search response is missing items array.".to_string() }
	})?;

	items
		.iter()
		.map(|item| {
			item.as_i64().or_else(|| item.get("id").and_then(Value::as_i64)).ok_or_else(|| {
				Error::InvalidResponse { message: format!("Search result {item} is not an id.") }
			})
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keeps_service_order() {
		let json = serde_json::json!({ "items": [30, 10, { "id": 20 }], "total": 3 });
		let ids = parse_search_response(json).expect("parse failed");

		assert_eq!(ids, vec![30, 10, 20]);
	}

	#[test]
	fn rejects_missing_items() {
		let json = serde_json::json!({ "error": "boom" });

		assert!(parse_search_response(json).is_err());
	}

	#[test]
	fn rejects_non_numeric_ids() {
		let json = serde_json::json!({ "items": ["abc"] });

		assert!(parse_search_response(json).is_err());
	}
}
