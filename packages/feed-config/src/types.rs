use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub search: Search,
	#[serde(default)]
	pub cache: Cache,
	#[serde(default)]
	pub feed: Feed,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// Upper bound for a whole page fetch, resolution and materialization included.
	#[serde(default = "default_request_timeout_ms")]
	pub request_timeout_ms: u64,
}
impl Service {
	pub fn request_timeout(&self) -> Duration {
		Duration::from_millis(self.request_timeout_ms)
	}
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
	#[serde(default = "default_pool_min_idle")]
	pub pool_min_idle: u32,
	#[serde(default = "default_conn_max_lifetime_secs")]
	pub conn_max_lifetime_secs: u64,
}

/// The external tag/search service.
#[derive(Debug, Deserialize)]
pub struct Search {
	pub api_base: String,
	#[serde(default = "default_search_path")]
	pub path: String,
	pub timeout_ms: u64,
	#[serde(default = "default_pool_max_idle_per_host")]
	pub pool_max_idle_per_host: usize,
	#[serde(default = "default_idle_timeout_ms")]
	pub idle_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Cache {
	pub ttl_secs: u64,
	pub sweep_interval_secs: u64,
	/// Upper bound on cached items; the least useful entries are evicted past it.
	pub max_entries: u64,
}
impl Cache {
	pub fn ttl(&self) -> Duration {
		Duration::from_secs(self.ttl_secs)
	}

	pub fn sweep_interval(&self) -> Duration {
		Duration::from_secs(self.sweep_interval_secs)
	}
}
impl Default for Cache {
	fn default() -> Self {
		Self { ttl_secs: 300, sweep_interval_secs: 30, max_entries: 100_000 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Feed {
	pub page_size: usize,
	/// Random pages report the end of the stream below this many items.
	pub random_end_threshold: usize,
	/// Items tagged `repost` above this confidence are hidden from direct queries.
	pub repost_confidence: f32,
}
impl Default for Feed {
	fn default() -> Self {
		Self { page_size: 120, random_end_threshold: 20, repost_confidence: 0.3 }
	}
}

fn default_request_timeout_ms() -> u64 {
	10_000
}

fn default_pool_min_idle() -> u32 {
	1
}

fn default_conn_max_lifetime_secs() -> u64 {
	300
}

fn default_search_path() -> String {
	"/query".to_string()
}

fn default_pool_max_idle_per_host() -> usize {
	4
}

fn default_idle_timeout_ms() -> u64 {
	5_000
}
