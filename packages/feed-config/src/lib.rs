mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Cache, Config, Feed, Postgres, Search, Service, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } => Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("service.log_level", &cfg.service.log_level),
		("storage.postgres.dsn", &cfg.storage.postgres.dsn),
		("search.api_base", &cfg.search.api_base),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if cfg.service.request_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "service.request_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_min_idle > cfg.storage.postgres.pool_max_conns {
		return Err(Error::Validation {
			message: "storage.postgres.pool_min_idle must not exceed pool_max_conns.".to_string(),
		});
	}
	if cfg.search.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "search.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if !cfg.search.path.starts_with('/') {
		return Err(Error::Validation { message: "search.path must start with '/'.".to_string() });
	}
	if cfg.cache.ttl_secs == 0 {
		return Err(Error::Validation {
			message: "cache.ttl_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.cache.sweep_interval_secs == 0 {
		return Err(Error::Validation {
			message: "cache.sweep_interval_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.cache.max_entries == 0 {
		return Err(Error::Validation {
			message: "cache.max_entries must be greater than zero.".to_string(),
		});
	}
	if cfg.feed.page_size == 0 {
		return Err(Error::Validation {
			message: "feed.page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.feed.random_end_threshold > cfg.feed.page_size {
		return Err(Error::Validation {
			message: "feed.random_end_threshold must not exceed feed.page_size.".to_string(),
		});
	}
	if !cfg.feed.repost_confidence.is_finite()
		|| !(0.0..=1.0).contains(&cfg.feed.repost_confidence)
	{
		return Err(Error::Validation {
			message: "feed.repost_confidence must be in the range 0.0-1.0.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let api_base = cfg.search.api_base.trim().trim_end_matches('/');

	cfg.search.api_base = api_base.to_string();
	cfg.service.log_level = cfg.service.log_level.trim().to_string();
}
