mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Cache, Catalog, Config, Postgres, Redis, Search, SearchIndex, Security, Service, Storage,
};

use std::{fs, path::Path};

pub const SEARCH_BACKEND_TRGM: &str = "trgm";
pub const SEARCH_BACKEND_INDEX: &str = "index";

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
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.redis.url.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.redis.url must be non-empty.".to_string(),
		});
	}
	if cfg.cache.search_ttl_seconds == 0 {
		return Err(Error::Validation {
			message: "cache.search_ttl_seconds must be greater than zero.".to_string(),
		});
	}
	if cfg.cache.random_ttl_seconds == 0 {
		return Err(Error::Validation {
			message: "cache.random_ttl_seconds must be greater than zero.".to_string(),
		});
	}
	if cfg.search.similarity_limit == 0 {
		return Err(Error::Validation {
			message: "search.similarity_limit must be greater than zero.".to_string(),
		});
	}
	if !matches!(cfg.search.backend.as_str(), SEARCH_BACKEND_TRGM | SEARCH_BACKEND_INDEX) {
		return Err(Error::Validation {
			message: "search.backend must be one of trgm or index.".to_string(),
		});
	}
	if cfg.search.backend == SEARCH_BACKEND_INDEX && cfg.search_index.is_none() {
		return Err(Error::Validation {
			message: "search_index must be configured when search.backend is index.".to_string(),
		});
	}

	if let Some(index) = cfg.search_index.as_ref() {
		if index.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: "search_index.api_base must be non-empty.".to_string(),
			});
		}
		if index.timeout_ms == 0 {
			return Err(Error::Validation {
				message: "search_index.timeout_ms must be greater than zero.".to_string(),
			});
		}
		if index.max_concurrency == 0 {
			return Err(Error::Validation {
				message: "search_index.max_concurrency must be greater than zero.".to_string(),
			});
		}
	}

	if cfg.catalog.default_langs.is_empty() {
		return Err(Error::Validation {
			message: "catalog.default_langs must be non-empty.".to_string(),
		});
	}
	if cfg.catalog.default_langs.iter().any(|lang| lang.trim().is_empty()) {
		return Err(Error::Validation {
			message: "catalog.default_langs must not contain blank entries.".to_string(),
		});
	}
	if cfg.catalog.all_langs_sentinel.trim().is_empty() {
		return Err(Error::Validation {
			message: "catalog.all_langs_sentinel must be non-empty.".to_string(),
		});
	}
	if cfg.security.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "security.api_key must be non-empty.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.search.backend = cfg.search.backend.trim().to_lowercase();

	for lang in cfg.catalog.default_langs.iter_mut() {
		*lang = lang.trim().to_lowercase();
	}

	cfg.catalog.all_langs_sentinel = cfg.catalog.all_langs_sentinel.trim().to_lowercase();

	if let Some(index) = cfg.search_index.as_mut() {
		let trimmed = index.api_base.trim_end_matches('/').to_string();

		index.api_base = trimmed;
	}
}
