use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub cache: Cache,
	#[serde(default)]
	pub search: Search,
	pub search_index: Option<SearchIndex>,
	#[serde(default)]
	pub catalog: Catalog,
	pub security: Security,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub redis: Redis,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Redis {
	pub url: String,
}

/// Lifetimes of cached id lists and id sets.
///
/// Entries are never invalidated on write, so these bound how stale a page can be.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Cache {
	pub search_ttl_seconds: u64,
	pub random_ttl_seconds: u64,
}
impl Default for Cache {
	fn default() -> Self {
		Self { search_ttl_seconds: 60 * 60, random_ttl_seconds: 60 * 60 }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	/// Either "trgm" (similarity SQL) or "index" (external search index).
	pub backend: String,
	/// Upper bound on ids a similarity query may return.
	pub similarity_limit: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self { backend: "trgm".to_string(), similarity_limit: 210 }
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct SearchIndex {
	pub api_base: String,
	pub api_key: String,
	pub timeout_ms: u64,
	#[serde(default = "default_max_concurrency")]
	pub max_concurrency: u32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Catalog {
	pub default_langs: Vec<String>,
	pub all_langs_sentinel: String,
}
impl Default for Catalog {
	fn default() -> Self {
		Self {
			default_langs: vec!["ru".to_string(), "be".to_string(), "uk".to_string()],
			all_langs_sentinel: "__all__".to_string(),
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct Security {
	pub api_key: String,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_max_concurrency() -> u32 {
	2
}
