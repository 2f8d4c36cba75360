pub mod assembler;
pub mod catalog;
pub mod date_serde;
pub mod fingerprint;
pub mod id_cache;
pub mod lookup;
pub mod random;
pub mod resolver;
pub mod search;

mod error;

pub use assembler::{EntityLoader, Identified, ResultAssembler};
pub use catalog::{Annotation, Author, BaseBook, Book, BookDetail, Genre, Sequence};
pub use error::{Error, Result};
pub use id_cache::IdCache;
pub use random::RandomPick;
pub use resolver::{BookFilter, IdResolver, IndexResolver, IndexTarget, RandomQuery, TextQuery};
pub use search::SearchBackend;
pub use shelf_providers::meili::{SearchHits, SearchHitsRequest};
pub use shelf_storage::cache::{ListWindow, SetDraw};

use std::{future::Future, pin::Pin, sync::Arc};

use shelf_config::{Config, SearchIndex};
use shelf_domain::langs::LangFilter;
use shelf_providers::meili;
use shelf_storage::{cache::RedisCache, db::Db};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Key-value store holding resolved id lists and id sets.
///
/// Each write replaces the entry and its active marker in one atomic unit. Each read reports the
/// marker together with the data so callers can tell a live entry from a stale one.
pub trait CacheBackend
where
	Self: Send + Sync,
{
	fn read_list_window<'a>(
		&'a self,
		list_key: &'a str,
		active_key: &'a str,
		start: isize,
		stop: isize,
	) -> BoxFuture<'a, color_eyre::Result<ListWindow>>;

	fn replace_list<'a>(
		&'a self,
		list_key: &'a str,
		active_key: &'a str,
		ids: &'a [i32],
		ttl_seconds: u64,
	) -> BoxFuture<'a, color_eyre::Result<()>>;

	fn replace_set<'a>(
		&'a self,
		set_key: &'a str,
		active_key: &'a str,
		ids: &'a [i32],
		ttl_seconds: u64,
	) -> BoxFuture<'a, color_eyre::Result<()>>;

	fn random_member<'a>(
		&'a self,
		set_key: &'a str,
		active_key: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<SetDraw>>;
}

pub trait SearchOracle
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a SearchIndex,
		req: &'a SearchHitsRequest,
	) -> BoxFuture<'a, color_eyre::Result<SearchHits>>;
}

pub struct ShelfService {
	pub cfg: Config,
	pub db: Db,
	pub assembler: ResultAssembler,
	pub random: RandomPick,
	pub index: IndexResolver,
}

struct MeiliOracle;

impl CacheBackend for RedisCache {
	fn read_list_window<'a>(
		&'a self,
		list_key: &'a str,
		active_key: &'a str,
		start: isize,
		stop: isize,
	) -> BoxFuture<'a, color_eyre::Result<ListWindow>> {
		Box::pin(async move {
			Ok(RedisCache::read_list_window(self, list_key, active_key, start, stop).await?)
		})
	}

	fn replace_list<'a>(
		&'a self,
		list_key: &'a str,
		active_key: &'a str,
		ids: &'a [i32],
		ttl_seconds: u64,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			Ok(RedisCache::replace_list(self, list_key, active_key, ids, ttl_seconds).await?)
		})
	}

	fn replace_set<'a>(
		&'a self,
		set_key: &'a str,
		active_key: &'a str,
		ids: &'a [i32],
		ttl_seconds: u64,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			Ok(RedisCache::replace_set(self, set_key, active_key, ids, ttl_seconds).await?)
		})
	}

	fn random_member<'a>(
		&'a self,
		set_key: &'a str,
		active_key: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<SetDraw>> {
		Box::pin(async move { Ok(RedisCache::random_member(self, set_key, active_key).await?) })
	}
}

impl SearchOracle for MeiliOracle {
	fn search<'a>(
		&'a self,
		cfg: &'a SearchIndex,
		req: &'a SearchHitsRequest,
	) -> BoxFuture<'a, color_eyre::Result<SearchHits>> {
		Box::pin(meili::search(cfg, req))
	}
}

impl ShelfService {
	pub fn new(cfg: Config, db: Db, cache: Arc<dyn CacheBackend>) -> Self {
		Self::with_oracle(cfg, db, cache, Arc::new(MeiliOracle))
	}

	pub fn with_oracle(
		cfg: Config,
		db: Db,
		cache: Arc<dyn CacheBackend>,
		oracle: Arc<dyn SearchOracle>,
	) -> Self {
		let cache = IdCache::new(cache);
		let assembler = ResultAssembler::new(cache.clone(), cfg.cache.search_ttl_seconds);
		let random = RandomPick::new(cache, cfg.cache.random_ttl_seconds);
		let index = IndexResolver::new(oracle, cfg.search_index.clone());

		Self { cfg, db, assembler, random, index }
	}

	/// Resolves caller-supplied `allowed_langs` against the configured defaults.
	pub fn langs<S>(&self, requested: &[S]) -> LangFilter
	where
		S: AsRef<str>,
	{
		LangFilter::resolve(
			requested,
			&self.cfg.catalog.default_langs,
			&self.cfg.catalog.all_langs_sentinel,
		)
	}
}
