//! Backends that turn a query into entity ids.

use std::{sync::Arc, time::Duration};

use sqlx::PgPool;
use time::Date;
use tokio::{sync::Semaphore, time as tokio_time};

use shelf_config::SearchIndex;
use shelf_domain::{langs::LangFilter, page::PageWindow};
use shelf_storage::ids::{self, BookIdFilter, EligibleTarget, SimilarityTarget};

use crate::{
	BoxFuture, Error, Result, SearchHits, SearchHitsRequest, SearchOracle, fingerprint::QueryParams,
};

pub const NS_BOOK: &str = "book";
pub const NS_BOOK_FILTER: &str = "book_filter";
pub const NS_AUTHOR: &str = "author";
pub const NS_TRANSLATOR: &str = "translator";
pub const NS_SEQUENCE: &str = "sequence";
pub const NS_GENRE: &str = "genre";
pub const NS_RANDOM_BOOK: &str = "random_book";
pub const NS_RANDOM_AUTHOR: &str = "random_author";
pub const NS_RANDOM_SEQUENCE: &str = "random_sequence";

const DEFAULT_INDEX_CONCURRENCY: usize = 2;

/// Produces the ids matching a query.
///
/// `namespace` and `params` together decide the cache key, so two resolvers that may return
/// different ids for the same query must not share a namespace.
pub trait IdResolver<Q>
where
	Self: Send + Sync,
	Q: Sync,
{
	fn namespace(&self) -> &'static str;

	fn params(&self, query: &Q) -> QueryParams;

	fn resolve_ids<'a>(&'a self, query: &'a Q) -> BoxFuture<'a, Result<Vec<i32>>>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextQuery {
	pub text: String,
	pub langs: LangFilter,
}
impl TextQuery {
	pub fn new(text: &str, langs: LangFilter) -> Result<Self> {
		let text = text.trim();

		if text.is_empty() {
			return Err(Error::InvalidRequest { message: "query must be non-empty.".to_string() });
		}

		Ok(Self { text: text.to_string(), langs })
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookFilter {
	pub langs: LangFilter,
	pub is_deleted: Option<bool>,
	pub uploaded_gte: Option<Date>,
	pub uploaded_lte: Option<Date>,
	pub id_gte: Option<i32>,
	pub id_lte: Option<i32>,
}
impl BookFilter {
	pub fn new(langs: LangFilter) -> Self {
		Self {
			langs,
			is_deleted: None,
			uploaded_gte: None,
			uploaded_lte: None,
			id_gte: None,
			id_lte: None,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RandomQuery {
	pub langs: LangFilter,
	pub genre: Option<i32>,
}

/// Trigram similarity ranking in Postgres.
pub struct TrgmResolver {
	pool: PgPool,
	target: SimilarityTarget,
	limit: u32,
}
impl TrgmResolver {
	pub fn new(pool: PgPool, target: SimilarityTarget, limit: u32) -> Self {
		Self { pool, target, limit }
	}
}
impl IdResolver<TextQuery> for TrgmResolver {
	fn namespace(&self) -> &'static str {
		match self.target {
			SimilarityTarget::Book => NS_BOOK,
			SimilarityTarget::Author => NS_AUTHOR,
			SimilarityTarget::Translator => NS_TRANSLATOR,
			SimilarityTarget::Sequence => NS_SEQUENCE,
			SimilarityTarget::Genre => NS_GENRE,
		}
	}

	fn params(&self, query: &TextQuery) -> QueryParams {
		QueryParams::new()
			.text("query", &query.text)
			.langs(&query.langs)
			.int("limit", Some(i64::from(self.limit)))
	}

	fn resolve_ids<'a>(&'a self, query: &'a TextQuery) -> BoxFuture<'a, Result<Vec<i32>>> {
		Box::pin(async move {
			let langs = query.langs.as_sql();
			let ids = ids::similar_ids(
				&self.pool,
				self.target,
				&query.text,
				langs.as_deref(),
				i64::from(self.limit),
			)
			.await?;

			Ok(ids)
		})
	}
}

/// Attribute filter over books, in id order.
pub struct BookFilterResolver {
	pool: PgPool,
}
impl BookFilterResolver {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}
impl IdResolver<BookFilter> for BookFilterResolver {
	fn namespace(&self) -> &'static str {
		NS_BOOK_FILTER
	}

	fn params(&self, query: &BookFilter) -> QueryParams {
		QueryParams::new()
			.langs(&query.langs)
			.flag("is_deleted", query.is_deleted)
			.date("uploaded_gte", query.uploaded_gte)
			.date("uploaded_lte", query.uploaded_lte)
			.int("id_gte", query.id_gte.map(i64::from))
			.int("id_lte", query.id_lte.map(i64::from))
	}

	fn resolve_ids<'a>(&'a self, query: &'a BookFilter) -> BoxFuture<'a, Result<Vec<i32>>> {
		Box::pin(async move {
			let filter = BookIdFilter {
				langs: query.langs.as_sql(),
				is_deleted: query.is_deleted,
				uploaded_gte: query.uploaded_gte,
				uploaded_lte: query.uploaded_lte,
				id_gte: query.id_gte,
				id_lte: query.id_lte,
			};
			let ids = ids::filter_book_ids(&self.pool, &filter).await?;

			Ok(ids)
		})
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RandomTarget {
	Book,
	Author,
	Sequence,
}

/// Unordered population for random picks.
pub struct EligibleResolver {
	pool: PgPool,
	target: RandomTarget,
}
impl EligibleResolver {
	pub fn new(pool: PgPool, target: RandomTarget) -> Self {
		Self { pool, target }
	}
}
impl IdResolver<RandomQuery> for EligibleResolver {
	fn namespace(&self) -> &'static str {
		match self.target {
			RandomTarget::Book => NS_RANDOM_BOOK,
			RandomTarget::Author => NS_RANDOM_AUTHOR,
			RandomTarget::Sequence => NS_RANDOM_SEQUENCE,
		}
	}

	fn params(&self, query: &RandomQuery) -> QueryParams {
		let params = QueryParams::new().langs(&query.langs);

		match self.target {
			RandomTarget::Book => params.int("genre", query.genre.map(i64::from)),
			RandomTarget::Author | RandomTarget::Sequence => params,
		}
	}

	fn resolve_ids<'a>(&'a self, query: &'a RandomQuery) -> BoxFuture<'a, Result<Vec<i32>>> {
		Box::pin(async move {
			let target = match self.target {
				RandomTarget::Book => EligibleTarget::Book { genre: query.genre },
				RandomTarget::Author => EligibleTarget::Author,
				RandomTarget::Sequence => EligibleTarget::Sequence,
			};
			let langs = query.langs.as_sql();
			let ids = ids::eligible_ids(&self.pool, target, langs.as_deref()).await?;

			Ok(ids)
		})
	}
}

/// Index name and language attribute per searchable entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexTarget {
	Books,
	Authors,
	Translators,
	Sequences,
	Genres,
}
impl IndexTarget {
	pub fn index(self) -> &'static str {
		match self {
			Self::Books => "books",
			Self::Authors | Self::Translators => "authors",
			Self::Sequences => "sequences",
			Self::Genres => "genres",
		}
	}

	pub fn lang_key(self) -> &'static str {
		match self {
			Self::Books => "lang",
			Self::Authors => "author_langs",
			Self::Translators => "translator_langs",
			Self::Sequences | Self::Genres => "langs",
		}
	}
}

/// External search index client with bounded concurrency and a per-call timeout.
///
/// Results are paginated by the index itself, so nothing here touches the id cache.
#[derive(Clone)]
pub struct IndexResolver {
	oracle: Arc<dyn SearchOracle>,
	cfg: Option<SearchIndex>,
	permits: Arc<Semaphore>,
}
impl IndexResolver {
	pub fn new(oracle: Arc<dyn SearchOracle>, cfg: Option<SearchIndex>) -> Self {
		let permits = cfg
			.as_ref()
			.and_then(|cfg| usize::try_from(cfg.max_concurrency).ok())
			.unwrap_or(DEFAULT_INDEX_CONCURRENCY)
			.max(1);

		Self { oracle, cfg, permits: Arc::new(Semaphore::new(permits)) }
	}

	pub async fn search(
		&self,
		target: IndexTarget,
		query: &TextQuery,
		window: PageWindow,
	) -> Result<SearchHits> {
		let Some(cfg) = self.cfg.as_ref() else {
			return Err(Error::SearchIndex {
				message: "search_index is not configured.".to_string(),
			});
		};
		let req = SearchHitsRequest {
			index: target.index().to_string(),
			query: query.text.clone(),
			filter: query.langs.index_filter(target.lang_key()).into_iter().collect(),
			offset: window.offset,
			limit: window.limit,
		};
		let _permit = self.permits.acquire().await.map_err(|_| Error::SearchIndex {
			message: "Search index worker pool is closed.".to_string(),
		})?;
		let timeout = Duration::from_millis(cfg.timeout_ms);

		match tokio_time::timeout(timeout, self.oracle.search(cfg, &req)).await {
			Ok(Ok(hits)) => Ok(hits),
			Ok(Err(err)) => {
				tracing::warn!(error = %err, index = %req.index, "Search index request failed.");

				Err(Error::SearchIndex { message: err.to_string() })
			},
			Err(_) => {
				tracing::warn!(
					index = %req.index,
					timeout_ms = cfg.timeout_ms,
					"Search index request timed out."
				);

				Err(Error::SearchIndex {
					message: format!("Search index timed out after {} ms.", cfg.timeout_ms),
				})
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn translators_search_the_author_index() {
		assert_eq!(IndexTarget::Translators.index(), "authors");
		assert_eq!(IndexTarget::Translators.lang_key(), "translator_langs");
		assert_eq!(IndexTarget::Books.lang_key(), "lang");
	}

	#[test]
	fn blank_text_queries_are_rejected() {
		assert!(matches!(
			TextQuery::new("   ", LangFilter::All),
			Err(Error::InvalidRequest { .. })
		));
		assert_eq!(TextQuery::new(" war ", LangFilter::All).expect("valid").text, "war");
	}
}
