//! Id projections over the catalog: similarity ranking, attribute filters, random-pick eligibility
//! and related-book listings.
//!
//! Every language argument is `None` when all languages are allowed.

use sqlx::{PgExecutor, PgPool};
use time::Date;

use crate::Result;

const LIVE_IN_LANGS: &str = "b.is_deleted = false AND ($2::text[] IS NULL OR b.lang = ANY($2::text[]))";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimilarityTarget {
	Book,
	Author,
	Translator,
	Sequence,
	Genre,
}
impl SimilarityTarget {
	/// SQL returning one `int4[]` of matching ids. Binds: `$1` query text, `$2` languages, `$3` cap.
	fn sql(self) -> String {
		match self {
			Self::Book => format!(
				"\
SELECT ARRAY(
	SELECT b.id
	FROM books b
	WHERE b.title % $1 AND {LIVE_IN_LANGS}
	ORDER BY similarity(b.title, $1) DESC, b.id ASC
	LIMIT $3
)"
			),
			Self::Author => author_sql("book_authors"),
			Self::Translator => author_sql("translations"),
			Self::Sequence => format!(
				"\
SELECT ARRAY(
	WITH ranked AS (
		SELECT
			s.id,
			similarity(s.name, $1) AS sml,
			(
				SELECT count(*)
				FROM book_sequences bs
				JOIN books b ON b.id = bs.book
				WHERE bs.sequence = s.id AND {LIVE_IN_LANGS}
			) AS popularity
		FROM sequences s
		WHERE s.name % $1
	)
	SELECT id FROM ranked
	WHERE popularity > 0
	ORDER BY sml DESC, popularity DESC, id ASC
	LIMIT $3
)"
			),
			Self::Genre => format!(
				"\
SELECT ARRAY(
	WITH ranked AS (
		SELECT
			g.id,
			similarity(g.description, $1) AS sml,
			(
				SELECT count(*)
				FROM book_genres bg
				JOIN books b ON b.id = bg.book
				WHERE bg.genre = g.id AND {LIVE_IN_LANGS}
			) AS popularity
		FROM genres g
		WHERE g.description % $1
	)
	SELECT id FROM ranked
	WHERE popularity > 0
	ORDER BY sml DESC, popularity DESC, id ASC
	LIMIT $3
)"
			),
		}
	}
}

fn author_sql(link_table: &str) -> String {
	format!(
		"\
SELECT ARRAY(
	WITH ranked AS (
		SELECT
			a.id,
			GREATEST(
				similarity(a.last_name || ' ' || a.first_name || ' ' || a.middle_name, $1),
				similarity(a.last_name || ' ' || a.first_name, $1),
				similarity(a.last_name, $1)
			) AS sml,
			(
				SELECT count(*)
				FROM {link_table} l
				JOIN books b ON b.id = l.book
				WHERE l.author = a.id AND {LIVE_IN_LANGS}
			) AS popularity
		FROM authors a
		WHERE (
			(a.last_name || ' ' || a.first_name || ' ' || a.middle_name) % $1
			OR (a.last_name || ' ' || a.first_name) % $1
			OR a.last_name % $1
		)
	)
	SELECT id FROM ranked
	WHERE popularity > 0
	ORDER BY sml DESC, popularity DESC, id ASC
	LIMIT $3
)"
	)
}

/// Ranks ids by trigram similarity, most similar first, capped at `limit`.
pub async fn similar_ids<'e, E>(
	executor: E,
	target: SimilarityTarget,
	query: &str,
	langs: Option<&[String]>,
	limit: i64,
) -> Result<Vec<i32>>
where
	E: PgExecutor<'e>,
{
	let ids = sqlx::query_scalar::<_, Vec<i32>>(&target.sql())
		.bind(query)
		.bind(langs)
		.bind(limit)
		.fetch_one(executor)
		.await?;

	Ok(ids)
}

/// Attribute filters over `books`. Unset fields do not restrict.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookIdFilter {
	pub langs: Option<Vec<String>>,
	pub is_deleted: Option<bool>,
	pub uploaded_gte: Option<Date>,
	pub uploaded_lte: Option<Date>,
	pub id_gte: Option<i32>,
	pub id_lte: Option<i32>,
}

pub async fn filter_book_ids<'e, E>(executor: E, filter: &BookIdFilter) -> Result<Vec<i32>>
where
	E: PgExecutor<'e>,
{
	let ids = sqlx::query_scalar::<_, i32>(
		"\
SELECT b.id
FROM books b
WHERE ($1::text[] IS NULL OR b.lang = ANY($1::text[]))
	AND ($2::boolean IS NULL OR b.is_deleted = $2)
	AND ($3::date IS NULL OR b.uploaded >= $3)
	AND ($4::date IS NULL OR b.uploaded <= $4)
	AND ($5::int4 IS NULL OR b.id >= $5)
	AND ($6::int4 IS NULL OR b.id <= $6)
ORDER BY b.id ASC",
	)
	.bind(filter.langs.as_deref())
	.bind(filter.is_deleted)
	.bind(filter.uploaded_gte)
	.bind(filter.uploaded_lte)
	.bind(filter.id_gte)
	.bind(filter.id_lte)
	.fetch_all(executor)
	.await?;

	Ok(ids)
}

/// Random-pick populations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EligibleTarget {
	Book { genre: Option<i32> },
	Author,
	Sequence,
}

pub async fn eligible_ids<'e, E>(
	executor: E,
	target: EligibleTarget,
	langs: Option<&[String]>,
) -> Result<Vec<i32>>
where
	E: PgExecutor<'e>,
{
	let query = match target {
		EligibleTarget::Book { genre } => sqlx::query_scalar::<_, i32>(
			"\
SELECT b.id
FROM books b
WHERE b.is_deleted = false
	AND ($1::text[] IS NULL OR b.lang = ANY($1::text[]))
	AND ($2::int4 IS NULL OR EXISTS (
		SELECT 1 FROM book_genres bg WHERE bg.book = b.id AND bg.genre = $2
	))",
		)
		.bind(langs)
		.bind(genre),
		EligibleTarget::Author => sqlx::query_scalar::<_, i32>(
			"\
SELECT a.id
FROM authors a
WHERE EXISTS (
	SELECT 1
	FROM book_authors ba
	JOIN books b ON b.id = ba.book
	WHERE ba.author = a.id
		AND b.is_deleted = false
		AND ($1::text[] IS NULL OR b.lang = ANY($1::text[]))
)",
		)
		.bind(langs),
		EligibleTarget::Sequence => sqlx::query_scalar::<_, i32>(
			"\
SELECT s.id
FROM sequences s
WHERE EXISTS (
	SELECT 1
	FROM book_sequences bs
	JOIN books b ON b.id = bs.book
	WHERE bs.sequence = s.id
		AND b.is_deleted = false
		AND ($1::text[] IS NULL OR b.lang = ANY($1::text[]))
)",
		)
		.bind(langs),
	};
	let ids = query.fetch_all(executor).await?;

	Ok(ids)
}

/// Books hanging off one author, translator or sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelatedBooks {
	Author(i32),
	Translator(i32),
	Sequence(i32),
}
impl RelatedBooks {
	fn owner_id(self) -> i32 {
		match self {
			Self::Author(id) | Self::Translator(id) | Self::Sequence(id) => id,
		}
	}

	fn from_clause(self) -> &'static str {
		match self {
			Self::Author(_) => "FROM books b JOIN book_authors l ON l.book = b.id AND l.author = $1",
			Self::Translator(_) =>
				"FROM books b JOIN translations l ON l.book = b.id AND l.author = $1",
			Self::Sequence(_) =>
				"FROM books b JOIN book_sequences l ON l.book = b.id AND l.sequence = $1",
		}
	}

	fn order_clause(self) -> &'static str {
		match self {
			Self::Sequence(_) => "ORDER BY l.position ASC, b.id ASC",
			Self::Author(_) | Self::Translator(_) => "ORDER BY b.title ASC, b.id ASC",
		}
	}
}

/// Counts the live related books and returns the ids of one window of them.
pub async fn related_book_ids(
	pool: &PgPool,
	related: RelatedBooks,
	langs: Option<&[String]>,
	offset: i64,
	limit: i64,
) -> Result<(i64, Vec<i32>)> {
	let from = related.from_clause();
	let count_sql = format!("SELECT count(*) {from} WHERE {LIVE_IN_LANGS}");
	let total: i64 = sqlx::query_scalar(&count_sql)
		.bind(related.owner_id())
		.bind(langs)
		.fetch_one(pool)
		.await?;

	if total == 0 {
		return Ok((0, Vec::new()));
	}

	let ids_sql = format!(
		"SELECT b.id {from} WHERE {LIVE_IN_LANGS} {} OFFSET $3 LIMIT $4",
		related.order_clause()
	);
	let ids = sqlx::query_scalar::<_, i32>(&ids_sql)
		.bind(related.owner_id())
		.bind(langs)
		.bind(offset)
		.bind(limit)
		.fetch_all(pool)
		.await?;

	Ok((total, ids))
}

/// Distinct stored file types of the live related books, sorted.
pub async fn related_file_types(
	pool: &PgPool,
	related: RelatedBooks,
	langs: Option<&[String]>,
) -> Result<Vec<String>> {
	let sql = format!(
		"SELECT DISTINCT b.file_type {} WHERE {LIVE_IN_LANGS} ORDER BY b.file_type",
		related.from_clause()
	);
	let file_types = sqlx::query_scalar::<_, String>(&sql)
		.bind(related.owner_id())
		.bind(langs)
		.fetch_all(pool)
		.await?;

	Ok(file_types)
}
