use sqlx::{PgExecutor, PgPool};

use crate::{
	Result,
	models::{
		AnnotationRow, AuthorRow, BaseBookRow, BookRelations, BookRow, GenreRow, SequenceRow,
	},
};

const AUTHOR_JSON: &str = "\
jsonb_build_object(
	'id', a.id,
	'first_name', a.first_name,
	'last_name', a.last_name,
	'middle_name', a.middle_name,
	'annotation_exists', EXISTS (SELECT 1 FROM author_annotations aa WHERE aa.author = a.id)
)";

/// Renders the book projection. Relation toggles are bound at `$flag_base..$flag_base + 3`.
fn book_select(flag_base: usize) -> String {
	let authors = flag_base;
	let translators = flag_base + 1;
	let sequences = flag_base + 2;
	let genres = flag_base + 3;

	format!(
		"\
SELECT
	b.id,
	jsonb_build_object('id', s.id, 'name', s.name) AS source,
	b.remote_id,
	b.title,
	b.lang,
	b.file_type,
	b.year,
	b.uploaded,
	b.is_deleted,
	b.pages,
	CASE WHEN ${authors}::boolean THEN COALESCE((
		SELECT jsonb_agg({AUTHOR_JSON} ORDER BY a.last_name, a.first_name, a.id)
		FROM book_authors ba
		JOIN authors a ON a.id = ba.author
		WHERE ba.book = b.id
	), '[]'::jsonb) ELSE '[]'::jsonb END AS authors,
	CASE WHEN ${translators}::boolean THEN COALESCE((
		SELECT jsonb_agg({AUTHOR_JSON} ORDER BY t.position, a.id)
		FROM translations t
		JOIN authors a ON a.id = t.author
		WHERE t.book = b.id
	), '[]'::jsonb) ELSE '[]'::jsonb END AS translators,
	CASE WHEN ${sequences}::boolean THEN COALESCE((
		SELECT jsonb_agg(jsonb_build_object('id', sq.id, 'name', sq.name) ORDER BY sq.id)
		FROM book_sequences bs
		JOIN sequences sq ON sq.id = bs.sequence
		WHERE bs.book = b.id
	), '[]'::jsonb) ELSE '[]'::jsonb END AS sequences,
	CASE WHEN ${genres}::boolean THEN COALESCE((
		SELECT jsonb_agg(
			jsonb_build_object(
				'id', g.id,
				'source', jsonb_build_object('id', gs.id, 'name', gs.name),
				'remote_id', g.remote_id,
				'code', g.code,
				'description', g.description,
				'meta', g.meta
			)
			ORDER BY g.id
		)
		FROM book_genres bg
		JOIN genres g ON g.id = bg.genre
		JOIN sources gs ON gs.id = g.source
		WHERE bg.book = b.id
	), '[]'::jsonb) ELSE '[]'::jsonb END AS genres,
	EXISTS (SELECT 1 FROM book_annotations ban WHERE ban.book = b.id) AS annotation_exists
FROM books b
JOIN sources s ON s.id = b.source"
	)
}

const AUTHOR_SELECT: &str = "\
SELECT
	a.id,
	a.first_name,
	a.last_name,
	a.middle_name,
	EXISTS (SELECT 1 FROM author_annotations aa WHERE aa.author = a.id) AS annotation_exists
FROM authors a";

const GENRE_SELECT: &str = "\
SELECT
	g.id,
	jsonb_build_object('id', s.id, 'name', s.name) AS source,
	g.remote_id,
	g.code,
	g.description,
	g.meta
FROM genres g
JOIN sources s ON s.id = g.source";

/// Loads books by id. Row order is whatever the planner produces.
pub async fn fetch_books_by_ids<'e, E>(
	executor: E,
	ids: &[i32],
	relations: BookRelations,
) -> Result<Vec<BookRow>>
where
	E: PgExecutor<'e>,
{
	if ids.is_empty() {
		return Ok(Vec::new());
	}

	let sql = format!("{} WHERE b.id = ANY($1::int4[])", book_select(2));
	let rows = sqlx::query_as::<_, BookRow>(&sql)
		.bind(ids)
		.bind(relations.authors)
		.bind(relations.translators)
		.bind(relations.sequences)
		.bind(relations.genres)
		.fetch_all(executor)
		.await?;

	Ok(rows)
}

pub async fn fetch_base_books_by_ids<'e, E>(executor: E, ids: &[i32]) -> Result<Vec<BaseBookRow>>
where
	E: PgExecutor<'e>,
{
	if ids.is_empty() {
		return Ok(Vec::new());
	}

	let rows = sqlx::query_as::<_, BaseBookRow>(
		"SELECT id, file_type FROM books WHERE id = ANY($1::int4[])",
	)
	.bind(ids)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn get_book<'e, E>(
	executor: E,
	book_id: i32,
	relations: BookRelations,
) -> Result<Option<BookRow>>
where
	E: PgExecutor<'e>,
{
	let sql = format!("{} WHERE b.id = $1 LIMIT 1", book_select(2));
	let row = sqlx::query_as::<_, BookRow>(&sql)
		.bind(book_id)
		.bind(relations.authors)
		.bind(relations.translators)
		.bind(relations.sequences)
		.bind(relations.genres)
		.fetch_optional(executor)
		.await?;

	Ok(row)
}

pub async fn get_remote_book<'e, E>(
	executor: E,
	source_id: i32,
	remote_id: i32,
	relations: BookRelations,
) -> Result<Option<BookRow>>
where
	E: PgExecutor<'e>,
{
	let sql = format!("{} WHERE b.source = $1 AND b.remote_id = $2 LIMIT 1", book_select(3));
	let row = sqlx::query_as::<_, BookRow>(&sql)
		.bind(source_id)
		.bind(remote_id)
		.bind(relations.authors)
		.bind(relations.translators)
		.bind(relations.sequences)
		.bind(relations.genres)
		.fetch_optional(executor)
		.await?;

	Ok(row)
}

pub async fn get_book_annotation<'e, E>(executor: E, book_id: i32) -> Result<Option<AnnotationRow>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, AnnotationRow>(
		"SELECT id, title, text, file FROM book_annotations WHERE book = $1 LIMIT 1",
	)
	.bind(book_id)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

pub async fn fetch_authors_by_ids<'e, E>(executor: E, ids: &[i32]) -> Result<Vec<AuthorRow>>
where
	E: PgExecutor<'e>,
{
	if ids.is_empty() {
		return Ok(Vec::new());
	}

	let sql = format!("{AUTHOR_SELECT} WHERE a.id = ANY($1::int4[])");
	let rows = sqlx::query_as::<_, AuthorRow>(&sql).bind(ids).fetch_all(executor).await?;

	Ok(rows)
}

pub async fn get_author<'e, E>(executor: E, author_id: i32) -> Result<Option<AuthorRow>>
where
	E: PgExecutor<'e>,
{
	let sql = format!("{AUTHOR_SELECT} WHERE a.id = $1 LIMIT 1");
	let row = sqlx::query_as::<_, AuthorRow>(&sql).bind(author_id).fetch_optional(executor).await?;

	Ok(row)
}

/// One page of every author in id order plus the unpaged total.
pub async fn list_authors(pool: &PgPool, offset: i64, limit: i64) -> Result<(i64, Vec<AuthorRow>)> {
	let total: i64 = sqlx::query_scalar("SELECT count(*) FROM authors").fetch_one(pool).await?;
	let sql = format!("{AUTHOR_SELECT} ORDER BY a.id ASC OFFSET $1 LIMIT $2");
	let rows =
		sqlx::query_as::<_, AuthorRow>(&sql).bind(offset).bind(limit).fetch_all(pool).await?;

	Ok((total, rows))
}

pub async fn get_author_annotation<'e, E>(
	executor: E,
	author_id: i32,
) -> Result<Option<AnnotationRow>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, AnnotationRow>(
		"SELECT id, title, text, file FROM author_annotations WHERE author = $1 LIMIT 1",
	)
	.bind(author_id)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

pub async fn fetch_sequences_by_ids<'e, E>(executor: E, ids: &[i32]) -> Result<Vec<SequenceRow>>
where
	E: PgExecutor<'e>,
{
	if ids.is_empty() {
		return Ok(Vec::new());
	}

	let rows = sqlx::query_as::<_, SequenceRow>(
		"SELECT id, name FROM sequences WHERE id = ANY($1::int4[])",
	)
	.bind(ids)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn get_sequence<'e, E>(executor: E, sequence_id: i32) -> Result<Option<SequenceRow>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, SequenceRow>("SELECT id, name FROM sequences WHERE id = $1")
		.bind(sequence_id)
		.fetch_optional(executor)
		.await?;

	Ok(row)
}

pub async fn fetch_genres_by_ids<'e, E>(executor: E, ids: &[i32]) -> Result<Vec<GenreRow>>
where
	E: PgExecutor<'e>,
{
	if ids.is_empty() {
		return Ok(Vec::new());
	}

	let sql = format!("{GENRE_SELECT} WHERE g.id = ANY($1::int4[])");
	let rows = sqlx::query_as::<_, GenreRow>(&sql).bind(ids).fetch_all(executor).await?;

	Ok(rows)
}

/// One page of genres in id order plus the unpaged total.
pub async fn list_genres(
	pool: &PgPool,
	meta: Option<&str>,
	offset: i64,
	limit: i64,
) -> Result<(i64, Vec<GenreRow>)> {
	let total: i64 =
		sqlx::query_scalar("SELECT count(*) FROM genres WHERE ($1::text IS NULL OR meta = $1)")
			.bind(meta)
			.fetch_one(pool)
			.await?;
	let sql = format!(
		"{GENRE_SELECT} WHERE ($1::text IS NULL OR g.meta = $1) ORDER BY g.id ASC OFFSET $2 LIMIT $3"
	);
	let rows = sqlx::query_as::<_, GenreRow>(&sql)
		.bind(meta)
		.bind(offset)
		.bind(limit)
		.fetch_all(pool)
		.await?;

	Ok((total, rows))
}

pub async fn list_genre_metas<'e, E>(executor: E) -> Result<Vec<String>>
where
	E: PgExecutor<'e>,
{
	let metas = sqlx::query_scalar::<_, String>("SELECT DISTINCT meta FROM genres ORDER BY meta")
		.fetch_all(executor)
		.await?;

	Ok(metas)
}
