//! Catalog read models and their loaders.

use serde::Serialize;
use sqlx::PgPool;
use time::Date;

use shelf_domain::book;
use shelf_storage::{
	models::{
		AnnotationRow, AuthorRef, AuthorRow, BaseBookRow, BookRelations, BookRow, GenreRef,
		GenreRow, SequenceRef, SequenceRow, SourceRef,
	},
	queries,
};

use crate::{BoxFuture, EntityLoader, Identified, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Book {
	pub id: i32,
	pub title: String,
	pub lang: String,
	pub file_type: String,
	pub year: i32,
	pub available_types: Vec<String>,
	#[serde(with = "crate::date_serde")]
	pub uploaded: Date,
	pub authors: Vec<AuthorRef>,
	pub translators: Vec<AuthorRef>,
	pub sequences: Vec<SequenceRef>,
	pub annotation_exists: bool,
	pub source: SourceRef,
	pub remote_id: i32,
}
impl From<BookRow> for Book {
	fn from(row: BookRow) -> Self {
		Self {
			id: row.id,
			available_types: book::available_types(&row.file_type),
			title: row.title,
			lang: row.lang,
			file_type: row.file_type,
			year: row.year,
			uploaded: row.uploaded,
			authors: row.authors.0,
			translators: row.translators.0,
			sequences: row.sequences.0,
			annotation_exists: row.annotation_exists,
			source: row.source.0,
			remote_id: row.remote_id,
		}
	}
}
impl Identified for Book {
	fn id(&self) -> i32 {
		self.id
	}
}

/// Id and download formats only, for bulk sync clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BaseBook {
	pub id: i32,
	pub available_types: Vec<String>,
}
impl From<BaseBookRow> for BaseBook {
	fn from(row: BaseBookRow) -> Self {
		Self { id: row.id, available_types: book::available_types(&row.file_type) }
	}
}
impl Identified for BaseBook {
	fn id(&self) -> i32 {
		self.id
	}
}

/// A single book with every relation loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BookDetail {
	#[serde(flatten)]
	pub book: Book,
	pub genres: Vec<GenreRef>,
	pub is_deleted: bool,
	pub pages: Option<i32>,
}
impl From<BookRow> for BookDetail {
	fn from(mut row: BookRow) -> Self {
		let genres = std::mem::take(&mut row.genres.0);
		let is_deleted = row.is_deleted;
		let pages = row.pages;

		Self { book: Book::from(row), genres, is_deleted, pages }
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Author {
	pub id: i32,
	pub first_name: String,
	pub last_name: String,
	pub middle_name: String,
	pub annotation_exists: bool,
}
impl From<AuthorRow> for Author {
	fn from(row: AuthorRow) -> Self {
		Self {
			id: row.id,
			first_name: row.first_name,
			last_name: row.last_name,
			middle_name: row.middle_name,
			annotation_exists: row.annotation_exists,
		}
	}
}
impl Identified for Author {
	fn id(&self) -> i32 {
		self.id
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Sequence {
	pub id: i32,
	pub name: String,
}
impl From<SequenceRow> for Sequence {
	fn from(row: SequenceRow) -> Self {
		Self { id: row.id, name: row.name }
	}
}
impl Identified for Sequence {
	fn id(&self) -> i32 {
		self.id
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Genre {
	pub id: i32,
	pub source: SourceRef,
	pub remote_id: i32,
	pub code: String,
	pub description: String,
	pub meta: String,
}
impl From<GenreRow> for Genre {
	fn from(row: GenreRow) -> Self {
		Self {
			id: row.id,
			source: row.source.0,
			remote_id: row.remote_id,
			code: row.code,
			description: row.description,
			meta: row.meta,
		}
	}
}
impl Identified for Genre {
	fn id(&self) -> i32 {
		self.id
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Annotation {
	pub id: i32,
	pub title: String,
	pub text: String,
	pub file: Option<String>,
}
impl From<AnnotationRow> for Annotation {
	fn from(row: AnnotationRow) -> Self {
		Self { id: row.id, title: row.title, text: row.text, file: row.file }
	}
}

pub struct BookLoader {
	pool: PgPool,
	relations: BookRelations,
}
impl BookLoader {
	pub fn new(pool: PgPool, relations: BookRelations) -> Self {
		Self { pool, relations }
	}
}
impl EntityLoader<Book> for BookLoader {
	fn load_by_ids<'a>(&'a self, ids: &'a [i32]) -> BoxFuture<'a, Result<Vec<Book>>> {
		Box::pin(async move {
			let rows = queries::fetch_books_by_ids(&self.pool, ids, self.relations).await?;

			Ok(rows.into_iter().map(Book::from).collect())
		})
	}
}

pub struct BaseBookLoader {
	pool: PgPool,
}
impl BaseBookLoader {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}
impl EntityLoader<BaseBook> for BaseBookLoader {
	fn load_by_ids<'a>(&'a self, ids: &'a [i32]) -> BoxFuture<'a, Result<Vec<BaseBook>>> {
		Box::pin(async move {
			let rows = queries::fetch_base_books_by_ids(&self.pool, ids).await?;

			Ok(rows.into_iter().map(BaseBook::from).collect())
		})
	}
}

pub struct AuthorLoader {
	pool: PgPool,
}
impl AuthorLoader {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}
impl EntityLoader<Author> for AuthorLoader {
	fn load_by_ids<'a>(&'a self, ids: &'a [i32]) -> BoxFuture<'a, Result<Vec<Author>>> {
		Box::pin(async move {
			let rows = queries::fetch_authors_by_ids(&self.pool, ids).await?;

			Ok(rows.into_iter().map(Author::from).collect())
		})
	}
}

pub struct SequenceLoader {
	pool: PgPool,
}
impl SequenceLoader {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}
impl EntityLoader<Sequence> for SequenceLoader {
	fn load_by_ids<'a>(&'a self, ids: &'a [i32]) -> BoxFuture<'a, Result<Vec<Sequence>>> {
		Box::pin(async move {
			let rows = queries::fetch_sequences_by_ids(&self.pool, ids).await?;

			Ok(rows.into_iter().map(Sequence::from).collect())
		})
	}
}

pub struct GenreLoader {
	pool: PgPool,
}
impl GenreLoader {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}
impl EntityLoader<Genre> for GenreLoader {
	fn load_by_ids<'a>(&'a self, ids: &'a [i32]) -> BoxFuture<'a, Result<Vec<Genre>>> {
		Box::pin(async move {
			let rows = queries::fetch_genres_by_ids(&self.pool, ids).await?;

			Ok(rows.into_iter().map(Genre::from).collect())
		})
	}
}

#[cfg(test)]
mod tests {
	use sqlx::types::Json;
	use time::macros::date;

	use super::*;

	fn row(file_type: &str) -> BookRow {
		BookRow {
			id: 1,
			source: Json(SourceRef { id: 1, name: "flibusta".to_string() }),
			remote_id: 10,
			title: "War and Peace".to_string(),
			lang: "ru".to_string(),
			file_type: file_type.to_string(),
			year: 1869,
			uploaded: date!(2020 - 01 - 10),
			is_deleted: false,
			pages: Some(1225),
			authors: Json(Vec::new()),
			translators: Json(Vec::new()),
			sequences: Json(Vec::new()),
			genres: Json(vec![GenreRef {
				id: 3,
				source: SourceRef { id: 1, name: "flibusta".to_string() },
				remote_id: 30,
				code: "prose".to_string(),
				description: "Prose".to_string(),
				meta: "Prose".to_string(),
			}]),
			annotation_exists: true,
		}
	}

	#[test]
	fn detail_flattens_book_fields() {
		let detail = BookDetail::from(row("fb2"));
		let json = serde_json::to_value(&detail).expect("serialize failed");

		assert_eq!(json["id"], 1);
		assert_eq!(json["uploaded"], "2020-01-10");
		assert_eq!(json["available_types"], serde_json::json!(["fb2", "epub", "mobi", "fb2zip"]));
		assert_eq!(json["genres"][0]["code"], "prose");
		assert_eq!(json["pages"], 1225);
		assert_eq!(json["source"]["name"], "flibusta");
	}

	#[test]
	fn list_book_omits_detail_fields() {
		let json = serde_json::to_value(Book::from(row("pdf"))).expect("serialize failed");

		assert_eq!(json["available_types"], serde_json::json!(["pdf"]));
		assert!(json.get("genres").is_none());
		assert!(json.get("is_deleted").is_none());
	}

	#[test]
	fn base_book_carries_only_id_and_formats() {
		let base = BaseBook::from(BaseBookRow { id: 4, file_type: "fb2".to_string() });
		let json = serde_json::to_value(&base).expect("serialize failed");

		assert_eq!(
			json,
			serde_json::json!({ "id": 4, "available_types": ["fb2", "epub", "mobi", "fb2zip"] })
		);
	}
}
