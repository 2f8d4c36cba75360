use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use time::Date;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceRef {
	pub id: i32,
	pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthorRef {
	pub id: i32,
	pub first_name: String,
	pub last_name: String,
	pub middle_name: String,
	pub annotation_exists: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SequenceRef {
	pub id: i32,
	pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GenreRef {
	pub id: i32,
	pub source: SourceRef,
	pub remote_id: i32,
	pub code: String,
	pub description: String,
	pub meta: String,
}

/// Related rows loaded alongside books. Relations left out come back as empty lists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BookRelations {
	pub authors: bool,
	pub translators: bool,
	pub sequences: bool,
	pub genres: bool,
}
impl BookRelations {
	pub const DETAIL: Self = Self { authors: true, translators: true, sequences: true, genres: true };
	pub const LIST: Self = Self { authors: true, translators: true, sequences: true, genres: false };
	pub const NONE: Self = Self { authors: false, translators: false, sequences: false, genres: false };
}

#[derive(Debug, sqlx::FromRow)]
pub struct BookRow {
	pub id: i32,
	pub source: Json<SourceRef>,
	pub remote_id: i32,
	pub title: String,
	pub lang: String,
	pub file_type: String,
	pub year: i32,
	pub uploaded: Date,
	pub is_deleted: bool,
	pub pages: Option<i32>,
	pub authors: Json<Vec<AuthorRef>>,
	pub translators: Json<Vec<AuthorRef>>,
	pub sequences: Json<Vec<SequenceRef>>,
	pub genres: Json<Vec<GenreRef>>,
	pub annotation_exists: bool,
}

/// Just enough of a book to tell which formats it can be downloaded in.
#[derive(Debug, sqlx::FromRow)]
pub struct BaseBookRow {
	pub id: i32,
	pub file_type: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct AuthorRow {
	pub id: i32,
	pub first_name: String,
	pub last_name: String,
	pub middle_name: String,
	pub annotation_exists: bool,
}

#[derive(Debug, sqlx::FromRow)]
pub struct SequenceRow {
	pub id: i32,
	pub name: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct GenreRow {
	pub id: i32,
	pub source: Json<SourceRef>,
	pub remote_id: i32,
	pub code: String,
	pub description: String,
	pub meta: String,
}

/// Shared shape of `book_annotations` and `author_annotations`.
#[derive(Debug, sqlx::FromRow)]
pub struct AnnotationRow {
	pub id: i32,
	pub title: String,
	pub text: String,
	pub file: Option<String>,
}
