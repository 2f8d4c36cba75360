use shelf_domain::{
	book,
	langs::LangFilter,
	page::{Page, PageParams, ParentPage},
};
use shelf_storage::{
	ids::{self, RelatedBooks},
	models::BookRelations,
	queries,
};

use crate::{
	Annotation, Author, Book, BookDetail, EntityLoader, Error, Genre, Result, Sequence,
	ShelfService, assembler, catalog::BookLoader,
};

impl ShelfService {
	pub async fn get_book(&self, book_id: i32) -> Result<BookDetail> {
		let row = queries::get_book(&self.db.pool, book_id, BookRelations::DETAIL).await?;

		row.map(BookDetail::from).ok_or_else(|| not_found("book", book_id))
	}

	pub async fn get_remote_book(&self, source_id: i32, remote_id: i32) -> Result<BookDetail> {
		let row =
			queries::get_remote_book(&self.db.pool, source_id, remote_id, BookRelations::DETAIL)
				.await?;

		row.map(BookDetail::from).ok_or_else(|| Error::NotFound {
			message: format!("book {remote_id} from source {source_id} does not exist."),
		})
	}

	pub async fn get_book_annotation(&self, book_id: i32) -> Result<Annotation> {
		let row = queries::get_book_annotation(&self.db.pool, book_id).await?;

		row.map(Annotation::from).ok_or_else(|| not_found("book annotation", book_id))
	}

	pub async fn get_author(&self, author_id: i32) -> Result<Author> {
		let row = queries::get_author(&self.db.pool, author_id).await?;

		row.map(Author::from).ok_or_else(|| not_found("author", author_id))
	}

	/// Every author in id order.
	pub async fn list_authors(&self, params: PageParams) -> Result<Page<Author>> {
		let window = params.window();
		let (total, rows) =
			queries::list_authors(&self.db.pool, to_i64(window.offset), to_i64(window.limit))
				.await?;
		let items = rows.into_iter().map(Author::from).collect();

		Ok(Page::new(items, u64::try_from(total).unwrap_or_default(), params))
	}

	pub async fn get_author_annotation(&self, author_id: i32) -> Result<Annotation> {
		let row = queries::get_author_annotation(&self.db.pool, author_id).await?;

		row.map(Annotation::from).ok_or_else(|| not_found("author annotation", author_id))
	}

	pub async fn get_sequence(&self, sequence_id: i32) -> Result<Sequence> {
		let row = queries::get_sequence(&self.db.pool, sequence_id).await?;

		row.map(Sequence::from).ok_or_else(|| not_found("sequence", sequence_id))
	}

	/// Live books by an author, ordered by title.
	pub async fn author_books(
		&self,
		author_id: i32,
		langs: LangFilter,
		params: PageParams,
	) -> Result<ParentPage<Book, Author>> {
		let author = self.get_author(author_id).await?;
		let page = self.related_books(RelatedBooks::Author(author_id), langs, params).await?;

		Ok(page.with_parent(author))
	}

	pub async fn translator_books(
		&self,
		translator_id: i32,
		langs: LangFilter,
		params: PageParams,
	) -> Result<ParentPage<Book, Author>> {
		let translator = self.get_author(translator_id).await?;
		let page =
			self.related_books(RelatedBooks::Translator(translator_id), langs, params).await?;

		Ok(page.with_parent(translator))
	}

	/// Live books of a sequence, in sequence position order.
	pub async fn sequence_books(
		&self,
		sequence_id: i32,
		langs: LangFilter,
		params: PageParams,
	) -> Result<ParentPage<Book, Sequence>> {
		let sequence = self.get_sequence(sequence_id).await?;
		let page = self.related_books(RelatedBooks::Sequence(sequence_id), langs, params).await?;

		Ok(page.with_parent(sequence))
	}

	/// Download formats offered across an author's live books.
	pub async fn author_available_types(
		&self,
		author_id: i32,
		langs: LangFilter,
	) -> Result<Vec<String>> {
		self.get_author(author_id).await?;
		self.related_available_types(RelatedBooks::Author(author_id), langs).await
	}

	pub async fn translator_available_types(
		&self,
		translator_id: i32,
		langs: LangFilter,
	) -> Result<Vec<String>> {
		self.get_author(translator_id).await?;
		self.related_available_types(RelatedBooks::Translator(translator_id), langs).await
	}

	pub async fn sequence_available_types(
		&self,
		sequence_id: i32,
		langs: LangFilter,
	) -> Result<Vec<String>> {
		self.get_sequence(sequence_id).await?;
		self.related_available_types(RelatedBooks::Sequence(sequence_id), langs).await
	}

	pub async fn list_genres(&self, meta: Option<&str>, params: PageParams) -> Result<Page<Genre>> {
		let window = params.window();
		let (total, rows) = queries::list_genres(
			&self.db.pool,
			meta,
			to_i64(window.offset),
			to_i64(window.limit),
		)
		.await?;
		let items = rows.into_iter().map(Genre::from).collect();

		Ok(Page::new(items, u64::try_from(total).unwrap_or_default(), params))
	}

	pub async fn genre_metas(&self) -> Result<Vec<String>> {
		Ok(queries::list_genre_metas(&self.db.pool).await?)
	}

	async fn related_available_types(
		&self,
		related: RelatedBooks,
		langs: LangFilter,
	) -> Result<Vec<String>> {
		let langs = langs.as_sql();
		let file_types =
			ids::related_file_types(&self.db.pool, related, langs.as_deref()).await?;

		Ok(book::merged_available_types(file_types))
	}

	async fn related_books(
		&self,
		related: RelatedBooks,
		langs: LangFilter,
		params: PageParams,
	) -> Result<Page<Book>> {
		let window = params.window();
		let langs = langs.as_sql();
		let (total, ids) = ids::related_book_ids(
			&self.db.pool,
			related,
			langs.as_deref(),
			to_i64(window.offset),
			to_i64(window.limit),
		)
		.await?;
		let total = u64::try_from(total).unwrap_or_default();

		if ids.is_empty() {
			return Ok(Page::new(Vec::new(), total, params));
		}

		let loader = BookLoader::new(self.db.pool.clone(), BookRelations::LIST);
		let items = assembler::order_by_ids(&ids, loader.load_by_ids(&ids).await?);

		Ok(Page::new(items, total, params))
	}
}

fn not_found(kind: &str, id: i32) -> Error {
	Error::NotFound { message: format!("{kind} {id} does not exist.") }
}

fn to_i64(value: u64) -> i64 {
	i64::try_from(value).unwrap_or(i64::MAX)
}
