use shelf_config::SEARCH_BACKEND_INDEX;
use shelf_domain::page::{Page, PageParams};
use shelf_storage::{ids::SimilarityTarget, models::BookRelations};

use crate::{
	Author, BaseBook, Book, EntityLoader, Genre, Identified, Result, Sequence, ShelfService,
	catalog::{AuthorLoader, BaseBookLoader, BookLoader, GenreLoader, SequenceLoader},
	resolver::{BookFilter, BookFilterResolver, IndexTarget, TextQuery, TrgmResolver},
};

/// Where free-text searches are ranked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchBackend {
	Trgm,
	Index,
}
impl SearchBackend {
	pub fn from_config(backend: &str) -> Self {
		if backend == SEARCH_BACKEND_INDEX { Self::Index } else { Self::Trgm }
	}
}

impl ShelfService {
	pub fn search_backend(&self) -> SearchBackend {
		SearchBackend::from_config(&self.cfg.search.backend)
	}

	pub async fn search_books(&self, query: TextQuery, params: PageParams) -> Result<Page<Book>> {
		let loader = BookLoader::new(self.db.pool.clone(), BookRelations::LIST);

		self.search_with(SimilarityTarget::Book, IndexTarget::Books, &loader, query, params).await
	}

	pub async fn search_authors(
		&self,
		query: TextQuery,
		params: PageParams,
	) -> Result<Page<Author>> {
		let loader = AuthorLoader::new(self.db.pool.clone());

		self.search_with(SimilarityTarget::Author, IndexTarget::Authors, &loader, query, params)
			.await
	}

	pub async fn search_translators(
		&self,
		query: TextQuery,
		params: PageParams,
	) -> Result<Page<Author>> {
		let loader = AuthorLoader::new(self.db.pool.clone());

		self.search_with(
			SimilarityTarget::Translator,
			IndexTarget::Translators,
			&loader,
			query,
			params,
		)
		.await
	}

	pub async fn search_sequences(
		&self,
		query: TextQuery,
		params: PageParams,
	) -> Result<Page<Sequence>> {
		let loader = SequenceLoader::new(self.db.pool.clone());

		self.search_with(SimilarityTarget::Sequence, IndexTarget::Sequences, &loader, query, params)
			.await
	}

	pub async fn search_genres(
		&self,
		query: TextQuery,
		params: PageParams,
	) -> Result<Page<Genre>> {
		let loader = GenreLoader::new(self.db.pool.clone());

		self.search_with(SimilarityTarget::Genre, IndexTarget::Genres, &loader, query, params)
			.await
	}

	/// Books matching attribute filters, in id order.
	pub async fn list_books(&self, filter: BookFilter, params: PageParams) -> Result<Page<Book>> {
		let resolver = BookFilterResolver::new(self.db.pool.clone());
		let loader = BookLoader::new(self.db.pool.clone(), BookRelations::LIST);

		self.assembler.get(&resolver, &loader, &filter, params).await
	}

	/// Same filter and cached id list as [`Self::list_books`], with only ids and formats loaded.
	pub async fn list_base_books(
		&self,
		filter: BookFilter,
		params: PageParams,
	) -> Result<Page<BaseBook>> {
		let resolver = BookFilterResolver::new(self.db.pool.clone());
		let loader = BaseBookLoader::new(self.db.pool.clone());

		self.assembler.get(&resolver, &loader, &filter, params).await
	}

	async fn search_with<T, L>(
		&self,
		similarity: SimilarityTarget,
		index: IndexTarget,
		loader: &L,
		query: TextQuery,
		params: PageParams,
	) -> Result<Page<T>>
	where
		T: Identified,
		L: EntityLoader<T>,
	{
		match self.search_backend() {
			SearchBackend::Index =>
				self.assembler.get_from_index(&self.index, index, loader, &query, params).await,
			SearchBackend::Trgm => {
				let resolver = TrgmResolver::new(
					self.db.pool.clone(),
					similarity,
					self.cfg.search.similarity_limit,
				);

				self.assembler.get(&resolver, loader, &query, params).await
			},
		}
	}
}
