use std::sync::Arc;

use shelf_domain::{langs::LangFilter, page::PageParams};
use shelf_service::{
	BookFilter, BoxFuture, CacheBackend, Error, ListWindow, SetDraw, ShelfService, TextQuery,
};
use shelf_storage::db::Db;
use shelf_testkit::TestDatabase;

const SEED: &str = include_str!("../../shelf-storage/tests/fixtures_seed.sql");
const RANKING: &str = include_str!("../../shelf-storage/tests/fixtures_ranking.sql");

/// Accepts every write and never hits, so each call runs the resolver.
struct ColdCache;
impl CacheBackend for ColdCache {
	fn read_list_window<'a>(
		&'a self,
		_list_key: &'a str,
		_active_key: &'a str,
		_start: isize,
		_stop: isize,
	) -> BoxFuture<'a, color_eyre::Result<ListWindow>> {
		Box::pin(async move { Ok(ListWindow::default()) })
	}

	fn replace_list<'a>(
		&'a self,
		_list_key: &'a str,
		_active_key: &'a str,
		_ids: &'a [i32],
		_ttl_seconds: u64,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move { Ok(()) })
	}

	fn replace_set<'a>(
		&'a self,
		_set_key: &'a str,
		_active_key: &'a str,
		_ids: &'a [i32],
		_ttl_seconds: u64,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move { Ok(()) })
	}

	fn random_member<'a>(
		&'a self,
		_set_key: &'a str,
		_active_key: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<SetDraw>> {
		Box::pin(async move { Ok(SetDraw::default()) })
	}
}

async fn service(test_db: &TestDatabase) -> ShelfService {
	let raw = format!(
		r#"
[service]
http_bind = "127.0.0.1:0"

[storage.postgres]
dsn            = "{}"
pool_max_conns = 2

[storage.redis]
url = "redis://127.0.0.1:6379/0"

[security]
api_key = "secret"
"#,
		test_db.dsn()
	);
	let cfg = shelf_config::parse(&raw).expect("Failed to parse config.");
	let db = Db::connect(&cfg.storage.postgres).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");
	sqlx::raw_sql(SEED).execute(&db.pool).await.expect("Failed to seed catalog.");

	ShelfService::new(cfg, db, Arc::new(ColdCache))
}

fn page(page: i64, size: i64) -> PageParams {
	PageParams::new(page, size).expect("valid page")
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SHELF_PG_DSN to run."]
async fn author_search_runs_similarity_ranking_end_to_end() {
	let Some(base_dsn) = shelf_testkit::env_dsn() else {
		eprintln!("Skipping author_search_runs_similarity_ranking_end_to_end; set SHELF_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = service(&test_db).await;
	let query = TextQuery::new("Tolstoy", LangFilter::only(["ru", "en"])).expect("valid query");
	let result = service.search_authors(query, page(1, 1)).await.expect("Search failed.");

	assert_eq!(result.total, 2);
	assert_eq!(result.pages, 2);
	assert_eq!(result.items[0].first_name, "Leo");
	assert!(result.items[0].annotation_exists);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SHELF_PG_DSN to run."]
async fn catalog_reads_cover_lookup_listing_and_random() {
	let Some(base_dsn) = shelf_testkit::env_dsn() else {
		eprintln!("Skipping catalog_reads_cover_lookup_listing_and_random; set SHELF_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = service(&test_db).await;
	let mut filter = BookFilter::new(service.langs(&["ru"]));

	filter.is_deleted = Some(false);

	let books = service.list_books(filter, page(1, 10)).await.expect("Listing failed.");

	assert_eq!(books.items.iter().map(|book| book.id).collect::<Vec<_>>(), vec![1, 3, 5]);

	let detail = service.get_book(1).await.expect("Lookup failed.");

	assert_eq!(detail.book.title, "War and Peace");
	assert_eq!(detail.genres.len(), 1);
	assert!(matches!(service.get_book(404).await, Err(Error::NotFound { .. })));
	assert!(matches!(service.get_book_annotation(2).await, Err(Error::NotFound { .. })));

	let by_author =
		service.author_books(1, LangFilter::All, page(1, 10)).await.expect("Listing failed.");

	assert_eq!(by_author.page.items.iter().map(|book| book.id).collect::<Vec<_>>(), vec![2, 1]);
	assert_eq!(by_author.parent_item.last_name, "Tolstoy");

	let by_sequence =
		service.sequence_books(1, LangFilter::All, page(1, 10)).await.expect("Listing failed.");

	assert_eq!(by_sequence.page.items.iter().map(|book| book.id).collect::<Vec<_>>(), vec![2, 1]);
	assert_eq!(by_sequence.parent_item.name, "Classic Novels");
	assert!(matches!(
		service.translator_books(404, LangFilter::All, page(1, 10)).await,
		Err(Error::NotFound { .. })
	));

	let random = service.random_sequence(LangFilter::All).await.expect("Random pick failed.");

	assert_eq!(random.map(|sequence| sequence.id), Some(1));

	let nothing =
		service.random_book(LangFilter::only(["fr"]), None).await.expect("Random pick failed.");

	assert!(nothing.is_none());

	let genres = service.list_genres(None, page(1, 2)).await.expect("Listing failed.");

	assert_eq!((genres.total, genres.pages, genres.items.len()), (3, 2, 2));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SHELF_PG_DSN to run."]
async fn named_entity_searches_rank_and_page_end_to_end() {
	let Some(base_dsn) = shelf_testkit::env_dsn() else {
		eprintln!("Skipping named_entity_searches_rank_and_page_end_to_end; set SHELF_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = service(&test_db).await;

	sqlx::raw_sql(RANKING)
		.execute(&service.db.pool)
		.await
		.expect("Failed to seed ranking fixtures.");

	let ru = || LangFilter::only(["ru"]);
	let translators = service
		.search_translators(TextQuery::new("Kashkin", ru()).expect("valid query"), page(1, 3))
		.await
		.expect("Search failed.");

	assert_eq!((translators.total, translators.pages), (4, 2));
	assert_eq!(translators.items.iter().map(|a| a.id).collect::<Vec<_>>(), vec![11, 10, 12]);

	let sequences = service
		.search_sequences(TextQuery::new("Moon Saga", ru()).expect("valid query"), page(2, 3))
		.await
		.expect("Search failed.");

	assert_eq!(sequences.total, 4);
	assert_eq!(sequences.items.iter().map(|s| s.id).collect::<Vec<_>>(), vec![13]);

	let genres = service
		.search_genres(TextQuery::new("Space opera", ru()).expect("valid query"), page(1, 10))
		.await
		.expect("Search failed.");

	assert_eq!(genres.items.iter().map(|g| g.id).collect::<Vec<_>>(), vec![11, 10, 12, 13]);

	let none = service
		.search_genres(
			TextQuery::new("Science fiction", LangFilter::only(["de"])).expect("valid query"),
			page(1, 10),
		)
		.await
		.expect("Search failed.");

	assert_eq!((none.total, none.items.len()), (0, 0));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SHELF_PG_DSN to run."]
async fn author_listing_base_books_and_available_types() {
	let Some(base_dsn) = shelf_testkit::env_dsn() else {
		eprintln!("Skipping author_listing_base_books_and_available_types; set SHELF_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = service(&test_db).await;
	let authors = service.list_authors(page(2, 2)).await.expect("Listing failed.");

	assert_eq!((authors.total, authors.pages), (5, 3));
	assert_eq!(authors.items.iter().map(|a| a.id).collect::<Vec<_>>(), vec![3, 4]);

	let mut filter = BookFilter::new(service.langs(&["ru"]));

	filter.is_deleted = Some(false);

	let base = service.list_base_books(filter, page(1, 10)).await.expect("Listing failed.");

	assert_eq!(base.items.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 3, 5]);
	assert_eq!(base.items[2].available_types, vec!["pdf"]);

	let types =
		service.author_available_types(1, LangFilter::All).await.expect("Lookup failed.");

	assert_eq!(types, vec!["epub", "fb2", "fb2zip", "mobi"]);

	let types = service
		.translator_available_types(5, LangFilter::All)
		.await
		.expect("Lookup failed.");

	assert_eq!(types, vec!["epub"]);
	assert!(
		service
			.sequence_available_types(2, LangFilter::All)
			.await
			.expect("Lookup failed.")
			.is_empty()
	);
	assert!(matches!(
		service.author_available_types(404, LangFilter::All).await,
		Err(Error::NotFound { .. })
	));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
