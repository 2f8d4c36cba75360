use axum::{
	Json, Router,
	body::Body,
	extract::{Path, Request, State},
	http::{HeaderMap, StatusCode, header::AUTHORIZATION},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::get,
};
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};
use time::Date;
use tower_http::trace::TraceLayer;

use shelf_domain::page::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, Page, PageParams, ParentPage};
use shelf_service::{
	Annotation, Author, BaseBook, Book, BookDetail, BookFilter, Error as ServiceError, Genre,
	Sequence, TextQuery, date_serde,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	let api = Router::new()
		.route("/books/", get(list_books))
		.route("/books/base/", get(list_base_books))
		.route("/books/random", get(random_book))
		.route("/books/search/{query}", get(search_books))
		.route("/books/remote/{source_id}/{remote_id}", get(get_remote_book))
		.route("/books/{id}", get(get_book))
		.route("/books/{id}/annotation", get(get_book_annotation))
		.route("/authors/", get(list_authors))
		.route("/authors/random", get(random_author))
		.route("/authors/search/{query}", get(search_authors))
		.route("/authors/{id}", get(get_author))
		.route("/authors/{id}/annotation", get(get_author_annotation))
		.route("/authors/{id}/books", get(author_books))
		.route("/authors/{id}/available_types", get(author_available_types))
		.route("/translators/search/{query}", get(search_translators))
		.route("/translators/{id}/books", get(translator_books))
		.route("/translators/{id}/available_types", get(translator_available_types))
		.route("/sequences/random", get(random_sequence))
		.route("/sequences/search/{query}", get(search_sequences))
		.route("/sequences/{id}", get(get_sequence))
		.route("/sequences/{id}/books", get(sequence_books))
		.route("/sequences/{id}/available_types", get(sequence_available_types))
		.route("/genres/", get(list_genres))
		.route("/genres/metas", get(genre_metas))
		.route("/genres/search/{query}", get(search_genres))
		.route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

	Router::new()
		.route("/health", get(health))
		.nest("/api/v1", api)
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

#[derive(Debug, Deserialize)]
struct ListQuery {
	#[serde(default = "default_page")]
	page: i64,
	#[serde(default = "default_size")]
	size: i64,
	#[serde(default)]
	allowed_langs: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BookListQuery {
	#[serde(default = "default_page")]
	page: i64,
	#[serde(default = "default_size")]
	size: i64,
	#[serde(default)]
	allowed_langs: Vec<String>,
	is_deleted: Option<bool>,
	uploaded_gte: Option<String>,
	uploaded_lte: Option<String>,
	id_gte: Option<i32>,
	id_lte: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct PageQuery {
	#[serde(default = "default_page")]
	page: i64,
	#[serde(default = "default_size")]
	size: i64,
}

#[derive(Debug, Deserialize)]
struct LangsQuery {
	#[serde(default)]
	allowed_langs: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RandomParams {
	#[serde(default)]
	allowed_langs: Vec<String>,
	genre: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct GenreListQuery {
	#[serde(default = "default_page")]
	page: i64,
	#[serde(default = "default_size")]
	size: i64,
	meta: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}

	fn none_available(kind: &str) -> Self {
		Self::new(
			StatusCode::NOT_FOUND,
			"none_available",
			format!("No {kind} matches the requested filters."),
		)
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				Self::new(StatusCode::BAD_REQUEST, "invalid_request", message),
			ServiceError::NotFound { message } =>
				Self::new(StatusCode::NOT_FOUND, "not_found", message),
			ServiceError::Storage { message } => {
				tracing::error!(error = %message, "Storage error.");

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", "Storage error.")
			},
			ServiceError::SearchIndex { message } => {
				tracing::error!(error = %message, "Search index error.");

				Self::new(StatusCode::BAD_GATEWAY, "search_index_error", message)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

async fn auth_middleware(
	State(state): State<AppState>,
	req: Request<Body>,
	next: Next,
) -> Response {
	if !is_authorized(req.headers(), &state.api_key) {
		return ApiError::new(StatusCode::UNAUTHORIZED, "unauthorized", "Wrong API key.")
			.into_response();
	}

	next.run(req).await
}

fn is_authorized(headers: &HeaderMap, api_key: &str) -> bool {
	headers
		.get(AUTHORIZATION)
		.and_then(|value| value.to_str().ok())
		.is_some_and(|value| !api_key.is_empty() && value.trim() == api_key)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn list_books(
	State(state): State<AppState>,
	Query(q): Query<BookListQuery>,
) -> Result<Json<Page<Book>>, ApiError> {
	let (filter, params) = book_filter(&state, &q)?;

	Ok(Json(state.service.list_books(filter, params).await?))
}

async fn list_base_books(
	State(state): State<AppState>,
	Query(q): Query<BookListQuery>,
) -> Result<Json<Page<BaseBook>>, ApiError> {
	let (filter, params) = book_filter(&state, &q)?;

	Ok(Json(state.service.list_base_books(filter, params).await?))
}

async fn random_book(
	State(state): State<AppState>,
	Query(q): Query<RandomParams>,
) -> Result<Json<BookDetail>, ApiError> {
	let langs = state.service.langs(&q.allowed_langs);
	let book = state.service.random_book(langs, q.genre).await?;

	book.map(Json).ok_or_else(|| ApiError::none_available("book"))
}

async fn search_books(
	State(state): State<AppState>,
	Path(query): Path<String>,
	Query(q): Query<ListQuery>,
) -> Result<Json<Page<Book>>, ApiError> {
	let (query, params) = text_query(&state, &query, &q)?;

	Ok(Json(state.service.search_books(query, params).await?))
}

async fn get_remote_book(
	State(state): State<AppState>,
	Path((source_id, remote_id)): Path<(i32, i32)>,
) -> Result<Json<BookDetail>, ApiError> {
	Ok(Json(state.service.get_remote_book(source_id, remote_id).await?))
}

async fn get_book(
	State(state): State<AppState>,
	Path(id): Path<i32>,
) -> Result<Json<BookDetail>, ApiError> {
	Ok(Json(state.service.get_book(id).await?))
}

async fn get_book_annotation(
	State(state): State<AppState>,
	Path(id): Path<i32>,
) -> Result<Json<Annotation>, ApiError> {
	Ok(Json(state.service.get_book_annotation(id).await?))
}

async fn list_authors(
	State(state): State<AppState>,
	Query(q): Query<PageQuery>,
) -> Result<Json<Page<Author>>, ApiError> {
	let params = page_params(q.page, q.size)?;

	Ok(Json(state.service.list_authors(params).await?))
}

async fn random_author(
	State(state): State<AppState>,
	Query(q): Query<RandomParams>,
) -> Result<Json<Author>, ApiError> {
	let langs = state.service.langs(&q.allowed_langs);
	let author = state.service.random_author(langs).await?;

	author.map(Json).ok_or_else(|| ApiError::none_available("author"))
}

async fn search_authors(
	State(state): State<AppState>,
	Path(query): Path<String>,
	Query(q): Query<ListQuery>,
) -> Result<Json<Page<Author>>, ApiError> {
	let (query, params) = text_query(&state, &query, &q)?;

	Ok(Json(state.service.search_authors(query, params).await?))
}

async fn get_author(
	State(state): State<AppState>,
	Path(id): Path<i32>,
) -> Result<Json<Author>, ApiError> {
	Ok(Json(state.service.get_author(id).await?))
}

async fn get_author_annotation(
	State(state): State<AppState>,
	Path(id): Path<i32>,
) -> Result<Json<Annotation>, ApiError> {
	Ok(Json(state.service.get_author_annotation(id).await?))
}

async fn author_books(
	State(state): State<AppState>,
	Path(id): Path<i32>,
	Query(q): Query<ListQuery>,
) -> Result<Json<ParentPage<Book, Author>>, ApiError> {
	let params = page_params(q.page, q.size)?;
	let langs = state.service.langs(&q.allowed_langs);

	Ok(Json(state.service.author_books(id, langs, params).await?))
}

async fn author_available_types(
	State(state): State<AppState>,
	Path(id): Path<i32>,
	Query(q): Query<LangsQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
	let langs = state.service.langs(&q.allowed_langs);

	Ok(Json(state.service.author_available_types(id, langs).await?))
}

async fn search_translators(
	State(state): State<AppState>,
	Path(query): Path<String>,
	Query(q): Query<ListQuery>,
) -> Result<Json<Page<Author>>, ApiError> {
	let (query, params) = text_query(&state, &query, &q)?;

	Ok(Json(state.service.search_translators(query, params).await?))
}

async fn translator_books(
	State(state): State<AppState>,
	Path(id): Path<i32>,
	Query(q): Query<ListQuery>,
) -> Result<Json<ParentPage<Book, Author>>, ApiError> {
	let params = page_params(q.page, q.size)?;
	let langs = state.service.langs(&q.allowed_langs);

	Ok(Json(state.service.translator_books(id, langs, params).await?))
}

async fn translator_available_types(
	State(state): State<AppState>,
	Path(id): Path<i32>,
	Query(q): Query<LangsQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
	let langs = state.service.langs(&q.allowed_langs);

	Ok(Json(state.service.translator_available_types(id, langs).await?))
}

async fn random_sequence(
	State(state): State<AppState>,
	Query(q): Query<RandomParams>,
) -> Result<Json<Sequence>, ApiError> {
	let langs = state.service.langs(&q.allowed_langs);
	let sequence = state.service.random_sequence(langs).await?;

	sequence.map(Json).ok_or_else(|| ApiError::none_available("sequence"))
}

async fn search_sequences(
	State(state): State<AppState>,
	Path(query): Path<String>,
	Query(q): Query<ListQuery>,
) -> Result<Json<Page<Sequence>>, ApiError> {
	let (query, params) = text_query(&state, &query, &q)?;

	Ok(Json(state.service.search_sequences(query, params).await?))
}

async fn get_sequence(
	State(state): State<AppState>,
	Path(id): Path<i32>,
) -> Result<Json<Sequence>, ApiError> {
	Ok(Json(state.service.get_sequence(id).await?))
}

async fn sequence_books(
	State(state): State<AppState>,
	Path(id): Path<i32>,
	Query(q): Query<ListQuery>,
) -> Result<Json<ParentPage<Book, Sequence>>, ApiError> {
	let params = page_params(q.page, q.size)?;
	let langs = state.service.langs(&q.allowed_langs);

	Ok(Json(state.service.sequence_books(id, langs, params).await?))
}

async fn sequence_available_types(
	State(state): State<AppState>,
	Path(id): Path<i32>,
	Query(q): Query<LangsQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
	let langs = state.service.langs(&q.allowed_langs);

	Ok(Json(state.service.sequence_available_types(id, langs).await?))
}

async fn list_genres(
	State(state): State<AppState>,
	Query(q): Query<GenreListQuery>,
) -> Result<Json<Page<Genre>>, ApiError> {
	let params = page_params(q.page, q.size)?;

	Ok(Json(state.service.list_genres(q.meta.as_deref(), params).await?))
}

async fn genre_metas(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
	Ok(Json(state.service.genre_metas().await?))
}

async fn search_genres(
	State(state): State<AppState>,
	Path(query): Path<String>,
	Query(q): Query<ListQuery>,
) -> Result<Json<Page<Genre>>, ApiError> {
	let (query, params) = text_query(&state, &query, &q)?;

	Ok(Json(state.service.search_genres(query, params).await?))
}

fn text_query(
	state: &AppState,
	text: &str,
	q: &ListQuery,
) -> Result<(TextQuery, PageParams), ApiError> {
	let params = page_params(q.page, q.size)?;
	let query = TextQuery::new(text, state.service.langs(&q.allowed_langs))?;

	Ok((query, params))
}

fn book_filter(state: &AppState, q: &BookListQuery) -> Result<(BookFilter, PageParams), ApiError> {
	let params = page_params(q.page, q.size)?;
	let filter = BookFilter {
		langs: state.service.langs(&q.allowed_langs),
		is_deleted: q.is_deleted,
		uploaded_gte: parse_date("uploaded_gte", q.uploaded_gte.as_deref())?,
		uploaded_lte: parse_date("uploaded_lte", q.uploaded_lte.as_deref())?,
		id_gte: q.id_gte,
		id_lte: q.id_lte,
	};

	Ok((filter, params))
}

fn page_params(page: i64, size: i64) -> Result<PageParams, ApiError> {
	Ok(PageParams::new(page, size).map_err(ServiceError::from)?)
}

fn parse_date(field: &str, raw: Option<&str>) -> Result<Option<Date>, ApiError> {
	let Some(raw) = raw else {
		return Ok(None);
	};

	date_serde::parse(raw).map(Some).map_err(|_| {
		ApiError::new(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			format!("{field} must be a YYYY-MM-DD date."),
		)
	})
}

fn default_page() -> i64 {
	DEFAULT_PAGE
}

fn default_size() -> i64 {
	DEFAULT_PAGE_SIZE
}
