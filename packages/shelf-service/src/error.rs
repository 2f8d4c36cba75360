use shelf_domain::page::PageError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Search index error: {message}")]
	SearchIndex { message: String },
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<shelf_storage::Error> for Error {
	fn from(err: shelf_storage::Error) -> Self {
		match err {
			shelf_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			shelf_storage::Error::Redis(inner) => Self::Storage { message: inner.to_string() },
			shelf_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
		}
	}
}

impl From<PageError> for Error {
	fn from(err: PageError) -> Self {
		Self::InvalidRequest { message: err.to_string() }
	}
}
