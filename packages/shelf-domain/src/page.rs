use serde::Serialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PageError {
	#[error("page must be 1 or greater.")]
	Page,
	#[error("size must be between 1 and {MAX_PAGE_SIZE}.")]
	Size,
}

/// A validated 1-based page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageParams {
	page: u64,
	size: u64,
}
impl PageParams {
	pub fn new(page: i64, size: i64) -> Result<Self, PageError> {
		if page < 1 {
			return Err(PageError::Page);
		}
		if !(1..=MAX_PAGE_SIZE).contains(&size) {
			return Err(PageError::Size);
		}

		Ok(Self { page: page as u64, size: size as u64 })
	}

	pub fn page(&self) -> u64 {
		self.page
	}

	pub fn size(&self) -> u64 {
		self.size
	}

	pub fn window(&self) -> PageWindow {
		PageWindow { offset: (self.page - 1).saturating_mul(self.size), limit: self.size }
	}
}
impl Default for PageParams {
	fn default() -> Self {
		Self { page: DEFAULT_PAGE as u64, size: DEFAULT_PAGE_SIZE as u64 }
	}
}

/// Zero-based slice of an ordered result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
	pub offset: u64,
	pub limit: u64,
}
impl PageWindow {
	/// Applies the window to a fully materialized list.
	pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
		let len = items.len();
		let start = usize::try_from(self.offset).unwrap_or(usize::MAX).min(len);
		let end = start.saturating_add(usize::try_from(self.limit).unwrap_or(usize::MAX)).min(len);

		&items[start..end]
	}
}

pub fn total_pages(total: u64, size: u64) -> u64 {
	if size == 0 {
		return 0;
	}

	total.div_ceil(size)
}

/// The envelope every paginated endpoint returns.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Page<T> {
	pub items: Vec<T>,
	pub total: u64,
	pub page: u64,
	pub size: u64,
	pub pages: u64,
}
impl<T> Page<T> {
	pub fn new(items: Vec<T>, total: u64, params: PageParams) -> Self {
		Self {
			items,
			total,
			page: params.page(),
			size: params.size(),
			pages: total_pages(total, params.size()),
		}
	}

	/// Attaches the entity the items belong to.
	pub fn with_parent<P>(self, parent_item: P) -> ParentPage<T, P> {
		ParentPage { page: self, parent_item }
	}
}

/// A page of items listed under one parent entity, such as an author's books.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ParentPage<T, P> {
	#[serde(flatten)]
	pub page: Page<T>,
	pub parent_item: P,
}
