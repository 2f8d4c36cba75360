//! Paginated reads over resolved id lists.

use std::collections::HashMap;

use shelf_domain::page::{Page, PageParams};

use crate::{
	BoxFuture, IdCache, Result,
	fingerprint,
	resolver::{IdResolver, IndexResolver, IndexTarget, TextQuery},
};

pub trait Identified {
	fn id(&self) -> i32;
}

/// Loads entities by id. Returned order is unspecified.
pub trait EntityLoader<T>
where
	Self: Send + Sync,
{
	fn load_by_ids<'a>(&'a self, ids: &'a [i32]) -> BoxFuture<'a, Result<Vec<T>>>;
}

pub struct ResultAssembler {
	cache: IdCache,
	ttl_seconds: u64,
}
impl ResultAssembler {
	pub fn new(cache: IdCache, ttl_seconds: u64) -> Self {
		Self { cache, ttl_seconds }
	}

	/// Serves one page of a resolver's result, resolving and caching the full list on a miss.
	///
	/// Empty results are never cached.
	pub async fn get<Q, T, R, L>(
		&self,
		resolver: &R,
		loader: &L,
		query: &Q,
		params: PageParams,
	) -> Result<Page<T>>
	where
		Q: Sync,
		T: Identified,
		R: IdResolver<Q> + ?Sized,
		L: EntityLoader<T> + ?Sized,
	{
		let key = fingerprint::fingerprint(resolver.namespace(), &resolver.params(query));
		let window = params.window();
		let (total, slice) = match self.cache.get_cached_ids(&key, window.offset, window.limit).await
		{
			Some(hit) => hit,
			None => {
				let ids = resolver.resolve_ids(query).await.inspect_err(|err| {
					tracing::warn!(
						error = %err,
						namespace = resolver.namespace(),
						"Id resolver failed."
					);
				})?;

				if !ids.is_empty() {
					self.cache.store_ids(&key, &ids, self.ttl_seconds).await;
				}

				(ids.len() as u64, window.slice(&ids).to_vec())
			},
		};

		if slice.is_empty() {
			return Ok(Page::new(Vec::new(), total, params));
		}

		let items = order_by_ids(&slice, loader.load_by_ids(&slice).await?);

		Ok(Page::new(items, total, params))
	}

	/// Delegates ranking and pagination to the external index. Uses the index's total estimate.
	pub async fn get_from_index<T, L>(
		&self,
		index: &IndexResolver,
		target: IndexTarget,
		loader: &L,
		query: &TextQuery,
		params: PageParams,
	) -> Result<Page<T>>
	where
		T: Identified,
		L: EntityLoader<T> + ?Sized,
	{
		let hits = index.search(target, query, params.window()).await?;

		if hits.ids.is_empty() {
			return Ok(Page::new(Vec::new(), hits.estimated_total, params));
		}

		let items = order_by_ids(&hits.ids, loader.load_by_ids(&hits.ids).await?);

		Ok(Page::new(items, hits.estimated_total, params))
	}
}

/// Reorders `items` to follow `ids`. Ids without a loaded item are skipped.
pub fn order_by_ids<T>(ids: &[i32], items: Vec<T>) -> Vec<T>
where
	T: Identified,
{
	let mut by_id = items.into_iter().map(|item| (item.id(), item)).collect::<HashMap<_, _>>();

	ids.iter().filter_map(|id| by_id.remove(id)).collect()
}
