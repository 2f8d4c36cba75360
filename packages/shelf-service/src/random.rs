use std::future::Future;

use rand::seq::IndexedRandom as _;

use shelf_domain::langs::LangFilter;
use shelf_storage::{models::BookRelations, queries};

use crate::{
	Author, BookDetail, IdCache, Result, Sequence, ShelfService,
	fingerprint,
	resolver::{EligibleResolver, IdResolver, RandomQuery, RandomTarget},
};

/// Uniform draws from a cached eligible set.
pub struct RandomPick {
	cache: IdCache,
	ttl_seconds: u64,
}
impl RandomPick {
	pub fn new(cache: IdCache, ttl_seconds: u64) -> Self {
		Self { cache, ttl_seconds }
	}

	/// Returns `None` when nothing is eligible. Empty sets are not cached.
	pub async fn get_random_id<Q, R>(&self, resolver: &R, query: &Q) -> Result<Option<i32>>
	where
		Q: Sync,
		R: IdResolver<Q> + ?Sized,
	{
		let key = fingerprint::fingerprint(resolver.namespace(), &resolver.params(query));

		if let Some(id) = self.cache.random_cached_id(&key).await {
			return Ok(Some(id));
		}

		self.resolve_and_draw(resolver, query, &key).await
	}

	/// Draws an id and loads its entity.
	///
	/// A cached id that no longer loads marks the cached set as stale: the set is resolved and
	/// stored again, then drawn once more. `None` means nothing eligible could be loaded.
	pub async fn pick_loaded<Q, R, T, F, Fut>(
		&self,
		resolver: &R,
		query: &Q,
		load: F,
	) -> Result<Option<T>>
	where
		Q: Sync,
		R: IdResolver<Q> + ?Sized,
		F: Fn(i32) -> Fut,
		Fut: Future<Output = Result<Option<T>>>,
	{
		let Some(id) = self.get_random_id(resolver, query).await? else {
			return Ok(None);
		};

		if let Some(item) = load(id).await? {
			return Ok(Some(item));
		}

		tracing::info!(
			namespace = resolver.namespace(),
			id,
			"Random pick no longer loads. Refreshing eligible set."
		);

		let key = fingerprint::fingerprint(resolver.namespace(), &resolver.params(query));
		let Some(id) = self.resolve_and_draw(resolver, query, &key).await? else {
			return Ok(None);
		};

		load(id).await
	}

	async fn resolve_and_draw<Q, R>(
		&self,
		resolver: &R,
		query: &Q,
		key: &str,
	) -> Result<Option<i32>>
	where
		Q: Sync,
		R: IdResolver<Q> + ?Sized,
	{
		let ids = resolver.resolve_ids(query).await.inspect_err(|err| {
			tracing::warn!(error = %err, namespace = resolver.namespace(), "Id resolver failed.");
		})?;

		if ids.is_empty() {
			return Ok(None);
		}

		self.cache.store_id_set(key, &ids, self.ttl_seconds).await;

		Ok(pick(&ids))
	}
}

fn pick(ids: &[i32]) -> Option<i32> {
	let mut rng = rand::rng();

	ids.choose(&mut rng).copied()
}

impl ShelfService {
	pub async fn random_book(
		&self,
		langs: LangFilter,
		genre: Option<i32>,
	) -> Result<Option<BookDetail>> {
		let resolver = EligibleResolver::new(self.db.pool.clone(), RandomTarget::Book);
		let query = RandomQuery { langs, genre };

		self.random.pick_loaded(&resolver, &query, |id| self.load_book_detail(id)).await
	}

	pub async fn random_author(&self, langs: LangFilter) -> Result<Option<Author>> {
		let resolver = EligibleResolver::new(self.db.pool.clone(), RandomTarget::Author);
		let query = RandomQuery { langs, genre: None };

		self.random.pick_loaded(&resolver, &query, |id| self.load_author(id)).await
	}

	pub async fn random_sequence(&self, langs: LangFilter) -> Result<Option<Sequence>> {
		let resolver = EligibleResolver::new(self.db.pool.clone(), RandomTarget::Sequence);
		let query = RandomQuery { langs, genre: None };

		self.random.pick_loaded(&resolver, &query, |id| self.load_sequence(id)).await
	}

	async fn load_book_detail(&self, id: i32) -> Result<Option<BookDetail>> {
		let row = queries::get_book(&self.db.pool, id, BookRelations::DETAIL).await?;

		Ok(row.map(BookDetail::from))
	}

	async fn load_author(&self, id: i32) -> Result<Option<Author>> {
		Ok(queries::get_author(&self.db.pool, id).await?.map(Author::from))
	}

	async fn load_sequence(&self, id: i32) -> Result<Option<Sequence>> {
		Ok(queries::get_sequence(&self.db.pool, id).await?.map(Sequence::from))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pick_stays_inside_the_set() {
		let ids = [4, 8, 15];

		for _ in 0..50 {
			assert!(ids.contains(&pick(&ids).expect("non-empty set")));
		}

		assert_eq!(pick(&[]), None);
	}
}
