//! Fail-open adapter over a [`CacheBackend`].
//!
//! Every backend error is logged and turned into a miss or a skipped write; nothing here returns
//! an error to the caller.

use std::sync::Arc;

use crate::{
	CacheBackend,
	fingerprint::{self, key_prefix},
};

#[derive(Clone, Copy, Debug)]
enum CacheKind {
	IdList,
	IdSet,
}
impl CacheKind {
	fn as_str(self) -> &'static str {
		match self {
			Self::IdList => "id_list",
			Self::IdSet => "id_set",
		}
	}
}

#[derive(Clone)]
pub struct IdCache {
	backend: Arc<dyn CacheBackend>,
}
impl IdCache {
	pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
		Self { backend }
	}

	/// Returns the cached list length and the `[offset, offset + limit)` window of it.
	pub async fn get_cached_ids(
		&self,
		fingerprint: &str,
		offset: u64,
		limit: u64,
	) -> Option<(u64, Vec<i32>)> {
		if limit == 0 {
			return None;
		}

		let active_key = fingerprint::active_key(fingerprint);
		let start = isize::try_from(offset).unwrap_or(isize::MAX);
		let stop = isize::try_from(offset.saturating_add(limit - 1)).unwrap_or(isize::MAX);
		let window =
			match self.backend.read_list_window(fingerprint, &active_key, start, stop).await {
				Ok(window) => window,
				Err(err) => {
					tracing::warn!(
						error = %err,
						cache_kind = CacheKind::IdList.as_str(),
						cache_key_prefix = key_prefix(fingerprint),
						"Cache read failed."
					);

					return None;
				},
			};

		// The marker is authoritative. An active marker over a vanished list is a partial entry.
		if !window.active || window.total == 0 {
			tracing::debug!(
				cache_kind = CacheKind::IdList.as_str(),
				cache_key_prefix = key_prefix(fingerprint),
				hit = false,
				active = window.active,
				"Cache miss."
			);

			return None;
		}

		tracing::debug!(
			cache_kind = CacheKind::IdList.as_str(),
			cache_key_prefix = key_prefix(fingerprint),
			hit = true,
			total = window.total,
			"Cache hit."
		);

		Some((window.total, window.ids))
	}

	pub async fn store_ids(&self, fingerprint: &str, ids: &[i32], ttl_seconds: u64) {
		let active_key = fingerprint::active_key(fingerprint);

		match self.backend.replace_list(fingerprint, &active_key, ids, ttl_seconds).await {
			Ok(()) => tracing::info!(
				cache_kind = CacheKind::IdList.as_str(),
				cache_key_prefix = key_prefix(fingerprint),
				total = ids.len(),
				ttl_seconds,
				"Cache stored."
			),
			Err(err) => tracing::warn!(
				error = %err,
				cache_kind = CacheKind::IdList.as_str(),
				cache_key_prefix = key_prefix(fingerprint),
				"Cache write failed."
			),
		}
	}

	pub async fn store_id_set(&self, fingerprint: &str, ids: &[i32], ttl_seconds: u64) {
		let active_key = fingerprint::active_key(fingerprint);

		match self.backend.replace_set(fingerprint, &active_key, ids, ttl_seconds).await {
			Ok(()) => tracing::info!(
				cache_kind = CacheKind::IdSet.as_str(),
				cache_key_prefix = key_prefix(fingerprint),
				total = ids.len(),
				ttl_seconds,
				"Cache stored."
			),
			Err(err) => tracing::warn!(
				error = %err,
				cache_kind = CacheKind::IdSet.as_str(),
				cache_key_prefix = key_prefix(fingerprint),
				"Cache write failed."
			),
		}
	}

	/// Draws one member of an active cached set.
	pub async fn random_cached_id(&self, fingerprint: &str) -> Option<i32> {
		let active_key = fingerprint::active_key(fingerprint);
		let draw = match self.backend.random_member(fingerprint, &active_key).await {
			Ok(draw) => draw,
			Err(err) => {
				tracing::warn!(
					error = %err,
					cache_kind = CacheKind::IdSet.as_str(),
					cache_key_prefix = key_prefix(fingerprint),
					"Cache read failed."
				);

				return None;
			},
		};
		let member = if draw.active { draw.member } else { None };

		tracing::debug!(
			cache_kind = CacheKind::IdSet.as_str(),
			cache_key_prefix = key_prefix(fingerprint),
			hit = member.is_some(),
			"Cache draw."
		);

		member
	}
}
