use redis::{AsyncCommands as _, Client, aio::ConnectionManager};

use crate::{Error, Result};

/// One window read from a cached id list together with the state of its active marker.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListWindow {
	pub active: bool,
	pub total: u64,
	pub ids: Vec<i32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SetDraw {
	pub active: bool,
	pub member: Option<i32>,
}

/// Redis-backed id store. Every operation runs as a single `MULTI`/`EXEC` pipeline.
#[derive(Clone)]
pub struct RedisCache {
	conn: ConnectionManager,
}
impl RedisCache {
	pub async fn connect(cfg: &shelf_config::Redis) -> Result<Self> {
		let client = Client::open(cfg.url.as_str())?;
		let conn = ConnectionManager::new(client).await?;

		Ok(Self { conn })
	}

	/// Reads `[start, stop]` (inclusive, Redis `LRANGE` semantics) from `list_key`.
	pub async fn read_list_window(
		&self,
		list_key: &str,
		active_key: &str,
		start: isize,
		stop: isize,
	) -> Result<ListWindow> {
		let mut conn = self.conn.clone();
		let (active, total, ids): (bool, u64, Vec<i32>) = redis::pipe()
			.atomic()
			.exists(active_key)
			.llen(list_key)
			.lrange(list_key, start, stop)
			.query_async(&mut conn)
			.await?;

		Ok(ListWindow { active, total, ids })
	}

	pub async fn replace_list(
		&self,
		list_key: &str,
		active_key: &str,
		ids: &[i32],
		ttl_seconds: u64,
	) -> Result<()> {
		if ids.is_empty() {
			return Err(Error::InvalidArgument("Cannot cache an empty id list.".to_string()));
		}

		let mut conn = self.conn.clone();

		redis::pipe()
			.atomic()
			.del(list_key)
			.ignore()
			.set_ex(active_key, 1, ttl_seconds)
			.ignore()
			.rpush(list_key, ids)
			.ignore()
			.expire(list_key, ttl_as_i64(ttl_seconds))
			.ignore()
			.query_async::<()>(&mut conn)
			.await?;

		Ok(())
	}

	pub async fn replace_set(
		&self,
		set_key: &str,
		active_key: &str,
		ids: &[i32],
		ttl_seconds: u64,
	) -> Result<()> {
		if ids.is_empty() {
			return Err(Error::InvalidArgument("Cannot cache an empty id set.".to_string()));
		}

		let mut conn = self.conn.clone();

		redis::pipe()
			.atomic()
			.del(set_key)
			.ignore()
			.set_ex(active_key, 1, ttl_seconds)
			.ignore()
			.sadd(set_key, ids)
			.ignore()
			.expire(set_key, ttl_as_i64(ttl_seconds))
			.ignore()
			.query_async::<()>(&mut conn)
			.await?;

		Ok(())
	}

	pub async fn random_member(&self, set_key: &str, active_key: &str) -> Result<SetDraw> {
		let mut conn = self.conn.clone();
		let (active, member): (bool, Option<i32>) = redis::pipe()
			.atomic()
			.exists(active_key)
			.srandmember(set_key)
			.query_async(&mut conn)
			.await?;

		Ok(SetDraw { active, member })
	}

	/// Deletes every key in `keys`. Used by tests to simulate expiry.
	pub async fn delete(&self, keys: &[&str]) -> Result<()> {
		let mut conn = self.conn.clone();

		conn.del::<_, ()>(keys).await?;

		Ok(())
	}
}

fn ttl_as_i64(ttl_seconds: u64) -> i64 {
	i64::try_from(ttl_seconds).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ttl_conversion_saturates() {
		assert_eq!(ttl_as_i64(3_600), 3_600);
		assert_eq!(ttl_as_i64(u64::MAX), i64::MAX);
	}
}
