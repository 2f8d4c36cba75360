use std::sync::Arc;

use shelf_service::ShelfService;
use shelf_storage::{cache::RedisCache, db::Db};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<ShelfService>,
	pub api_key: Arc<str>,
}
impl AppState {
	pub async fn new(config: shelf_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let cache = RedisCache::connect(&config.storage.redis).await?;
		let service = ShelfService::new(config, db, Arc::new(cache));

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: ShelfService) -> Self {
		let api_key = Arc::from(service.cfg.security.api_key.as_str());

		Self { service: Arc::new(service), api_key }
	}
}
