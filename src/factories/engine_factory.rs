use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::interfaces::clock::{Clock, SystemClock};
use crate::interfaces::ids::IdGenerator;
use crate::interfaces::store::StoreClient;
use crate::providers::redis::RedisStore;
use crate::providers::snowflake::SnowflakeIdGenerator;
use crate::services::dispatcher::Dispatcher;
use crate::services::group::GroupMessageService;
use crate::services::private::PrivateMessageService;

pub struct ChatEngineFactory;

impl ChatEngineFactory {
    /// Connects to Redis and wires the default handlers.
    pub async fn create_from_config(config: &Config) -> Result<Dispatcher> {
        config.validate()?;
        let store = RedisStore::connect(
            &config.redis.url,
            config.redis.password.as_deref(),
            config.request_timeout(),
        )
        .await?;
        let ids = SnowflakeIdGenerator::new(config.snowflake.node_id)?;
        Ok(Self::create_with(
            Arc::new(store),
            Arc::new(ids),
            Arc::new(SystemClock),
            config.max_page_size,
        ))
    }

    pub fn create_with(
        store: Arc<dyn StoreClient>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        max_page_size: usize,
    ) -> Dispatcher {
        let private = Arc::new(PrivateMessageService::new(
            store.clone(),
            ids.clone(),
            clock.clone(),
            max_page_size,
        ));
        let group = Arc::new(GroupMessageService::new(store, ids, clock, max_page_size));
        Dispatcher::with_default_handlers(private, group)
    }
}
