use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::factories::engine_factory::ChatEngineFactory;
use crate::interfaces::clock::{Clock, SystemClock};
use crate::interfaces::handlers::MessageHandler;
use crate::interfaces::ids::IdGenerator;
use crate::interfaces::store::StoreClient;
use crate::services::dispatcher::Dispatcher;

/// Entry point for the transport: one `handle` call per inbound envelope.
pub struct ChatEngine {
    dispatcher: Dispatcher,
}

impl ChatEngine {
    pub async fn from_config(config: &Config) -> Result<Self> {
        let dispatcher = ChatEngineFactory::create_from_config(config).await?;
        Ok(Self { dispatcher })
    }

    pub fn new(store: Arc<dyn StoreClient>, ids: Arc<dyn IdGenerator>, max_page_size: usize) -> Self {
        Self::with_clock(store, ids, Arc::new(SystemClock), max_page_size)
    }

    pub fn with_clock(
        store: Arc<dyn StoreClient>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        max_page_size: usize,
    ) -> Self {
        Self {
            dispatcher: ChatEngineFactory::create_with(store, ids, clock, max_page_size),
        }
    }

    /// Adds a handler for a new message type. Returns `false` if the type
    /// code is already served.
    pub fn register_handler(&mut self, handler: Arc<dyn MessageHandler>) -> bool {
        self.dispatcher.register(handler)
    }

    pub async fn handle(&self, caller_id: &str, envelope: &[u8]) -> Vec<u8> {
        self.dispatcher.handle(caller_id, envelope).await
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}
