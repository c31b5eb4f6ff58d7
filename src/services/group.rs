use std::sync::Arc;

use futures::future::try_join_all;

use crate::codec::Payload;
use crate::domains::message::GroupMessage;
use crate::domains::requests::{require_non_blank, GroupHistoryRequest, GroupSendRequest, PageRange};
use crate::error::{RedChatError, Result};
use crate::interfaces::clock::Clock;
use crate::interfaces::ids::IdGenerator;
use crate::interfaces::store::{Procedure, StoreClient};
use crate::keys;
use crate::services::send_args;

/// Group conversations. Membership is checked upstream; there is no read tracking.
pub struct GroupMessageService {
    store: Arc<dyn StoreClient>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    max_page_size: usize,
}

impl GroupMessageService {
    pub fn new(
        store: Arc<dyn StoreClient>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        max_page_size: usize,
    ) -> Self {
        Self {
            store,
            ids,
            clock,
            max_page_size,
        }
    }

    pub async fn send(&self, caller_id: &str, request: GroupSendRequest) -> Result<GroupMessage> {
        let shape = GroupSendRequest::SHAPE;
        require_non_blank(shape, "groupId", &request.group_id)?;
        if request.content.is_empty() {
            return Err(RedChatError::decode(shape, "content must not be empty"));
        }

        let millis = self.clock.now_millis();
        let message = GroupMessage {
            id: self.ids.next_id(),
            group_id: request.group_id,
            sender_id: caller_id.to_string(),
            content: request.content,
            time: millis.div_euclid(1000),
        };

        let keys = vec![
            keys::group_index(&message.group_id),
            keys::group_message(&message.id),
        ];
        let args = send_args(millis, &message.id, message.to_fields());
        self.store.run_atomic(Procedure::GroupSend, &keys, &args).await?;

        tracing::debug!(
            id = %message.id,
            group = %message.group_id,
            sender = caller_id,
            "group message stored"
        );
        Ok(message)
    }

    pub async fn history(
        &self,
        _caller_id: &str,
        request: GroupHistoryRequest,
    ) -> Result<Vec<GroupMessage>> {
        let shape = GroupHistoryRequest::SHAPE;
        require_non_blank(shape, "groupId", &request.group_id)?;
        let Some(range) =
            PageRange::new(shape, request.page_num, request.page_size, self.max_page_size)?
        else {
            return Ok(Vec::new());
        };

        let ids = self
            .store
            .zrevrange(&keys::group_index(&request.group_id), range.start, range.stop)
            .await?;
        try_join_all(ids.iter().map(|id| self.load(keys::group_message(id)))).await
    }

    async fn load(&self, key: String) -> Result<GroupMessage> {
        let fields = self.store.hgetall(&key).await?;
        GroupMessage::from_fields(&key, &fields)
    }
}
