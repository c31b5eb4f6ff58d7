use std::sync::Arc;

use futures::future::try_join_all;

use crate::codec::Payload;
use crate::domains::message::{MessageStatus, PrivateMessage, FIELD_STATUS};
use crate::domains::requests::{
    require_non_blank, PageRange, PrivateHistoryRequest, PrivateSendRequest, PrivateUnreadRequest,
};
use crate::error::{RedChatError, Result};
use crate::interfaces::clock::Clock;
use crate::interfaces::ids::IdGenerator;
use crate::interfaces::store::{Procedure, StoreClient};
use crate::keys;
use crate::services::send_args;

/// One-to-one conversations: send, paged history and the unread drain.
pub struct PrivateMessageService {
    store: Arc<dyn StoreClient>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    max_page_size: usize,
}

impl PrivateMessageService {
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

    /// Stores a new unread message from `caller_id`. Both participants' all
    /// indexes, the recipient's unread index and the body are written by one
    /// atomic procedure.
    pub async fn send(&self, caller_id: &str, request: PrivateSendRequest) -> Result<PrivateMessage> {
        let shape = PrivateSendRequest::SHAPE;
        require_non_blank(shape, "toUserId", &request.to_user_id)?;
        if request.content.is_empty() {
            return Err(RedChatError::decode(shape, "content must not be empty"));
        }

        let millis = self.clock.now_millis();
        let message = PrivateMessage {
            id: self.ids.next_id(),
            sender_id: caller_id.to_string(),
            to_user_id: request.to_user_id,
            content: request.content,
            status: MessageStatus::Unread,
            time: millis.div_euclid(1000),
        };

        let keys = vec![
            keys::private_all(&message.sender_id, &message.to_user_id),
            keys::private_all(&message.to_user_id, &message.sender_id),
            keys::private_unread(&message.to_user_id, &message.sender_id),
            keys::private_message(&message.id),
        ];
        let args = send_args(millis, &message.id, message.to_fields());
        self.store
            .run_atomic(Procedure::PrivateSend, &keys, &args)
            .await?;

        tracing::debug!(
            id = %message.id,
            sender = %message.sender_id,
            recipient = %message.to_user_id,
            "private message stored"
        );
        Ok(message)
    }

    /// One page of the conversation with `target_user_id`, newest first.
    pub async fn history(
        &self,
        caller_id: &str,
        request: PrivateHistoryRequest,
    ) -> Result<Vec<PrivateMessage>> {
        let shape = PrivateHistoryRequest::SHAPE;
        require_non_blank(shape, "targetUserId", &request.target_user_id)?;
        let Some(range) =
            PageRange::new(shape, request.page_num, request.page_size, self.max_page_size)?
        else {
            return Ok(Vec::new());
        };

        let index = keys::private_all(caller_id, &request.target_user_id);
        let ids = self.store.zrevrange(&index, range.start, range.stop).await?;
        try_join_all(ids.iter().map(|id| self.load(keys::private_message(id)))).await
    }

    /// Returns every message `target_user_id` sent that the caller has not
    /// fetched yet, marks them read and empties the unread index, atomically.
    pub async fn unread(
        &self,
        caller_id: &str,
        request: PrivateUnreadRequest,
    ) -> Result<Vec<PrivateMessage>> {
        require_non_blank(
            PrivateUnreadRequest::SHAPE,
            "targetUserId",
            &request.target_user_id,
        )?;

        let keys = vec![keys::private_unread(caller_id, &request.target_user_id)];
        let mut args = vec![
            FIELD_STATUS.to_string(),
            MessageStatus::Read.as_field().to_string(),
        ];
        args.extend(PrivateMessage::REQUIRED_FIELDS.iter().map(|f| f.to_string()));
        let records = self
            .store
            .run_atomic(Procedure::UnreadDrain, &keys, &args)
            .await?
            .into_records();

        let messages = records
            .iter()
            .map(|record| PrivateMessage::from_fields(&record.key, &record.fields))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(
            recipient = caller_id,
            sender = %request.target_user_id,
            drained = messages.len(),
            "unread messages drained"
        );
        Ok(messages)
    }

    async fn load(&self, key: String) -> Result<PrivateMessage> {
        let fields = self.store.hgetall(&key).await?;
        PrivateMessage::from_fields(&key, &fields)
    }
}
