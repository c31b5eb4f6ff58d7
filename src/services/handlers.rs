use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::codec::{decode_payload, to_data};
use crate::domains::envelope::{success_data, MessageType};
use crate::domains::requests::{
    GroupHistoryRequest, GroupSendRequest, PrivateHistoryRequest, PrivateSendRequest,
    PrivateUnreadRequest,
};
use crate::error::Result;
use crate::interfaces::handlers::MessageHandler;
use crate::services::group::GroupMessageService;
use crate::services::private::PrivateMessageService;

pub struct PrivateSendHandler {
    service: Arc<PrivateMessageService>,
}

impl PrivateSendHandler {
    pub fn new(service: Arc<PrivateMessageService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl MessageHandler for PrivateSendHandler {
    fn message_type(&self) -> i64 {
        MessageType::PrivateSend.code()
    }

    fn name(&self) -> &str {
        MessageType::PrivateSend.name()
    }

    async fn handle(&self, caller_id: &str, data: &Value) -> Result<Value> {
        let request: PrivateSendRequest = decode_payload(data)?;
        self.service.send(caller_id, request).await?;
        Ok(success_data())
    }
}

pub struct PrivateHistoryHandler {
    service: Arc<PrivateMessageService>,
}

impl PrivateHistoryHandler {
    pub fn new(service: Arc<PrivateMessageService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl MessageHandler for PrivateHistoryHandler {
    fn message_type(&self) -> i64 {
        MessageType::PrivateHistory.code()
    }

    fn name(&self) -> &str {
        MessageType::PrivateHistory.name()
    }

    async fn handle(&self, caller_id: &str, data: &Value) -> Result<Value> {
        let request: PrivateHistoryRequest = decode_payload(data)?;
        to_data(&self.service.history(caller_id, request).await?)
    }
}

pub struct PrivateUnreadHandler {
    service: Arc<PrivateMessageService>,
}

impl PrivateUnreadHandler {
    pub fn new(service: Arc<PrivateMessageService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl MessageHandler for PrivateUnreadHandler {
    fn message_type(&self) -> i64 {
        MessageType::PrivateUnread.code()
    }

    fn name(&self) -> &str {
        MessageType::PrivateUnread.name()
    }

    async fn handle(&self, caller_id: &str, data: &Value) -> Result<Value> {
        let request: PrivateUnreadRequest = decode_payload(data)?;
        to_data(&self.service.unread(caller_id, request).await?)
    }
}

pub struct GroupSendHandler {
    service: Arc<GroupMessageService>,
}

impl GroupSendHandler {
    pub fn new(service: Arc<GroupMessageService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl MessageHandler for GroupSendHandler {
    fn message_type(&self) -> i64 {
        MessageType::GroupSend.code()
    }

    fn name(&self) -> &str {
        MessageType::GroupSend.name()
    }

    async fn handle(&self, caller_id: &str, data: &Value) -> Result<Value> {
        let request: GroupSendRequest = decode_payload(data)?;
        self.service.send(caller_id, request).await?;
        Ok(success_data())
    }
}

pub struct GroupHistoryHandler {
    service: Arc<GroupMessageService>,
}

impl GroupHistoryHandler {
    pub fn new(service: Arc<GroupMessageService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl MessageHandler for GroupHistoryHandler {
    fn message_type(&self) -> i64 {
        MessageType::GroupHistory.code()
    }

    fn name(&self) -> &str {
        MessageType::GroupHistory.name()
    }

    async fn handle(&self, caller_id: &str, data: &Value) -> Result<Value> {
        let request: GroupHistoryRequest = decode_payload(data)?;
        to_data(&self.service.history(caller_id, request).await?)
    }
}

/// The five built-in handlers, one per [`MessageType`].
pub fn default_handlers(
    private: Arc<PrivateMessageService>,
    group: Arc<GroupMessageService>,
) -> Vec<Arc<dyn MessageHandler>> {
    vec![
        Arc::new(PrivateSendHandler::new(private.clone())),
        Arc::new(PrivateHistoryHandler::new(private.clone())),
        Arc::new(PrivateUnreadHandler::new(private)),
        Arc::new(GroupSendHandler::new(group.clone())),
        Arc::new(GroupHistoryHandler::new(group)),
    ]
}
