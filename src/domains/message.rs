use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{RedChatError, Result};

pub const FIELD_ID: &str = "Id";
pub const FIELD_SENDER: &str = "UserId";
pub const FIELD_RECIPIENT: &str = "ToUserID";
pub const FIELD_GROUP: &str = "GroupId";
pub const FIELD_CONTENT: &str = "Content";
pub const FIELD_STATUS: &str = "Status";
pub const FIELD_TIME: &str = "Time";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum MessageStatus {
    Unread,
    Read,
}

impl MessageStatus {
    pub fn as_field(self) -> &'static str {
        match self {
            Self::Unread => "0",
            Self::Read => "1",
        }
    }

    pub fn from_field(value: &str) -> Option<Self> {
        match value {
            "0" => Some(Self::Unread),
            "1" => Some(Self::Read),
            _ => None,
        }
    }
}

impl From<MessageStatus> for u8 {
    fn from(status: MessageStatus) -> Self {
        match status {
            MessageStatus::Unread => 0,
            MessageStatus::Read => 1,
        }
    }
}

impl TryFrom<u8> for MessageStatus {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unread),
            1 => Ok(Self::Read),
            other => Err(format!("invalid message status {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateMessage {
    pub id: String,
    pub sender_id: String,
    pub to_user_id: String,
    pub content: String,
    pub status: MessageStatus,
    pub time: i64,
}

impl PrivateMessage {
    /// Fields every stored private message hash carries.
    pub const REQUIRED_FIELDS: [&'static str; 6] = [
        FIELD_ID,
        FIELD_SENDER,
        FIELD_RECIPIENT,
        FIELD_CONTENT,
        FIELD_STATUS,
        FIELD_TIME,
    ];

    /// Hash layout written under the message id.
    pub fn to_fields(&self) -> Vec<(String, String)> {
        vec![
            (FIELD_ID.to_string(), self.id.clone()),
            (FIELD_SENDER.to_string(), self.sender_id.clone()),
            (FIELD_RECIPIENT.to_string(), self.to_user_id.clone()),
            (FIELD_CONTENT.to_string(), self.content.clone()),
            (FIELD_STATUS.to_string(), self.status.as_field().to_string()),
            (FIELD_TIME.to_string(), self.time.to_string()),
        ]
    }

    pub fn from_fields(key: &str, fields: &HashMap<String, String>) -> Result<Self> {
        let status = required(key, fields, FIELD_STATUS)?;
        let status = MessageStatus::from_field(status)
            .ok_or_else(|| RedChatError::corrupt(key, FIELD_STATUS))?;
        Ok(Self {
            id: required(key, fields, FIELD_ID)?.to_string(),
            sender_id: required(key, fields, FIELD_SENDER)?.to_string(),
            to_user_id: required(key, fields, FIELD_RECIPIENT)?.to_string(),
            content: required(key, fields, FIELD_CONTENT)?.to_string(),
            status,
            time: parse_time(key, fields)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMessage {
    pub id: String,
    pub group_id: String,
    pub sender_id: String,
    pub content: String,
    pub time: i64,
}

impl GroupMessage {
    pub fn to_fields(&self) -> Vec<(String, String)> {
        vec![
            (FIELD_ID.to_string(), self.id.clone()),
            (FIELD_GROUP.to_string(), self.group_id.clone()),
            (FIELD_SENDER.to_string(), self.sender_id.clone()),
            (FIELD_CONTENT.to_string(), self.content.clone()),
            (FIELD_TIME.to_string(), self.time.to_string()),
        ]
    }

    pub fn from_fields(key: &str, fields: &HashMap<String, String>) -> Result<Self> {
        Ok(Self {
            id: required(key, fields, FIELD_ID)?.to_string(),
            group_id: required(key, fields, FIELD_GROUP)?.to_string(),
            sender_id: required(key, fields, FIELD_SENDER)?.to_string(),
            content: required(key, fields, FIELD_CONTENT)?.to_string(),
            time: parse_time(key, fields)?,
        })
    }
}

fn required<'a>(key: &str, fields: &'a HashMap<String, String>, field: &str) -> Result<&'a str> {
    fields
        .get(field)
        .map(String::as_str)
        .ok_or_else(|| RedChatError::corrupt(key, field))
}

fn parse_time(key: &str, fields: &HashMap<String, String>) -> Result<i64> {
    required(key, fields, FIELD_TIME)?
        .parse::<i64>()
        .map_err(|_| RedChatError::corrupt(key, FIELD_TIME))
}
