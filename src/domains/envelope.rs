use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type code carried by error envelopes when not even `type` could be parsed.
pub const UNKNOWN_TYPE: i64 = -1;

pub const SUCCESS_DATA: &str = "success";
pub const INTERNAL_ERROR_DATA: &str = "internal server error";

/// `data` of every successful send reply.
pub fn success_data() -> Value {
    Value::String(SUCCESS_DATA.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    PrivateSend,
    PrivateHistory,
    PrivateUnread,
    GroupSend,
    GroupHistory,
}

impl MessageType {
    pub const ALL: [MessageType; 5] = [
        MessageType::PrivateSend,
        MessageType::PrivateHistory,
        MessageType::PrivateUnread,
        MessageType::GroupSend,
        MessageType::GroupHistory,
    ];

    pub const fn code(self) -> i64 {
        match self {
            Self::PrivateSend => 0,
            Self::PrivateHistory => 1,
            Self::PrivateUnread => 2,
            Self::GroupSend => 3,
            Self::GroupHistory => 4,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::PrivateSend => "private_send",
            Self::PrivateHistory => "private_history",
            Self::PrivateUnread => "private_unread",
            Self::GroupSend => "group_send",
            Self::GroupHistory => "group_history",
        }
    }
}

/// Outer wire wrapper. `data` stays opaque until the type is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: i64,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn new(kind: i64, data: Value) -> Self {
        Self { kind, data }
    }

    pub fn internal_error(kind: i64) -> Self {
        Self::new(kind, Value::String(INTERNAL_ERROR_DATA.to_string()))
    }

    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::from_code(self.kind)
    }
}
