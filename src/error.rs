use thiserror::Error;

#[derive(Debug, Error)]
pub enum RedChatError {
    #[error("failed to decode {shape}: {reason}")]
    Decode { shape: &'static str, reason: String },
    #[error("unknown message type: {0}")]
    UnknownType(i64),
    #[error("store error: {0}")]
    Store(String),
    #[error("corrupt record {key}: missing field {field}")]
    CorruptRecord { key: String, field: String },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl RedChatError {
    pub fn decode(shape: &'static str, reason: impl Into<String>) -> Self {
        Self::Decode {
            shape,
            reason: reason.into(),
        }
    }

    pub fn corrupt(key: impl Into<String>, field: impl Into<String>) -> Self {
        Self::CorruptRecord {
            key: key.into(),
            field: field.into(),
        }
    }

    /// Short stable label used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "decode",
            Self::UnknownType(_) => "unknown_type",
            Self::Store(_) => "store",
            Self::CorruptRecord { .. } => "corrupt_record",
            Self::Config(_) => "config",
            Self::Runtime(_) => "runtime",
        }
    }
}

pub type Result<T> = std::result::Result<T, RedChatError>;
