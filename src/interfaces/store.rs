use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{RedChatError, Result};

/// Fixed multi-key procedures the store applies as one indivisible unit.
///
/// Key and argument layouts:
///
/// * `PrivateSend`: keys `[all(sender, recipient), all(recipient, sender),
///   unread(recipient, sender), message_key]`, args `[score, member, field, value, ...]`.
/// * `UnreadDrain`: keys `[unread(caller, target)]`, args
///   `[status_field, read_value, required_field, ...]`. Replies with every
///   drained record, newest first, after the status flip. If any indexed
///   message lacks one of the required fields, nothing is changed and the
///   call fails with [`RedChatError::CorruptRecord`].
/// * `GroupSend`: keys `[group_index, group_message_key]`, args `[score, member, field, value, ...]`.
///
/// `member` is the message id added to the ordered indexes; `message_key` is
/// the hash written with the field/value pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Procedure {
    PrivateSend,
    UnreadDrain,
    GroupSend,
}

impl Procedure {
    pub fn name(self) -> &'static str {
        match self {
            Self::PrivateSend => "private_send",
            Self::UnreadDrain => "unread_drain",
            Self::GroupSend => "group_send",
        }
    }

    pub fn key_count(self) -> usize {
        match self {
            Self::PrivateSend => 4,
            Self::UnreadDrain => 1,
            Self::GroupSend => 2,
        }
    }

    /// Rejects invocations whose keys or args do not match the layout.
    pub fn check_layout(self, keys: &[String], args: &[String]) -> Result<()> {
        if keys.len() != self.key_count() {
            return Err(RedChatError::Store(format!(
                "{} expects {} keys, got {}",
                self.name(),
                self.key_count(),
                keys.len()
            )));
        }
        let args_ok = match self {
            Self::UnreadDrain => args.len() >= 2,
            Self::PrivateSend | Self::GroupSend => args.len() >= 4 && args.len() % 2 == 0,
        };
        if !args_ok {
            return Err(RedChatError::Store(format!(
                "{} got malformed arguments ({} values)",
                self.name(),
                args.len()
            )));
        }
        Ok(())
    }
}

/// Ordered-index score for a message sent at `millis`: seconds, with the
/// milliseconds kept as the fraction.
pub fn score_arg(millis: i64) -> String {
    format!("{}.{:03}", millis.div_euclid(1000), millis.rem_euclid(1000))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub key: String,
    pub fields: HashMap<String, String>,
}

impl StoredRecord {
    /// Decodes `[key, field, value, field, value, ...]` as produced by the
    /// drain procedure.
    pub fn from_flat(flat: Vec<String>) -> Result<Self> {
        let mut items = flat.into_iter();
        let key = items
            .next()
            .ok_or_else(|| RedChatError::Store("empty record in reply".to_string()))?;
        let rest: Vec<String> = items.collect();
        if rest.len() % 2 != 0 {
            return Err(RedChatError::Store(format!(
                "record {key} has an odd number of field values"
            )));
        }
        let mut fields = HashMap::with_capacity(rest.len() / 2);
        let mut pairs = rest.into_iter();
        while let (Some(field), Some(value)) = (pairs.next(), pairs.next()) {
            fields.insert(field, value);
        }
        Ok(Self { key, fields })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomicReply {
    Applied,
    Records(Vec<StoredRecord>),
}

impl AtomicReply {
    pub fn into_records(self) -> Vec<StoredRecord> {
        match self {
            Self::Applied => Vec::new(),
            Self::Records(records) => records,
        }
    }
}

/// Key-value store client shared by every messaging component.
///
/// Every call is a suspension point and may fail with [`RedChatError::Store`].
#[async_trait]
pub trait StoreClient: Send + Sync {
    async fn zadd(&self, key: &str, score: f64, member: &str) -> Result<()>;

    /// Members ranked `start..=stop` by descending score. Negative indexes
    /// count from the end, as in Redis.
    async fn zrevrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>>;

    async fn hset(&self, key: &str, fields: &[(String, String)]) -> Result<()>;

    /// Empty map when the key does not exist.
    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>>;

    async fn del(&self, keys: &[String]) -> Result<()>;

    async fn run_atomic(
        &self,
        procedure: Procedure,
        keys: &[String],
        args: &[String],
    ) -> Result<AtomicReply>;
}
