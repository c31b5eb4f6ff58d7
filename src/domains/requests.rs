use serde::Deserialize;

use crate::codec::Payload;
use crate::error::{RedChatError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateSendRequest {
    pub to_user_id: String,
    pub content: String,
}

impl Payload for PrivateSendRequest {
    const SHAPE: &'static str = "PrivateSendRequest";
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateHistoryRequest {
    pub target_user_id: String,
    pub page_num: i64,
    pub page_size: i64,
}

impl Payload for PrivateHistoryRequest {
    const SHAPE: &'static str = "PrivateHistoryRequest";
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateUnreadRequest {
    pub target_user_id: String,
}

impl Payload for PrivateUnreadRequest {
    const SHAPE: &'static str = "PrivateUnreadRequest";
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSendRequest {
    pub group_id: String,
    pub content: String,
}

impl Payload for GroupSendRequest {
    const SHAPE: &'static str = "GroupSendRequest";
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupHistoryRequest {
    pub group_id: String,
    pub page_num: i64,
    pub page_size: i64,
}

impl Payload for GroupHistoryRequest {
    const SHAPE: &'static str = "GroupHistoryRequest";
}

/// Inclusive `[start, stop]` rank range of one history page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: isize,
    pub stop: isize,
}

impl PageRange {
    /// Validates the paging fields. `Ok(None)` means the page starts beyond
    /// any addressable rank and is therefore empty.
    pub fn new(
        shape: &'static str,
        page_num: i64,
        page_size: i64,
        max_page_size: usize,
    ) -> Result<Option<Self>> {
        if page_num < 1 {
            return Err(RedChatError::decode(shape, "pageNum must be at least 1"));
        }
        if page_size < 1 || page_size as u64 > max_page_size as u64 {
            return Err(RedChatError::decode(
                shape,
                format!("pageSize must be between 1 and {max_page_size}"),
            ));
        }
        let Some(start) = (page_num - 1)
            .checked_mul(page_size)
            .and_then(|v| isize::try_from(v).ok())
        else {
            return Ok(None);
        };
        let stop = start.saturating_add(page_size as isize - 1);
        Ok(Some(Self { start, stop }))
    }
}

pub(crate) fn require_non_blank(shape: &'static str, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RedChatError::decode(shape, format!("{field} must not be blank")));
    }
    Ok(())
}
