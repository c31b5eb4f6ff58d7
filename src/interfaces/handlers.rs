use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// One entry of the dispatcher's type table.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Envelope `type` code this handler answers.
    fn message_type(&self) -> i64;

    /// Operation name used in logs.
    fn name(&self) -> &str;

    /// Decodes `data`, performs the operation for `caller_id` and returns the
    /// `data` of the success envelope.
    async fn handle(&self, caller_id: &str, data: &Value) -> Result<Value>;
}
