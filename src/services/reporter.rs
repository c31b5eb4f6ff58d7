use crate::codec;
use crate::domains::envelope::Envelope;
use crate::error::RedChatError;

/// Logs a failed call with full detail and produces the generic error
/// envelope returned to the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report(&self, operation: &str, msg_type: i64, err: &RedChatError) -> Vec<u8> {
        let kind = err.kind();
        match err {
            RedChatError::Decode { .. } | RedChatError::UnknownType(_) => {
                tracing::warn!(operation, msg_type, kind, error = %err, "rejected chat request");
            }
            RedChatError::CorruptRecord { .. } => {
                tracing::error!(
                    operation,
                    msg_type,
                    kind,
                    integrity = true,
                    error = %err,
                    "corrupt message record"
                );
            }
            _ => {
                tracing::error!(operation, msg_type, kind, error = %err, "chat request failed");
            }
        }
        codec::encode(&Envelope::internal_error(msg_type))
    }
}
