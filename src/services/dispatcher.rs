use std::collections::HashMap;
use std::sync::Arc;

use crate::codec::{self, decode_envelope, recover_type};
use crate::domains::envelope::Envelope;
use crate::error::RedChatError;
use crate::interfaces::handlers::MessageHandler;
use crate::services::group::GroupMessageService;
use crate::services::handlers::default_handlers;
use crate::services::private::PrivateMessageService;
use crate::services::reporter::ErrorReporter;

/// Routes decoded envelopes to the handler registered for their type code.
///
/// Holds no per-call state; one instance serves every connection.
pub struct Dispatcher {
    handlers: HashMap<i64, Arc<dyn MessageHandler>>,
    reporter: ErrorReporter,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            reporter: ErrorReporter::new(),
        }
    }

    pub fn with_default_handlers(
        private: Arc<PrivateMessageService>,
        group: Arc<GroupMessageService>,
    ) -> Self {
        let mut dispatcher = Self::new();
        for handler in default_handlers(private, group) {
            dispatcher.register(handler);
        }
        dispatcher
    }

    /// Adds a handler for its type code. Returns `false` if the code is taken.
    pub fn register(&mut self, handler: Arc<dyn MessageHandler>) -> bool {
        let code = handler.message_type();
        if self.handlers.contains_key(&code) {
            tracing::warn!(code, name = handler.name(), "handler already registered");
            return false;
        }
        self.handlers.insert(code, handler);
        true
    }

    pub fn registered_types(&self) -> Vec<i64> {
        let mut codes: Vec<i64> = self.handlers.keys().copied().collect();
        codes.sort_unstable();
        codes
    }

    /// Handles one raw inbound envelope for `caller_id` and returns the raw
    /// reply. Failures come back as the generic error envelope.
    pub async fn handle(&self, caller_id: &str, bytes: &[u8]) -> Vec<u8> {
        let envelope = match decode_envelope(bytes) {
            Ok(envelope) => envelope,
            Err(err) => return self.reporter.report("decode_envelope", recover_type(bytes), &err),
        };

        let Some(handler) = self.handlers.get(&envelope.kind) else {
            return self.reporter.report(
                "dispatch",
                envelope.kind,
                &RedChatError::UnknownType(envelope.kind),
            );
        };

        match handler.handle(caller_id, &envelope.data).await {
            Ok(data) => {
                tracing::debug!(caller_id, operation = handler.name(), "chat request handled");
                codec::encode(&Envelope::new(envelope.kind, data))
            }
            Err(err) => self.reporter.report(handler.name(), envelope.kind, &err),
        }
    }
}
