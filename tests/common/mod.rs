#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use redchat::error::{RedChatError, Result};
use redchat::interfaces::clock::Clock;
use redchat::interfaces::ids::IdGenerator;
use redchat::interfaces::store::{AtomicReply, Procedure, StoreClient};
use redchat::providers::memory::InMemoryStore;
use redchat::ChatEngine;

pub const T0: i64 = 1_700_000_000_000;

pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    pub fn advance(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Zero-padded counter ids, so string order follows issue order.
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        format!("{:019}", self.next.fetch_add(1, Ordering::SeqCst))
    }
}

/// Every call fails as if the store were unreachable.
pub struct UnreachableStore;

fn unreachable() -> RedChatError {
    RedChatError::Store("connection refused".to_string())
}

#[async_trait]
impl StoreClient for UnreachableStore {
    async fn zadd(&self, _key: &str, _score: f64, _member: &str) -> Result<()> {
        Err(unreachable())
    }

    async fn zrevrange(&self, _key: &str, _start: isize, _stop: isize) -> Result<Vec<String>> {
        Err(unreachable())
    }

    async fn hset(&self, _key: &str, _fields: &[(String, String)]) -> Result<()> {
        Err(unreachable())
    }

    async fn hgetall(&self, _key: &str) -> Result<HashMap<String, String>> {
        Err(unreachable())
    }

    async fn del(&self, _keys: &[String]) -> Result<()> {
        Err(unreachable())
    }

    async fn run_atomic(
        &self,
        _procedure: Procedure,
        _keys: &[String],
        _args: &[String],
    ) -> Result<AtomicReply> {
        Err(unreachable())
    }
}

/// Delegates to an in-memory store after sleeping on every procedure.
pub struct SlowStore {
    pub inner: InMemoryStore,
    pub delay: Duration,
}

#[async_trait]
impl StoreClient for SlowStore {
    async fn zadd(&self, key: &str, score: f64, member: &str) -> Result<()> {
        self.inner.zadd(key, score, member).await
    }

    async fn zrevrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        self.inner.zrevrange(key, start, stop).await
    }

    async fn hset(&self, key: &str, fields: &[(String, String)]) -> Result<()> {
        self.inner.hset(key, fields).await
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        self.inner.hgetall(key).await
    }

    async fn del(&self, keys: &[String]) -> Result<()> {
        self.inner.del(keys).await
    }

    async fn run_atomic(
        &self,
        procedure: Procedure,
        keys: &[String],
        args: &[String],
    ) -> Result<AtomicReply> {
        tokio::time::sleep(self.delay).await;
        self.inner.run_atomic(procedure, keys, args).await
    }
}

pub struct Harness {
    pub engine: ChatEngine,
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::new(T0));
        let engine = ChatEngine::with_clock(
            store.clone(),
            Arc::new(SequentialIds::new()),
            clock.clone(),
            100,
        );
        Self {
            engine,
            store,
            clock,
        }
    }

    pub async fn call(&self, caller: &str, envelope: Value) -> Value {
        let reply = self
            .engine
            .handle(caller, envelope.to_string().as_bytes())
            .await;
        serde_json::from_slice(&reply).unwrap()
    }

    pub async fn send_private(&self, from: &str, to: &str, content: &str) -> Value {
        self.call(
            from,
            json!({"type": 0, "data": {"toUserId": to, "content": content}}),
        )
        .await
    }
}

pub fn internal_error(kind: i64) -> Value {
    json!({"type": kind, "data": "internal server error"})
}
