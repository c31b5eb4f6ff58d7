use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, FromRedisValue, IntoConnectionInfo, RedisResult, Script};

use crate::error::{RedChatError, Result};
use crate::interfaces::store::{AtomicReply, Procedure, StoreClient, StoredRecord};

const PRIVATE_SEND_LUA: &str = r#"
for i = 1, 3 do
    local t = redis.call("TYPE", KEYS[i]).ok
    if t ~= "none" and t ~= "zset" then
        return redis.error_reply("WRONGTYPE " .. KEYS[i] .. " holds a " .. t)
    end
end
local t = redis.call("TYPE", KEYS[4]).ok
if t ~= "none" and t ~= "hash" then
    return redis.error_reply("WRONGTYPE " .. KEYS[4] .. " holds a " .. t)
end
redis.call("ZADD", KEYS[1], ARGV[1], ARGV[2])
redis.call("ZADD", KEYS[2], ARGV[1], ARGV[2])
redis.call("ZADD", KEYS[3], ARGV[1], ARGV[2])
redis.call("HSET", KEYS[4], unpack(ARGV, 3))
return 1
"#;

const GROUP_SEND_LUA: &str = r#"
local t = redis.call("TYPE", KEYS[1]).ok
if t ~= "none" and t ~= "zset" then
    return redis.error_reply("WRONGTYPE " .. KEYS[1] .. " holds a " .. t)
end
t = redis.call("TYPE", KEYS[2]).ok
if t ~= "none" and t ~= "hash" then
    return redis.error_reply("WRONGTYPE " .. KEYS[2] .. " holds a " .. t)
end
redis.call("ZADD", KEYS[1], ARGV[1], ARGV[2])
redis.call("HSET", KEYS[2], unpack(ARGV, 3))
return 1
"#;

const UNREAD_DRAIN_LUA: &str = r#"
local ids = redis.call("ZREVRANGE", KEYS[1], 0, -1)
for _, id in ipairs(ids) do
    local t = redis.call("TYPE", id).ok
    if t ~= "none" and t ~= "hash" then
        return redis.error_reply("WRONGTYPE " .. id .. " holds a " .. t)
    end
    for j = 3, #ARGV do
        if redis.call("HEXISTS", id, ARGV[j]) == 0 then
            return redis.error_reply("CORRUPT " .. id .. " " .. ARGV[j])
        end
    end
end
local out = {}
for i, id in ipairs(ids) do
    if redis.call("EXISTS", id) == 1 then
        redis.call("HSET", id, ARGV[1], ARGV[2])
    end
    local record = { id }
    for _, v in ipairs(redis.call("HGETALL", id)) do
        record[#record + 1] = v
    end
    out[i] = record
end
redis.call("DEL", KEYS[1])
return out
"#;

static PRIVATE_SEND_SCRIPT: Lazy<Script> = Lazy::new(|| Script::new(PRIVATE_SEND_LUA));
static GROUP_SEND_SCRIPT: Lazy<Script> = Lazy::new(|| Script::new(GROUP_SEND_LUA));
static UNREAD_DRAIN_SCRIPT: Lazy<Script> = Lazy::new(|| Script::new(UNREAD_DRAIN_LUA));

fn script_for(procedure: Procedure) -> &'static Script {
    match procedure {
        Procedure::PrivateSend => &PRIVATE_SEND_SCRIPT,
        Procedure::GroupSend => &GROUP_SEND_SCRIPT,
        Procedure::UnreadDrain => &UNREAD_DRAIN_SCRIPT,
    }
}

/// Error code the drain script replies with when an indexed message is
/// missing a required field. The detail is `<key> <field>`.
const CORRUPT_CODE: &str = "CORRUPT";

fn store_err(e: redis::RedisError) -> RedChatError {
    if e.code() == Some(CORRUPT_CODE) {
        if let Some((key, field)) = e.detail().and_then(|d| d.trim().rsplit_once(' ')) {
            return RedChatError::corrupt(key, field);
        }
    }
    RedChatError::Store(e.to_string())
}

/// Decodes the drain reply: one flat `[key, field, value, ...]` list per record.
pub fn decode_drain_reply(reply: Vec<Vec<String>>) -> Result<Vec<StoredRecord>> {
    reply.into_iter().map(StoredRecord::from_flat).collect()
}

/// Redis-backed store. The multiplexed connection is shared by all callers;
/// every command runs under `timeout`.
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
    timeout: Duration,
}

impl RedisStore {
    pub async fn connect(url: &str, password: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut info = url.into_connection_info().map_err(store_err)?;
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            info.redis.password = Some(password.to_string());
        }
        let client = redis::Client::open(info).map_err(store_err)?;
        let conn = tokio::time::timeout(timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| RedChatError::Store(format!("timeout connecting to {url}")))?
            .map_err(store_err)?;
        let store = Self { conn, timeout };
        store.ping().await?;
        tracing::info!(url, "connected to redis");
        Ok(store)
    }

    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = self
            .deadline("PING", async move { redis::cmd("PING").query_async(&mut conn).await })
            .await?;
        Ok(())
    }

    async fn deadline<T, F>(&self, op: &str, fut: F) -> Result<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(store_err),
            Err(_) => Err(RedChatError::Store(format!(
                "timeout after {}ms running {op}",
                self.timeout.as_millis()
            ))),
        }
    }

    async fn invoke<T: FromRedisValue + Send>(
        &self,
        procedure: Procedure,
        keys: &[String],
        args: &[String],
    ) -> Result<T> {
        let mut invocation = script_for(procedure).prepare_invoke();
        for key in keys {
            invocation.key(key);
        }
        for arg in args {
            invocation.arg(arg);
        }
        let mut conn = self.conn.clone();
        self.deadline(procedure.name(), async move {
            invocation.invoke_async::<_, T>(&mut conn).await
        })
        .await
    }
}

#[async_trait]
impl StoreClient for RedisStore {
    async fn zadd(&self, key: &str, score: f64, member: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        self.deadline("ZADD", async move { conn.zadd(key, member, score).await })
            .await
    }

    async fn zrevrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        self.deadline("ZREVRANGE", async move { conn.zrevrange(key, start, stop).await })
            .await
    }

    async fn hset(&self, key: &str, fields: &[(String, String)]) -> Result<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        self.deadline("HSET", async move { conn.hset_multiple(key, fields).await })
            .await
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        let mut conn = self.conn.clone();
        self.deadline("HGETALL", async move { conn.hgetall(key).await })
            .await
    }

    async fn del(&self, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        self.deadline("DEL", async move { conn.del(keys).await })
            .await
    }

    async fn run_atomic(
        &self,
        procedure: Procedure,
        keys: &[String],
        args: &[String],
    ) -> Result<AtomicReply> {
        procedure.check_layout(keys, args)?;
        match procedure {
            Procedure::PrivateSend | Procedure::GroupSend => {
                let _: i64 = self.invoke(procedure, keys, args).await?;
                Ok(AtomicReply::Applied)
            }
            Procedure::UnreadDrain => {
                let reply: Vec<Vec<String>> = self.invoke(procedure, keys, args).await?;
                Ok(AtomicReply::Records(decode_drain_reply(reply)?))
            }
        }
    }
}
