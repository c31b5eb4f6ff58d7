use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{RedChatError, Result};
use crate::interfaces::store::{AtomicReply, Procedure, StoreClient, StoredRecord};

#[derive(Debug, Clone)]
enum Entry {
    SortedSet(HashMap<String, f64>),
    Hash(HashMap<String, String>),
}

impl Entry {
    fn type_name(&self) -> &'static str {
        match self {
            Self::SortedSet(_) => "zset",
            Self::Hash(_) => "hash",
        }
    }
}

type Keyspace = HashMap<String, Entry>;

/// In-process store with Redis ordered-set and hash semantics.
///
/// Procedures run under the keyspace write lock, so they are indivisible with
/// respect to every other call on the same store.
#[derive(Default)]
pub struct InMemoryStore {
    data: RwLock<Keyspace>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    pub async fn exists(&self, key: &str) -> bool {
        self.data.read().await.contains_key(key)
    }

    pub async fn zcard(&self, key: &str) -> usize {
        match self.data.read().await.get(key) {
            Some(Entry::SortedSet(set)) => set.len(),
            _ => 0,
        }
    }

    pub async fn zscore(&self, key: &str, member: &str) -> Option<f64> {
        match self.data.read().await.get(key) {
            Some(Entry::SortedSet(set)) => set.get(member).copied(),
            _ => None,
        }
    }

    #[doc(hidden)]
    pub async fn key_count(&self) -> usize {
        self.data.read().await.len()
    }
}

fn wrong_type(key: &str, found: &Entry) -> RedChatError {
    RedChatError::Store(format!(
        "WRONGTYPE key {key} holds a {}",
        found.type_name()
    ))
}

fn expect_sorted_set(data: &Keyspace, key: &str) -> Result<()> {
    match data.get(key) {
        None | Some(Entry::SortedSet(_)) => Ok(()),
        Some(other) => Err(wrong_type(key, other)),
    }
}

fn expect_hash(data: &Keyspace, key: &str) -> Result<()> {
    match data.get(key) {
        None | Some(Entry::Hash(_)) => Ok(()),
        Some(other) => Err(wrong_type(key, other)),
    }
}

fn zadd_in(data: &mut Keyspace, key: &str, score: f64, member: &str) -> Result<()> {
    let entry = data
        .entry(key.to_string())
        .or_insert_with(|| Entry::SortedSet(HashMap::new()));
    match entry {
        Entry::SortedSet(set) => {
            set.insert(member.to_string(), score);
            Ok(())
        }
        other => Err(wrong_type(key, other)),
    }
}

fn hset_in(data: &mut Keyspace, key: &str, fields: &[(String, String)]) -> Result<()> {
    let entry = data
        .entry(key.to_string())
        .or_insert_with(|| Entry::Hash(HashMap::new()));
    match entry {
        Entry::Hash(hash) => {
            for (field, value) in fields {
                hash.insert(field.clone(), value.clone());
            }
            Ok(())
        }
        other => Err(wrong_type(key, other)),
    }
}

fn hgetall_in(data: &Keyspace, key: &str) -> Result<HashMap<String, String>> {
    match data.get(key) {
        None => Ok(HashMap::new()),
        Some(Entry::Hash(hash)) => Ok(hash.clone()),
        Some(other) => Err(wrong_type(key, other)),
    }
}

/// Descending by score, ties descending by member, then Redis index rules.
fn zrevrange_in(data: &Keyspace, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
    let set = match data.get(key) {
        None => return Ok(Vec::new()),
        Some(Entry::SortedSet(set)) => set,
        Some(other) => return Err(wrong_type(key, other)),
    };
    let mut ranked: Vec<(&String, f64)> = set.iter().map(|(m, s)| (m, *s)).collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.0.cmp(a.0))
    });

    let len = ranked.len() as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len {
        return Ok(Vec::new());
    }
    Ok(ranked[start as usize..=stop as usize]
        .iter()
        .map(|(member, _)| (*member).clone())
        .collect())
}

/// Splits `[score, member, field, value, ...]`.
fn send_args(args: &[String]) -> Result<(f64, &str, Vec<(String, String)>)> {
    let score = args[0]
        .parse::<f64>()
        .map_err(|_| RedChatError::Store(format!("invalid score {}", args[0])))?;
    let fields = args[2..]
        .chunks(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect();
    Ok((score, args[1].as_str(), fields))
}

fn private_send(data: &mut Keyspace, keys: &[String], args: &[String]) -> Result<AtomicReply> {
    let (score, member, fields) = send_args(args)?;
    for key in &keys[..3] {
        expect_sorted_set(data, key)?;
    }
    expect_hash(data, &keys[3])?;

    for key in &keys[..3] {
        zadd_in(data, key, score, member)?;
    }
    hset_in(data, &keys[3], &fields)?;
    Ok(AtomicReply::Applied)
}

fn group_send(data: &mut Keyspace, keys: &[String], args: &[String]) -> Result<AtomicReply> {
    let (score, member, fields) = send_args(args)?;
    expect_sorted_set(data, &keys[0])?;
    expect_hash(data, &keys[1])?;

    zadd_in(data, &keys[0], score, member)?;
    hset_in(data, &keys[1], &fields)?;
    Ok(AtomicReply::Applied)
}

fn unread_drain(data: &mut Keyspace, keys: &[String], args: &[String]) -> Result<AtomicReply> {
    let index = &keys[0];
    let ids = zrevrange_in(data, index, 0, -1)?;
    let required = &args[2..];
    for id in &ids {
        expect_hash(data, id)?;
        let fields = match data.get(id) {
            Some(Entry::Hash(hash)) => Some(hash),
            _ => None,
        };
        if let Some(missing) = required
            .iter()
            .find(|field| !fields.is_some_and(|hash| hash.contains_key(*field)))
        {
            return Err(RedChatError::corrupt(id.as_str(), missing.as_str()));
        }
    }

    let status = [(args[0].clone(), args[1].clone())];
    let mut records = Vec::with_capacity(ids.len());
    for id in ids {
        if data.contains_key(&id) {
            hset_in(data, &id, &status)?;
        }
        let fields = hgetall_in(data, &id)?;
        records.push(StoredRecord { key: id, fields });
    }
    data.remove(index);
    Ok(AtomicReply::Records(records))
}

#[async_trait]
impl StoreClient for InMemoryStore {
    async fn zadd(&self, key: &str, score: f64, member: &str) -> Result<()> {
        let mut guard = self.data.write().await;
        zadd_in(&mut guard, key, score, member)
    }

    async fn zrevrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let guard = self.data.read().await;
        zrevrange_in(&guard, key, start, stop)
    }

    async fn hset(&self, key: &str, fields: &[(String, String)]) -> Result<()> {
        let mut guard = self.data.write().await;
        hset_in(&mut guard, key, fields)
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        let guard = self.data.read().await;
        hgetall_in(&guard, key)
    }

    async fn del(&self, keys: &[String]) -> Result<()> {
        let mut guard = self.data.write().await;
        for key in keys {
            guard.remove(key);
        }
        Ok(())
    }

    async fn run_atomic(
        &self,
        procedure: Procedure,
        keys: &[String],
        args: &[String],
    ) -> Result<AtomicReply> {
        procedure.check_layout(keys, args)?;
        let mut guard = self.data.write().await;
        match procedure {
            Procedure::PrivateSend => private_send(&mut guard, keys, args),
            Procedure::UnreadDrain => unread_drain(&mut guard, keys, args),
            Procedure::GroupSend => group_send(&mut guard, keys, args),
        }
    }
}
