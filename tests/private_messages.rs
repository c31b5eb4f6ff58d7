mod common;

use std::collections::HashSet;
use std::sync::Arc;

use redchat::domains::message::{MessageStatus, PrivateMessage};
use redchat::domains::requests::{PrivateHistoryRequest, PrivateSendRequest, PrivateUnreadRequest};
use redchat::error::RedChatError;
use redchat::interfaces::store::StoreClient;
use redchat::providers::memory::InMemoryStore;
use redchat::services::private::PrivateMessageService;

use common::{ManualClock, SequentialIds, UnreachableStore, T0};

fn service_with(store: Arc<dyn StoreClient>, clock: Arc<ManualClock>) -> PrivateMessageService {
    PrivateMessageService::new(store, Arc::new(SequentialIds::new()), clock, 50)
}

fn send(to: &str, content: &str) -> PrivateSendRequest {
    PrivateSendRequest {
        to_user_id: to.to_string(),
        content: content.to_string(),
    }
}

fn page(target: &str, page_num: i64, page_size: i64) -> PrivateHistoryRequest {
    PrivateHistoryRequest {
        target_user_id: target.to_string(),
        page_num,
        page_size,
    }
}

fn unread(target: &str) -> PrivateUnreadRequest {
    PrivateUnreadRequest {
        target_user_id: target.to_string(),
    }
}

fn contents(messages: &[PrivateMessage]) -> Vec<&str> {
    messages.iter().map(|m| m.content.as_str()).collect()
}

#[tokio::test]
async fn send_writes_every_index_and_the_body_together() {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(ManualClock::new(T0 + 250));
    let service = service_with(store.clone(), clock);

    let message = service.send("alice", send("bob", "hi")).await.unwrap();
    assert_eq!(message.sender_id, "alice");
    assert_eq!(message.status, MessageStatus::Unread);
    assert_eq!(message.time, T0 / 1000);

    for index in [
        "message:all:alice:bob",
        "message:all:bob:alice",
        "message:unread:bob:alice",
    ] {
        assert_eq!(store.zcard(index).await, 1, "{index}");
        assert_eq!(
            store.zscore(index, &message.id).await,
            Some(1_700_000_000.25)
        );
    }
    assert!(!store.exists("message:unread:alice:bob").await);

    let fields = store.hgetall(&message.id).await.unwrap();
    assert_eq!(fields.get("Id"), Some(&message.id));
    assert_eq!(fields.get("UserId").map(String::as_str), Some("alice"));
    assert_eq!(fields.get("ToUserID").map(String::as_str), Some("bob"));
    assert_eq!(fields.get("Content").map(String::as_str), Some("hi"));
    assert_eq!(fields.get("Status").map(String::as_str), Some("0"));
    assert_eq!(fields.get("Time").map(String::as_str), Some("1700000000"));
}

#[tokio::test]
async fn history_is_newest_first_and_paginated() {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(ManualClock::new(T0));
    let service = service_with(store.clone(), clock.clone());

    for i in 1..=5 {
        let (from, to) = if i % 2 == 0 { ("bob", "alice") } else { ("alice", "bob") };
        service.send(from, send(to, &format!("m{i}"))).await.unwrap();
        clock.advance(1_000);
    }

    let all = service.history("alice", page("bob", 1, 10)).await.unwrap();
    assert_eq!(contents(&all), vec!["m5", "m4", "m3", "m2", "m1"]);
    assert!(all.windows(2).all(|w| w[0].time >= w[1].time));

    let mirrored = service.history("bob", page("alice", 1, 10)).await.unwrap();
    assert_eq!(all, mirrored);

    let first = service.history("alice", page("bob", 1, 2)).await.unwrap();
    assert_eq!(contents(&first), vec!["m5", "m4"]);
    let last = service.history("alice", page("bob", 3, 2)).await.unwrap();
    assert_eq!(contents(&last), vec!["m1"]);
    let beyond = service.history("alice", page("bob", 4, 2)).await.unwrap();
    assert!(beyond.is_empty());

    let mut pages = Vec::new();
    for n in (1..=3).rev() {
        let mut chunk = service.history("alice", page("bob", n, 2)).await.unwrap();
        chunk.reverse();
        pages.extend(chunk);
    }
    assert_eq!(contents(&pages), vec!["m1", "m2", "m3", "m4", "m5"]);

    let stranger = service.history("alice", page("carol", 1, 10)).await.unwrap();
    assert!(stranger.is_empty());
}

#[tokio::test]
async fn same_millisecond_sends_keep_send_order() {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(ManualClock::new(T0));
    let service = service_with(store, clock);

    for i in 1..=3 {
        service.send("alice", send("bob", &format!("m{i}"))).await.unwrap();
    }
    let all = service.history("bob", page("alice", 1, 10)).await.unwrap();
    assert_eq!(contents(&all), vec!["m3", "m2", "m1"]);
}

#[tokio::test]
async fn unread_drains_once_and_marks_read() {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(ManualClock::new(T0));
    let service = service_with(store.clone(), clock.clone());

    service.send("alice", send("bob", "one")).await.unwrap();
    clock.advance(10);
    service.send("alice", send("bob", "two")).await.unwrap();
    service.send("bob", send("alice", "reply")).await.unwrap();

    let drained = service.unread("bob", unread("alice")).await.unwrap();
    assert_eq!(contents(&drained), vec!["two", "one"]);
    assert!(drained.iter().all(|m| m.status == MessageStatus::Read));
    assert!(drained.iter().all(|m| m.sender_id == "alice" && m.to_user_id == "bob"));
    assert!(!store.exists("message:unread:bob:alice").await);

    assert!(service.unread("bob", unread("alice")).await.unwrap().is_empty());

    // Alice's own unread from Bob is untouched.
    let alice = service.unread("alice", unread("bob")).await.unwrap();
    assert_eq!(contents(&alice), vec!["reply"]);

    let history = service.history("bob", page("alice", 1, 10)).await.unwrap();
    assert_eq!(history.len(), 3);
    assert!(history.iter().all(|m| m.status == MessageStatus::Read));
}

#[tokio::test]
async fn self_conversation_uses_one_index() {
    let store = Arc::new(InMemoryStore::new());
    let service = service_with(store.clone(), Arc::new(ManualClock::new(T0)));

    service.send("alice", send("alice", "note")).await.unwrap();
    assert_eq!(store.zcard("message:all:alice:alice").await, 1);
    let history = service.history("alice", page("alice", 1, 10)).await.unwrap();
    assert_eq!(contents(&history), vec!["note"]);
}

#[tokio::test]
async fn concurrent_sends_and_drains_lose_nothing() {
    let store = Arc::new(InMemoryStore::new());
    let service = Arc::new(service_with(store.clone(), Arc::new(ManualClock::new(T0))));

    let mut tasks = Vec::new();
    for i in 0..40 {
        let sender = service.clone();
        tasks.push(tokio::spawn(async move {
            sender
                .send("alice", send("bob", &format!("m{i}")))
                .await
                .map(|_| Vec::new())
        }));
        if i % 10 == 0 {
            let service = service.clone();
            tasks.push(tokio::spawn(async move {
                service.unread("bob", unread("alice")).await
            }));
        }
    }

    let mut seen = Vec::new();
    for task in tasks {
        seen.extend(task.await.unwrap().unwrap());
    }
    seen.extend(service.unread("bob", unread("alice")).await.unwrap());

    let ids: HashSet<&str> = seen.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(seen.len(), 40);
    assert_eq!(ids.len(), 40);
    assert_eq!(store.zcard("message:all:alice:bob").await, 40);
}

#[tokio::test]
async fn missing_body_is_a_corrupt_record() {
    let store = Arc::new(InMemoryStore::new());
    let service = service_with(store.clone(), Arc::new(ManualClock::new(T0)));
    service.send("alice", send("bob", "ok")).await.unwrap();
    store
        .zadd("message:all:alice:bob", 1_800_000_000.0, "ghost")
        .await
        .unwrap();

    let err = service.history("alice", page("bob", 1, 10)).await.unwrap_err();
    assert!(matches!(err, RedChatError::CorruptRecord { ref key, .. } if key == "ghost"));

    // The other participant's view does not reference the ghost.
    let other = service.history("bob", page("alice", 1, 10)).await.unwrap();
    assert_eq!(contents(&other), vec!["ok"]);
}

#[tokio::test]
async fn invalid_requests_are_decode_errors() {
    let store = Arc::new(InMemoryStore::new());
    let service = service_with(store.clone(), Arc::new(ManualClock::new(T0)));

    let err = service.send("alice", send("  ", "hi")).await.unwrap_err();
    assert!(matches!(err, RedChatError::Decode { shape: "PrivateSendRequest", .. }));
    let err = service.send("alice", send("bob", "")).await.unwrap_err();
    assert_eq!(err.kind(), "decode");
    assert_eq!(store.key_count().await, 0);

    for (num, size) in [(0, 10), (1, 0), (1, 51), (-3, 5)] {
        let err = service
            .history("alice", page("bob", num, size))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "decode", "page {num}/{size}");
    }
    let err = service.unread("alice", unread("")).await.unwrap_err();
    assert_eq!(err.kind(), "decode");
}

#[tokio::test]
async fn store_failures_surface_as_store_errors() {
    let service = service_with(Arc::new(UnreachableStore), Arc::new(ManualClock::new(T0)));
    let err = service.send("alice", send("bob", "hi")).await.unwrap_err();
    assert_eq!(err.kind(), "store");
    let err = service.history("alice", page("bob", 1, 5)).await.unwrap_err();
    assert_eq!(err.kind(), "store");
    let err = service.unread("alice", unread("bob")).await.unwrap_err();
    assert_eq!(err.kind(), "store");
}

#[tokio::test]
async fn corrupt_unread_entry_leaves_the_drain_untouched() {
    let store = Arc::new(InMemoryStore::new());
    let service = service_with(store.clone(), Arc::new(ManualClock::new(T0)));
    let valid = service.send("alice", send("bob", "valid")).await.unwrap();
    store
        .zadd("message:unread:bob:alice", 1.0, "ghost")
        .await
        .unwrap();

    let err = service.unread("bob", unread("alice")).await.unwrap_err();
    assert!(matches!(err, RedChatError::CorruptRecord { ref key, .. } if key == "ghost"));

    assert_eq!(store.zcard("message:unread:bob:alice").await, 2);
    let fields = store.hgetall(&valid.id).await.unwrap();
    assert_eq!(fields.get("Status").map(String::as_str), Some("0"));

    // Retrying fails the same way instead of returning an empty page.
    let err = service.unread("bob", unread("alice")).await.unwrap_err();
    assert_eq!(err.kind(), "corrupt_record");
    assert_eq!(store.zcard("message:unread:bob:alice").await, 2);
}

#[tokio::test]
async fn incomplete_body_blocks_the_drain() {
    let store = Arc::new(InMemoryStore::new());
    let service = service_with(store.clone(), Arc::new(ManualClock::new(T0)));
    service.send("alice", send("bob", "one")).await.unwrap();
    let broken = service.send("alice", send("bob", "two")).await.unwrap();
    store.del(&[broken.id.clone()]).await.unwrap();
    store
        .hset(&broken.id, &[("Id".to_string(), broken.id.clone())])
        .await
        .unwrap();

    let err = service.unread("bob", unread("alice")).await.unwrap_err();
    assert_eq!(err.kind(), "corrupt_record");
    assert_eq!(store.zcard("message:unread:bob:alice").await, 2);
}

#[tokio::test]
async fn pages_beyond_any_rank_are_empty() {
    let store = Arc::new(InMemoryStore::new());
    let service = service_with(store, Arc::new(ManualClock::new(T0)));
    service.send("alice", send("bob", "hi")).await.unwrap();

    for page_num in [i64::MAX, 100_000_000_000_000_000] {
        let messages = service
            .history("alice", page("bob", page_num, 50))
            .await
            .unwrap();
        assert!(messages.is_empty(), "page {page_num}");
    }
}
