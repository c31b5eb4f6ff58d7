//! Store key naming. These strings are shared with existing data and must not change.

/// All-messages index of a private conversation, as seen by `owner`.
pub fn private_all(owner: &str, peer: &str) -> String {
    format!("message:all:{owner}:{peer}")
}

/// Messages from `sender` that `recipient` has not fetched yet.
pub fn private_unread(recipient: &str, sender: &str) -> String {
    format!("message:unread:{recipient}:{sender}")
}

/// Private message bodies are stored directly under their id.
pub fn private_message(id: &str) -> String {
    id.to_string()
}

pub fn group_index(group_id: &str) -> String {
    format!("group:{group_id}")
}

pub fn group_message(id: &str) -> String {
    format!("group:message:{id}")
}
