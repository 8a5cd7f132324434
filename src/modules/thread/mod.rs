// Copyright © 2025 graphmailer.dev
// Licensed under GraphMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

//! Conversation threading over raw internet message headers.
//!
//! The provider's `conversationId` is deliberately ignored; threads are
//! reconstructed from `Message-ID`/`References` alone so the grouping works
//! the same against any mailbox. A message adopts the thread of the first
//! referenced id that is already resolved at the time it is processed.
//! Processing happens in `receivedDateTime` order, so ancestors normally
//! resolve first; when a parent is missing from the fetched window (or clock
//! skew dates a reply before its parent) the message simply roots its own
//! thread. That first-match rule is not guaranteed to land on the
//! topological root when a client reorders the `References` list; it is kept
//! as-is rather than replaced with full reference-chain linking.

use crate::modules::graph::messages::GraphMessage;
use ahash::AHashMap;
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// One reconstructed conversation: the thread id is the `Message-ID` of the
/// thread's root (or of the first message seen for it), and members are
/// ordered by ascending `receivedDateTime`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct MessageThread {
    pub thread_id: String,
    pub messages: Vec<GraphMessage>,
}

struct IndexEntry {
    message: GraphMessage,
    references: Option<String>,
    thread_id: Option<String>,
}

/// Group a flat message list into conversation threads.
///
/// Messages without a `Message-ID` header never enter the index and are
/// absent from the result. The function is total: malformed `References`
/// values (empty strings, stray spaces, unknown or duplicate ids) degrade to
/// "message roots its own thread", never to an error.
pub fn group_into_threads(mut messages: Vec<GraphMessage>) -> Vec<MessageThread> {
    // Ascending receivedDateTime; sort_by_key is stable, so equal timestamps
    // keep their incoming relative order.
    messages.sort_by_key(GraphMessage::received_timestamp);

    // First pass: index every addressable message by its Message-ID. A
    // duplicate Message-ID replaces the entry but keeps its position.
    let mut order: Vec<String> = Vec::with_capacity(messages.len());
    let mut index: AHashMap<String, IndexEntry> = AHashMap::with_capacity(messages.len());
    for message in messages {
        let Some(message_id) = message.first_header("Message-ID").map(str::to_owned) else {
            continue;
        };
        let references = message.first_header("References").map(str::to_owned);
        if !index.contains_key(&message_id) {
            order.push(message_id.clone());
        }
        index.insert(
            message_id,
            IndexEntry {
                message,
                references,
                thread_id: None,
            },
        );
    }

    // Second pass: resolve a thread id per entry, oldest first. Each entry
    // is written exactly once.
    for message_id in &order {
        let resolved = match index[message_id].references.as_deref() {
            None => message_id.clone(),
            Some(references) => references
                .split(' ')
                .find_map(|token| index.get(token).and_then(|entry| entry.thread_id.clone()))
                .unwrap_or_else(|| message_id.clone()),
        };
        if let Some(entry) = index.get_mut(message_id) {
            entry.thread_id = Some(resolved);
        }
    }

    // Third pass: emit groups in the order thread ids first appear.
    let mut threads: Vec<MessageThread> = Vec::new();
    let mut positions: AHashMap<String, usize> = AHashMap::new();
    for message_id in order {
        let Some(entry) = index.remove(&message_id) else {
            continue;
        };
        let thread_id = entry.thread_id.unwrap_or(message_id);
        match positions.get(&thread_id) {
            Some(&at) => threads[at].messages.push(entry.message),
            None => {
                positions.insert(thread_id.clone(), threads.len());
                threads.push(MessageThread {
                    thread_id,
                    messages: vec![entry.message],
                });
            }
        }
    }
    threads
}
