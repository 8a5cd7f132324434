use crate::modules::graph::messages::{GraphMessage, InternetMessageHeader};
use crate::modules::thread::{group_into_threads, MessageThread};

fn message(
    id: &str,
    received: &str,
    message_id: Option<&str>,
    references: Option<&str>,
) -> GraphMessage {
    let mut headers = Vec::new();
    if let Some(value) = message_id {
        headers.push(InternetMessageHeader {
            name: "Message-ID".into(),
            value: value.into(),
        });
    }
    if let Some(value) = references {
        headers.push(InternetMessageHeader {
            name: "References".into(),
            value: value.into(),
        });
    }
    GraphMessage {
        id: id.into(),
        received_date_time: Some(received.into()),
        internet_message_headers: (!headers.is_empty()).then_some(headers),
        ..Default::default()
    }
}

fn ids(thread: &MessageThread) -> Vec<&str> {
    thread.messages.iter().map(|m| m.id.as_str()).collect()
}

#[test]
fn reply_chain_collapses_into_one_thread() {
    // A <- B (refs A) <- C (refs A B)
    let a = message("A", "2025-03-01T08:00:00Z", Some("<1>"), None);
    let b = message("B", "2025-03-01T09:00:00Z", Some("<2>"), Some("<1>"));
    let c = message("C", "2025-03-01T10:00:00Z", Some("<3>"), Some("<1> <2>"));

    let threads = group_into_threads(vec![a, b, c]);
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].thread_id, "<1>");
    assert_eq!(ids(&threads[0]), vec!["A", "B", "C"]);
}

#[test]
fn message_without_references_roots_its_own_thread() {
    let threads = group_into_threads(vec![message(
        "A",
        "2025-03-01T08:00:00Z",
        Some("<1>"),
        None,
    )]);
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].thread_id, "<1>");
}

#[test]
fn dangling_reference_falls_back_to_self_root() {
    let threads = group_into_threads(vec![message(
        "D",
        "2025-03-01T08:00:00Z",
        Some("<9>"),
        Some("<missing>"),
    )]);
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].thread_id, "<9>");
    assert_eq!(ids(&threads[0]), vec!["D"]);
}

#[test]
fn message_without_headers_is_excluded() {
    let a = message("A", "2025-03-01T08:00:00Z", Some("<1>"), None);
    let e = message("E", "2025-03-01T09:00:00Z", None, None);
    let b = message("B", "2025-03-01T10:00:00Z", Some("<2>"), Some("<1>"));

    let threads = group_into_threads(vec![a, e, b]);
    assert_eq!(threads.len(), 1);
    assert_eq!(ids(&threads[0]), vec!["A", "B"]);
}

#[test]
fn every_indexed_message_lands_in_exactly_one_group() {
    let messages = vec![
        message("A", "2025-03-01T08:00:00Z", Some("<1>"), None),
        message("B", "2025-03-01T09:00:00Z", Some("<2>"), Some("<1>")),
        message("C", "2025-03-01T10:00:00Z", Some("<3>"), None),
        message("D", "2025-03-01T11:00:00Z", Some("<4>"), Some("<3>")),
        message("E", "2025-03-01T12:00:00Z", Some("<5>"), Some("<nope>")),
    ];

    let threads = group_into_threads(messages);
    let mut seen: Vec<&str> = threads.iter().flat_map(ids).collect();
    seen.sort();
    assert_eq!(seen, vec!["A", "B", "C", "D", "E"]);
}

#[test]
fn grouping_is_insensitive_to_input_order() {
    let build = || {
        vec![
            message("A", "2025-03-01T08:00:00Z", Some("<1>"), None),
            message("B", "2025-03-01T09:00:00Z", Some("<2>"), Some("<1>")),
            message("C", "2025-03-01T10:00:00Z", Some("<3>"), Some("<1> <2>")),
            message("X", "2025-03-01T08:30:00Z", Some("<7>"), None),
        ]
    };

    let reference = group_into_threads(build());
    let mut shuffled = build();
    shuffled.reverse();
    assert_eq!(group_into_threads(shuffled), reference);

    let mut rotated = build();
    rotated.rotate_left(2);
    assert_eq!(group_into_threads(rotated), reference);
}

#[test]
fn grouping_twice_yields_identical_output() {
    let build = || {
        vec![
            message("B", "2025-03-01T09:00:00Z", Some("<2>"), Some("<1>")),
            message("A", "2025-03-01T08:00:00Z", Some("<1>"), None),
        ]
    };
    assert_eq!(group_into_threads(build()), group_into_threads(build()));
}

#[test]
fn equal_timestamps_keep_incoming_relative_order() {
    let a = message("A", "2025-03-01T08:00:00Z", Some("<1>"), None);
    let b = message("B", "2025-03-01T08:00:00Z", Some("<2>"), None);

    let threads = group_into_threads(vec![a.clone(), b.clone()]);
    assert_eq!(threads[0].thread_id, "<1>");
    assert_eq!(threads[1].thread_id, "<2>");

    let threads = group_into_threads(vec![b, a]);
    assert_eq!(threads[0].thread_id, "<2>");
    assert_eq!(threads[1].thread_id, "<1>");
}

#[test]
fn malformed_references_never_fail() {
    let messages = vec![
        message("A", "2025-03-01T08:00:00Z", Some("<1>"), Some("")),
        message("B", "2025-03-01T09:00:00Z", Some("<2>"), Some("  <1>  ")),
        message("C", "2025-03-01T10:00:00Z", Some("<3>"), Some("<1> <1> <1>")),
    ];

    let threads = group_into_threads(messages);
    // "" and "  <1>  " split on single spaces produce no resolvable tokens
    // for A and still resolve "<1>" for B; duplicates in C are harmless.
    let by_id: Vec<(&str, usize)> = threads
        .iter()
        .map(|t| (t.thread_id.as_str(), t.messages.len()))
        .collect();
    assert_eq!(by_id, vec![("<1>", 3)]);
}

#[test]
fn reply_dated_before_its_parent_roots_itself() {
    // Clock skew: the reply carries an earlier receivedDateTime than the
    // message it references, so the parent is unresolved when the reply is
    // processed and the reply becomes its own root.
    let parent = message("P", "2025-03-01T10:00:00Z", Some("<p>"), None);
    let reply = message("R", "2025-03-01T09:00:00Z", Some("<r>"), Some("<p>"));

    let threads = group_into_threads(vec![parent, reply]);
    assert_eq!(threads.len(), 2);
    assert_eq!(threads[0].thread_id, "<r>");
    assert_eq!(threads[1].thread_id, "<p>");
}

#[test]
fn first_listed_resolved_reference_wins() {
    // Two separate roots; the late message references both, in written
    // order. The first listed id that already has a thread wins, even when
    // the other root is older.
    let old_root = message("A", "2025-03-01T08:00:00Z", Some("<1>"), None);
    let new_root = message("B", "2025-03-01T09:00:00Z", Some("<2>"), None);
    let joiner = message("C", "2025-03-01T10:00:00Z", Some("<3>"), Some("<2> <1>"));

    let threads = group_into_threads(vec![old_root, new_root, joiner]);
    assert_eq!(threads.len(), 2);
    assert_eq!(ids(&threads[0]), vec!["A"]);
    assert_eq!(ids(&threads[1]), vec!["B", "C"]);
}

#[test]
fn group_order_follows_first_sight_of_thread_id() {
    let messages = vec![
        message("A", "2025-03-01T08:00:00Z", Some("<1>"), None),
        message("X", "2025-03-01T08:30:00Z", Some("<7>"), None),
        message("B", "2025-03-01T09:00:00Z", Some("<2>"), Some("<1>")),
    ];

    let threads = group_into_threads(messages);
    let order: Vec<&str> = threads.iter().map(|t| t.thread_id.as_str()).collect();
    assert_eq!(order, vec!["<1>", "<7>"]);
}

#[test]
fn empty_input_produces_empty_grouping() {
    assert!(group_into_threads(Vec::new()).is_empty());
}
