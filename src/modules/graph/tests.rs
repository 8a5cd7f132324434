use crate::modules::graph::attachments::{chunk_ranges, UPLOAD_CHUNK_SIZE};
use crate::modules::graph::messages::{inbox_messages_url, GraphMessage, MessagePage};
use crate::modules::graph::subscriptions::SubscriptionCreate;
use crate::modules::graph::user::UserProfile;
use chrono::{TimeZone, Utc};

#[test]
fn parses_a_message_page_with_cursor() {
    let raw = r#"{
        "@odata.nextLink": "https://graph.microsoft.com/v1.0/me/mailFolders/inbox/messages?$skip=5",
        "value": [
            {
                "id": "AAMkAD",
                "subject": "Weekly sync",
                "bodyPreview": "agenda attached",
                "conversationId": "AAQkAD",
                "receivedDateTime": "2025-03-01T09:30:00Z",
                "internetMessageHeaders": [
                    {"name": "Message-ID", "value": "<a1@example.com>"},
                    {"name": "References", "value": "<root@example.com>"}
                ],
                "from": {"emailAddress": {"name": "Ana", "address": "ana@example.com"}},
                "toRecipients": [
                    {"emailAddress": {"address": "team@example.com"}}
                ]
            }
        ]
    }"#;

    let page: MessagePage = serde_json::from_str(raw).unwrap();
    assert_eq!(page.value.len(), 1);
    assert!(page.next_link.as_deref().unwrap().contains("$skip=5"));

    let message = &page.value[0];
    assert_eq!(message.first_header("Message-ID"), Some("<a1@example.com>"));
    assert_eq!(
        message.first_header("references"),
        Some("<root@example.com>")
    );
    assert_eq!(
        message.from.as_ref().unwrap().email_address.address.as_deref(),
        Some("ana@example.com")
    );
}

#[test]
fn last_page_has_no_cursor() {
    let page: MessagePage = serde_json::from_str(r#"{"value": []}"#).unwrap();
    assert!(page.value.is_empty());
    assert!(page.next_link.is_none());
}

#[test]
fn received_timestamp_handles_garbage() {
    let message: GraphMessage = serde_json::from_str(
        r#"{"id": "x", "receivedDateTime": "not-a-timestamp"}"#,
    )
    .unwrap();
    assert_eq!(message.received_timestamp(), i64::MIN);

    let message: GraphMessage =
        serde_json::from_str(r#"{"id": "x", "receivedDateTime": "2025-03-01T09:30:00Z"}"#).unwrap();
    assert!(message.received_timestamp() > 0);
}

#[test]
fn inbox_url_carries_window_and_cap() {
    let since = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
    let url = inbox_messages_url(since, 25);
    assert!(url.starts_with("/me/mailFolders/inbox/messages?"));
    assert!(url.contains("$select="));
    assert!(url.contains("receivedDateTime%20ge%202025-02-01T00%3A00%3A00.000Z"));
    assert!(url.ends_with("$top=25"));
}

#[test]
fn chunk_ranges_cover_every_byte_once() {
    assert_eq!(chunk_ranges(0, UPLOAD_CHUNK_SIZE), vec![]);
    assert_eq!(chunk_ranges(1, 4), vec![(0, 0)]);
    assert_eq!(chunk_ranges(4, 4), vec![(0, 3)]);
    assert_eq!(chunk_ranges(5, 4), vec![(0, 3), (4, 4)]);
    assert_eq!(chunk_ranges(10, 4), vec![(0, 3), (4, 7), (8, 9)]);

    let total = UPLOAD_CHUNK_SIZE * 2 + 17;
    let ranges = chunk_ranges(total, UPLOAD_CHUNK_SIZE);
    assert_eq!(ranges.first().unwrap().0, 0);
    assert_eq!(ranges.last().unwrap().1, total - 1);
    let covered: usize = ranges.iter().map(|(s, e)| e - s + 1).sum();
    assert_eq!(covered, total);
}

#[test]
fn mailbox_address_prefers_mail_over_principal_name() {
    let profile: UserProfile = serde_json::from_str(
        r#"{"displayName": "Ana", "mail": "ana@contoso.com", "userPrincipalName": "ana_contoso.com#EXT#@tenant.onmicrosoft.com"}"#,
    )
    .unwrap();
    assert_eq!(profile.mailbox_address().as_deref(), Some("ana@contoso.com"));

    let profile: UserProfile =
        serde_json::from_str(r#"{"userPrincipalName": "ana@hotmail.com"}"#).unwrap();
    assert_eq!(profile.mailbox_address().as_deref(), Some("ana@hotmail.com"));
}

#[test]
fn subscription_create_serializes_graph_field_names() {
    let request = SubscriptionCreate {
        change_type: "created,updated".into(),
        notification_url: "https://example.com/webhook".into(),
        lifecycle_notification_url: None,
        resource: "me/messages".into(),
        expiration_date_time: "2025-03-04T09:30:00Z".into(),
        client_state: "user@example.com".into(),
    };
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["changeType"], "created,updated");
    assert_eq!(value["notificationUrl"], "https://example.com/webhook");
    assert!(value.get("lifecycleNotificationUrl").is_none());
    assert_eq!(value["clientState"], "user@example.com");
}
