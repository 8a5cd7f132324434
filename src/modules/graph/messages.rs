use crate::modules::error::GraphMailerResult;
use crate::modules::graph::GraphClient;
use chrono::{DateTime, SecondsFormat, Utc};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Fields requested for every message. The threading heuristic only needs
/// `receivedDateTime` and `internetMessageHeaders`; the rest is what the
/// presentation layer shows.
const MESSAGE_SELECT: &str =
    "id,subject,bodyPreview,conversationId,internetMessageHeaders,receivedDateTime,from,toRecipients";

/// A single internet message header. Real-world mail may carry zero, one, or
/// many headers with the same name; consumers take the first match only.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct InternetMessageHeader {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct EmailAddress {
    pub name: Option<String>,
    pub address: Option<String>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct Recipient {
    pub email_address: EmailAddress,
}

/// A mailbox message as returned by the Graph API.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct GraphMessage {
    pub id: String,
    pub subject: Option<String>,
    pub body_preview: Option<String>,
    /// The provider's own conversation identifier. Passed through for
    /// display; the grouped listing derives threads from headers instead.
    pub conversation_id: Option<String>,
    pub received_date_time: Option<String>,
    pub internet_message_headers: Option<Vec<InternetMessageHeader>>,
    pub from: Option<Recipient>,
    pub to_recipients: Option<Vec<Recipient>>,
}

impl GraphMessage {
    /// The value of the first header matching `name`, if any.
    pub fn first_header(&self, name: &str) -> Option<&str> {
        self.internet_message_headers
            .as_deref()?
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.as_str())
    }

    /// `receivedDateTime` parsed to epoch milliseconds. Unparsable or absent
    /// timestamps sort before everything else rather than failing.
    pub fn received_timestamp(&self) -> i64 {
        self.received_date_time
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.timestamp_millis())
            .unwrap_or(i64::MIN)
    }
}

/// One page of a message listing, with the cursor to the next page.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MessagePage {
    #[serde(default)]
    pub value: Vec<GraphMessage>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Patch applied to a reply draft before sending.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<ItemBody>,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    pub content_type: String,
    pub content: String,
}

impl ItemBody {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content_type: "Text".into(),
            content: content.into(),
        }
    }
}

/// Build the first-page URL of an inbox listing: limited field selection,
/// a `receivedDateTime` window filter, and a per-page item cap.
pub fn inbox_messages_url(since: DateTime<Utc>, page_size: u8) -> String {
    let filter = format!(
        "receivedDateTime ge {}",
        since.to_rfc3339_opts(SecondsFormat::Millis, true)
    );
    format!(
        "/me/mailFolders/inbox/messages?$select={}&$filter={}&$top={}",
        urlencoding::encode(MESSAGE_SELECT),
        urlencoding::encode(&filter),
        page_size
    )
}

impl GraphClient {
    pub async fn list_messages_page(&self, url: &str) -> GraphMailerResult<MessagePage> {
        self.get_json(url).await
    }

    pub async fn get_message(&self, message_id: &str) -> GraphMailerResult<GraphMessage> {
        self.get_json(&format!(
            "/me/messages/{}?$select={}",
            urlencoding::encode(message_id),
            urlencoding::encode(MESSAGE_SELECT)
        ))
        .await
    }

    /// Create a reply draft for an existing message and return the draft.
    pub async fn create_reply_draft(&self, message_id: &str) -> GraphMailerResult<GraphMessage> {
        self.post_json(
            &format!(
                "/me/messages/{}/createReply",
                urlencoding::encode(message_id)
            ),
            &serde_json::json!({}),
        )
        .await
    }

    pub async fn update_draft(
        &self,
        message_id: &str,
        patch: &DraftPatch,
    ) -> GraphMailerResult<GraphMessage> {
        self.patch_json(
            &format!("/me/messages/{}", urlencoding::encode(message_id)),
            patch,
        )
        .await
    }

    pub async fn send_draft(&self, message_id: &str) -> GraphMailerResult<()> {
        self.post_no_content(
            &format!("/me/messages/{}/send", urlencoding::encode(message_id)),
            &serde_json::json!({}),
        )
        .await
    }
}
