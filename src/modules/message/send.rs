use crate::modules::{
    account::entity::Account,
    error::{code::ErrorCode, GraphMailerResult},
    graph::{
        messages::{DraftPatch, ItemBody},
        GraphClient,
    },
    upload::entity::StagedUpload,
};
use crate::raise_error;
use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Attachments up to this size travel inline (base64 in the request body);
/// anything larger goes through an upload session with ranged PUTs.
pub const INLINE_ATTACHMENT_LIMIT: usize = 3 * 1024 * 1024;

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct SendReplyRequest {
    /// The provider id of the message being replied to.
    pub source_message_id: String,
    /// Replacement subject for the reply draft (optional).
    pub subject: Option<String>,
    /// Plain-text body of the reply (optional).
    pub body: Option<String>,
    /// A previously staged upload to attach (optional).
    pub upload_id: Option<u64>,
}

/// Reply to an existing message: create the reply draft, patch subject and
/// body, attach the staged file if any, send, and unstage the attachment.
pub async fn send_reply(account_id: u64, request: SendReplyRequest) -> GraphMailerResult<String> {
    let account = Account::check_account_active(account_id).await?;
    let client = GraphClient::for_account(&account).await?;

    let draft = client
        .create_reply_draft(&request.source_message_id)
        .await?;
    let draft_id = draft.id;

    if request.subject.is_some() || request.body.is_some() {
        let patch = DraftPatch {
            subject: request.subject,
            body: request.body.map(ItemBody::text),
        };
        client.update_draft(&draft_id, &patch).await?;
    }

    let staged = match request.upload_id {
        Some(upload_id) => Some(resolve_staged_upload(account_id, upload_id).await?),
        None => None,
    };

    if let Some(staged) = &staged {
        let content = staged.read_content().await?;
        if content.len() > INLINE_ATTACHMENT_LIMIT {
            let session = client
                .create_upload_session(
                    &draft_id,
                    &staged.file_name,
                    content.len(),
                    &staged.content_type,
                )
                .await?;
            client.upload_in_chunks(&session.upload_url, &content).await?;
        } else {
            client
                .add_file_attachment(&draft_id, &staged.file_name, &staged.content_type, &content)
                .await?;
        }
    }

    client.send_draft(&draft_id).await?;
    info!(
        "Sent reply to message {} for account {}",
        request.source_message_id, account_id
    );

    // The staged file is single-use; drop it once the mail is out.
    if let Some(staged) = staged {
        staged.discard().await?;
    }

    Ok(draft_id)
}

async fn resolve_staged_upload(
    account_id: u64,
    upload_id: u64,
) -> GraphMailerResult<StagedUpload> {
    let staged = StagedUpload::get(upload_id).await?.ok_or_else(|| {
        raise_error!(
            format!("Staged upload with id={} not found", upload_id),
            ErrorCode::ResourceNotFound
        )
    })?;
    if staged.account_id != account_id {
        return Err(raise_error!(
            format!(
                "Staged upload {} belongs to a different account",
                upload_id
            ),
            ErrorCode::PermissionDenied
        ));
    }
    Ok(staged)
}
