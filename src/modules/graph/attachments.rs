use crate::base64_encode;
use crate::modules::error::{code::ErrorCode, GraphMailerResult};
use crate::modules::graph::GraphClient;
use crate::raise_error;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Chunk size for ranged uploads against an upload session. The Graph API
/// requires ranges in multiples of 320 KiB; 3 MiB satisfies that.
pub const UPLOAD_CHUNK_SIZE: usize = 3 * 1024 * 1024;

#[derive(Clone, Debug, Serialize)]
struct FileAttachment<'a> {
    #[serde(rename = "@odata.type")]
    odata_type: &'static str,
    name: &'a str,
    #[serde(rename = "contentType")]
    content_type: &'a str,
    #[serde(rename = "contentBytes")]
    content_bytes: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentItem<'a> {
    attachment_type: &'static str,
    name: &'a str,
    size: usize,
    content_type: &'a str,
}

#[derive(Clone, Debug, Serialize)]
struct UploadSessionRequest<'a> {
    #[serde(rename = "AttachmentItem")]
    attachment_item: AttachmentItem<'a>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSession {
    pub upload_url: String,
    pub expiration_date_time: Option<String>,
}

/// Inclusive byte ranges covering `total` bytes in `chunk`-sized steps,
/// the way `Content-Range: bytes start-end/total` expects them.
pub(crate) fn chunk_ranges(total: usize, chunk: usize) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start = 0;
    while start < total {
        let end = (start + chunk - 1).min(total - 1);
        ranges.push((start, end));
        start = end + 1;
    }
    ranges
}

impl GraphClient {
    /// Attach a small file inline on a draft message (base64 in the request
    /// body). Callers switch to an upload session above the inline limit.
    pub async fn add_file_attachment(
        &self,
        message_id: &str,
        name: &str,
        content_type: &str,
        content: &[u8],
    ) -> GraphMailerResult<()> {
        let attachment = FileAttachment {
            odata_type: "#microsoft.graph.fileAttachment",
            name,
            content_type,
            content_bytes: base64_encode!(content),
        };
        self.post_no_content(
            &format!(
                "/me/messages/{}/attachments",
                urlencoding::encode(message_id)
            ),
            &attachment,
        )
        .await
    }

    pub async fn create_upload_session(
        &self,
        message_id: &str,
        name: &str,
        size: usize,
        content_type: &str,
    ) -> GraphMailerResult<UploadSession> {
        self.post_json(
            &format!(
                "/me/messages/{}/attachments/createUploadSession",
                urlencoding::encode(message_id)
            ),
            &UploadSessionRequest {
                attachment_item: AttachmentItem {
                    attachment_type: "file",
                    name,
                    size,
                    content_type,
                },
            },
        )
        .await
    }

    /// Upload a large attachment through an upload session with ranged PUTs.
    /// The session URL is pre-authenticated; no bearer header is sent.
    pub async fn upload_in_chunks(
        &self,
        upload_url: &str,
        content: &[u8],
    ) -> GraphMailerResult<()> {
        let total = content.len();
        for (start, end) in chunk_ranges(total, UPLOAD_CHUNK_SIZE) {
            let chunk = &content[start..=end];
            debug!("Uploading {} bytes ({}-{}/{})", chunk.len(), start, end, total);
            let response = self
                .raw()
                .put(upload_url)
                .header("Content-Range", format!("bytes {}-{}/{}", start, end, total))
                .header(CONTENT_TYPE, "application/octet-stream")
                .header(CONTENT_LENGTH, chunk.len())
                .body(chunk.to_vec())
                .send()
                .await
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::NetworkError))?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(raise_error!(
                    format!(
                        "Chunk upload failed at bytes {}-{}/{}: {} - {}",
                        start, end, total, status, body
                    ),
                    ErrorCode::GraphUploadSessionFailed
                ));
            }
        }
        debug!("Upload complete ({} bytes)", total);
        Ok(())
    }
}
