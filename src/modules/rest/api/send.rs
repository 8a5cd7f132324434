use crate::modules::message::send::{send_reply, SendReplyRequest};
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;
use poem::web::Path;
use poem_openapi::payload::{Json, PlainText};
use poem_openapi::OpenApi;

pub struct SendMailApi;

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::SendMail")]
impl SendMailApi {
    /// Sends a reply to an existing message for a specified account.
    ///
    /// Creates a reply draft, applies the requested subject/body, attaches a
    /// previously staged upload if one is referenced (inline below 3 MiB,
    /// chunked upload session above), sends the draft, and discards the
    /// staged file. Returns the draft message id.
    #[oai(
        path = "/send-reply/:account_id",
        method = "post",
        operation_id = "send_reply"
    )]
    async fn send_reply(
        &self,
        /// The ID of the account sending the reply
        account_id: Path<u64>,
        /// A JSON payload containing the details of the reply
        request: Json<SendReplyRequest>,
    ) -> ApiResult<PlainText<String>> {
        Ok(PlainText(send_reply(account_id.0, request.0).await?))
    }
}
