use crate::modules::account::entity::Account;
use crate::modules::error::code::ErrorCode;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;
use crate::modules::upload::entity::StagedUpload;
use crate::raise_error;
use poem::web::Path;
use poem_openapi::payload::Json;
use poem_openapi::types::multipart::Upload;
use poem_openapi::{Multipart, OpenApi};

pub struct UploadApi;

#[derive(Debug, Multipart)]
pub struct UploadPayload {
    /// The file to stage for a later send.
    file: Upload,
}

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::Upload")]
impl UploadApi {
    /// Stages an attachment for a later reply.
    ///
    /// The file is written to the staging directory and referenced by the
    /// returned upload id; unsent uploads are discarded after the TTL.
    #[oai(
        path = "/upload/:account_id",
        method = "post",
        operation_id = "stage_upload"
    )]
    async fn stage_upload(
        &self,
        /// The ID of the account staging the file
        account_id: Path<u64>,
        payload: UploadPayload,
    ) -> ApiResult<Json<StagedUpload>> {
        let account = Account::check_account_active(account_id.0).await?;

        let file_name = payload
            .file
            .file_name()
            .map(str::to_owned)
            .ok_or_else(|| {
                raise_error!("No file name in upload".into(), ErrorCode::InvalidParameter)
            })?;
        let content_type = payload
            .file
            .content_type()
            .map(str::to_owned)
            .unwrap_or_else(|| {
                mime_guess::from_path(&file_name)
                    .first_or_octet_stream()
                    .to_string()
            });
        let content = payload
            .file
            .into_vec()
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        if content.is_empty() {
            return Err(raise_error!(
                "No file uploaded.".into(),
                ErrorCode::InvalidParameter
            )
            .into());
        }

        Ok(Json(
            StagedUpload::stage(account.id, file_name, content_type, content).await?,
        ))
    }

    /// Lists the staged uploads of an account.
    #[oai(
        path = "/uploads/:account_id",
        method = "get",
        operation_id = "list_uploads"
    )]
    async fn list_uploads(
        &self,
        /// The ID of the account whose staged uploads are listed
        account_id: Path<u64>,
    ) -> ApiResult<Json<Vec<StagedUpload>>> {
        Ok(Json(StagedUpload::list_for_account(account_id.0).await?))
    }

    /// Discards a staged upload without sending it.
    #[oai(
        path = "/upload/:id",
        method = "delete",
        operation_id = "remove_upload"
    )]
    async fn remove_upload(
        &self,
        /// The id of the staged upload to discard
        id: Path<u64>,
    ) -> ApiResult<()> {
        let staged = StagedUpload::get(id.0).await?.ok_or_else(|| {
            raise_error!(
                format!("Staged upload with id={} not found", id.0),
                ErrorCode::ResourceNotFound
            )
        })?;
        Ok(staged.discard().await?)
    }
}
