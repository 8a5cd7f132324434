// Copyright © 2025 graphmailer.dev
// Licensed under GraphMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::account::entity::Account;
use crate::modules::account::payload::{AccountCreateRequest, AccountUpdateRequest};
use crate::modules::error::code::ErrorCode;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::response::DataPage;
use crate::modules::rest::ApiResult;
use crate::raise_error;
use poem::web::Path;
use poem_openapi::param::Query;
use poem_openapi::payload::Json;
use poem_openapi::OpenApi;

pub struct AccountApi;

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::Account")]
impl AccountApi {
    /// Connects a new mailbox account.
    ///
    /// The account still needs to complete the OAuth2 authorization flow
    /// before any Graph API operation can run on its behalf.
    #[oai(path = "/account", method = "post", operation_id = "create_account")]
    async fn create_account(
        &self,
        /// A JSON payload with the mailbox address and OAuth2 binding
        request: Json<AccountCreateRequest>,
    ) -> ApiResult<Json<Account>> {
        let account = Account::new(request.0)?;
        account.save().await?;
        Ok(Json(account))
    }

    /// Retrieves an account by id.
    #[oai(path = "/account/:id", method = "get", operation_id = "get_account")]
    async fn get_account(
        &self,
        /// The id of the account to retrieve
        id: Path<u64>,
    ) -> ApiResult<Json<Account>> {
        let id = id.0;
        Ok(Json(Account::get(id).await?.ok_or_else(|| {
            raise_error!(
                format!("Account id='{id}' not found"),
                ErrorCode::ResourceNotFound
            )
        })?))
    }

    /// Updates an existing account.
    #[oai(path = "/account/:id", method = "post", operation_id = "update_account")]
    async fn update_account(
        &self,
        /// The id of the account to update
        id: Path<u64>,
        /// A JSON payload containing the updated account details
        payload: Json<AccountUpdateRequest>,
    ) -> ApiResult<()> {
        Ok(Account::update(id.0, payload.0).await?)
    }

    /// Disconnects an account.
    #[oai(
        path = "/account/:id",
        method = "delete",
        operation_id = "remove_account"
    )]
    async fn remove_account(
        &self,
        /// The id of the account to delete
        id: Path<u64>,
    ) -> ApiResult<()> {
        Ok(Account::delete(id.0).await?)
    }

    /// Lists accounts with pagination and sorting options.
    #[oai(path = "/account-list", method = "get", operation_id = "list_accounts")]
    async fn list_accounts(
        &self,
        /// Optional. The page number to retrieve (starting from 1).
        page: Query<Option<u64>>,
        /// Optional. The number of items per page.
        page_size: Query<Option<u64>>,
        /// Optional. Whether to sort the list in descending order.
        desc: Query<Option<bool>>,
    ) -> ApiResult<Json<DataPage<Account>>> {
        Ok(Json(
            Account::paginate_list(page.0, page_size.0, desc.0).await?,
        ))
    }
}
