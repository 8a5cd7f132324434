// Copyright © 2025 graphmailer.dev
// Licensed under GraphMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::oauth2::entity::{OAuth2, OAuth2CreateRequest, OAuth2UpdateRequest};
use crate::modules::oauth2::flow::{AuthorizeUrlRequest, OAuth2Flow};
use crate::modules::oauth2::token::OAuth2AccessToken;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::response::DataPage;
use crate::modules::rest::ApiResult;
use crate::raise_error;
use poem::web::Path;
use poem_openapi::param::Query;
use poem_openapi::payload::{Json, PlainText};
use poem_openapi::OpenApi;

pub struct OAuth2Api;

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::OAuth2")]
impl OAuth2Api {
    /// Retrieves an OAuth2 configuration by id.
    #[oai(
        path = "/oauth2/:id",
        method = "get",
        operation_id = "get_oauth2_config"
    )]
    async fn get_oauth2_config(
        &self,
        /// The id of the OAuth2 configuration to retrieve
        id: Path<u64>,
    ) -> ApiResult<Json<OAuth2>> {
        let id = id.0;
        Ok(Json(OAuth2::get(id).await?.ok_or_else(|| {
            raise_error!(
                format!("OAuth2 configuration id='{id}' not found"),
                ErrorCode::ResourceNotFound
            )
        })?))
    }

    /// Deletes an OAuth2 configuration by id.
    #[oai(
        path = "/oauth2/:id",
        method = "delete",
        operation_id = "remove_oauth2_config"
    )]
    async fn remove_oauth2_config(
        &self,
        /// The id of the OAuth2 configuration to delete
        id: Path<u64>,
    ) -> ApiResult<()> {
        Ok(OAuth2::delete(id.0).await?)
    }

    /// Creates a new OAuth2 configuration.
    ///
    /// The client secret is encrypted before it is stored.
    #[oai(
        path = "/oauth2",
        method = "post",
        operation_id = "create_oauth2_config"
    )]
    async fn create_oauth2_config(
        &self,
        /// A JSON payload containing the details for the new OAuth2 configuration
        request: Json<OAuth2CreateRequest>,
    ) -> ApiResult<()> {
        let entity = OAuth2::new(request.0)?;
        Ok(entity.save().await?)
    }

    /// Updates an existing OAuth2 configuration.
    #[oai(
        path = "/oauth2/:id",
        method = "post",
        operation_id = "update_oauth2_config"
    )]
    async fn update_oauth2_config(
        &self,
        /// The id of the OAuth2 configuration to update
        id: Path<u64>,
        /// A JSON payload containing the updated configuration details
        payload: Json<OAuth2UpdateRequest>,
    ) -> ApiResult<()> {
        Ok(OAuth2::update(id.0, payload.0).await?)
    }

    /// Lists OAuth2 configurations with pagination and sorting options.
    #[oai(
        path = "/oauth2-list",
        method = "get",
        operation_id = "list_oauth2_config"
    )]
    async fn list_oauth2_config(
        &self,
        /// Optional. The page number to retrieve (starting from 1).
        page: Query<Option<u64>>,
        /// Optional. The number of items per page.
        page_size: Query<Option<u64>>,
        /// Optional. Whether to sort the list in descending order.
        desc: Query<Option<bool>>,
    ) -> ApiResult<Json<DataPage<OAuth2>>> {
        Ok(Json(
            OAuth2::paginate_list(page.0, page_size.0, desc.0).await?,
        ))
    }

    /// Generates an OAuth2 authorization URL for a specific account.
    ///
    /// Visiting the returned URL signs the user in at the identity provider;
    /// the provider then redirects back to this instance's public callback,
    /// which stores the exchanged tokens for the account.
    #[oai(
        path = "/oauth2-authorize-url",
        method = "post",
        operation_id = "create_oauth2_authorize_url"
    )]
    async fn create_oauth2_authorize_url(
        &self,
        /// A JSON payload containing the OAuth2 configuration id and account ID.
        request: Json<AuthorizeUrlRequest>,
    ) -> ApiResult<PlainText<String>> {
        let request = request.0;
        let flow = OAuth2Flow::new(request.oauth2_id);
        Ok(PlainText(flow.authorize_url(request.account_id).await?))
    }

    /// Retrieves OAuth2 access tokens for a specified account.
    #[oai(
        path = "/oauth2-tokens/:account_id",
        method = "get",
        operation_id = "get_oauth2_tokens"
    )]
    async fn get_oauth2_tokens(
        &self,
        /// The ID of the account to retrieve access tokens for
        account_id: Path<u64>,
    ) -> ApiResult<Json<OAuth2AccessToken>> {
        let account = account_id.0;
        Ok(Json(OAuth2AccessToken::get(account).await?.ok_or_else(
            || {
                raise_error!(
                    "OAuth2 access tokens not found".into(),
                    ErrorCode::ResourceNotFound
                )
            },
        )?))
    }
}
