// Copyright © 2025 graphmailer.dev
// Licensed under GraphMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::graphmailer_version;
use crate::modules::account::entity::Account;
use crate::modules::error::{code::ErrorCode, GraphMailerResult};
use crate::modules::oauth2::entity::OAuth2;
use crate::modules::oauth2::token::OAuth2AccessToken;
use crate::modules::settings::cli::SETTINGS;
use crate::modules::settings::proxy::Proxy;
use crate::raise_error;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub mod attachments;
pub mod messages;
pub mod subscriptions;
#[cfg(test)]
mod tests;
pub mod user;

/// A thin client over the Microsoft Graph REST API, authenticated with a
/// bearer token obtained through the OAuth2 flow.
pub struct GraphClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl GraphClient {
    pub async fn new(access_token: String, use_proxy: Option<u64>) -> GraphMailerResult<Self> {
        let mut builder = reqwest::ClientBuilder::new()
            .user_agent(format!("GraphMailer/{}", graphmailer_version!()))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_id) = use_proxy {
            let proxy = Proxy::get(proxy_id).await?;
            let proxy_obj = reqwest::Proxy::all(&proxy.url).map_err(|e| {
                raise_error!(
                    format!(
                        "Failed to configure SOCKS5 proxy ({}): {:#?}. Please check",
                        &proxy.url, e
                    ),
                    ErrorCode::InternalError
                )
            })?;
            builder = builder
                .redirect(reqwest::redirect::Policy::none())
                .proxy(proxy_obj);
        }

        let client = builder.build().map_err(|e| {
            raise_error!(
                format!("Failed to build HTTP client: {:#?}", e),
                ErrorCode::InternalError
            )
        })?;

        Ok(Self {
            client,
            access_token,
            base_url: SETTINGS.graphmailer_graph_base_url.clone(),
        })
    }

    /// Build a client for an account, resolving its stored access token and
    /// the proxy of the OAuth2 configuration it authorizes against.
    pub async fn for_account(account: &Account) -> GraphMailerResult<Self> {
        let access_token = OAuth2AccessToken::require_bearer(account.id).await?;
        let use_proxy = OAuth2::get(account.oauth2_id)
            .await?
            .and_then(|entity| entity.use_proxy);
        Self::new(access_token, use_proxy).await
    }

    /// Resolve a Graph path to an absolute URL. Pagination cursors
    /// (`@odata.nextLink`) are already absolute and pass through untouched.
    fn api_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> GraphMailerResult<T> {
        let response = self
            .client
            .get(self.api_url(path))
            .header(AUTHORIZATION, format!("Bearer {}", &self.access_token))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::NetworkError))?;
        Self::deserialize_checked(response).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> GraphMailerResult<T> {
        let response = self
            .client
            .post(self.api_url(path))
            .header(AUTHORIZATION, format!("Bearer {}", &self.access_token))
            .json(body)
            .send()
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::NetworkError))?;
        Self::deserialize_checked(response).await
    }

    /// POST with a body where the Graph API answers 202/204 with no payload.
    pub(crate) async fn post_no_content<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> GraphMailerResult<()> {
        let response = self
            .client
            .post(self.api_url(path))
            .header(AUTHORIZATION, format!("Bearer {}", &self.access_token))
            .json(body)
            .send()
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::NetworkError))?;
        Self::check_status(response).await.map(|_| ())
    }

    pub(crate) async fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> GraphMailerResult<T> {
        let response = self
            .client
            .patch(self.api_url(path))
            .header(AUTHORIZATION, format!("Bearer {}", &self.access_token))
            .json(body)
            .send()
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::NetworkError))?;
        Self::deserialize_checked(response).await
    }

    pub(crate) async fn delete(&self, path: &str) -> GraphMailerResult<()> {
        let response = self
            .client
            .delete(self.api_url(path))
            .header(AUTHORIZATION, format!("Bearer {}", &self.access_token))
            .send()
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::NetworkError))?;
        Self::check_status(response).await.map(|_| ())
    }

    /// Access to the underlying HTTP client for pre-authenticated URLs
    /// (chunked upload sessions carry their own auth in the URL).
    pub(crate) fn raw(&self) -> &reqwest::Client {
        &self.client
    }

    async fn check_status(response: reqwest::Response) -> GraphMailerResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(raise_error!(
            format!("Graph API call failed: {} - {}", status, body),
            ErrorCode::GraphApiCallFailed
        ))
    }

    async fn deserialize_checked<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> GraphMailerResult<T> {
        let response = Self::check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::GraphApiCallFailed))
    }
}
