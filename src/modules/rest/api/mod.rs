// Copyright © 2025 graphmailer.dev
// Licensed under GraphMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use account::AccountApi;
use message::MessageApi;
use oauth2::OAuth2Api;
use poem_openapi::{OpenApiService, Tags};
use proxy::ProxyApi;
use send::SendMailApi;
use subscription::SubscriptionApi;
use upload::UploadApi;

use crate::graphmailer_version;

pub mod account;
pub mod message;
pub mod oauth2;
pub mod proxy;
pub mod send;
pub mod subscription;
pub mod upload;

#[derive(Tags)]
pub enum ApiTags {
    Account,
    OAuth2,
    Message,
    SendMail,
    Upload,
    Subscription,
    Proxy,
}

type GraphMailerOpenApi = (
    AccountApi,
    OAuth2Api,
    MessageApi,
    SendMailApi,
    UploadApi,
    SubscriptionApi,
    ProxyApi,
);

pub fn create_openapi_service() -> OpenApiService<GraphMailerOpenApi, ()> {
    OpenApiService::new(
        (
            AccountApi,
            OAuth2Api,
            MessageApi,
            SendMailApi,
            UploadApi,
            SubscriptionApi,
            ProxyApi,
        ),
        "GraphMailerApi",
        graphmailer_version!(),
    )
}
