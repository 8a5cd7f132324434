// Copyright © 2025 graphmailer.dev
// Licensed under GraphMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use poem::http::StatusCode;
use poem_openapi::Enum;

#[derive(Copy, Clone, Debug, Enum, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorCode {
    // Client-side errors (10000–10999)
    InvalidParameter = 10000,
    MissingConfiguration = 10010,
    ExceedsLimitation = 10020,
    PayloadTooLarge = 10030,
    MethodNotAllowed = 10040,

    // Authentication and authorization errors (20000–20999)
    PermissionDenied = 20000,
    OAuth2ItemDisabled = 20010,
    MissingRefreshToken = 20020,
    MissingAccessToken = 20030,

    // Resource errors (30000–30999)
    ResourceNotFound = 30000,
    AlreadyExists = 30010,

    // Network connection errors (40000–40999)
    NetworkError = 40000,
    HttpResponseError = 40010,

    // Graph API errors (50000–50999)
    GraphApiCallFailed = 50000,
    GraphUploadSessionFailed = 50010,
    SubscriptionRenewFailed = 50020,

    // Message bus errors (60000–60999)
    NatsConnectionFailed = 60000,
    NatsCreateStreamFailed = 60010,
    NatsConsumeFailed = 60020,

    // Internal system errors (70000–70999)
    InternalError = 70000,
    UnhandledPoemError = 70010,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidParameter
            | ErrorCode::MissingConfiguration
            | ErrorCode::ExceedsLimitation => StatusCode::BAD_REQUEST,
            ErrorCode::PermissionDenied => StatusCode::UNAUTHORIZED,
            ErrorCode::OAuth2ItemDisabled
            | ErrorCode::MissingRefreshToken
            | ErrorCode::MissingAccessToken => StatusCode::FORBIDDEN,
            ErrorCode::ResourceNotFound => StatusCode::NOT_FOUND,
            ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorCode::AlreadyExists => StatusCode::CONFLICT,
            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::NetworkError
            | ErrorCode::HttpResponseError
            | ErrorCode::GraphApiCallFailed
            | ErrorCode::GraphUploadSessionFailed
            | ErrorCode::SubscriptionRenewFailed => StatusCode::BAD_GATEWAY,
            ErrorCode::NatsConnectionFailed
            | ErrorCode::NatsCreateStreamFailed
            | ErrorCode::NatsConsumeFailed
            | ErrorCode::InternalError
            | ErrorCode::UnhandledPoemError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
