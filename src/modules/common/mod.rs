// Copyright © 2025 graphmailer.dev
// Licensed under GraphMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use super::error::code::ErrorCode;
use super::error::GraphMailerError;
use poem::error::ResponseError;
use poem::Body;
use poem::{http::StatusCode, Error, Response};
use tracing::error;

pub mod error;
pub mod log;
pub mod signal;

#[inline]
fn create_graph_mailer_error(message: &str, code: ErrorCode) -> GraphMailerError {
    GraphMailerError::Generic {
        message: message.into(),
        location: snafu::Location::default(),
        code,
    }
}

#[inline]
pub fn create_api_error_response(message: &str, code: ErrorCode) -> Error {
    let graph_mailer_error = create_graph_mailer_error(message, code);
    graph_mailer_error.into()
}

impl ResponseError for GraphMailerError {
    fn status(&self) -> StatusCode {
        match self {
            GraphMailerError::Generic {
                message: _,
                location: _,
                code,
            } => code.status(),
        }
    }

    fn as_response(&self) -> Response
    where
        Self: std::error::Error + Send + Sync + 'static,
    {
        match self {
            GraphMailerError::Generic {
                message,
                location,
                code,
            } => {
                error!(
                    error_code = *code as u32,
                    error_message = %message,
                    error_location = ?location
                );

                let body = Body::from_json(serde_json::json!({
                    "code": *code as u32,
                    "message": message.to_string(),
                }))
                .unwrap();

                Response::builder().status(self.status()).body(body)
            }
        }
    }
}
