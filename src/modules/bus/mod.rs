// Copyright © 2025 graphmailer.dev
// Licensed under GraphMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::{
    modules::error::{code::ErrorCode, GraphMailerResult},
    modules::settings::cli::SETTINGS,
    raise_error,
};
use async_nats::jetstream::{self, stream::Stream};

pub mod consumer;
pub mod payload;

/// Connection settings for the change-notification bus, assembled from the
/// process configuration. `None` when no NATS URL is configured.
#[derive(Clone, Debug)]
pub struct NatsConfig {
    pub url: String,
    pub stream_name: String,
    pub subject: String,
    pub consumer_name: String,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl NatsConfig {
    pub fn from_settings() -> Option<Self> {
        SETTINGS.graphmailer_nats_url.clone().map(|url| Self {
            url,
            stream_name: SETTINGS.graphmailer_nats_stream.clone(),
            subject: SETTINGS.graphmailer_nats_subject.clone(),
            consumer_name: SETTINGS.graphmailer_nats_consumer.clone(),
            token: SETTINGS.graphmailer_nats_token.clone(),
            username: SETTINGS.graphmailer_nats_username.clone(),
            password: SETTINGS.graphmailer_nats_password.clone(),
        })
    }

    /// Connect and make sure the notification stream exists.
    pub async fn connect(&self) -> GraphMailerResult<Stream> {
        let client = match (&self.token, &self.username, &self.password) {
            (Some(token), _, _) => {
                async_nats::connect_with_options(
                    &self.url,
                    async_nats::ConnectOptions::new().token(token.clone()),
                )
                .await
                .map_err(|error| {
                    raise_error!(
                        format!(
                            "Failed to connect to NATS server at {} with token authentication. Error: {}",
                            self.url, error
                        ),
                        ErrorCode::NatsConnectionFailed
                    )
                })?
            }
            (None, Some(username), Some(password)) => {
                async_nats::connect_with_options(
                    &self.url,
                    async_nats::ConnectOptions::new()
                        .user_and_password(username.clone(), password.clone()),
                )
                .await
                .map_err(|error| {
                    raise_error!(
                        format!(
                            "Failed to connect to NATS server at {} with username/password authentication. Error: {}",
                            self.url, error
                        ),
                        ErrorCode::NatsConnectionFailed
                    )
                })?
            }
            _ => async_nats::connect(&self.url).await.map_err(|error| {
                raise_error!(
                    format!(
                        "Failed to connect to NATS server at {} without authentication. Error: {}",
                        self.url, error
                    ),
                    ErrorCode::NatsConnectionFailed
                )
            })?,
        };

        let jetstream = jetstream::new(client);
        jetstream
            .get_or_create_stream(jetstream::stream::Config {
                name: self.stream_name.clone(),
                subjects: vec![self.subject.clone()],
                ..Default::default()
            })
            .await
            .map_err(|error| {
                raise_error!(
                    format!(
                        "Failed to create NATS stream '{}' for subject '{}'. Error: {}",
                        self.stream_name, self.subject, error
                    ),
                    ErrorCode::NatsCreateStreamFailed
                )
            })
    }
}
