// Copyright © 2025 graphmailer.dev
// Licensed under GraphMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::account::entity::Account;
use crate::modules::bus::payload::NotificationEnvelope;
use crate::modules::subscription::{renew_by_id, REAUTHORIZATION_EXTENSION_MINUTES};
use poem::{
    handler,
    http::StatusCode,
    web::Query,
    Body, IntoResponse, Response, Result,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Serialize, Deserialize, Debug)]
pub struct WebhookParams {
    #[serde(rename = "validationToken")]
    validation_token: Option<String>,
}

/// Receives change notifications from the provider.
///
/// Subscription creation starts with a validation handshake: the provider
/// POSTs with a `validationToken` query parameter and expects it echoed back
/// as plain text. Real notifications are acknowledged with 202 and lifecycle
/// events are handled inline.
#[handler]
pub async fn webhook_endpoint(
    Query(params): Query<WebhookParams>,
    body: Body,
) -> Result<impl IntoResponse> {
    if let Some(token) = params.validation_token {
        return Ok(Response::builder()
            .status(StatusCode::OK)
            .content_type("text/plain")
            .body(token));
    }

    let bytes = body.into_vec().await.unwrap_or_default();
    if bytes.is_empty() {
        info!("Received empty webhook body");
        return Ok(StatusCode::ACCEPTED.into_response());
    }

    match serde_json::from_slice::<NotificationEnvelope>(&bytes) {
        Ok(envelope) => {
            for notification in envelope.value {
                info!("New email received or updated: {:?}", notification);
                if !notification.requires_reauthorization() {
                    continue;
                }
                let (Some(subscription_id), Some(client_state)) = (
                    notification.subscription_id.as_deref(),
                    notification.client_state.as_deref(),
                ) else {
                    continue;
                };
                info!(
                    "Received reauthorizationRequired event for subscription: {}",
                    subscription_id
                );
                match Account::find_by_email(client_state).await {
                    Ok(Some(account)) => {
                        if let Err(e) = renew_by_id(
                            account.id,
                            subscription_id,
                            REAUTHORIZATION_EXTENSION_MINUTES,
                        )
                        .await
                        {
                            warn!(
                                "Failed to extend subscription {}: {:?}",
                                subscription_id, e
                            );
                        }
                    }
                    _ => {
                        warn!(
                            "Lifecycle event for unknown clientState; not renewing subscription {}",
                            subscription_id
                        );
                    }
                }
            }
        }
        Err(e) => {
            warn!("Discarding undecodable webhook notification: {:#?}", e);
        }
    }

    // Acknowledge quickly either way; the provider retries on non-2xx.
    Ok(StatusCode::ACCEPTED.into_response())
}
