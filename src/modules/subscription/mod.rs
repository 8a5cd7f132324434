// Copyright © 2025 graphmailer.dev
// Licensed under GraphMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::account::entity::Account;
use crate::modules::error::{code::ErrorCode, GraphMailerResult};
use crate::modules::graph::subscriptions::{Subscription, SubscriptionCreate};
use crate::modules::graph::GraphClient;
use crate::modules::settings::cli::SETTINGS;
use crate::raise_error;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub mod task;

/// Subscriptions expiring within this window get extended by the renewal
/// pass rather than being left to lapse.
pub const RENEWAL_WINDOW_HOURS: i64 = 24;

/// Minutes a subscription gets extended by when the provider asks for
/// reauthorization through a lifecycle event.
pub const REAUTHORIZATION_EXTENSION_MINUTES: i64 = 24 * 60;

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct SubscribeRequest {
    /// Where the provider delivers change notifications. Defaults to this
    /// instance's public `/webhook` endpoint; an `EventHub:`/bridge URL can
    /// be passed instead to route notifications onto a bus.
    pub notification_url: Option<String>,
}

pub(crate) fn expiration_from_now(minutes: i64) -> String {
    (Utc::now() + Duration::minutes(minutes)).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Whether an RFC 3339 expiration falls within `hours` from now. Anything
/// unparsable counts as expiring, so a renewal is attempted rather than the
/// subscription silently lapsing.
pub(crate) fn expires_within(expiration: Option<&str>, hours: i64) -> bool {
    match expiration.and_then(|raw| DateTime::parse_from_rfc3339(raw).ok()) {
        Some(expiration) => expiration.with_timezone(&Utc) - Utc::now() < Duration::hours(hours),
        None => true,
    }
}

/// Create a mailbox change-notification subscription for an account. The
/// `clientState` is set to the mailbox address so downstream consumers can
/// verify a notification really belongs to the account they act for.
pub async fn create_for_account(
    account_id: u64,
    request: SubscribeRequest,
) -> GraphMailerResult<Subscription> {
    let account = Account::check_account_active(account_id).await?;
    let client = GraphClient::for_account(&account).await?;

    let profile = client.me().await?;
    let client_state = profile.mailbox_address().unwrap_or(account.email);
    let notification_url = request
        .notification_url
        .unwrap_or_else(|| format!("{}/webhook", SETTINGS.graphmailer_public_url));

    let subscription = client
        .create_subscription(&SubscriptionCreate {
            change_type: "created,updated".into(),
            notification_url: notification_url.clone(),
            lifecycle_notification_url: Some(notification_url),
            resource: "me/messages".into(),
            expiration_date_time: expiration_from_now(
                SETTINGS.graphmailer_subscription_lifetime_minutes,
            ),
            client_state,
        })
        .await?;
    info!(
        "Subscription created for account {}: {:?}",
        account_id, subscription.id
    );
    Ok(subscription)
}

/// All subscriptions visible to the account, pagination cursor followed.
pub async fn list_for_account(account_id: u64) -> GraphMailerResult<Vec<Subscription>> {
    let account = Account::check_account_active(account_id).await?;
    let client = GraphClient::for_account(&account).await?;

    let mut subscriptions = Vec::new();
    let mut next_url: Option<String> = None;
    loop {
        let page = client.list_subscriptions_page(next_url.as_deref()).await?;
        subscriptions.extend(page.value);
        match page.next_link {
            Some(link) => next_url = Some(link),
            None => break,
        }
    }
    Ok(subscriptions)
}

/// Extend every subscription of the account that is close to expiry.
/// Returns the number of successfully renewed subscriptions.
pub async fn renew_expiring(account_id: u64) -> GraphMailerResult<usize> {
    let account = Account::check_account_active(account_id).await?;
    let client = GraphClient::for_account(&account).await?;

    let mut renewed = 0usize;
    let mut next_url: Option<String> = None;
    loop {
        let page = client.list_subscriptions_page(next_url.as_deref()).await?;
        for subscription in page.value {
            if !expires_within(subscription.expiration_date_time.as_deref(), RENEWAL_WINDOW_HOURS)
            {
                continue;
            }
            let Some(subscription_id) = subscription.id.as_deref() else {
                continue;
            };
            let expiration =
                expiration_from_now(SETTINGS.graphmailer_subscription_lifetime_minutes);
            match client.renew_subscription(subscription_id, expiration).await {
                Ok(renewed_subscription) => {
                    renewed += 1;
                    info!(
                        "Subscription {} renewed until {:?}",
                        subscription_id, renewed_subscription.expiration_date_time
                    );
                }
                Err(e) => {
                    warn!("Error renewing subscription {}: {:?}", subscription_id, e);
                }
            }
        }
        match page.next_link {
            Some(link) => next_url = Some(link),
            None => break,
        }
    }
    Ok(renewed)
}

/// Extend one subscription by `minutes` from now. Used by the REST renew
/// endpoint and by `reauthorizationRequired` lifecycle events.
pub async fn renew_by_id(
    account_id: u64,
    subscription_id: &str,
    minutes: i64,
) -> GraphMailerResult<Subscription> {
    if subscription_id.is_empty() {
        return Err(raise_error!(
            "subscription id must not be empty".into(),
            ErrorCode::InvalidParameter
        ));
    }
    let account = Account::check_account_active(account_id).await?;
    let client = GraphClient::for_account(&account).await?;
    client
        .renew_subscription(subscription_id, expiration_from_now(minutes))
        .await
        .map_err(|e| match e {
            crate::modules::error::GraphMailerError::Generic { message, .. } => raise_error!(
                format!("Subscription renewal failed: {}", message),
                ErrorCode::SubscriptionRenewFailed
            ),
        })
}

#[cfg(test)]
mod tests {
    use super::{expiration_from_now, expires_within};
    use chrono::{DateTime, Duration, SecondsFormat, Utc};

    #[test]
    fn expiration_is_rfc3339_in_the_future() {
        let raw = expiration_from_now(4230);
        let parsed = DateTime::parse_from_rfc3339(&raw).unwrap();
        assert!(parsed.with_timezone(&Utc) > Utc::now());
    }

    #[test]
    fn near_expiry_is_detected() {
        let soon = (Utc::now() + Duration::hours(2)).to_rfc3339_opts(SecondsFormat::Millis, true);
        let far = (Utc::now() + Duration::hours(48)).to_rfc3339_opts(SecondsFormat::Millis, true);
        assert!(expires_within(Some(soon.as_str()), 24));
        assert!(!expires_within(Some(far.as_str()), 24));
    }

    #[test]
    fn unparsable_expiration_counts_as_expiring() {
        assert!(expires_within(Some("not-a-date"), 24));
        assert!(expires_within(None, 24));
    }
}
