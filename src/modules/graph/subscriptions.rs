use crate::modules::error::GraphMailerResult;
use crate::modules::graph::GraphClient;
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// A change-notification subscription as the Graph API reports it.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Option<String>,
    pub resource: Option<String>,
    pub change_type: Option<String>,
    pub notification_url: Option<String>,
    pub lifecycle_notification_url: Option<String>,
    pub expiration_date_time: Option<String>,
    pub client_state: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionCreate {
    pub change_type: String,
    pub notification_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifecycle_notification_url: Option<String>,
    pub resource: String,
    pub expiration_date_time: String,
    pub client_state: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRenew {
    pub expiration_date_time: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SubscriptionPage {
    #[serde(default)]
    pub value: Vec<Subscription>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

impl GraphClient {
    pub async fn create_subscription(
        &self,
        request: &SubscriptionCreate,
    ) -> GraphMailerResult<Subscription> {
        self.post_json("/subscriptions", request).await
    }

    /// One page of the subscription listing; pass the previous page's
    /// `next_link` to continue.
    pub async fn list_subscriptions_page(
        &self,
        url: Option<&str>,
    ) -> GraphMailerResult<SubscriptionPage> {
        self.get_json(url.unwrap_or("/subscriptions")).await
    }

    pub async fn renew_subscription(
        &self,
        subscription_id: &str,
        expiration_date_time: String,
    ) -> GraphMailerResult<Subscription> {
        self.patch_json(
            &format!("/subscriptions/{}", urlencoding::encode(subscription_id)),
            &SubscriptionRenew {
                expiration_date_time,
            },
        )
        .await
    }

    pub async fn delete_subscription(&self, subscription_id: &str) -> GraphMailerResult<()> {
        self.delete(&format!(
            "/subscriptions/{}",
            urlencoding::encode(subscription_id)
        ))
        .await
    }
}
