use crate::modules::graph::subscriptions::Subscription;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;
use crate::modules::settings::cli::SETTINGS;
use crate::modules::subscription::{
    create_for_account, list_for_account, renew_by_id, renew_expiring, SubscribeRequest,
};
use poem::web::Path;
use poem_openapi::payload::Json;
use poem_openapi::{Object, OpenApi};

pub struct SubscriptionApi;

#[derive(Debug, Clone, Object)]
pub struct RenewSummary {
    /// How many subscriptions were extended by this renewal pass.
    pub renewed: u64,
}

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::Subscription")]
impl SubscriptionApi {
    /// Creates a mailbox change-notification subscription for an account.
    ///
    /// `clientState` is set to the mailbox address so notification consumers
    /// can verify origin. The notification URL defaults to this instance's
    /// public `/webhook` endpoint.
    #[oai(
        path = "/subscribe/:account_id",
        method = "post",
        operation_id = "create_subscription"
    )]
    async fn create_subscription(
        &self,
        /// The ID of the account to subscribe for
        account_id: Path<u64>,
        /// Optional overrides for the subscription
        request: Json<SubscribeRequest>,
    ) -> ApiResult<Json<Subscription>> {
        Ok(Json(create_for_account(account_id.0, request.0).await?))
    }

    /// Lists the change-notification subscriptions visible to an account.
    #[oai(
        path = "/subscriptions/:account_id",
        method = "get",
        operation_id = "list_subscriptions"
    )]
    async fn list_subscriptions(
        &self,
        /// The ID of the account whose subscriptions are listed
        account_id: Path<u64>,
    ) -> ApiResult<Json<Vec<Subscription>>> {
        Ok(Json(list_for_account(account_id.0).await?))
    }

    /// Extends every subscription of the account that is close to expiry.
    #[oai(
        path = "/subscriptions/:account_id/renew",
        method = "post",
        operation_id = "renew_subscriptions"
    )]
    async fn renew_subscriptions(
        &self,
        /// The ID of the account whose subscriptions are renewed
        account_id: Path<u64>,
    ) -> ApiResult<Json<RenewSummary>> {
        let renewed = renew_expiring(account_id.0).await? as u64;
        Ok(Json(RenewSummary { renewed }))
    }

    /// Extends a single subscription by the configured lifetime.
    #[oai(
        path = "/subscriptions/:account_id/:subscription_id/renew",
        method = "post",
        operation_id = "renew_subscription"
    )]
    async fn renew_subscription(
        &self,
        /// The ID of the account owning the subscription
        account_id: Path<u64>,
        /// The provider id of the subscription
        subscription_id: Path<String>,
    ) -> ApiResult<Json<Subscription>> {
        Ok(Json(
            renew_by_id(
                account_id.0,
                &subscription_id.0,
                SETTINGS.graphmailer_subscription_lifetime_minutes,
            )
            .await?,
        ))
    }
}
