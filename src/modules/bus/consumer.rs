use crate::modules::account::entity::Account;
use crate::modules::bus::payload::{ChangeNotification, NotificationEnvelope};
use crate::modules::bus::NatsConfig;
use crate::modules::common::signal::SIGNAL_MANAGER;
use crate::modules::error::{code::ErrorCode, GraphMailerResult};
use crate::modules::message::list::fetch_message;
use crate::modules::subscription::{renew_by_id, REAUTHORIZATION_EXTENSION_MINUTES};
use crate::raise_error;
use async_nats::jetstream::consumer::{pull, PullConsumer};
use futures::StreamExt;
use tracing::{debug, error, info, warn};

/// Long-lived consumer of change-notification envelopes published on the
/// bus, the alternative to receiving them on the public webhook endpoint.
pub struct BusConsumer;

impl BusConsumer {
    pub fn start_if_configured() {
        let Some(config) = NatsConfig::from_settings() else {
            info!("No NATS URL configured; change-notification consumer disabled");
            return;
        };
        tokio::spawn(async move {
            if let Err(e) = Self::run(config).await {
                error!("Change-notification consumer stopped: {:?}", e);
            }
        });
    }

    async fn run(config: NatsConfig) -> GraphMailerResult<()> {
        let stream = config.connect().await?;
        let consumer: PullConsumer = stream
            .get_or_create_consumer(
                &config.consumer_name,
                pull::Config {
                    durable_name: Some(config.consumer_name.clone()),
                    filter_subject: config.subject.clone(),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::NatsConsumeFailed))?;

        let mut messages = consumer
            .messages()
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::NatsConsumeFailed))?;
        let mut shutdown = SIGNAL_MANAGER.subscribe();
        info!(
            "Consuming change notifications from stream '{}' (subject '{}')",
            config.stream_name, config.subject
        );

        loop {
            tokio::select! {
                message = messages.next() => {
                    match message {
                        Some(Ok(message)) => {
                            Self::handle_envelope(&message.payload).await;
                            if let Err(e) = message.ack().await {
                                warn!("Failed to ack bus message: {:#?}", e);
                            }
                        }
                        Some(Err(e)) => {
                            warn!("Error receiving bus message: {:#?}", e);
                        }
                        None => {
                            warn!("Bus message stream closed");
                            break;
                        }
                    }
                }
                _ = shutdown.recv() => {
                    info!("Change-notification consumer shutting down");
                    break;
                }
            }
        }
        Ok(())
    }

    async fn handle_envelope(payload: &[u8]) {
        let envelope: NotificationEnvelope = match serde_json::from_slice(payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Discarding undecodable notification envelope: {:#?}", e);
                return;
            }
        };
        if envelope.value.is_empty() {
            debug!("Received empty notification envelope");
            return;
        }
        for notification in envelope.value {
            if let Err(e) = Self::dispatch(&notification).await {
                warn!(
                    "Failed to process notification for subscription {:?}: {:?}",
                    notification.subscription_id, e
                );
            }
        }
    }

    async fn dispatch(notification: &ChangeNotification) -> GraphMailerResult<()> {
        if notification.requires_reauthorization() {
            let account = Self::account_for(notification).await?;
            let subscription_id = notification.subscription_id.as_deref().ok_or_else(|| {
                raise_error!(
                    "Lifecycle notification without a subscription id".into(),
                    ErrorCode::InvalidParameter
                )
            })?;
            info!(
                "Reauthorization required for subscription {}; extending expiration",
                subscription_id
            );
            renew_by_id(account.id, subscription_id, REAUTHORIZATION_EXTENSION_MINUTES).await?;
            return Ok(());
        }

        if notification.is_message() {
            let account = Self::account_for(notification).await?;
            let Some(message_id) = notification
                .resource_data
                .as_ref()
                .and_then(|data| data.id.clone())
            else {
                debug!("Message notification without a resource id; ignored");
                return Ok(());
            };
            let message = fetch_message(account.id, &message_id).await?;
            info!(
                "Change notification for account {}: message {:?} ({:?})",
                account.id, message.id, message.subject
            );
            return Ok(());
        }

        debug!(
            "Ignoring notification with no actionable resource (subscription {:?})",
            notification.subscription_id
        );
        Ok(())
    }

    /// Resolve the account a notification belongs to via its `clientState`.
    /// A notification whose state matches no account is not acted upon.
    async fn account_for(notification: &ChangeNotification) -> GraphMailerResult<Account> {
        let client_state = notification.client_state.as_deref().ok_or_else(|| {
            raise_error!(
                "Notification carries no clientState; refusing to act on it".into(),
                ErrorCode::PermissionDenied
            )
        })?;
        Account::find_by_email(client_state).await?.ok_or_else(|| {
            raise_error!(
                format!("No account matches clientState '{}'", client_state),
                ErrorCode::ResourceNotFound
            )
        })
    }
}
