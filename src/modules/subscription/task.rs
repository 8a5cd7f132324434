use crate::modules::account::entity::Account;
use crate::modules::context::GraphMailerTask;
use crate::modules::database::{list_all_impl, manager::DB_MANAGER};
use crate::modules::scheduler::periodic::PeriodicTask;
use crate::modules::subscription::renew_expiring;
use std::time::Duration;
use tracing::{debug, warn};

const TASK_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Walks all active accounts and extends their change-notification
/// subscriptions before the provider lets them lapse.
pub struct SubscriptionRenewTask;

impl GraphMailerTask for SubscriptionRenewTask {
    fn start() {
        let periodic_task = PeriodicTask::new("subscription-renew-task");

        let task = move |_: Option<u64>| {
            Box::pin(async move {
                let accounts: Vec<Account> = list_all_impl(DB_MANAGER.meta_db()).await?;
                for account in accounts.into_iter().filter(|a| a.enabled) {
                    match renew_expiring(account.id).await {
                        Ok(0) => {
                            debug!("No subscriptions near expiry for account {}", account.id)
                        }
                        Ok(count) => {
                            debug!("Renewed {} subscriptions for account {}", count, account.id)
                        }
                        Err(e) => {
                            // Accounts without a completed OAuth2 flow land here; skip them.
                            warn!(
                                "Subscription renewal skipped for account {}: {:?}",
                                account.id, e
                            );
                        }
                    }
                }
                Ok(())
            })
        };

        periodic_task.start(task, None, TASK_INTERVAL, false, false);
    }
}
