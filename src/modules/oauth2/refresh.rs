// Copyright © 2025 graphmailer.dev
// Licensed under GraphMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::context::GraphMailerTask;
use crate::modules::oauth2::{flow::OAuth2Flow, token::OAuth2AccessToken};
use crate::modules::scheduler::periodic::PeriodicTask;
use crate::utc_now;
use std::time::Duration;
use tracing::{debug, error, info};

const TASK_INTERVAL: Duration = Duration::from_secs(60);
const FIFTEEN_MINUTES: Duration = Duration::from_secs(15 * 60);

/// Keeps stored access tokens fresh by exchanging refresh tokens before the
/// provider expires them. Graph access tokens live about an hour, so any
/// token untouched for fifteen minutes gets refreshed proactively.
pub struct OAuth2RefreshTask;

impl GraphMailerTask for OAuth2RefreshTask {
    fn start() {
        let periodic_task = PeriodicTask::new("oauth2-token-refresh-task");

        let task = move |_: Option<u64>| {
            Box::pin(async move {
                debug!("Starting OAuth2 token refresh task");

                match OAuth2AccessToken::list_all().await {
                    Ok(all_tokens) => {
                        let need_refresh: Vec<OAuth2AccessToken> = all_tokens
                            .into_iter()
                            .filter(|token| {
                                (utc_now!() - token.updated_at)
                                    > FIFTEEN_MINUTES.as_millis() as i64
                            })
                            .collect();

                        if need_refresh.is_empty() {
                            debug!("No expired tokens need to be refreshed.");
                        } else {
                            debug!(
                                "Found {} tokens that need to be refreshed",
                                need_refresh.len()
                            );
                            for token in need_refresh {
                                tokio::spawn(async move {
                                    let flow = OAuth2Flow::new(token.oauth2_id);
                                    if let Err(error) = flow.refresh_access_token(&token).await {
                                        error!(
                                            "Failed to refresh access token for {}: {}",
                                            token.account_id, error
                                        );
                                    } else {
                                        info!(
                                            "Successfully refreshed access token for {}",
                                            token.account_id
                                        );
                                    }
                                });
                            }
                        }
                    }
                    Err(e) => {
                        error!("Failed to fetch OAuth2 tokens: {:?}", e);
                    }
                }

                debug!("OAuth2 token refresh task completed");
                Ok(())
            })
        };

        periodic_task.start(task, None, TASK_INTERVAL, false, true);
    }
}
