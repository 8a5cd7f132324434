// Copyright © 2025 graphmailer.dev
// Licensed under GraphMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::context::GraphMailerTask;
use crate::modules::oauth2::{refresh::OAuth2RefreshTask, task::OAuth2CleanTask};
use crate::modules::subscription::task::SubscriptionRenewTask;
use crate::modules::upload::task::StagedUploadCleanTask;

pub struct PeriodicTasks;

impl PeriodicTasks {
    pub fn start_background_tasks() {
        OAuth2CleanTask::start();
        OAuth2RefreshTask::start();
        SubscriptionRenewTask::start();
        StagedUploadCleanTask::start();
    }
}
