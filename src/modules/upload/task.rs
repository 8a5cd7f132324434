use crate::modules::{
    context::GraphMailerTask, scheduler::periodic::PeriodicTask, upload::entity::StagedUpload,
};
use std::time::Duration;

const TASK_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Removes staged attachment uploads that were never sent within the TTL.
pub struct StagedUploadCleanTask;

impl GraphMailerTask for StagedUploadCleanTask {
    fn start() {
        let periodic_task = PeriodicTask::new("staged-upload-cleaner");

        let task = move |_: Option<u64>| {
            Box::pin(async move {
                StagedUpload::clean().await?;
                Ok(())
            })
        };

        periodic_task.start(task, None, TASK_INTERVAL, false, false);
    }
}
