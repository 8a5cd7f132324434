// Copyright © 2025 graphmailer.dev
// Licensed under GraphMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::GraphMailerResult;

pub trait Initialize {
    async fn initialize() -> GraphMailerResult<()>;
}

pub trait GraphMailerTask {
    fn start();
}
