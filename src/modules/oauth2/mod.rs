// Copyright © 2025 graphmailer.dev
// Licensed under GraphMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

pub mod entity;
pub mod flow;
pub mod pending;
pub mod refresh;
pub mod task;
pub mod token;
