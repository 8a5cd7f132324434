// Copyright © 2025 graphmailer.dev
// Licensed under GraphMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

pub mod account;
pub mod bus;
pub mod common;
pub mod context;
pub mod database;
pub mod error;
pub mod graph;
pub mod logger;
pub mod message;
pub mod oauth2;
pub mod rest;
pub mod scheduler;
pub mod settings;
pub mod subscription;
pub mod tasks;
pub mod thread;
pub mod upload;
pub mod utils;
