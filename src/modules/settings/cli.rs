// Copyright © 2025 graphmailer.dev
// Licensed under GraphMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use clap::{builder::ValueParser, Parser};
use std::{collections::HashSet, env, path::PathBuf, sync::LazyLock};
use url::Url;

#[cfg(not(test))]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::parse);

#[cfg(test)]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::new_for_test);

#[derive(Debug, Parser)]
#[clap(
    name = "graphmailer",
    about = "A service that connects Microsoft 365 mailboxes to applications via REST,
    handling OAuth2 sign-in, paginated mail retrieval with conversation threading,
    attachment uploads, and webhook subscriptions.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Settings {
    /// graphmailer log level (default: "info")
    #[clap(
        long,
        default_value = "info",
        env,
        help = "Set the log level for graphmailer"
    )]
    pub graphmailer_log_level: String,

    /// graphmailer HTTP port (default: 15700)
    #[clap(
        long,
        default_value = "15700",
        env,
        help = "Set the HTTP port for graphmailer"
    )]
    pub graphmailer_http_port: i32,

    /// The IP address that the server binds to, in IPv4 format (e.g., 192.168.1.1).
    #[clap(
        long,
        env,
        default_value = "0.0.0.0",
        help = "The IP address that the server binds to, in IPv4 format (e.g., 192.168.1.1).",
        value_parser = ValueParser::new(|s: &str| {
            if s.parse::<std::net::Ipv4Addr>().is_err() {
                return Err("The bind IP address must be a valid IPv4 address.".to_string());
            }
            Ok(s.to_string())
        })
    )]
    pub graphmailer_bind_ip: Option<String>,

    /// GraphMailer public URL (default: "http://localhost:15700")
    #[clap(
        long,
        default_value = "http://localhost:15700",
        env,
        help = "Set the public URL for graphmailer (used for OAuth2 redirects and webhook notification URLs)"
    )]
    pub graphmailer_public_url: String,

    /// CORS allowed origins (default: "*")
    #[clap(
        long,
        default_value = "*",
        env,
        help = "Set the allowed CORS origins (comma-separated list, e.g., \"https://example.com, https://another.com\")",
        value_parser = ValueParser::new(|s: &str| -> Result<HashSet<String>, String> {
            let set: HashSet<String> = s.split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect();
            Ok(set)
        })
    )]
    pub graphmailer_cors_origins: HashSet<String>,

    /// CORS max age in seconds (default: 86400)
    #[clap(
        long,
        default_value = "86400",
        env,
        help = "Set the CORS max age in seconds"
    )]
    pub graphmailer_cors_max_age: i32,

    /// Enable ANSI logs (default: true)
    #[clap(long, default_value = "true", env, help = "Enable ANSI formatted logs")]
    pub graphmailer_ansi_logs: bool,

    /// Enable log file output (default: false)
    /// If false, logs will be printed to stdout
    #[clap(
        long,
        default_value = "false",
        env,
        help = "Enable log file output (otherwise logs go to stdout)"
    )]
    pub graphmailer_log_to_file: bool,

    /// Maximum number of log files (default: 5)
    #[clap(
        long,
        default_value = "5",
        env,
        help = "Set the maximum number of server log files"
    )]
    pub graphmailer_max_server_log_files: usize,

    /// graphmailer encryption password
    #[clap(
        long,
        default_value = "change-this-default-password-now",
        env,
        help = "Set the encryption password for stored client secrets and tokens. ⚠️ Change this default in production!"
    )]
    pub graphmailer_encrypt_password: String,

    #[clap(
        long,
        env,
        help = "Set the data directory for graphmailer (database, staged uploads, logs)",
        value_parser = ValueParser::new(|s: &str| {
            let path = PathBuf::from(s);
            if !path.is_absolute() {
                return Err("Path must be an absolute directory path".to_string());
            }
            if !path.exists() {
                return Err(format!("Path {:?} does not exist", path));
            }
            if !path.is_dir() {
                return Err(format!("Path {:?} is not a directory", path));
            }
            Ok(s.to_string())
        })
    )]
    pub graphmailer_root_dir: String,

    #[clap(
        long,
        env,
        default_value = "134217728",
        help = "Set the cache size for the graphmailer metadata database in bytes"
    )]
    pub graphmailer_metadata_cache_size: Option<usize>,

    #[clap(
        long,
        env,
        default_value = "false",
        help = "Keep metadata in memory instead of on disk (ephemeral; intended for tests and demos)"
    )]
    pub graphmailer_metadata_memory_mode_enabled: bool,

    #[clap(
        long,
        default_value = "true",
        env,
        help = "Enable compression for the open api server"
    )]
    pub graphmailer_http_compression_enabled: bool,

    #[clap(
        long,
        env,
        help = "URL to redirect users to after successful OAuth2 authorization",
        value_parser = ValueParser::new(|s: &str| -> Result<String, String> {
            Url::parse(s).map_err(|_| format!("Invalid URL for oauth2_success_redirect: {}", s))?;
            Ok(s.to_string())
        })
    )]
    pub graphmailer_oauth2_success_redirect: Option<String>,

    /// Base URL of the Microsoft Graph API.
    #[clap(
        long,
        default_value = "https://graph.microsoft.com/v1.0",
        env,
        help = "Set the Microsoft Graph API base URL"
    )]
    pub graphmailer_graph_base_url: String,

    #[clap(
        long,
        default_value = "25",
        env,
        help = "Number of messages requested per Graph API page ($top)",
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    pub graphmailer_message_page_size: u8,

    #[clap(
        long,
        default_value = "24",
        env,
        help = "Hours before a staged attachment upload is discarded",
        value_parser = clap::value_parser!(u64).range(1..=720)
    )]
    pub graphmailer_staged_upload_ttl_hours: u64,

    /// Requested lifetime of a mailbox change-notification subscription.
    ///
    /// The Graph API caps message subscriptions at roughly three days, which
    /// is why the default matches that ceiling.
    #[clap(
        long,
        default_value = "4230",
        env,
        help = "Requested subscription lifetime in minutes",
        value_parser = clap::value_parser!(i64).range(10..=4230)
    )]
    pub graphmailer_subscription_lifetime_minutes: i64,

    /// NATS server URL for consuming change notifications (e.g., "nats://127.0.0.1:4222").
    /// The bus consumer is disabled when unset.
    #[clap(
        long,
        env,
        help = "Set the NATS server URL for the change-notification consumer (disabled when unset)"
    )]
    pub graphmailer_nats_url: Option<String>,

    #[clap(
        long,
        default_value = "graphmailer-notifications",
        env,
        help = "Name of the NATS JetStream stream carrying change notifications"
    )]
    pub graphmailer_nats_stream: String,

    #[clap(
        long,
        default_value = "graphmailer.notifications",
        env,
        help = "Subject that change-notification envelopes are published on"
    )]
    pub graphmailer_nats_subject: String,

    #[clap(
        long,
        default_value = "graphmailer",
        env,
        help = "Durable consumer name used by the change-notification consumer"
    )]
    pub graphmailer_nats_consumer: String,

    #[clap(long, env, help = "Token for NATS token authentication")]
    pub graphmailer_nats_token: Option<String>,

    #[clap(long, env, help = "Username for NATS password authentication")]
    pub graphmailer_nats_username: Option<String>,

    #[clap(long, env, help = "Password for NATS password authentication")]
    pub graphmailer_nats_password: Option<String>,
}

impl Settings {
    #[cfg(test)]
    fn new_for_test() -> Self {
        Self {
            graphmailer_log_level: "info".to_string(),
            graphmailer_http_port: 15700,
            graphmailer_bind_ip: Default::default(),
            graphmailer_public_url: "http://localhost:15700".to_string(),
            graphmailer_cors_origins: Default::default(),
            graphmailer_cors_max_age: 86400,
            graphmailer_ansi_logs: false,
            graphmailer_log_to_file: false,
            graphmailer_max_server_log_files: 5,
            graphmailer_encrypt_password: "change-this-default-password-now".into(),
            graphmailer_root_dir: env::temp_dir()
                .join("graphmailer_test_data")
                .to_string_lossy()
                .into_owned(),
            graphmailer_metadata_cache_size: None,
            graphmailer_metadata_memory_mode_enabled: true,
            graphmailer_http_compression_enabled: true,
            graphmailer_oauth2_success_redirect: None,
            graphmailer_graph_base_url: "https://graph.microsoft.com/v1.0".to_string(),
            graphmailer_message_page_size: 25,
            graphmailer_staged_upload_ttl_hours: 24,
            graphmailer_subscription_lifetime_minutes: 4230,
            graphmailer_nats_url: None,
            graphmailer_nats_stream: "graphmailer-notifications".to_string(),
            graphmailer_nats_subject: "graphmailer.notifications".to_string(),
            graphmailer_nats_consumer: "graphmailer".to_string(),
            graphmailer_nats_token: None,
            graphmailer_nats_username: None,
            graphmailer_nats_password: None,
        }
    }
}
