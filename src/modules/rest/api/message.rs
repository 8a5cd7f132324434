// Copyright © 2025 graphmailer.dev
// Licensed under GraphMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::graph::messages::GraphMessage;
use crate::modules::message::list::{fetch_message, list_inbox_messages, list_inbox_threads};
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;
use crate::modules::thread::MessageThread;
use poem::web::Path;
use poem_openapi::param::Query;
use poem_openapi::payload::Json;
use poem_openapi::{Object, OpenApi, Union};

pub struct MessageApi;

#[derive(Debug, Clone, Object)]
pub struct FlatListing {
    /// All messages in the requested window, in provider order.
    pub messages: Vec<GraphMessage>,
}

#[derive(Debug, Clone, Object)]
pub struct ThreadedListing {
    /// Conversation threads reconstructed from message headers, ordered by
    /// first appearance of each thread.
    pub threads: Vec<MessageThread>,
}

/// An inbox listing: flat by default, grouped into conversation threads
/// when `group_by_thread=true` is passed.
#[derive(Debug, Clone, Union)]
pub enum MessageListing {
    Flat(FlatListing),
    Threaded(ThreadedListing),
}

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::Message")]
impl MessageApi {
    /// Lists inbox messages for an account.
    ///
    /// Follows the provider's pagination cursor until the whole window has
    /// been fetched, so the response is the complete listing rather than a
    /// single page. With `group_by_thread=true` the flat list is grouped
    /// into conversation threads via `Message-ID`/`References` headers.
    #[oai(
        path = "/messages/:account_id",
        method = "get",
        operation_id = "list_messages"
    )]
    async fn list_messages(
        &self,
        /// The ID of the account whose inbox is listed
        account_id: Path<u64>,
        /// Optional. How many days of history to fetch (defaults to the account setting).
        days_since: Query<Option<u32>>,
        /// Optional. Group the listing into conversation threads.
        group_by_thread: Query<Option<bool>>,
    ) -> ApiResult<Json<MessageListing>> {
        let account_id = account_id.0;
        if group_by_thread.0.unwrap_or(false) {
            let threads = list_inbox_threads(account_id, days_since.0).await?;
            Ok(Json(MessageListing::Threaded(ThreadedListing { threads })))
        } else {
            let messages = list_inbox_messages(account_id, days_since.0).await?;
            Ok(Json(MessageListing::Flat(FlatListing { messages })))
        }
    }

    /// Retrieves a single message by its provider id.
    #[oai(
        path = "/messages/:account_id/:message_id",
        method = "get",
        operation_id = "get_message"
    )]
    async fn get_message(
        &self,
        /// The ID of the account owning the message
        account_id: Path<u64>,
        /// The provider id of the message
        message_id: Path<String>,
    ) -> ApiResult<Json<GraphMessage>> {
        Ok(Json(fetch_message(account_id.0, &message_id.0).await?))
    }
}
