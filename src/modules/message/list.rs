use crate::modules::{
    account::entity::Account,
    error::GraphMailerResult,
    graph::{
        messages::{inbox_messages_url, GraphMessage},
        GraphClient,
    },
    settings::cli::SETTINGS,
    thread::{group_into_threads, MessageThread},
};
use chrono::{Duration, Utc};
use tracing::debug;

/// Fetch the full inbox window for an account, following the provider's
/// pagination cursor until it runs out. The result is the concatenated flat
/// list; grouping happens afterwards, never mid-pagination.
pub async fn list_inbox_messages(
    account_id: u64,
    days_since: Option<u32>,
) -> GraphMailerResult<Vec<GraphMessage>> {
    let account = Account::check_account_active(account_id).await?;
    let client = GraphClient::for_account(&account).await?;

    let days = days_since.unwrap_or(account.default_days_since);
    let since = Utc::now() - Duration::days(days as i64);

    let mut messages = Vec::new();
    let mut next_url = Some(inbox_messages_url(
        since,
        SETTINGS.graphmailer_message_page_size,
    ));
    let mut pages = 0usize;
    while let Some(url) = next_url {
        let page = client.list_messages_page(&url).await?;
        pages += 1;
        messages.extend(page.value);
        next_url = page.next_link;
    }
    debug!(
        "Fetched {} inbox messages over {} pages for account {}",
        messages.len(),
        pages,
        account_id
    );
    Ok(messages)
}

/// The grouped variant of the inbox listing: same fetch, then conversation
/// threads reconstructed from message headers.
pub async fn list_inbox_threads(
    account_id: u64,
    days_since: Option<u32>,
) -> GraphMailerResult<Vec<MessageThread>> {
    let messages = list_inbox_messages(account_id, days_since).await?;
    Ok(group_into_threads(messages))
}

/// Fetch a single message by its provider id. Also used by the bus consumer
/// when a change notification points at a message.
pub async fn fetch_message(account_id: u64, message_id: &str) -> GraphMailerResult<GraphMessage> {
    let account = Account::check_account_active(account_id).await?;
    let client = GraphClient::for_account(&account).await?;
    client.get_message(message_id).await
}
