use poem_openapi::Object;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct AccountCreateRequest {
    /// Email address of the mailbox being connected.
    pub email: String,
    /// Display name for the account (optional).
    pub name: Option<String>,
    /// The OAuth2 configuration this account authorizes against.
    pub oauth2_id: u64,
    /// Whether the account is active upon creation.
    pub enabled: bool,
    /// Default number of days of inbox history fetched for this account.
    pub default_days_since: Option<u32>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct AccountUpdateRequest {
    /// Display name for the account (optional).
    pub name: Option<String>,
    /// The OAuth2 configuration this account authorizes against.
    pub oauth2_id: Option<u64>,
    /// Whether the account is active.
    pub enabled: Option<bool>,
    /// Default number of days of inbox history fetched for this account.
    pub default_days_since: Option<u32>,
}
