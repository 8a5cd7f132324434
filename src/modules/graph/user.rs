use crate::modules::error::GraphMailerResult;
use crate::modules::graph::GraphClient;
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// The signed-in user as reported by `GET /me`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub mail: Option<String>,
    pub user_principal_name: Option<String>,
}

impl UserProfile {
    /// The address mail is delivered to. Personal accounts often leave
    /// `mail` unset, in which case the principal name is the mailbox.
    pub fn mailbox_address(&self) -> Option<String> {
        self.mail
            .clone()
            .or_else(|| self.user_principal_name.clone())
    }
}

impl GraphClient {
    pub async fn me(&self) -> GraphMailerResult<UserProfile> {
        self.get_json("/me").await
    }
}
