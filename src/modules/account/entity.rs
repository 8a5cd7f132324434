// Copyright © 2025 graphmailer.dev
// Licensed under GraphMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::account::payload::{AccountCreateRequest, AccountUpdateRequest};
use crate::modules::database::{
    delete_impl, insert_impl, manager::DB_MANAGER, paginate_query_primary_scan_all_impl,
    secondary_find_impl, update_impl,
};
use crate::modules::error::{code::ErrorCode, GraphMailerResult};
use crate::modules::rest::response::DataPage;
use crate::{id, raise_error, utc_now, validate_email};
use native_db::*;
use native_model::{native_model, Model};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// A mailbox connected to graphmailer: the user it belongs to and the OAuth2
/// configuration used to authorize Graph API calls on their behalf.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
#[native_model(id = 4, version = 1)]
#[native_db(primary_key(pk -> String))]
pub struct Account {
    /// Unique account identifier
    #[secondary_key(unique)]
    pub id: u64,
    /// Email address associated with this account
    #[secondary_key(unique)]
    pub email: String,
    /// Display name for the account (optional)
    pub name: Option<String>,
    /// The OAuth2 configuration used to authorize this account.
    pub oauth2_id: u64,
    /// Represents the account activation status.
    ///
    /// If this value is `false`, all account-related resources will be unavailable
    /// and any attempts to access them should return an error indicating the account
    /// is inactive.
    pub enabled: bool,
    /// Default number of days of inbox history fetched when a listing request
    /// does not pass its own window.
    pub default_days_since: u32,
    /// Creation timestamp (UNIX epoch milliseconds)
    pub created_at: i64,
    /// Last update timestamp (UNIX epoch milliseconds)
    pub updated_at: i64,
}

impl Account {
    fn pk(&self) -> String {
        format!("{}_{}", self.created_at, self.id)
    }

    pub fn new(request: AccountCreateRequest) -> GraphMailerResult<Self> {
        validate_email!(&request.email)?;
        Ok(Self {
            id: id!(64),
            email: request.email,
            name: request.name,
            oauth2_id: request.oauth2_id,
            enabled: request.enabled,
            default_days_since: request.default_days_since.unwrap_or(100),
            created_at: utc_now!(),
            updated_at: utc_now!(),
        })
    }

    pub async fn save(&self) -> GraphMailerResult<()> {
        insert_impl(DB_MANAGER.meta_db(), self.to_owned()).await
    }

    pub async fn get(id: u64) -> GraphMailerResult<Option<Account>> {
        secondary_find_impl(DB_MANAGER.meta_db(), AccountKey::id, id).await
    }

    pub async fn find_by_email(email: &str) -> GraphMailerResult<Option<Account>> {
        secondary_find_impl(DB_MANAGER.meta_db(), AccountKey::email, email.to_string()).await
    }

    /// Fetch an account and fail if it is missing or disabled.
    pub async fn check_account_active(id: u64) -> GraphMailerResult<Account> {
        let account = Self::get(id).await?.ok_or_else(|| {
            raise_error!(
                format!("Account with id={} not found", id),
                ErrorCode::ResourceNotFound
            )
        })?;
        if !account.enabled {
            return Err(raise_error!(
                format!("Account '{}' is disabled", account.email),
                ErrorCode::PermissionDenied
            ));
        }
        Ok(account)
    }

    pub async fn paginate_list(
        page: Option<u64>,
        page_size: Option<u64>,
        desc: Option<bool>,
    ) -> GraphMailerResult<DataPage<Account>> {
        paginate_query_primary_scan_all_impl(DB_MANAGER.meta_db(), page, page_size, desc)
            .await
            .map(DataPage::from)
    }

    pub async fn update(id: u64, request: AccountUpdateRequest) -> GraphMailerResult<()> {
        update_impl(
            DB_MANAGER.meta_db(),
            move |rw| {
                rw.get()
                    .secondary::<Account>(AccountKey::id, id)
                    .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                    .ok_or_else(|| {
                        raise_error!(
                            format!("The account with id={id} that you want to modify was not found."),
                            ErrorCode::ResourceNotFound
                        )
                    })
            },
            |current| apply_update(current, request),
        )
        .await?;
        Ok(())
    }

    pub async fn delete(id: u64) -> GraphMailerResult<()> {
        delete_impl(DB_MANAGER.meta_db(), move |rw| {
            rw.get()
                .secondary::<Account>(AccountKey::id, id)
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .ok_or_else(|| {
                    raise_error!(
                        format!(
                            "The account with id={id} that you want to delete was not found."
                        ),
                        ErrorCode::ResourceNotFound
                    )
                })
        })
        .await
    }
}

fn apply_update(old: &Account, request: AccountUpdateRequest) -> GraphMailerResult<Account> {
    let mut new = old.clone();
    if request.name.is_some() {
        new.name = request.name;
    }
    if let Some(oauth2_id) = request.oauth2_id {
        new.oauth2_id = oauth2_id;
    }
    if let Some(enabled) = request.enabled {
        new.enabled = enabled;
    }
    if let Some(default_days_since) = request.default_days_since {
        new.default_days_since = default_days_since;
    }
    new.updated_at = utc_now!();
    Ok(new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::account::payload::AccountCreateRequest;

    #[tokio::test]
    async fn create_and_lookup_by_email() {
        let account = Account::new(AccountCreateRequest {
            email: "user@example.com".into(),
            name: Some("User".into()),
            oauth2_id: 42,
            enabled: true,
            default_days_since: None,
        })
        .unwrap();
        let id = account.id;
        account.save().await.unwrap();

        let found = Account::find_by_email("user@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.default_days_since, 100);

        let active = Account::check_account_active(id).await.unwrap();
        assert_eq!(active.email, "user@example.com");
    }

    #[tokio::test]
    async fn rejects_malformed_email() {
        let result = Account::new(AccountCreateRequest {
            email: "not-an-email".into(),
            name: None,
            oauth2_id: 1,
            enabled: true,
            default_days_since: None,
        });
        assert!(result.is_err());
    }
}
