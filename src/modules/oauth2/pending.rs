// Copyright © 2025 graphmailer.dev
// Licensed under GraphMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::{
    modules::{
        database::{async_find_impl, batch_delete_impl, delete_impl, insert_impl, manager::DB_MANAGER},
        error::{code::ErrorCode, GraphMailerResult},
    },
    raise_error, utc_now,
};
use itertools::Itertools;
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};

const EXPIRATION_DURATION_MS: i64 = 24 * 60 * 60 * 1000;

/// An authorization attempt waiting for the provider to redirect back.
/// Keyed by the CSRF state so the callback can recover the PKCE verifier.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[native_model(id = 2, version = 1)]
#[native_db]
pub struct OAuth2Pending {
    /// Unique identifier for the OAuth2 request record
    pub oauth2_id: u64,

    pub account_id: u64,
    /// CSRF protection state parameter used to verify the integrity of the authorization request
    #[primary_key]
    pub state: String,

    /// PKCE code verifier used in the authorization code exchange process to ensure security
    pub code_verifier: String,

    /// Timestamp when the OAuth2 request was created, used to determine request expiration
    pub created_at: i64,
}

impl OAuth2Pending {
    pub fn new(oauth2_id: u64, account_id: u64, state: String, code_verifier: String) -> Self {
        Self {
            oauth2_id,
            account_id,
            state,
            code_verifier,
            created_at: utc_now!(),
        }
    }

    pub async fn save(self) -> GraphMailerResult<()> {
        insert_impl(DB_MANAGER.meta_db(), self).await
    }

    pub async fn delete(state: &str) -> GraphMailerResult<()> {
        let state = state.to_string();
        delete_impl(DB_MANAGER.meta_db(), move |rw| {
            rw.get().primary::<OAuth2Pending>(state.clone())
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
            .ok_or_else(|| raise_error!(format!(
                "The oauth2 pending entity with state={state} that you want to delete was not found."
            ), ErrorCode::ResourceNotFound))
        }).await
    }

    pub async fn clean() -> GraphMailerResult<()> {
        batch_delete_impl(DB_MANAGER.meta_db(), |rw| {
            let all: Vec<OAuth2Pending> = rw
                .scan()
                .primary()
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .all()
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .try_collect()
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;

            let now = utc_now!();
            let to_delete: Vec<OAuth2Pending> = all
                .into_iter()
                .filter(|e| now - e.created_at > EXPIRATION_DURATION_MS)
                .collect();
            Ok(to_delete)
        })
        .await?;
        Ok(())
    }

    pub async fn get(state: &str) -> GraphMailerResult<Option<OAuth2Pending>> {
        let entity =
            async_find_impl::<OAuth2Pending>(DB_MANAGER.meta_db(), state.to_string()).await?;

        match entity {
            Some(entity) => {
                let state = state.to_string();
                if utc_now!() - entity.created_at > EXPIRATION_DURATION_MS {
                    delete_impl(DB_MANAGER.meta_db(), move |rw| {
                        rw.get()
                            .primary::<OAuth2Pending>(state)
                            .map_err(|e| {
                                raise_error!(format!("{:#?}", e), ErrorCode::InternalError)
                            })?
                            .ok_or_else(|| {
                                raise_error!(
                                    "OAuth2 pending entity not found".into(),
                                    ErrorCode::ResourceNotFound
                                )
                            })
                    })
                    .await?;
                    return Ok(None);
                }
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OAuth2Pending;

    #[tokio::test]
    async fn pending_state_round_trip() {
        let pending = OAuth2Pending::new(7, 11, "csrf-state-1".into(), "verifier-1".into());
        pending.save().await.unwrap();

        let loaded = OAuth2Pending::get("csrf-state-1").await.unwrap().unwrap();
        assert_eq!(loaded.oauth2_id, 7);
        assert_eq!(loaded.account_id, 11);
        assert_eq!(loaded.code_verifier, "verifier-1");

        OAuth2Pending::delete("csrf-state-1").await.unwrap();
        assert!(OAuth2Pending::get("csrf-state-1").await.unwrap().is_none());
    }
}
