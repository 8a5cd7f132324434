// Copyright © 2025 graphmailer.dev
// Licensed under GraphMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::database::{
    async_find_impl, batch_delete_impl, delete_impl, filter_by_secondary_key_impl, insert_impl,
    manager::DB_MANAGER,
};
use crate::modules::error::{code::ErrorCode, GraphMailerResult};
use crate::modules::settings::cli::SETTINGS;
use crate::modules::settings::dir::DATA_DIR_MANAGER;
use crate::{id, raise_error, utc_now};
use itertools::Itertools;
use native_db::*;
use native_model::{native_model, Model};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// An attachment staged on disk, waiting to be sent with an outgoing reply.
/// Staging is explicit and per-account; nothing about an upload lives in
/// request-independent shared state.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
#[native_model(id = 5, version = 1)]
#[native_db]
pub struct StagedUpload {
    /// Unique identifier of this staged upload.
    #[primary_key]
    pub id: u64,
    /// The account that staged the file.
    #[secondary_key]
    pub account_id: u64,
    /// Original file name, reused as the attachment name.
    pub file_name: String,
    /// MIME type of the staged content.
    pub content_type: String,
    /// Size of the staged content in bytes.
    pub size: u64,
    /// The timestamp when the file was staged, in milliseconds since the Unix epoch.
    pub created_at: i64,
}

impl StagedUpload {
    /// Write the content to the staging directory and persist the metadata.
    pub async fn stage(
        account_id: u64,
        file_name: String,
        content_type: String,
        content: Vec<u8>,
    ) -> GraphMailerResult<StagedUpload> {
        let staged = StagedUpload {
            id: id!(64),
            account_id,
            file_name,
            content_type,
            size: content.len() as u64,
            created_at: utc_now!(),
        };

        tokio::fs::create_dir_all(&DATA_DIR_MANAGER.upload_dir)
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        tokio::fs::write(DATA_DIR_MANAGER.staged_file_path(staged.id), content)
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;

        insert_impl(DB_MANAGER.meta_db(), staged.clone()).await?;
        Ok(staged)
    }

    pub async fn get(id: u64) -> GraphMailerResult<Option<StagedUpload>> {
        async_find_impl(DB_MANAGER.meta_db(), id).await
    }

    pub async fn list_for_account(account_id: u64) -> GraphMailerResult<Vec<StagedUpload>> {
        filter_by_secondary_key_impl(DB_MANAGER.meta_db(), StagedUploadKey::account_id, account_id)
            .await
    }

    pub async fn read_content(&self) -> GraphMailerResult<Vec<u8>> {
        tokio::fs::read(DATA_DIR_MANAGER.staged_file_path(self.id))
            .await
            .map_err(|e| {
                raise_error!(
                    format!("Staged file for upload {} unreadable: {:#?}", self.id, e),
                    ErrorCode::ResourceNotFound
                )
            })
    }

    /// Remove the staged file and its metadata entry.
    pub async fn discard(self) -> GraphMailerResult<()> {
        if let Err(e) = tokio::fs::remove_file(DATA_DIR_MANAGER.staged_file_path(self.id)).await {
            warn!("Failed to remove staged file {}: {:#?}", self.id, e);
        }
        let id = self.id;
        delete_impl(DB_MANAGER.meta_db(), move |rw| {
            rw.get()
                .primary::<StagedUpload>(id)
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .ok_or_else(|| {
                    raise_error!(
                        format!(
                            "The staged upload with id={id} that you want to delete was not found."
                        ),
                        ErrorCode::ResourceNotFound
                    )
                })
        })
        .await
    }

    /// Drop staged uploads older than the configured TTL, files included.
    pub async fn clean() -> GraphMailerResult<()> {
        let ttl_ms = SETTINGS.graphmailer_staged_upload_ttl_hours as i64 * 60 * 60 * 1000;
        let expired = batch_delete_impl(DB_MANAGER.meta_db(), move |rw| {
            let all: Vec<StagedUpload> = rw
                .scan()
                .primary()
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .all()
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .try_collect()
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;

            let now = utc_now!();
            let to_delete: Vec<StagedUpload> = all
                .into_iter()
                .filter(|e| now - e.created_at > ttl_ms)
                .collect();

            for staged in &to_delete {
                if let Err(e) = std::fs::remove_file(DATA_DIR_MANAGER.staged_file_path(staged.id))
                {
                    warn!("Failed to remove expired staged file {}: {:#?}", staged.id, e);
                }
            }
            Ok(to_delete)
        })
        .await?;
        if expired > 0 {
            tracing::info!("Removed {} expired staged uploads", expired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::StagedUpload;

    #[tokio::test]
    async fn stage_read_discard_cycle() {
        let staged = StagedUpload::stage(
            501,
            "report.pdf".into(),
            "application/pdf".into(),
            b"%PDF-1.7 test".to_vec(),
        )
        .await
        .unwrap();
        assert_eq!(staged.size, 13);

        let loaded = StagedUpload::get(staged.id).await.unwrap().unwrap();
        assert_eq!(loaded.file_name, "report.pdf");
        assert_eq!(loaded.read_content().await.unwrap(), b"%PDF-1.7 test");

        let listed = StagedUpload::list_for_account(501).await.unwrap();
        assert!(listed.iter().any(|u| u.id == staged.id));

        let id = staged.id;
        loaded.discard().await.unwrap();
        assert!(StagedUpload::get(id).await.unwrap().is_none());
    }
}
