use native_db::*;
use native_model::{native_model, Model};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::{
    id,
    modules::{
        database::{async_find_impl, delete_impl, insert_impl, list_all_impl, manager::DB_MANAGER},
        error::{code::ErrorCode, GraphMailerResult},
    },
    raise_error, utc_now,
};

/// An outbound SOCKS5 proxy that Graph and OAuth2 requests can be routed
/// through when direct access is blocked.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
#[native_model(id = 6, version = 1)]
#[native_db]
pub struct Proxy {
    /// The unique identifier for this proxy configuration.
    #[primary_key]
    pub id: u64,

    /// The proxy URL (e.g., socks5://127.0.0.1:1080) used to route network requests.
    pub url: String,

    /// The creation timestamp of this record, represented as milliseconds since the Unix epoch.
    pub created_at: i64,

    /// The last update timestamp of this record, represented as milliseconds since the Unix epoch.
    pub updated_at: i64,
}

impl Proxy {
    pub fn new(url: String) -> Self {
        Self {
            id: id!(64),
            url,
            created_at: utc_now!(),
            updated_at: utc_now!(),
        }
    }

    pub async fn save(&self) -> GraphMailerResult<()> {
        insert_impl(DB_MANAGER.meta_db(), self.clone()).await
    }

    pub async fn get(id: u64) -> GraphMailerResult<Proxy> {
        async_find_impl(DB_MANAGER.meta_db(), id)
            .await?
            .ok_or_else(|| {
                raise_error!(
                    format!("Proxy with id={} not found", id),
                    ErrorCode::ResourceNotFound
                )
            })
    }

    pub async fn list_all() -> GraphMailerResult<Vec<Proxy>> {
        list_all_impl(DB_MANAGER.meta_db()).await
    }

    pub async fn delete(id: u64) -> GraphMailerResult<()> {
        delete_impl(DB_MANAGER.meta_db(), move |rw| {
            rw.get()
                .primary::<Proxy>(id)
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .ok_or_else(|| {
                    raise_error!(
                        format!(
                            "The proxy entity with id={id} that you want to delete was not found."
                        ),
                        ErrorCode::ResourceNotFound
                    )
                })
        })
        .await
    }
}
