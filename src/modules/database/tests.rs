use crate::modules::database::{
    async_find_impl, delete_impl, insert_impl, list_all_impl, manager::DB_MANAGER, update_impl,
};
use crate::modules::error::code::ErrorCode;
use crate::modules::settings::proxy::Proxy;
use crate::{raise_error, utc_now};

#[tokio::test]
async fn insert_find_update_delete_cycle() {
    let proxy = Proxy::new("socks5://127.0.0.1:1080".into());
    let id = proxy.id;
    insert_impl(DB_MANAGER.meta_db(), proxy).await.unwrap();

    let found: Option<Proxy> = async_find_impl(DB_MANAGER.meta_db(), id).await.unwrap();
    assert_eq!(found.unwrap().url, "socks5://127.0.0.1:1080");

    update_impl(
        DB_MANAGER.meta_db(),
        move |rw| {
            rw.get()
                .primary::<Proxy>(id)
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .ok_or_else(|| raise_error!("missing".into(), ErrorCode::ResourceNotFound))
        },
        |current| {
            let mut updated = current.clone();
            updated.url = "socks5://127.0.0.1:9050".into();
            updated.updated_at = utc_now!();
            Ok(updated)
        },
    )
    .await
    .unwrap();

    let found: Option<Proxy> = async_find_impl(DB_MANAGER.meta_db(), id).await.unwrap();
    assert_eq!(found.unwrap().url, "socks5://127.0.0.1:9050");

    delete_impl(DB_MANAGER.meta_db(), move |rw| {
        rw.get()
            .primary::<Proxy>(id)
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
            .ok_or_else(|| raise_error!("missing".into(), ErrorCode::ResourceNotFound))
    })
    .await
    .unwrap();

    let all: Vec<Proxy> = list_all_impl(DB_MANAGER.meta_db()).await.unwrap();
    assert!(all.iter().all(|p| p.id != id));
}
