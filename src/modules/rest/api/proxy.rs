use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;
use crate::modules::settings::proxy::Proxy;
use poem::web::Path;
use poem_openapi::payload::Json;
use poem_openapi::{Object, OpenApi};
use serde::{Deserialize, Serialize};

pub struct ProxyApi;

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct ProxyCreateRequest {
    /// The proxy URL (e.g., socks5://127.0.0.1:1080).
    pub url: String,
}

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::Proxy")]
impl ProxyApi {
    /// Registers an outbound SOCKS5 proxy that OAuth2 and Graph requests can
    /// be routed through.
    #[oai(path = "/proxy", method = "post", operation_id = "create_proxy")]
    async fn create_proxy(
        &self,
        /// A JSON payload containing the proxy URL
        request: Json<ProxyCreateRequest>,
    ) -> ApiResult<Json<Proxy>> {
        let proxy = Proxy::new(request.0.url);
        proxy.save().await?;
        Ok(Json(proxy))
    }

    /// Lists all registered proxies.
    #[oai(path = "/proxy-list", method = "get", operation_id = "list_proxies")]
    async fn list_proxies(&self) -> ApiResult<Json<Vec<Proxy>>> {
        Ok(Json(Proxy::list_all().await?))
    }

    /// Removes a proxy.
    #[oai(path = "/proxy/:id", method = "delete", operation_id = "remove_proxy")]
    async fn remove_proxy(
        &self,
        /// The id of the proxy to delete
        id: Path<u64>,
    ) -> ApiResult<()> {
        Ok(Proxy::delete(id.0).await?)
    }
}
