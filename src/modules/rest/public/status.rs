use crate::graphmailer_version;
use poem::{handler, web::Json, IntoResponse};
use serde::Serialize;

#[derive(Serialize)]
struct GraphMailerStatus {
    status: &'static str,
    version: &'static str,
    git: &'static str,
}

#[handler]
pub async fn get_status() -> impl IntoResponse {
    Json(GraphMailerStatus {
        status: "ok",
        version: graphmailer_version!(),
        git: env!("GIT_HASH"),
    })
}
