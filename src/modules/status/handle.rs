use actix_web::{get, web};
use serde::Serialize;

use crate::api::{error, success};
use crate::configs::RedisCache;
use crate::modules::{file::service::FileService, user::service::UserService};

#[derive(Serialize)]
pub struct StatusResponse {
    pub redis: bool,
    pub db: bool,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub users: i64,
    pub files: i64,
}

/// Liveness of the two backing stores. Always 200; the body carries the truth.
#[get("/status")]
pub async fn get_status(
    cache: web::Data<RedisCache>,
    db_pool: web::Data<sqlx::PgPool>,
) -> Result<success::Success<StatusResponse>, error::Error> {
    let redis = cache.is_alive().await;
    let db = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(db_pool.get_ref()).await.is_ok();
    Ok(success::Success::ok(StatusResponse { redis, db }))
}

#[get("/stats")]
pub async fn get_stats(
    user_service: web::Data<UserService>,
    file_service: web::Data<FileService>,
) -> Result<success::Success<StatsResponse>, error::Error> {
    let users = user_service.count().await?;
    let files = file_service.count().await?;
    Ok(success::Success::ok(StatsResponse { users, files }))
}
