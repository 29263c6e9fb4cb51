use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::user::schema::UserEntity;

/// Presence of `email`/`password` is checked in the service so the API can
/// answer with the exact field that was left out.
#[derive(Deserialize, Validate)]
pub struct RegisterModel {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub struct InsertUser {
    pub email: String,
    pub password_hash: String,
}

#[derive(Deserialize, Serialize)]
pub struct UserResponse {
    pub id: uuid::Uuid,
    pub email: String,
}

impl From<UserEntity> for UserResponse {
    fn from(entity: UserEntity) -> Self {
        UserResponse { id: entity.id, email: entity.email }
    }
}
