use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::user::model::{InsertUser, RegisterModel, UserResponse};
use crate::modules::user::repository::UserRepository;
use crate::utils::hash_password;

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn with_dependencies(repo: Arc<dyn UserRepository + Send + Sync>) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo }
    }

    pub async fn register(&self, user: RegisterModel) -> Result<UserResponse, error::SystemError> {
        let Some(email) = user.email.filter(|e| !e.is_empty()) else {
            return Err(error::SystemError::MissingField("email"));
        };
        let Some(password) = user.password.filter(|p| !p.is_empty()) else {
            return Err(error::SystemError::MissingField("password"));
        };

        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(error::SystemError::AlreadyExists);
        }

        let password_hash = hash_password(&password)?;
        let id = self.repo.create(&InsertUser { email: email.clone(), password_hash }).await?;

        Ok(UserResponse { id, email })
    }

    pub async fn me(&self, id: Uuid) -> Result<UserResponse, error::SystemError> {
        let user = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("session user no longer exists"))?;
        Ok(UserResponse::from(user))
    }

    pub async fn count(&self) -> Result<i64, error::SystemError> {
        self.repo.count().await
    }
}
