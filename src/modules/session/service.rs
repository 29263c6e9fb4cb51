use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::session::store::SessionStore;
use crate::modules::user::repository::UserRepository;
use crate::utils::{decode_basic_credentials, verify_password};

/// Sessions expire after 24 hours.
pub const SESSION_TTL_SECS: usize = 86_400;

#[derive(Clone)]
pub struct SessionManager {
    users: Arc<dyn UserRepository + Send + Sync>,
    store: Arc<dyn SessionStore + Send + Sync>,
}

impl SessionManager {
    pub fn with_dependencies(
        users: Arc<dyn UserRepository + Send + Sync>,
        store: Arc<dyn SessionStore + Send + Sync>,
    ) -> Self {
        info!("SessionManager initialized with dependencies");
        SessionManager { users, store }
    }

    /// Trades an `Authorization: Basic` header for a fresh session token.
    /// Every failure mode reads the same from the outside.
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
    ) -> Result<String, error::SystemError> {
        let header = authorization
            .ok_or_else(|| error::SystemError::unauthorized("missing Authorization header"))?;
        let (email, password) = decode_basic_credentials(header)?;

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("unknown email"))?;

        if !verify_password(&user.password_hash, &password)? {
            return Err(error::SystemError::unauthorized("wrong password"));
        }

        let token = Uuid::new_v4().to_string();
        self.store.set(&token, &user.id, SESSION_TTL_SECS).await?;

        Ok(token)
    }

    /// Maps a token back to its user, checking that the user still exists.
    pub async fn resolve(&self, token: &str) -> Result<Uuid, error::SystemError> {
        let user_id = self
            .store
            .get(token)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("unknown or expired token"))?;

        self.users
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("session user no longer exists"))?;

        Ok(user_id)
    }

    /// `resolve` for callers where anonymous access is allowed.
    pub async fn try_resolve(&self, token: &str) -> Option<Uuid> {
        self.resolve(token).await.ok()
    }

    pub async fn revoke(&self, token: &str) -> Result<(), error::SystemError> {
        self.store
            .get(token)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("unknown or expired token"))?;
        self.store.delete(token).await?;
        Ok(())
    }
}
