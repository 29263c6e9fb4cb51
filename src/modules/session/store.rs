use uuid::Uuid;

use crate::api::error;

#[async_trait::async_trait]
pub trait SessionStore {
    async fn set(
        &self,
        token: &str,
        user_id: &Uuid,
        ttl_secs: usize,
    ) -> Result<(), error::SystemError>;
    async fn get(&self, token: &str) -> Result<Option<Uuid>, error::SystemError>;
    async fn delete(&self, token: &str) -> Result<(), error::SystemError>;
}
