use uuid::Uuid;

use crate::api::error;
use crate::configs::RedisCache;
use crate::modules::session::store::SessionStore;

fn session_key(token: &str) -> String {
    format!("auth_{token}")
}

pub struct RedisSessionStore {
    cache: RedisCache,
}

impl RedisSessionStore {
    pub fn new(cache: RedisCache) -> Self {
        Self { cache }
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn set(
        &self,
        token: &str,
        user_id: &Uuid,
        ttl_secs: usize,
    ) -> Result<(), error::SystemError> {
        self.cache.set(&session_key(token), user_id, ttl_secs).await
    }

    async fn get(&self, token: &str) -> Result<Option<Uuid>, error::SystemError> {
        self.cache.get(&session_key(token)).await
    }

    async fn delete(&self, token: &str) -> Result<(), error::SystemError> {
        self.cache.delete(&session_key(token)).await
    }
}
